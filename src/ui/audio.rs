use bevy::prelude::*;

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// SFX PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

/// Maps SFX IDs (sent by other domains) to audio file paths.
pub fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        SFX_CLICK => Some("audio/sfx/click.ogg"),
        SFX_PURCHASE => Some("audio/sfx/purchase.ogg"),
        SFX_ERROR => Some("audio/sfx/error.ogg"),
        SFX_SNAP => Some("audio/sfx/snap.ogg"),
        SFX_WIN => Some("audio/sfx/win.ogg"),
        SFX_LOSE => Some("audio/sfx/lose.ogg"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SFX QUEUE
// ═══════════════════════════════════════════════════════════════════════

/// Cue paths waiting to be played, in the order they were requested.
#[derive(Resource, Debug, Default)]
pub struct SfxQueue {
    pub pending: Vec<&'static str>,
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Turns `PlaySfxEvent`s into queued paths. Muted means the events are
/// drained and dropped.
pub fn queue_sfx(
    mut events: EventReader<PlaySfxEvent>,
    sound: Res<SoundSettings>,
    mut queue: ResMut<SfxQueue>,
) {
    for event in events.read() {
        if !sound.enabled {
            continue;
        }
        match sfx_path(&event.sfx_id) {
            Some(path) => queue.pending.push(path),
            None => warn!("[Audio] Unknown sfx id '{}'.", event.sfx_id),
        }
    }
}

/// Spawns one-shot audio sources that auto-despawn.
pub fn play_queued_sfx(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut queue: ResMut<SfxQueue>,
) {
    for path in queue.pending.drain(..) {
        commands.spawn((
            AudioPlayer::new(asset_server.load(path)),
            PlaybackSettings::DESPAWN,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_game_sfx_has_a_path() {
        for id in [SFX_CLICK, SFX_PURCHASE, SFX_ERROR, SFX_SNAP, SFX_WIN, SFX_LOSE] {
            assert!(sfx_path(id).is_some(), "missing path for {id}");
        }
        assert_eq!(sfx_path("nope"), None);
    }

    fn queue_app(enabled: bool) -> App {
        let mut app = App::new();
        app.add_event::<PlaySfxEvent>()
            .insert_resource(SoundSettings { enabled })
            .init_resource::<SfxQueue>()
            .add_systems(Update, queue_sfx);
        app
    }

    #[test]
    fn test_cues_queue_in_request_order() {
        let mut app = queue_app(true);
        app.world_mut().send_event(PlaySfxEvent::new(SFX_CLICK));
        app.world_mut().send_event(PlaySfxEvent::new(SFX_PURCHASE));
        app.world_mut().send_event(PlaySfxEvent::new("nope"));
        app.update();

        let queue = app.world().resource::<SfxQueue>();
        assert_eq!(
            queue.pending,
            vec!["audio/sfx/click.ogg", "audio/sfx/purchase.ogg"]
        );
    }

    #[test]
    fn test_muted_drops_cues() {
        let mut app = queue_app(false);
        app.world_mut().send_event(PlaySfxEvent::new(SFX_CLICK));
        app.update();
        assert!(app.world().resource::<SfxQueue>().pending.is_empty());

        // Unmuting does not replay what was dropped.
        app.world_mut().resource_mut::<SoundSettings>().enabled = true;
        app.update();
        assert!(app.world().resource::<SfxQueue>().pending.is_empty());
    }
}
