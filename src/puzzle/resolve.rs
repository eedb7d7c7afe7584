//! Outcome resolution: rewards, completion flags and the trip back to town.

use bevy::prelude::*;

use super::{AssemblyPuzzle, PuzzleOutcome};
use crate::shared::*;

#[derive(Event, Debug, Clone, Copy)]
pub struct PuzzleFinishedEvent {
    pub outcome: PuzzleOutcome,
}

/// Counts down to the automatic return to the main scene.
#[derive(Resource, Debug)]
pub struct ReturnToMain {
    pub timer: Timer,
}

/// Applies a finished run exactly once.
pub fn resolve_outcome(
    mut commands: Commands,
    mut events: EventReader<PuzzleFinishedEvent>,
    puzzle: Res<AssemblyPuzzle>,
    config: Res<GameConfig>,
    mut wallet: ResMut<Wallet>,
    mut prefs: ResMut<PlayerPrefs>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
    pending: Option<Res<ReturnToMain>>,
) {
    let Some(event) = events.read().next() else {
        return;
    };
    if pending.is_some() {
        return;
    }

    match event.outcome {
        PuzzleOutcome::Win => {
            // The reward belongs to a plot; a run with none pays nothing.
            if let Some(index) = puzzle.plot_index {
                prefs.set_flag_logged(keys::plot_success(index), true);
                wallet.credit(config.puzzle.win_reward, &mut prefs);
                info!(
                    "[Puzzle] Plot {} completed. +{} reward.",
                    index, config.puzzle.win_reward
                );
            } else {
                info!("[Puzzle] House assembled without a plot. No reward.");
            }
            sfx_writer.send(PlaySfxEvent::new(SFX_WIN));
        }
        PuzzleOutcome::Lose => {
            sfx_writer.send(PlaySfxEvent::new(SFX_LOSE));
            info!(
                "[Puzzle] Time is up with {}/{} parts placed.",
                puzzle.placed(),
                puzzle.total_parts
            );
        }
    }

    commands.insert_resource(ReturnToMain {
        timer: Timer::from_seconds(config.puzzle.return_delay_secs, TimerMode::Once),
    });
}

pub fn return_to_main(
    mut commands: Commands,
    time: Res<Time>,
    pending: Option<ResMut<ReturnToMain>>,
    config: Res<GameConfig>,
    mut scene_writer: EventWriter<SceneRequestEvent>,
) {
    let Some(mut pending) = pending else {
        return;
    };
    pending.timer.tick(time.delta());
    if pending.timer.just_finished() {
        scene_writer.send(SceneRequestEvent {
            scene: config.main_scene.clone(),
        });
        commands.remove_resource::<ReturnToMain>();
    }
}
