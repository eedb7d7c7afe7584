use bevy::prelude::*;

use super::fade::ScreenFade;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashPhase {
    FadingIn,
    Holding,
    FadingOut,
    Done,
}

/// Fade in, hold, fade out. Any input during the first two phases
/// jumps straight to the fade out.
#[derive(Resource, Debug, Clone)]
pub struct SplashSequence {
    pub phase: SplashPhase,
    timer: Timer,
    hold_secs: f32,
    fade_secs: f32,
}

impl SplashSequence {
    pub fn new(config: &SplashConfig) -> Self {
        Self {
            phase: SplashPhase::FadingIn,
            timer: Timer::from_seconds(config.fade_secs.max(0.0), TimerMode::Once),
            hold_secs: config.hold_secs.max(0.0),
            fade_secs: config.fade_secs.max(0.0),
        }
    }

    fn enter(&mut self, phase: SplashPhase, secs: f32) {
        self.phase = phase;
        self.timer = Timer::from_seconds(secs, TimerMode::Once);
    }

    /// Returns true on the step the sequence finishes.
    pub fn tick(&mut self, dt: std::time::Duration, skip: bool) -> bool {
        if skip && matches!(self.phase, SplashPhase::FadingIn | SplashPhase::Holding) {
            self.enter(SplashPhase::FadingOut, self.fade_secs);
            return false;
        }

        self.timer.tick(dt);
        if !self.timer.finished() {
            return false;
        }
        match self.phase {
            SplashPhase::FadingIn => {
                self.enter(SplashPhase::Holding, self.hold_secs);
                false
            }
            SplashPhase::Holding => {
                self.enter(SplashPhase::FadingOut, self.fade_secs);
                false
            }
            SplashPhase::FadingOut => {
                self.phase = SplashPhase::Done;
                true
            }
            SplashPhase::Done => false,
        }
    }

    /// Black overlay opacity for the current moment.
    pub fn overlay_alpha(&self) -> f32 {
        let fraction = self.timer.fraction();
        match self.phase {
            SplashPhase::FadingIn => 1.0 - fraction,
            SplashPhase::Holding => 0.0,
            SplashPhase::FadingOut => fraction,
            SplashPhase::Done => 1.0,
        }
    }
}

#[derive(Component, Debug)]
pub struct SplashEntity;

pub fn start_splash(mut commands: Commands, config: Res<GameConfig>, mut fade: ResMut<ScreenFade>) {
    commands.insert_resource(SplashSequence::new(&config.splash));
    fade.hold(1.0);

    commands
        .spawn((
            SplashEntity,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(12.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.12, 0.16, 0.22)),
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("PLOTSTEAD"),
                TextFont {
                    font_size: 64.0,
                    ..default()
                },
                TextColor(Color::srgb(0.98, 0.9, 0.6)),
            ));
            parent.spawn((
                Text::new("click or press any key"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
            ));
        });
}

pub fn run_splash(
    time: Res<Time>,
    any_input: Res<AnyInput>,
    mut pointer_events: EventReader<PointerEvent>,
    sequence: Option<ResMut<SplashSequence>>,
    config: Res<GameConfig>,
    mut fade: ResMut<ScreenFade>,
    mut scene_writer: EventWriter<SceneRequestEvent>,
) {
    let clicked = pointer_events
        .read()
        .any(|e| e.phase == PointerPhase::Down);
    let Some(mut sequence) = sequence else {
        return;
    };

    let skip = clicked || any_input.just_pressed;
    if sequence.tick(time.delta(), skip) {
        info!("[Scenes] Splash finished.");
        scene_writer.send(SceneRequestEvent {
            scene: config.main_scene.clone(),
        });
    } else if sequence.phase != SplashPhase::Done {
        fade.hold(sequence.overlay_alpha());
    }
}

pub fn cleanup_splash(mut commands: Commands, query: Query<Entity, With<SplashEntity>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<SplashSequence>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> SplashConfig {
        SplashConfig {
            hold_secs: 3.0,
            fade_secs: 1.0,
        }
    }

    #[test]
    fn test_runs_through_all_phases() {
        let mut seq = SplashSequence::new(&config());
        assert_eq!(seq.overlay_alpha(), 1.0);

        assert!(!seq.tick(Duration::from_secs_f32(1.0), false));
        assert_eq!(seq.phase, SplashPhase::Holding);
        assert_eq!(seq.overlay_alpha(), 0.0);

        assert!(!seq.tick(Duration::from_secs_f32(3.0), false));
        assert_eq!(seq.phase, SplashPhase::FadingOut);

        assert!(!seq.tick(Duration::from_secs_f32(0.5), false));
        assert!((seq.overlay_alpha() - 0.5).abs() < 1e-3);
        assert!(seq.tick(Duration::from_secs_f32(0.5), false));
        assert_eq!(seq.phase, SplashPhase::Done);
        assert!(!seq.tick(Duration::from_secs_f32(1.0), false));
    }

    #[test]
    fn test_skip_goes_straight_to_fade_out() {
        let mut seq = SplashSequence::new(&config());
        seq.tick(Duration::from_secs_f32(0.2), false);
        seq.tick(Duration::ZERO, true);
        assert_eq!(seq.phase, SplashPhase::FadingOut);

        // Skipping again during the fade out changes nothing.
        seq.tick(Duration::ZERO, true);
        assert_eq!(seq.phase, SplashPhase::FadingOut);
        assert!(seq.tick(Duration::from_secs_f32(1.0), false));
    }
}
