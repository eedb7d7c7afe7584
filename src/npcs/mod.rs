//! Ambient townsfolk. Purely cosmetic: they never block clicks and never
//! touch persisted state.

use bevy::prelude::*;
use rand::Rng;

use crate::data::vec2;
use crate::shared::*;

mod wander;

pub use wander::*;

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Town), spawn_walkers)
            .add_systems(
                Update,
                wander_walkers.run_if(in_state(GameState::Town)),
            );
    }
}

#[derive(Component, Debug, Clone)]
pub struct AmbientWalker {
    pub home: Vec2,
    pub walk_range: f32,
    /// Pixels per second.
    pub speed: f32,
    /// Radians, 0 = facing +X.
    pub heading: f32,
    pub target: Vec2,
    /// Fires every change interval to pick a new target.
    pub retarget: Timer,
    /// Set while pressed against an obstacle, so a bump turns only once.
    pub bumping: bool,
}

impl AmbientWalker {
    pub fn from_config(config: &WalkerConfig, rng: &mut impl Rng) -> Self {
        let home = vec2(config.home);
        Self {
            home,
            walk_range: config.walk_range,
            speed: config.speed,
            heading: rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI),
            target: random_point_near(rng, home, config.walk_range),
            retarget: Timer::from_seconds(config.change_interval_secs.max(0.1), TimerMode::Repeating),
            bumping: false,
        }
    }
}

const WALKER_COLOR: Color = Color::srgb(0.95, 0.85, 0.75);

fn spawn_walkers(mut commands: Commands, config: Res<GameConfig>) {
    let mut rng = rand::thread_rng();
    for walker_config in &config.walkers {
        let walker = AmbientWalker::from_config(walker_config, &mut rng);
        let home = walker.home;
        commands.spawn((
            walker,
            TownEntity,
            Sprite::from_color(WALKER_COLOR, Vec2::new(14.0, 10.0)),
            Transform::from_translation(home.extend(Z_WALKER)),
        ));
    }
    info!("[Npcs] {} walkers out for a stroll.", config.walkers.len());
}
