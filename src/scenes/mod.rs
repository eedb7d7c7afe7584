//! Scenes domain: maps scene names onto `GameState`, plays the splash,
//! and drives the screen fade between scenes.

use bevy::prelude::*;
use crate::shared::*;

pub mod fade;
pub mod splash;

pub use fade::ScreenFade;
pub use splash::{SplashPhase, SplashSequence};

/// Scene names known to the game.
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneRouter {
    pub main_scene: String,
    pub assembly_scenes: Vec<String>,
}

impl SceneRouter {
    pub fn from_config(config: &GameConfig) -> Self {
        let mut assembly_scenes: Vec<String> = config
            .plots
            .iter()
            .filter_map(|plot| plot.scene.clone())
            .collect();
        assembly_scenes.sort();
        assembly_scenes.dedup();
        Self {
            main_scene: config.main_scene.clone(),
            assembly_scenes,
        }
    }

    pub fn resolve(&self, scene: &str) -> Option<GameState> {
        if scene == self.main_scene {
            Some(GameState::Town)
        } else if self.assembly_scenes.iter().any(|s| s == scene) {
            Some(GameState::Assembly)
        } else {
            None
        }
    }
}

pub struct ScenesPlugin;

impl Plugin for ScenesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneRouter>()
            .init_resource::<ScreenFade>();

        app.add_systems(OnExit(GameState::Loading), build_scene_router);

        app.add_systems(OnEnter(GameState::Splash), splash::start_splash);
        app.add_systems(
            Update,
            splash::run_splash.run_if(in_state(GameState::Splash)),
        );
        app.add_systems(OnExit(GameState::Splash), splash::cleanup_splash);

        app.add_systems(Update, (handle_scene_requests, fade::advance_fade).chain());
    }
}

fn build_scene_router(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(SceneRouter::from_config(&config));
}

pub fn handle_scene_requests(
    mut requests: EventReader<SceneRequestEvent>,
    router: Res<SceneRouter>,
    current: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut fade: ResMut<ScreenFade>,
) {
    for request in requests.read() {
        let Some(target) = router.resolve(&request.scene) else {
            error!("[Scenes] Unknown scene '{}'. Staying put.", request.scene);
            continue;
        };
        info!(
            "[Scenes] Loading '{}' ({:?} -> {:?}).",
            request.scene,
            current.get(),
            target
        );
        next_state.set(target);
        // New scenes open out of black.
        fade.start(1.0, 0.0, 0.4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_maps_names_to_states() {
        let router = SceneRouter::from_config(&GameConfig::default());
        assert_eq!(router.resolve("MainScene"), Some(GameState::Town));
        assert_eq!(router.resolve("Plot_3"), Some(GameState::Assembly));
        assert_eq!(router.resolve("Moon"), None);
    }

    #[test]
    fn test_router_lists_each_shared_scene_once() {
        let mut config = GameConfig::default();
        config.plots[0].scene = Some("Plot_B".to_string());
        config.plots[1].scene = Some("Plot_A".to_string());
        config.plots[2].scene = Some("Plot_B".to_string());
        config.plots[3].scene = None;

        let router = SceneRouter::from_config(&config);
        assert_eq!(router.assembly_scenes, vec!["Plot_A", "Plot_B"]);
        assert_eq!(router.resolve("Plot_B"), Some(GameState::Assembly));
    }
}
