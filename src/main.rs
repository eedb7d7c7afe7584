mod shared;
mod prefs;
mod data;
mod input;
mod tween;
mod economy;
mod plots;
mod scenes;
mod puzzle;
mod npcs;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Plotstead".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<AnyInput>()
        .init_resource::<SoundSettings>()
        .init_resource::<Wallet>()
        // Events
        .add_event::<PointerEvent>()
        .add_event::<UserMessageEvent>()
        .add_event::<ActionPanelEvent>()
        .add_event::<PlotCommand>()
        .add_event::<BuyItemRequest>()
        .add_event::<ItemPurchasedEvent>()
        .add_event::<SceneRequestEvent>()
        .add_event::<PlaySfxEvent>()
        // Data loading
        .add_plugins(data::DataPlugin)
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(tween::TweenPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(plots::PlotsPlugin)
        .add_plugins(scenes::ScenesPlugin)
        .add_plugins(puzzle::PuzzlePlugin)
        .add_plugins(npcs::NpcPlugin)
        .add_plugins(ui::UiPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));
}
