use bevy::prelude::*;

use crate::scenes::ScreenFade;

/// Marker for the screen fade overlay
#[derive(Component)]
pub struct ScreenFadeOverlay;

/// Spawn the fade overlay (always present, transparent until a fade runs)
pub fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        ScreenFadeOverlay,
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(100), // on top of everything
        PickingBehavior::IGNORE,
    ));
}

/// Mirrors the fade alpha onto the overlay.
pub fn sync_fade_overlay(
    fade: Res<ScreenFade>,
    mut query: Query<&mut BackgroundColor, With<ScreenFadeOverlay>>,
) {
    if !fade.is_changed() {
        return;
    }
    for mut bg in &mut query {
        bg.0 = Color::srgba(0.0, 0.0, 0.0, fade.alpha.clamp(0.0, 1.0));
    }
}
