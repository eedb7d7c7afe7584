use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::ui::UiSystem;
use bevy::window::PrimaryWindow;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        // UI focus has to be settled first so `over_ui` reflects this frame.
        app.add_systems(
            PreUpdate,
            (read_any_input, dispatch_pointer)
                .chain()
                .after(UiSystem::Focus),
        );
    }
}

fn read_any_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut any: ResMut<AnyInput>,
) {
    any.just_pressed = keys.get_just_pressed().next().is_some()
        || mouse.get_just_pressed().next().is_some()
        || touches.any_just_pressed();
}

/// The single point where mouse and touch become world-space `PointerEvent`s.
fn dispatch_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    interactions: Query<&Interaction>,
    mut last_world: Local<Option<Vec2>>,
    mut writer: EventWriter<PointerEvent>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };

    let touch_position = touches
        .iter_just_pressed()
        .next()
        .or_else(|| touches.iter().next())
        .or_else(|| touches.iter_just_released().next())
        .map(|touch| touch.position());
    let world = touch_position
        .or_else(|| window.cursor_position())
        .and_then(|screen| camera.viewport_to_world_2d(camera_transform, screen).ok());

    let pressed = mouse.just_pressed(MouseButton::Left) || touches.any_just_pressed();
    let released = mouse.just_released(MouseButton::Left) || touches.any_just_released();
    let held = mouse.pressed(MouseButton::Left) || touches.iter().next().is_some();

    let sample = pointer_sample(world, *last_world, pressed, released, held);
    if world.is_some() {
        *last_world = world;
    }

    if let Some((phase, position)) = sample {
        writer.send(PointerEvent {
            phase,
            position,
            over_ui: interactions.iter().any(|i| *i != Interaction::None),
        });
    }
}

/// Picks this frame's pointer phase. `world` is `None` while the cursor is
/// off the window; a release there still lands, at the last known position.
pub fn pointer_sample(
    world: Option<Vec2>,
    last_world: Option<Vec2>,
    pressed: bool,
    released: bool,
    held: bool,
) -> Option<(PointerPhase, Vec2)> {
    match world {
        Some(world) if pressed => Some((PointerPhase::Down, world)),
        Some(world) if released => Some((PointerPhase::Up, world)),
        Some(world) if held && last_world != Some(world) => Some((PointerPhase::Move, world)),
        Some(_) => None,
        None if released => last_world.map(|last| (PointerPhase::Up, last)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Vec2 = Vec2::new(10.0, 20.0);
    const B: Vec2 = Vec2::new(-5.0, 40.0);

    #[test]
    fn test_press_release_and_drag_phases() {
        assert_eq!(
            pointer_sample(Some(A), None, true, false, true),
            Some((PointerPhase::Down, A))
        );
        assert_eq!(
            pointer_sample(Some(B), Some(A), false, false, true),
            Some((PointerPhase::Move, B))
        );
        assert_eq!(pointer_sample(Some(A), Some(A), false, false, true), None);
        assert_eq!(
            pointer_sample(Some(B), Some(A), false, true, false),
            Some((PointerPhase::Up, B))
        );
        // Hovering without a button does nothing.
        assert_eq!(pointer_sample(Some(B), Some(A), false, false, false), None);
    }

    #[test]
    fn test_release_off_window_uses_last_position() {
        assert_eq!(
            pointer_sample(None, Some(A), false, true, false),
            Some((PointerPhase::Up, A))
        );
        // Nothing known yet, nothing to report.
        assert_eq!(pointer_sample(None, None, false, true, false), None);
        // Presses and drags need a real position.
        assert_eq!(pointer_sample(None, Some(A), true, false, true), None);
        assert_eq!(pointer_sample(None, Some(A), false, false, true), None);
    }
}
