//! The BUY / BUILD button pair that slides up when a plot is selected.

use bevy::prelude::*;

use super::{TownUi, UiAction, BUTTON_NORMAL};
use crate::shared::*;
use crate::tween::{Easing, Tween, UiSlide};

pub const SLIDE_SECS: f32 = 0.5;
const PANEL_WIDTH: f32 = 300.0;
pub const PANEL_SHOWN: Vec2 = Vec2::new((SCREEN_WIDTH - PANEL_WIDTH) / 2.0, 24.0);
pub const PANEL_HIDDEN: Vec2 = Vec2::new((SCREEN_WIDTH - PANEL_WIDTH) / 2.0, -120.0);

const COLOR_AFFORDABLE: Color = Color::srgb(0.25, 0.6, 0.3);
const COLOR_UNAFFORDABLE: Color = Color::srgb(0.65, 0.25, 0.22);
const COLOR_BUILD: Color = Color::srgb(0.25, 0.42, 0.7);

#[derive(Component)]
pub struct ActionPanel;

/// The BUY / BUILD button. Coloured by its face, not by hover.
#[derive(Component)]
pub struct ActionButton;

#[derive(Component)]
pub struct ActionButtonLabel;

pub fn face_color(face: ActionFace) -> Color {
    match face {
        ActionFace::Buy {
            affordable: true, ..
        } => COLOR_AFFORDABLE,
        ActionFace::Buy {
            affordable: false, ..
        } => COLOR_UNAFFORDABLE,
        ActionFace::Build => COLOR_BUILD,
    }
}

pub fn spawn_action_panel(mut commands: Commands) {
    commands
        .spawn((
            ActionPanel,
            TownUi,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(PANEL_HIDDEN.x),
                bottom: Val::Px(PANEL_HIDDEN.y),
                width: Val::Px(PANEL_WIDTH),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::SpaceBetween,
                column_gap: Val::Px(12.0),
                ..default()
            },
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|panel| {
            panel
                .spawn((
                    ActionButton,
                    Button,
                    UiAction::Act,
                    Node {
                        width: Val::Px(180.0),
                        height: Val::Px(48.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(BUTTON_NORMAL),
                ))
                .with_children(|button| {
                    button.spawn((
                        ActionButtonLabel,
                        Text::new(""),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        PickingBehavior::IGNORE,
                    ));
                });

            super::spawn_button(panel, UiAction::Deselect, "UNSELECT", 108.0);
        });
}

fn node_position(node: &Node) -> Vec2 {
    let px = |val: Val, fallback: f32| match val {
        Val::Px(v) => v,
        _ => fallback,
    };
    Vec2::new(px(node.left, PANEL_HIDDEN.x), px(node.bottom, PANEL_HIDDEN.y))
}

/// Slides the panel in with the requested face, or out again.
pub fn handle_action_panel_events(
    mut commands: Commands,
    mut events: EventReader<ActionPanelEvent>,
    mut panels: Query<(Entity, &Node, &mut Visibility), With<ActionPanel>>,
    mut buttons: Query<&mut BackgroundColor, With<ActionButton>>,
    mut labels: Query<&mut Text, With<ActionButtonLabel>>,
) {
    let Some(event) = events.read().last().copied() else {
        return;
    };
    let Ok((entity, node, mut visibility)) = panels.get_single_mut() else {
        return;
    };
    let from = node_position(node);

    match event {
        ActionPanelEvent::Show(face) => {
            for mut bg in &mut buttons {
                bg.0 = face_color(face);
            }
            for mut text in &mut labels {
                text.0 = face.label();
            }
            *visibility = Visibility::Visible;
            commands.entity(entity).insert(UiSlide::new(
                Tween::new(from, PANEL_SHOWN, SLIDE_SECS, Easing::SmoothStep),
                false,
            ));
        }
        ActionPanelEvent::Hide => {
            if *visibility == Visibility::Hidden {
                return;
            }
            commands.entity(entity).insert(UiSlide::new(
                Tween::new(from, PANEL_HIDDEN, SLIDE_SECS, Easing::SmoothStep),
                true,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_colors_differ() {
        let cheap = face_color(ActionFace::Buy {
            cost: 10,
            affordable: true,
        });
        let dear = face_color(ActionFace::Buy {
            cost: 10_000,
            affordable: false,
        });
        assert_ne!(cheap, dear);
        assert_ne!(face_color(ActionFace::Build), cheap);
    }

    #[test]
    fn test_node_position_falls_back_to_hidden() {
        let node = Node::default();
        assert_eq!(node_position(&node), PANEL_HIDDEN);

        let node = Node {
            left: Val::Px(5.0),
            bottom: Val::Px(7.0),
            ..default()
        };
        assert_eq!(node_position(&node), Vec2::new(5.0, 7.0));
    }
}
