//! Assembly scene sprites, countdown text and the win/lose panel.

use bevy::prelude::*;

use super::{
    format_countdown, ActiveDrag, AssemblyEntity, AssemblyPart, AssemblyPuzzle, PuzzleFinishedEvent,
    PuzzleOutcome, ReturnToMain, SnapTarget,
};
use crate::data::vec2;
use crate::shared::*;

// ─── Colors ───────────────────────────────────────────────────────────────────

const COLOR_GROUND: Color = Color::srgb(0.32, 0.45, 0.3);
const COLOR_PART: Color = Color::srgb(0.78, 0.52, 0.32);
const COLOR_TARGET: Color = Color::srgba(1.0, 1.0, 1.0, 0.2);
const COLOR_TARGET_NEAR: Color = Color::srgba(1.0, 0.95, 0.5, 0.6);
const COLOR_PANEL: Color = Color::srgba(0.0, 0.0, 0.0, 0.8);
const COLOR_WIN: Color = Color::srgb(0.55, 0.95, 0.5);
const COLOR_LOSE: Color = Color::srgb(0.95, 0.45, 0.4);

const Z_TARGET: f32 = 5.0;

#[derive(Component, Debug)]
pub struct CountdownText;

#[derive(Component, Debug)]
pub struct OutcomePanel;

// ─── OnEnter / OnExit ─────────────────────────────────────────────────────────

pub fn spawn_assembly_scene(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        AssemblyEntity,
        Sprite::from_color(COLOR_GROUND, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT)),
        Transform::from_xyz(0.0, 0.0, Z_GROUND),
    ));

    for (index, part) in config.puzzle.parts.iter().enumerate() {
        let size = vec2(part.size);
        let target = vec2(part.target);
        let home = vec2(part.start);

        commands.spawn((
            AssemblyEntity,
            SnapTarget { part: index },
            Sprite::from_color(COLOR_TARGET, size),
            Transform::from_translation(target.extend(Z_TARGET))
                .with_rotation(Quat::from_rotation_z(part.rotation_deg.to_radians())),
        ));

        commands.spawn((
            AssemblyEntity,
            AssemblyPart {
                index,
                home,
                target,
                target_rotation: part.rotation_deg.to_radians(),
                placed: false,
            },
            HitRegion::new(size),
            Sprite::from_color(COLOR_PART, size),
            Transform::from_translation(home.extend(Z_PART)),
        ));
    }

    commands
        .spawn((
            AssemblyEntity,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(4.0),
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Drag every piece into place"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                CountdownText,
                Text::new(format_countdown(config.puzzle.time_limit_secs)),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn despawn_assembly_scene(
    mut commands: Commands,
    query: Query<Entity, With<AssemblyEntity>>,
    mut drag: ResMut<ActiveDrag>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
    *drag = ActiveDrag::default();
    commands.remove_resource::<ReturnToMain>();
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Brightens the target of the dragged part while it is close enough to snap.
pub fn highlight_snap_targets(
    drag: Res<ActiveDrag>,
    config: Res<GameConfig>,
    parts: Query<(&AssemblyPart, &Transform)>,
    mut targets: Query<(&SnapTarget, &mut Sprite)>,
) {
    let near = drag
        .part
        .and_then(|entity| parts.get(entity).ok())
        .filter(|(part, transform)| {
            transform.translation.truncate().distance(part.target) <= config.puzzle.snap_distance
        })
        .map(|(part, _)| part.index);

    for (target, mut sprite) in &mut targets {
        let color = if Some(target.part) == near {
            COLOR_TARGET_NEAR
        } else {
            COLOR_TARGET
        };
        if sprite.color != color {
            sprite.color = color;
        }
    }
}

pub fn update_countdown_text(
    puzzle: Res<AssemblyPuzzle>,
    mut query: Query<&mut Text, With<CountdownText>>,
) {
    if !puzzle.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = format_countdown(puzzle.remaining_secs());
    }
}

pub fn show_outcome_panel(
    mut commands: Commands,
    mut events: EventReader<PuzzleFinishedEvent>,
    config: Res<GameConfig>,
    puzzle: Res<AssemblyPuzzle>,
    existing: Query<(), With<OutcomePanel>>,
) {
    let Some(event) = events.read().next() else {
        return;
    };
    if !existing.is_empty() {
        return;
    }

    let (title, detail, color) = match event.outcome {
        PuzzleOutcome::Win => (
            "HOUSE BUILT!".to_string(),
            match puzzle.plot_index {
                Some(_) => format!("+{}", config.puzzle.win_reward),
                None => "Back to town...".to_string(),
            },
            COLOR_WIN,
        ),
        PuzzleOutcome::Lose => (
            "TIME'S UP".to_string(),
            "Back to town...".to_string(),
            COLOR_LOSE,
        ),
    };

    commands
        .spawn((
            AssemblyEntity,
            OutcomePanel,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        padding: UiRect::all(Val::Px(24.0)),
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(8.0),
                        ..default()
                    },
                    BackgroundColor(COLOR_PANEL),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new(title),
                        TextFont {
                            font_size: 40.0,
                            ..default()
                        },
                        TextColor(color),
                    ));
                    panel.spawn((
                        Text::new(detail),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}
