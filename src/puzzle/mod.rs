use bevy::prelude::*;

use crate::shared::*;
use crate::tween::{TweenSet, WorldMove};

// ─── Sub-modules ────────────────────────────────────────────────────────────
mod assembly;
mod render;
mod resolve;

pub use assembly::*;
pub use render::*;
pub use resolve::*;

// ─── Plugin ─────────────────────────────────────────────────────────────────

pub struct PuzzlePlugin;

impl Plugin for PuzzlePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveDrag>()
            .add_event::<PuzzleFinishedEvent>()
            .add_systems(
                OnEnter(GameState::Assembly),
                (start_puzzle, render::spawn_assembly_scene).chain(),
            )
            .add_systems(OnExit(GameState::Assembly), render::despawn_assembly_scene)
            // Releases are handled before the countdown so a part placed on
            // the last frame still counts.
            .add_systems(
                Update,
                (
                    handle_part_pointer,
                    tick_countdown,
                    resolve::resolve_outcome,
                    render::show_outcome_panel,
                    resolve::return_to_main,
                    render::highlight_snap_targets,
                    render::update_countdown_text,
                )
                    .chain()
                    .after(TweenSet)
                    .run_if(in_state(GameState::Assembly)),
            );
    }
}

// ─── Components ─────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone)]
pub struct AssemblyPart {
    pub index: usize,
    pub home: Vec2,
    pub target: Vec2,
    pub target_rotation: f32,
    /// Locked once snapped; never draggable again.
    pub placed: bool,
}

/// Ghost outline showing where a part belongs.
#[derive(Component, Debug, Clone, Copy)]
pub struct SnapTarget {
    pub part: usize,
}

/// Everything spawned for the assembly scene.
#[derive(Component, Debug, Default)]
pub struct AssemblyEntity;

#[derive(Resource, Debug, Default)]
pub struct ActiveDrag {
    pub part: Option<Entity>,
    pub grab_offset: Vec2,
}

pub const SNAP_SECS: f32 = 0.1;
pub const RETURN_SECS: f32 = 0.2;

// ─── Systems ────────────────────────────────────────────────────────────────

fn start_puzzle(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut prefs: ResMut<PlayerPrefs>,
    mut drag: ResMut<ActiveDrag>,
) {
    let handed_off = prefs.get_int(keys::CURRENT_PLOT_INDEX, -1);
    let plot_index = usize::try_from(handed_off).ok();
    if plot_index.is_none() {
        warn!("[Puzzle] No plot handed off. A win will neither complete a plot nor pay out.");
    }
    // The hand-off is single use.
    if let Err(e) = prefs.delete_key(keys::CURRENT_PLOT_INDEX) {
        warn!("[Puzzle] Could not clear the plot hand-off: {}", e);
    }

    let puzzle = AssemblyPuzzle::new(
        config.puzzle.parts.len(),
        config.puzzle.time_limit_secs,
        plot_index,
    );
    info!(
        "[Puzzle] Assembly started: {} parts, {}s, plot {:?}.",
        puzzle.total_parts, config.puzzle.time_limit_secs, plot_index
    );
    commands.insert_resource(puzzle);
    *drag = ActiveDrag::default();
}

/// Grab, drag and drop parts.
pub fn handle_part_pointer(
    mut commands: Commands,
    mut pointer_events: EventReader<PointerEvent>,
    mut puzzle: ResMut<AssemblyPuzzle>,
    mut drag: ResMut<ActiveDrag>,
    config: Res<GameConfig>,
    mut parts: Query<(Entity, &mut AssemblyPart, &mut Transform, &mut HitRegion)>,
    mut finished_writer: EventWriter<PuzzleFinishedEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
) {
    for event in pointer_events.read() {
        match event.phase {
            PointerPhase::Down => {
                if event.over_ui || !puzzle.accepts_input() || drag.part.is_some() {
                    continue;
                }
                let grabbed = parts
                    .iter()
                    .filter(|(_, part, _, region)| !part.placed && region.enabled)
                    .filter(|(_, _, transform, region)| {
                        region
                            .rect_at(transform.translation.truncate())
                            .contains(event.position)
                    })
                    .max_by(|a, b| a.2.translation.z.total_cmp(&b.2.translation.z))
                    .map(|(entity, _, transform, _)| (entity, transform.translation.truncate()));

                let Some((entity, position)) = grabbed else {
                    continue;
                };
                drag.part = Some(entity);
                drag.grab_offset = position - event.position;
                // Cancels a return animation still in flight.
                commands.entity(entity).remove::<WorldMove>();
                if let Ok((_, _, mut transform, _)) = parts.get_mut(entity) {
                    transform.translation.z = Z_PART_DRAGGED;
                }
                if puzzle.start_timer() {
                    info!("[Puzzle] Countdown started.");
                }
            }
            PointerPhase::Move => {
                let Some(entity) = drag.part else {
                    continue;
                };
                if !puzzle.accepts_input() {
                    continue;
                }
                if let Ok((_, _, mut transform, _)) = parts.get_mut(entity) {
                    let to = event.position + drag.grab_offset;
                    transform.translation.x = to.x;
                    transform.translation.y = to.y;
                }
            }
            PointerPhase::Up => {
                let Some(entity) = drag.part.take() else {
                    continue;
                };
                let Ok((_, mut part, mut transform, mut region)) = parts.get_mut(entity) else {
                    continue;
                };
                transform.translation.z = Z_PART;

                let distance = transform.translation.truncate().distance(part.target);
                if puzzle.accepts_input() && distance <= config.puzzle.snap_distance {
                    part.placed = true;
                    region.enabled = false;
                    commands.entity(entity).insert(WorldMove::to(
                        &transform,
                        part.target,
                        part.target_rotation,
                        SNAP_SECS,
                    ));
                    sfx_writer.send(PlaySfxEvent::new(SFX_SNAP));
                    info!(
                        "[Puzzle] Part {} placed ({}/{}).",
                        part.index,
                        puzzle.placed() + 1,
                        puzzle.total_parts
                    );
                    if let Some(outcome) = puzzle.record_placement() {
                        finished_writer.send(PuzzleFinishedEvent { outcome });
                    }
                } else {
                    commands.entity(entity).insert(WorldMove::to(
                        &transform,
                        part.home,
                        0.0,
                        RETURN_SECS,
                    ));
                }
            }
        }
    }
}

pub fn tick_countdown(
    time: Res<Time>,
    mut puzzle: ResMut<AssemblyPuzzle>,
    mut finished_writer: EventWriter<PuzzleFinishedEvent>,
) {
    if let Some(outcome) = puzzle.tick(time.delta_secs()) {
        finished_writer.send(PuzzleFinishedEvent { outcome });
    }
}
