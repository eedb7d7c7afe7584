//! Plots domain: the town's purchasable plots, decorations and the
//! selection state machine that turns clicks into purchases and builds.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::data::vec2;
use crate::shared::*;

pub mod board;
pub mod picking;
pub mod selector;

pub use board::{PlotBoard, PlotState};
pub use selector::{PlotSelector, PointerHit, SelectionState, SelectorEffect};

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone, Copy)]
pub struct Plot {
    pub index: usize,
}

/// Price text floating over a plot.
#[derive(Component, Debug, Clone, Copy)]
pub struct PriceLabel {
    pub index: usize,
}

#[derive(Component, Debug, Clone)]
pub struct Decoration {
    pub name: String,
    pub hidden_until_purchased: bool,
}

/// The single marker drawn over the selected plot.
#[derive(Component, Debug)]
pub struct SelectionHighlight;

const PLOT_COLOR: Color = Color::srgb(0.42, 0.68, 0.36);
const PLOT_PURCHASED_COLOR: Color = Color::srgb(0.86, 0.74, 0.42);
const PLOT_BUILT_COLOR: Color = Color::srgb(0.5, 0.5, 0.5);
const DECORATION_COLOR: Color = Color::srgb(0.55, 0.45, 0.62);
const HIGHLIGHT_COLOR: Color = Color::srgba(1.0, 0.95, 0.4, 0.35);

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct PlotsPlugin;

impl Plugin for PlotsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlotBoard>()
            .init_resource::<PlotSelector>();

        app.add_systems(OnExit(GameState::Loading), build_plot_board);
        app.add_systems(OnEnter(GameState::Town), spawn_town);
        app.add_systems(OnExit(GameState::Town), despawn_town);

        app.add_systems(
            Update,
            (
                resolve_world_clicks,
                handle_plot_commands,
                forget_built_selection,
                refresh_plot_visuals,
            )
                .chain()
                .run_if(in_state(GameState::Town)),
        );

        info!("[Plots] PlotsPlugin registered.");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Effect application
// ─────────────────────────────────────────────────────────────────────────────

#[derive(SystemParam)]
pub struct SelectorOutputs<'w, 's> {
    commands: Commands<'w, 's>,
    highlights: Query<'w, 's, Entity, With<SelectionHighlight>>,
    sfx: EventWriter<'w, PlaySfxEvent>,
    panel: EventWriter<'w, ActionPanelEvent>,
    messages: EventWriter<'w, UserMessageEvent>,
    scenes: EventWriter<'w, SceneRequestEvent>,
}

impl SelectorOutputs<'_, '_> {
    fn apply(&mut self, effects: Vec<SelectorEffect>, board: &PlotBoard) {
        for effect in effects {
            match effect {
                SelectorEffect::Sfx(id) => {
                    self.sfx.send(PlaySfxEvent::new(id));
                }
                SelectorEffect::Highlight(target) => {
                    for entity in &self.highlights {
                        self.commands.entity(entity).despawn_recursive();
                    }
                    if let Some(plot) = target.and_then(|i| board.get(i)) {
                        self.commands.spawn((
                            SelectionHighlight,
                            TownEntity,
                            Sprite::from_color(HIGHLIGHT_COLOR, plot.region.size() + Vec2::splat(12.0)),
                            Transform::from_translation(plot.region.center().extend(Z_HIGHLIGHT)),
                        ));
                    }
                }
                SelectorEffect::ShowActions(face) => {
                    self.panel.send(ActionPanelEvent::Show(face));
                }
                SelectorEffect::HideActions => {
                    self.panel.send(ActionPanelEvent::Hide);
                }
                SelectorEffect::Message(message) => {
                    self.messages.send(UserMessageEvent { message });
                }
                SelectorEffect::LoadScene { scene, .. } => {
                    self.scenes.send(SceneRequestEvent { scene });
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

fn build_plot_board(mut commands: Commands, config: Res<GameConfig>, prefs: Res<PlayerPrefs>) {
    let board = PlotBoard::from_config(&config, &prefs);
    info!("[Plots] {} plots on the board.", board.plots.len());
    commands.insert_resource(board);
}

fn spawn_town(
    mut commands: Commands,
    board: Res<PlotBoard>,
    wallet: Res<Wallet>,
    config: Res<GameConfig>,
    mut selector: ResMut<PlotSelector>,
) {
    *selector = PlotSelector::default();

    for (index, plot) in board.plots.iter().enumerate() {
        let built = wallet.is_built(&plot.id);
        let mut region = HitRegion::new(plot.region.size());
        region.enabled = !built;

        commands
            .spawn((
                Plot { index },
                TownEntity,
                region,
                Sprite::from_color(plot_color(plot, built), plot.region.size()),
                Transform::from_translation(plot.region.center().extend(Z_PLOT)),
            ))
            .with_children(|parent| {
                parent.spawn((
                    PriceLabel { index },
                    Text2d::new(label_text(plot, built)),
                    TextFont {
                        font_size: 22.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    Transform::from_xyz(0.0, 0.0, Z_PLOT_LABEL - Z_PLOT),
                ));
            });
    }

    for decoration in &config.decorations {
        let revealed = decoration_revealed(decoration, &wallet);
        let mut region = HitRegion::new(vec2(decoration.size));
        region.enabled = revealed;

        commands
            .spawn((
                Decoration {
                    name: decoration.name.clone(),
                    hidden_until_purchased: decoration.hidden_until_purchased,
                },
                Obstacle,
                TownEntity,
                region,
                Sprite::from_color(DECORATION_COLOR, vec2(decoration.size)),
                Transform::from_translation(vec2(decoration.position).extend(Z_PLOT)),
                if revealed {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                },
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text2d::new(decoration.name.clone()),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    Transform::from_xyz(0.0, 0.0, 0.1),
                ));
            });
    }
}

fn despawn_town(
    mut commands: Commands,
    query: Query<Entity, With<TownEntity>>,
    mut selector: ResMut<PlotSelector>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
    *selector = PlotSelector::default();
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

/// World clicks that were not swallowed by the UI.
pub fn resolve_world_clicks(
    mut pointer_events: EventReader<PointerEvent>,
    mut selector: ResMut<PlotSelector>,
    board: Res<PlotBoard>,
    wallet: Res<Wallet>,
    regions: Query<(&Transform, &HitRegion, Option<&Plot>)>,
    mut outputs: SelectorOutputs,
) {
    for event in pointer_events.read() {
        if event.phase != PointerPhase::Down || event.over_ui {
            continue;
        }

        let candidates = regions
            .iter()
            .filter(|(_, region, _)| region.enabled)
            .map(|(transform, region, plot)| {
                let hit = match plot {
                    Some(plot) => PointerHit::Plot(plot.index),
                    None => PointerHit::Blocked,
                };
                (
                    region.rect_at(transform.translation.truncate()),
                    transform.translation.z,
                    hit,
                )
            });
        let hit = picking::topmost_hit(event.position, candidates).unwrap_or(PointerHit::Nothing);

        let effects = selector.pointer_down(hit, &board, &wallet);
        outputs.apply(effects, &board);
    }
}

/// BUY / BUILD and Unselect button presses.
pub fn handle_plot_commands(
    mut commands_in: EventReader<PlotCommand>,
    mut selector: ResMut<PlotSelector>,
    mut board: ResMut<PlotBoard>,
    mut wallet: ResMut<Wallet>,
    mut prefs: ResMut<PlayerPrefs>,
    mut outputs: SelectorOutputs,
) {
    for command in commands_in.read() {
        let effects = match command {
            PlotCommand::Act => selector.press_action(&mut board, &mut wallet, &mut prefs),
            PlotCommand::Deselect => selector.deselect(),
        };
        outputs.apply(effects, &board);
    }
}

/// A plot built through the shop can no longer be selected.
pub fn forget_built_selection(
    mut purchases: EventReader<ItemPurchasedEvent>,
    mut selector: ResMut<PlotSelector>,
    board: Res<PlotBoard>,
    mut outputs: SelectorOutputs,
) {
    for event in purchases.read() {
        let Some(LinkedObject::Plot(plot_id)) = &event.activates else {
            continue;
        };
        if let Some(index) = board.index_of(plot_id) {
            let effects = selector.forget(index);
            outputs.apply(effects, &board);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Visuals
// ─────────────────────────────────────────────────────────────────────────────

fn plot_color(plot: &PlotState, built: bool) -> Color {
    if built {
        PLOT_BUILT_COLOR
    } else if plot.purchased {
        PLOT_PURCHASED_COLOR
    } else {
        PLOT_COLOR
    }
}

fn label_text(plot: &PlotState, built: bool) -> String {
    if built {
        "BUILT".to_string()
    } else {
        plot.price_label.clone().unwrap_or_default()
    }
}

fn decoration_revealed(decoration: &DecorationConfig, wallet: &Wallet) -> bool {
    !decoration.hidden_until_purchased || revealed_by_purchase(&decoration.name, wallet)
}

fn revealed_by_purchase(name: &str, wallet: &Wallet) -> bool {
    wallet.items().iter().any(|item| {
        item.purchased
            && matches!(&item.activates, Some(LinkedObject::Decoration(target)) if target == name)
    })
}

/// Keeps sprites, labels and hit regions in step with the board and wallet.
pub fn refresh_plot_visuals(
    board: Res<PlotBoard>,
    wallet: Res<Wallet>,
    mut plots: Query<(&Plot, &mut Sprite, &mut HitRegion), Without<Decoration>>,
    mut labels: Query<(&PriceLabel, &mut Text2d)>,
    mut decorations: Query<(&Decoration, &mut Visibility, &mut HitRegion), Without<Plot>>,
) {
    if !board.is_changed() && !wallet.is_changed() {
        return;
    }

    for (plot, mut sprite, mut region) in &mut plots {
        let Some(state) = board.get(plot.index) else {
            continue;
        };
        let built = wallet.is_built(&state.id);
        sprite.color = plot_color(state, built);
        region.enabled = !built;
    }

    for (label, mut text) in &mut labels {
        if let Some(state) = board.get(label.index) {
            let built = wallet.is_built(&state.id);
            text.0 = label_text(state, built);
        }
    }

    for (decoration, mut visibility, mut region) in &mut decorations {
        let revealed =
            !decoration.hidden_until_purchased || revealed_by_purchase(&decoration.name, &wallet);
        *visibility = if revealed {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        region.enabled = revealed;
    }
}
