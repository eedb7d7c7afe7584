//! Shared components, resources, events, and states for Plotstead.
//!
//! This is the type contract. Domain plugins talk to each other through
//! the events and resources declared (or re-exported) here.

use bevy::prelude::*;

pub use crate::data::{
    DecorationConfig, GameConfig, PartConfig, PlotConfig, PuzzleConfig, SplashConfig,
    WalkerConfig,
};
pub use crate::economy::wallet::{
    parse_price_label, LinkedObject, PriceLabelError, PurchaseOutcome, ShopItem, Wallet,
};
pub use crate::prefs::PlayerPrefs;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Splash,
    /// The main scene: plots, shop, walkers.
    Town,
    /// A plot's house-assembly mini-puzzle.
    Assembly,
}

// ═══════════════════════════════════════════════════════════════════════
// PERSISTED KEYS
// ═══════════════════════════════════════════════════════════════════════

pub mod keys {
    pub const PLAYER_MONEY: &str = "PlayerMoney";
    /// Written by the build action, read back by the assembly scene.
    pub const CURRENT_PLOT_INDEX: &str = "CurrentPlotIndex";
    pub const SOUND_STATE: &str = "SoundState";

    pub fn shop_item_purchased(item_name: &str) -> String {
        format!("ShopItem_{}_Purchased", item_name)
    }

    pub fn plot_built(plot_id: &str) -> String {
        format!("{}_Built", plot_id)
    }

    pub fn plot_purchased(plot_id: &str) -> String {
        format!("{}_Purchased", plot_id)
    }

    /// Completion flags are 1-based on disk.
    pub fn plot_success(plot_index: usize) -> String {
        format!("Plot_{}_Success", plot_index + 1)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD
// ═══════════════════════════════════════════════════════════════════════

pub type PlotId = String;

/// Marker for the single 2D camera used for pointer projection.
#[derive(Component, Debug, Default)]
pub struct MainCamera;

/// Axis-aligned clickable area centred on the entity's `Transform`.
/// Disabled regions are skipped by hit tests and walker bumps.
#[derive(Component, Debug, Clone, Copy)]
pub struct HitRegion {
    pub half_size: Vec2,
    pub enabled: bool,
}

impl HitRegion {
    pub fn new(size: Vec2) -> Self {
        Self {
            half_size: size * 0.5,
            enabled: true,
        }
    }

    pub fn rect_at(&self, center: Vec2) -> Rect {
        Rect::from_center_half_size(center, self.half_size)
    }
}

/// A region ambient walkers turn away from.
#[derive(Component, Debug, Default)]
pub struct Obstacle;

/// Everything spawned for the town; despawned when leaving it.
#[derive(Component, Debug, Default)]
pub struct TownEntity;

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer sample already projected into world space.
/// `over_ui` is set when any UI control is hovered or pressed.
#[derive(Event, Debug, Clone, Copy)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Vec2,
    pub over_ui: bool,
}

/// Set for one frame when any key, mouse button or touch starts.
#[derive(Resource, Debug, Default)]
pub struct AnyInput {
    pub just_pressed: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// USER MESSAGES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMessage {
    NotEnoughMoney,
    AlreadyBuilt,
}

impl UserMessage {
    pub fn text(self) -> &'static str {
        match self {
            UserMessage::NotEnoughMoney => "NOT ENOUGH MONEY",
            UserMessage::AlreadyBuilt => "ALREADY BUILT!",
        }
    }
}

/// Replaces the single message slot. `None` clears it.
#[derive(Event, Debug, Clone, Copy)]
pub struct UserMessageEvent {
    pub message: Option<UserMessage>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLOT SELECTION
// ═══════════════════════════════════════════════════════════════════════

/// What the action button currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFace {
    Buy { cost: u32, affordable: bool },
    Build,
}

impl ActionFace {
    pub fn label(&self) -> String {
        match self {
            ActionFace::Buy { cost, .. } => format!("BUY ({})", cost),
            ActionFace::Build => "BUILD".to_string(),
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPanelEvent {
    Show(ActionFace),
    Hide,
}

/// Button presses forwarded to the plot selector.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotCommand {
    Act,
    Deselect,
}

// ═══════════════════════════════════════════════════════════════════════
// SHOP
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct BuyItemRequest {
    pub item_name: String,
}

/// Sent once per successful shop purchase.
#[derive(Event, Debug, Clone)]
pub struct ItemPurchasedEvent {
    pub item_name: String,
    pub activates: Option<LinkedObject>,
}

// ═══════════════════════════════════════════════════════════════════════
// SCENES
// ═══════════════════════════════════════════════════════════════════════

/// Asks the scene router to load a scene by name.
#[derive(Event, Debug, Clone)]
pub struct SceneRequestEvent {
    pub scene: String,
}

// ═══════════════════════════════════════════════════════════════════════
// AUDIO
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

impl PlaySfxEvent {
    pub fn new(sfx_id: &str) -> Self {
        Self {
            sfx_id: sfx_id.to_string(),
        }
    }
}

pub const SFX_CLICK: &str = "click";
pub const SFX_PURCHASE: &str = "purchase";
pub const SFX_ERROR: &str = "error";
pub const SFX_SNAP: &str = "snap";
pub const SFX_WIN: &str = "win";
pub const SFX_LOSE: &str = "lose";

/// Global sound switch, persisted under `SoundState`.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SoundSettings {
    pub enabled: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SoundSettings {
    /// Missing key means sound on.
    pub fn load(prefs: &PlayerPrefs) -> Self {
        Self {
            enabled: prefs.get_int(keys::SOUND_STATE, 1) == 1,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool, prefs: &mut PlayerPrefs) {
        self.enabled = enabled;
        prefs.set_flag_logged(keys::SOUND_STATE, enabled);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

// Z layers
pub const Z_GROUND: f32 = 0.0;
pub const Z_PLOT: f32 = 1.0;
pub const Z_PLOT_LABEL: f32 = 2.0;
pub const Z_HIGHLIGHT: f32 = 3.0;
pub const Z_WALKER: f32 = 5.0;
pub const Z_PART: f32 = 10.0;
pub const Z_PART_DRAGGED: f32 = 20.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(keys::plot_success(0), "Plot_1_Success");
        assert_eq!(keys::plot_built("Plot_4"), "Plot_4_Built");
        assert_eq!(keys::plot_purchased("Plot_2"), "Plot_2_Purchased");
        assert_eq!(
            keys::shop_item_purchased("Fountain"),
            "ShopItem_Fountain_Purchased"
        );
    }

    #[test]
    fn test_action_face_labels() {
        let buy = ActionFace::Buy {
            cost: 300,
            affordable: true,
        };
        assert_eq!(buy.label(), "BUY (300)");
        assert_eq!(ActionFace::Build.label(), "BUILD");
    }

    #[test]
    fn test_sound_state_defaults_on_and_persists() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut sound = SoundSettings::load(&prefs);
        assert!(sound.enabled);

        sound.set_enabled(false, &mut prefs);
        assert_eq!(prefs.get_int(keys::SOUND_STATE, 1), 0);
        assert!(!SoundSettings::load(&prefs).enabled);
    }
}
