//! Data layer: game configuration and startup seeding.
//!
//! This plugin runs in OnEnter(GameState::Loading). It reads
//! `assets/data/town.ron` over the built-in defaults, opens the player
//! prefs, reports configuration problems once, seeds the wallet and sound
//! settings, then transitions the game into GameState::Splash.
//!
//! Resources that already exist when Loading is entered are left alone,
//! so tests can pre-insert an in-memory store and a hand-built config.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::prefs::PlayerPrefs;
use crate::shared::*;

pub const CONFIG_PATH: &str = "assets/data/town.ron";

// ═══════════════════════════════════════════════════════════════════════
// CONFIG TYPES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_currency: u32,
    /// Scene name that maps to the town.
    pub main_scene: String,
    /// File name under the saves directory.
    pub prefs_file: String,
    pub splash: SplashConfig,
    /// Ordered allow-list of purchasable plots. The order is the plot index.
    pub plots: Vec<PlotConfig>,
    pub decorations: Vec<DecorationConfig>,
    pub shop_items: Vec<ShopItem>,
    pub puzzle: PuzzleConfig,
    pub walkers: Vec<WalkerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    pub hold_secs: f32,
    pub fade_secs: f32,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            hold_secs: 3.0,
            fade_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    pub id: String,
    /// Text shown on the plot; doubles as the price when the shop has none.
    pub price_label: Option<String>,
    /// Assembly scene loaded by BUILD.
    pub scene: Option<String>,
    pub position: [f32; 2],
    pub size: [f32; 2],
}

/// A non-plot world region. Clicking it deselects; walkers bump into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationConfig {
    pub name: String,
    pub position: [f32; 2],
    pub size: [f32; 2],
    #[serde(default)]
    pub hidden_until_purchased: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub time_limit_secs: f32,
    pub win_reward: u32,
    pub return_delay_secs: f32,
    pub snap_distance: f32,
    pub parts: Vec<PartConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartConfig {
    pub start: [f32; 2],
    pub target: [f32; 2],
    pub size: [f32; 2],
    #[serde(default)]
    pub rotation_deg: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    pub home: [f32; 2],
    pub walk_range: f32,
    pub speed: f32,
    pub change_interval_secs: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// BUILT-IN DEFAULTS
// ═══════════════════════════════════════════════════════════════════════

impl Default for GameConfig {
    fn default() -> Self {
        let plot = |id: &str, label: Option<&str>, scene: Option<&str>, x: f32, y: f32| {
            PlotConfig {
                id: id.to_string(),
                price_label: label.map(str::to_string),
                scene: scene.map(str::to_string),
                position: [x, y],
                size: [180.0, 140.0],
            }
        };

        Self {
            starting_currency: 1000,
            main_scene: "MainScene".to_string(),
            prefs_file: "prefs.json".to_string(),
            splash: SplashConfig::default(),
            plots: vec![
                plot("Plot_1", Some("300"), Some("Plot_1"), -300.0, 90.0),
                plot("Plot_2", Some("500"), Some("Plot_2"), -60.0, 90.0),
                plot("Plot_3", Some("800"), Some("Plot_3"), 180.0, 90.0),
                plot("Plot_4", Some("400"), Some("Plot_4"), -180.0, -130.0),
            ],
            decorations: vec![
                DecorationConfig {
                    name: "Townhall".to_string(),
                    position: [380.0, 110.0],
                    size: [120.0, 170.0],
                    hidden_until_purchased: false,
                },
                DecorationConfig {
                    name: "Fountain".to_string(),
                    position: [110.0, -140.0],
                    size: [80.0, 80.0],
                    hidden_until_purchased: true,
                },
            ],
            shop_items: vec![
                ShopItem::new("Park", 400)
                    .with_icon("icon_park")
                    .linked_to(LinkedObject::Plot("Plot_4".to_string())),
                ShopItem::new("Fountain", 250)
                    .with_icon("icon_fountain")
                    .linked_to(LinkedObject::Decoration("Fountain".to_string())),
                ShopItem::new("Streetlights", 150).with_icon("icon_streetlights"),
            ],
            puzzle: PuzzleConfig::default(),
            walkers: vec![
                WalkerConfig {
                    home: [-120.0, -30.0],
                    walk_range: 150.0,
                    speed: 45.0,
                    change_interval_secs: 3.0,
                },
                WalkerConfig {
                    home: [260.0, -160.0],
                    walk_range: 150.0,
                    speed: 45.0,
                    change_interval_secs: 3.0,
                },
                WalkerConfig {
                    home: [-380.0, -190.0],
                    walk_range: 100.0,
                    speed: 35.0,
                    change_interval_secs: 3.0,
                },
            ],
        }
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        let part = |start: [f32; 2], target: [f32; 2], size: [f32; 2], rotation_deg: f32| {
            PartConfig {
                start,
                target,
                size,
                rotation_deg,
            }
        };

        Self {
            time_limit_secs: 240.0,
            win_reward: 500,
            return_delay_secs: 2.0,
            snap_distance: 24.0,
            // Floor, two walls, roof, door.
            parts: vec![
                part([-380.0, -200.0], [150.0, -110.0], [240.0, 30.0], 0.0),
                part([-380.0, -100.0], [50.0, -5.0], [30.0, 180.0], 0.0),
                part([-300.0, -100.0], [250.0, -5.0], [30.0, 180.0], 0.0),
                part([-340.0, 60.0], [150.0, 130.0], [260.0, 80.0], 0.0),
                part([-260.0, 180.0], [150.0, -55.0], [50.0, 80.0], 0.0),
            ],
        }
    }
}

impl GameConfig {
    pub fn plot_ids(&self) -> impl Iterator<Item = &str> {
        self.plots.iter().map(|p| p.id.as_str())
    }
}

pub fn vec2(v: [f32; 2]) -> Vec2 {
    Vec2::new(v[0], v[1])
}

// ═══════════════════════════════════════════════════════════════════════
// LOADING & VALIDATION
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid town config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

pub fn parse_config(text: &str) -> Result<GameConfig, ConfigError> {
    Ok(ron::from_str(text)?)
}

pub fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

/// Problems found in a loaded config. Each one degrades a feature; none is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("plot '{0}' is listed more than once")]
    DuplicatePlot(String),
    #[error("plot '{0}' has no assembly scene; BUILD will do nothing")]
    MissingScene(String),
    #[error("plot '{plot}' price label '{label}' is not a number; it will cost 0")]
    UnparsablePriceLabel { plot: String, label: String },
    #[error("plot '{0}' has no price label and no shop price; it will cost 0")]
    MissingPrice(String),
    #[error("shop item '{0}' is listed more than once")]
    DuplicateItem(String),
    #[error("shop item '{item}' activates unknown plot '{plot}'")]
    UnknownPlotLink { item: String, plot: String },
    #[error("shop item '{item}' reveals unknown decoration '{decoration}'")]
    UnknownDecorationLink { item: String, decoration: String },
    #[error("the assembly puzzle has no parts")]
    NoPuzzleParts,
}

pub fn validate_config(config: &GameConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let mut seen_plots = HashSet::new();
    for plot in &config.plots {
        if !seen_plots.insert(plot.id.as_str()) {
            issues.push(ConfigIssue::DuplicatePlot(plot.id.clone()));
        }
        if plot.scene.is_none() {
            issues.push(ConfigIssue::MissingScene(plot.id.clone()));
        }

        let registered = config
            .shop_items
            .iter()
            .any(|item| item.name.eq_ignore_ascii_case(&plot.id) && item.price > 0);
        if !registered {
            match parse_price_label(plot.price_label.as_deref()) {
                Ok(_) => {}
                Err(PriceLabelError::Missing) => {
                    issues.push(ConfigIssue::MissingPrice(plot.id.clone()));
                }
                Err(PriceLabelError::NotANumber(label)) => {
                    issues.push(ConfigIssue::UnparsablePriceLabel {
                        plot: plot.id.clone(),
                        label,
                    });
                }
            }
        }
    }

    let mut seen_items = HashSet::new();
    for item in &config.shop_items {
        if !seen_items.insert(item.name.to_ascii_lowercase()) {
            issues.push(ConfigIssue::DuplicateItem(item.name.clone()));
        }
        match &item.activates {
            Some(LinkedObject::Plot(plot)) if !seen_plots.contains(plot.as_str()) => {
                issues.push(ConfigIssue::UnknownPlotLink {
                    item: item.name.clone(),
                    plot: plot.clone(),
                });
            }
            Some(LinkedObject::Decoration(name))
                if !config.decorations.iter().any(|d| &d.name == name) =>
            {
                issues.push(ConfigIssue::UnknownDecorationLink {
                    item: item.name.clone(),
                    decoration: name.clone(),
                });
            }
            _ => {}
        }
    }

    if config.puzzle.parts.is_empty() {
        issues.push(ConfigIssue::NoPuzzleParts);
    }

    issues
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(GameState::Loading),
            (
                load_game_config,
                open_player_prefs,
                report_config_issues,
                seed_player_state,
            )
                .chain(),
        );
    }
}

fn load_game_config(mut commands: Commands, existing: Option<Res<GameConfig>>) {
    if existing.is_some() {
        return;
    }
    commands.insert_resource(read_config_or_default());
}

#[cfg(not(target_arch = "wasm32"))]
fn read_config_or_default() -> GameConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        info!("[Data] No {} found. Using built-in town.", CONFIG_PATH);
        return GameConfig::default();
    }
    match load_config(path) {
        Ok(config) => {
            info!(
                "[Data] Loaded {}: {} plots, {} shop items.",
                CONFIG_PATH,
                config.plots.len(),
                config.shop_items.len()
            );
            config
        }
        Err(e) => {
            error!("[Data] {}. Using built-in town.", e);
            GameConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn read_config_or_default() -> GameConfig {
    GameConfig::default()
}

fn open_player_prefs(
    mut commands: Commands,
    existing: Option<Res<PlayerPrefs>>,
    config: Res<GameConfig>,
) {
    if existing.is_some() {
        return;
    }

    #[cfg(not(target_arch = "wasm32"))]
    let prefs = {
        let path = crate::prefs::default_prefs_dir().join(&config.prefs_file);
        info!("[Prefs] Using {}", path.display());
        PlayerPrefs::open_or_reset(path)
    };

    #[cfg(target_arch = "wasm32")]
    let prefs = {
        let _ = &config;
        PlayerPrefs::open_local_storage().unwrap_or_else(|e| {
            warn!("[Prefs] {}. Progress will not be kept.", e);
            PlayerPrefs::in_memory()
        })
    };

    commands.insert_resource(prefs);
}

fn report_config_issues(config: Res<GameConfig>) {
    for issue in validate_config(&config) {
        error!("[Data] {}", issue);
    }
}

/// Builds the wallet and sound settings, then moves on to the splash.
fn seed_player_state(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut prefs: ResMut<PlayerPrefs>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let wallet = Wallet::load(
        &mut prefs,
        config.starting_currency,
        config.shop_items.clone(),
        config.plot_ids(),
    );
    info!(
        "[Data] Wallet ready: balance {}, {} shop items.",
        wallet.balance(),
        wallet.items().len()
    );
    commands.insert_resource(wallet);
    commands.insert_resource(SoundSettings::load(&prefs));

    next_state.set(GameState::Splash);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_clean() {
        assert_eq!(validate_config(&GameConfig::default()), Vec::new());
    }

    #[test]
    fn test_shipped_town_file_parses_and_validates() {
        let config = parse_config(include_str!("../../assets/data/town.ron")).unwrap();
        assert_eq!(config.plots.len(), 4);
        assert_eq!(config.puzzle.parts.len(), 5);
        assert_eq!(config.starting_currency, 1000);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config("(starting_currency: 50)").unwrap();
        assert_eq!(config.starting_currency, 50);
        assert_eq!(config.main_scene, "MainScene");
        assert_eq!(config.puzzle.time_limit_secs, 240.0);
    }

    #[test]
    fn test_validation_reports_each_problem() {
        let mut config = GameConfig::default();
        config.plots[1].scene = None;
        config.plots[2].price_label = Some("lots".to_string());
        config.plots.push(config.plots[0].clone());
        config
            .shop_items
            .push(ShopItem::new("Pier", 10).linked_to(LinkedObject::Plot("Plot_9".to_string())));
        config.shop_items.push(ShopItem::new("park", 10));

        let issues = validate_config(&config);
        assert!(issues.contains(&ConfigIssue::MissingScene("Plot_2".to_string())));
        assert!(issues.contains(&ConfigIssue::UnparsablePriceLabel {
            plot: "Plot_3".to_string(),
            label: "lots".to_string(),
        }));
        assert!(issues.contains(&ConfigIssue::DuplicatePlot("Plot_1".to_string())));
        assert!(issues.contains(&ConfigIssue::UnknownPlotLink {
            item: "Pier".to_string(),
            plot: "Plot_9".to_string(),
        }));
        assert!(issues.contains(&ConfigIssue::DuplicateItem("park".to_string())));
    }

    #[test]
    fn test_registered_price_excuses_bad_label() {
        let mut config = GameConfig::default();
        config.plots[0].price_label = None;
        config.shop_items.push(ShopItem::new("Plot_1", 300));
        assert!(validate_config(&config).is_empty());
    }
}
