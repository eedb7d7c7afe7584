use bevy::prelude::*;

use crate::shared::*;
use crate::tween::TweenSet;

pub mod audio;
pub mod hud;
pub mod message;
pub mod plot_actions;
pub mod settings_panel;
pub mod shop_panel;
pub mod transitions;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OpenPanels>()
            .init_resource::<audio::SfxQueue>();

        // ─── FADE OVERLAY (always present) ───
        app.add_systems(Startup, transitions::spawn_fade_overlay);
        app.add_systems(Update, transitions::sync_fade_overlay);

        // ─── AUDIO ───
        app.add_systems(
            Update,
            (
                audio::queue_sfx,
                audio::play_queued_sfx.run_if(resource_exists::<AssetServer>),
            )
                .chain(),
        );

        // ─── TOWN UI ───
        app.add_systems(
            OnEnter(GameState::Town),
            (
                hud::spawn_hud,
                plot_actions::spawn_action_panel,
                shop_panel::spawn_shop_panel,
                settings_panel::spawn_settings_panel,
            ),
        );
        app.add_systems(OnExit(GameState::Town), despawn_town_ui);

        app.add_systems(
            Update,
            (
                handle_button_presses,
                sync_panel_visibility,
                shop_panel::rebuild_shop_list,
                hud::update_currency_text,
                message::update_message_text,
                plot_actions::handle_action_panel_events,
                settings_panel::update_sound_label,
                tint_buttons,
            )
                .chain()
                .after(TweenSet)
                .run_if(in_state(GameState::Town)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHARED UI TYPES
// ═══════════════════════════════════════════════════════════════════════

/// Everything spawned by the town UI, despawned on leaving town.
#[derive(Component, Debug, Default)]
pub struct TownUi;

/// What a button does when pressed.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    OpenShop,
    CloseShop,
    OpenSettings,
    CloseSettings,
    ToggleSound,
    Act,
    Deselect,
    BuyItem(String),
}

/// Which overlay panels are open. At most one at a time.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpenPanels {
    pub shop: bool,
    pub settings: bool,
}

impl OpenPanels {
    pub fn apply(&mut self, action: &UiAction) {
        match action {
            UiAction::OpenShop => {
                self.shop = true;
                self.settings = false;
            }
            UiAction::CloseShop => self.shop = false,
            UiAction::OpenSettings => {
                self.settings = true;
                self.shop = false;
            }
            UiAction::CloseSettings => self.settings = false,
            _ => {}
        }
    }
}

pub const BUTTON_NORMAL: Color = Color::srgb(0.22, 0.24, 0.3);
pub const BUTTON_HOVERED: Color = Color::srgb(0.3, 0.33, 0.4);
pub const BUTTON_PRESSED: Color = Color::srgb(0.16, 0.17, 0.22);
pub const PANEL_BG: Color = Color::srgba(0.08, 0.08, 0.12, 0.92);

/// Spawns a plain text button under `parent`.
pub fn spawn_button(parent: &mut ChildBuilder, action: UiAction, label: &str, width: f32) {
    parent
        .spawn((
            Button,
            action,
            Node {
                width: Val::Px(width),
                height: Val::Px(36.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_NORMAL),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(label),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                PickingBehavior::IGNORE,
            ));
        });
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Every button clicks, then does its one thing.
pub fn handle_button_presses(
    buttons: Query<(&Interaction, &UiAction), Changed<Interaction>>,
    mut panels: ResMut<OpenPanels>,
    mut sound: ResMut<SoundSettings>,
    mut prefs: ResMut<PlayerPrefs>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
    mut plot_commands: EventWriter<PlotCommand>,
    mut buy_requests: EventWriter<BuyItemRequest>,
) {
    for (interaction, action) in &buttons {
        if *interaction != Interaction::Pressed {
            continue;
        }
        sfx_writer.send(PlaySfxEvent::new(SFX_CLICK));

        match action {
            UiAction::Act => {
                plot_commands.send(PlotCommand::Act);
            }
            UiAction::Deselect => {
                plot_commands.send(PlotCommand::Deselect);
            }
            UiAction::BuyItem(name) => {
                buy_requests.send(BuyItemRequest {
                    item_name: name.clone(),
                });
            }
            UiAction::ToggleSound => {
                let enabled = !sound.enabled;
                sound.set_enabled(enabled, &mut prefs);
                info!("[Ui] Sound {}.", if enabled { "on" } else { "off" });
            }
            panel_action => panels.apply(panel_action),
        }
    }
}

fn sync_panel_visibility(
    panels: Res<OpenPanels>,
    mut shop: Query<&mut Visibility, (With<shop_panel::ShopPanel>, Without<settings_panel::SettingsPanel>)>,
    mut settings: Query<&mut Visibility, (With<settings_panel::SettingsPanel>, Without<shop_panel::ShopPanel>)>,
) {
    if !panels.is_changed() {
        return;
    }
    for mut visibility in &mut shop {
        *visibility = shown_if(panels.shop);
    }
    for mut visibility in &mut settings {
        *visibility = shown_if(panels.settings);
    }
}

fn shown_if(open: bool) -> Visibility {
    if open {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

/// Hover/press feedback for buttons that have no colour of their own.
fn tint_buttons(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>, Without<plot_actions::ActionButton>),
    >,
) {
    for (interaction, mut bg) in &mut buttons {
        bg.0 = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVERED,
            Interaction::None => BUTTON_NORMAL,
        };
    }
}

fn despawn_town_ui(
    mut commands: Commands,
    query: Query<Entity, With<TownUi>>,
    mut panels: ResMut<OpenPanels>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
    *panels = OpenPanels::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_one_panel_closes_the_other() {
        let mut panels = OpenPanels::default();
        panels.apply(&UiAction::OpenShop);
        assert!(panels.shop && !panels.settings);

        panels.apply(&UiAction::OpenSettings);
        assert!(!panels.shop && panels.settings);

        panels.apply(&UiAction::CloseSettings);
        assert_eq!(panels, OpenPanels::default());
    }

    #[test]
    fn test_non_panel_actions_leave_panels_alone() {
        let mut panels = OpenPanels {
            shop: true,
            settings: false,
        };
        panels.apply(&UiAction::Act);
        panels.apply(&UiAction::BuyItem("Park".into()));
        assert!(panels.shop);
    }
}
