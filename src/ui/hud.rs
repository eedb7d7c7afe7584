use bevy::prelude::*;

use super::{spawn_button, TownUi, UiAction};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

/// Any text showing the wallet balance. The HUD and the shop both carry one.
#[derive(Component)]
pub struct CurrencyText;

#[derive(Component)]
pub struct MessageText;

pub fn currency_label(balance: u32) -> String {
    format!("$ {}", balance)
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands, wallet: Res<Wallet>) {
    // Root container: full screen overlay, no interaction blocking
    commands
        .spawn((
            HudRoot,
            TownUi,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            // ─── TOP BAR ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Px(52.0),
                        flex_direction: FlexDirection::Row,
                        justify_content: JustifyContent::SpaceBetween,
                        align_items: AlignItems::Center,
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                    PickingBehavior::IGNORE,
                ))
                .with_children(|top_bar| {
                    top_bar.spawn((
                        CurrencyText,
                        Text::new(currency_label(wallet.balance())),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.85, 0.2)),
                        PickingBehavior::IGNORE,
                    ));

                    top_bar
                        .spawn((
                            Node {
                                flex_direction: FlexDirection::Row,
                                column_gap: Val::Px(8.0),
                                ..default()
                            },
                            PickingBehavior::IGNORE,
                        ))
                        .with_children(|right| {
                            spawn_button(right, UiAction::OpenShop, "SHOP", 96.0);
                            spawn_button(right, UiAction::OpenSettings, "SETTINGS", 112.0);
                        });
                });

            // ─── MESSAGE LINE ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        justify_content: JustifyContent::Center,
                        margin: UiRect::bottom(Val::Px(96.0)),
                        ..default()
                    },
                    PickingBehavior::IGNORE,
                ))
                .with_children(|row| {
                    row.spawn((
                        MessageText,
                        Text::new(""),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.4, 0.35)),
                        PickingBehavior::IGNORE,
                    ));
                });
        });
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_currency_text(
    wallet: Res<Wallet>,
    mut query: Query<&mut Text, With<CurrencyText>>,
) {
    if !wallet.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = currency_label(wallet.balance());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_label() {
        assert_eq!(currency_label(0), "$ 0");
        assert_eq!(currency_label(1250), "$ 1250");
    }
}
