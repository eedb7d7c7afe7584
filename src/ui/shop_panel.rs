//! Shop overlay: one card per catalogue item, rebuilt when opened and after
//! every purchase.

use bevy::prelude::*;

use super::hud::{currency_label, CurrencyText};
use super::{spawn_button, OpenPanels, TownUi, UiAction, PANEL_BG};
use crate::shared::*;

#[derive(Component)]
pub struct ShopPanel;

/// Container the cards are spawned into.
#[derive(Component)]
pub struct ShopList;

/// One spawned card row, tagged with the item it shows.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ShopCardRow {
    pub name: String,
    pub owned: bool,
}

/// What one row of the shop shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopCard {
    pub name: String,
    pub price: u32,
    pub icon: Option<String>,
    pub purchased: bool,
    pub affordable: bool,
}

pub fn build_shop_cards(wallet: &Wallet) -> Vec<ShopCard> {
    wallet
        .items()
        .iter()
        .map(|item| ShopCard {
            name: item.name.clone(),
            price: item.price,
            icon: item.icon.clone(),
            purchased: item.purchased,
            affordable: wallet.can_afford(item.price),
        })
        .collect()
}

pub fn spawn_shop_panel(mut commands: Commands, wallet: Res<Wallet>) {
    commands
        .spawn((
            ShopPanel,
            TownUi,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            root.spawn((
                // Swallows world clicks under the panel.
                Interaction::default(),
                Node {
                    width: Val::Px(420.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(10.0),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|panel| {
                panel
                    .spawn(Node {
                        flex_direction: FlexDirection::Row,
                        justify_content: JustifyContent::SpaceBetween,
                        ..default()
                    })
                    .with_children(|header| {
                        header.spawn((
                            Text::new("SHOP"),
                            TextFont {
                                font_size: 26.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                        header.spawn((
                            CurrencyText,
                            Text::new(currency_label(wallet.balance())),
                            TextFont {
                                font_size: 20.0,
                                ..default()
                            },
                            TextColor(Color::srgb(1.0, 0.85, 0.2)),
                        ));
                    });

                panel.spawn((
                    ShopList,
                    Node {
                        flex_direction: FlexDirection::Column,
                        row_gap: Val::Px(6.0),
                        ..default()
                    },
                ));

                spawn_button(panel, UiAction::CloseShop, "CLOSE", 96.0);
            });
        });
}

fn spawn_card(list: &mut ChildBuilder, card: &ShopCard) {
    list.spawn((
        ShopCardRow {
            name: card.name.clone(),
            owned: card.purchased,
        },
        Node {
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::Center,
            padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.05)),
    ))
    .with_children(|row| {
        let title = match &card.icon {
            Some(icon) => format!("[{}] {}", icon, card.name),
            None => card.name.clone(),
        };
        row.spawn((
            Text::new(title),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));

        if card.purchased {
            // Owned items get no button at all.
            row.spawn((
                Text::new("OWNED"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.6, 0.6)),
            ));
        } else {
            let price_color = if card.affordable {
                Color::WHITE
            } else {
                Color::srgb(1.0, 0.45, 0.4)
            };
            row.spawn((
                Text::new(format!("$ {}", card.price)),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(price_color),
            ));
            spawn_button(row, UiAction::BuyItem(card.name.clone()), "BUY", 72.0);
        }
    });
}

/// Regenerates the cards on open and after any purchase.
pub fn rebuild_shop_list(
    mut commands: Commands,
    panels: Res<OpenPanels>,
    wallet: Res<Wallet>,
    mut purchases: EventReader<ItemPurchasedEvent>,
    lists: Query<Entity, With<ShopList>>,
) {
    let purchased = purchases.read().count() > 0;
    let opened = panels.is_changed() && panels.shop;
    if !purchased && !opened {
        return;
    }

    let cards = build_shop_cards(&wallet);
    for list in &lists {
        commands
            .entity(list)
            .despawn_descendants()
            .with_children(|list| {
                for card in &cards {
                    spawn_card(list, card);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(balance: u32) -> (Wallet, PlayerPrefs) {
        let mut prefs = PlayerPrefs::in_memory();
        let items = vec![
            ShopItem::new("Park", 400),
            ShopItem::new("Fountain", 250).with_icon("fountain"),
        ];
        let wallet = Wallet::load(&mut prefs, balance, items, Vec::<&str>::new());
        (wallet, prefs)
    }

    #[test]
    fn test_cards_follow_catalogue_order_and_affordability() {
        let (wallet, _) = wallet(300);
        let cards = build_shop_cards(&wallet);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name, "Park");
        assert!(!cards[0].affordable);
        assert!(cards[1].affordable);
        assert_eq!(cards[1].icon.as_deref(), Some("fountain"));
    }

    #[test]
    fn test_purchased_cards_are_marked_owned() {
        let (mut wallet, mut prefs) = wallet(1000);
        assert!(wallet.purchase("Fountain", &mut prefs).succeeded());

        let cards = build_shop_cards(&wallet);
        let fountain = cards.iter().find(|c| c.name == "Fountain").unwrap();
        assert!(fountain.purchased);
        assert!(!cards.iter().find(|c| c.name == "Park").unwrap().purchased);
    }
}
