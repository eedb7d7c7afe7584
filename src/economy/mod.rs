//! Economy domain: the wallet, shop purchases and built-plot flags.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.

use bevy::prelude::*;
use crate::shared::*;

pub mod wallet;

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Town), reload_wallet);

        app.add_systems(
            Update,
            handle_buy_requests.run_if(in_state(GameState::Town)),
        );

        info!("[Economy] EconomyPlugin registered.");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Picks up whatever the assembly scene persisted (reward, completion).
pub fn reload_wallet(
    mut wallet: ResMut<Wallet>,
    prefs: Res<PlayerPrefs>,
    config: Res<GameConfig>,
) {
    wallet.reload(&prefs, config.plots.iter().map(|p| p.id.as_str()));
    info!("[Economy] Wallet loaded. Balance: {}", wallet.balance());
}

/// Processes shop-panel purchases.
pub fn handle_buy_requests(
    mut requests: EventReader<BuyItemRequest>,
    mut wallet: ResMut<Wallet>,
    mut prefs: ResMut<PlayerPrefs>,
    mut purchased_writer: EventWriter<ItemPurchasedEvent>,
    mut message_writer: EventWriter<UserMessageEvent>,
    mut sfx_writer: EventWriter<PlaySfxEvent>,
) {
    for request in requests.read() {
        match wallet.purchase(&request.item_name, &mut prefs) {
            PurchaseOutcome::Purchased { activates, .. } => {
                sfx_writer.send(PlaySfxEvent::new(SFX_PURCHASE));
                purchased_writer.send(ItemPurchasedEvent {
                    item_name: request.item_name.clone(),
                    activates,
                });
            }
            PurchaseOutcome::AlreadyOwned => {
                debug!("[Economy] '{}' already owned.", request.item_name);
            }
            PurchaseOutcome::Unaffordable { price, balance } => {
                info!(
                    "[Economy] Cannot afford '{}' ({} > {}).",
                    request.item_name, price, balance
                );
                sfx_writer.send(PlaySfxEvent::new(SFX_ERROR));
                message_writer.send(UserMessageEvent {
                    message: Some(UserMessage::NotEnoughMoney),
                });
            }
            PurchaseOutcome::UnknownItem => {}
        }
    }
}
