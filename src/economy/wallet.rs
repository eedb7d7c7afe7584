use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::prefs::PlayerPrefs;
use crate::shared::{keys, PlotId};

// ─────────────────────────────────────────────────────────────────────────────
// Catalogue types
// ─────────────────────────────────────────────────────────────────────────────

/// What a shop item switches on when bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkedObject {
    /// Marks the plot as built: greyed out and no longer clickable.
    Plot(PlotId),
    /// Reveals a named decoration in the town.
    Decoration(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub price: u32,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub activates: Option<LinkedObject>,
    /// Restored from prefs, never from config.
    #[serde(skip)]
    pub purchased: bool,
}

impl ShopItem {
    pub fn new(name: &str, price: u32) -> Self {
        Self {
            name: name.to_string(),
            price,
            icon: None,
            activates: None,
            purchased: false,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn linked_to(mut self, link: LinkedObject) -> Self {
        self.activates = Some(link);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased {
        price: u32,
        activates: Option<LinkedObject>,
    },
    /// Buying twice is a successful no-op.
    AlreadyOwned,
    Unaffordable {
        price: u32,
        balance: u32,
    },
    UnknownItem,
}

impl PurchaseOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            PurchaseOutcome::Purchased { .. } | PurchaseOutcome::AlreadyOwned
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceLabelError {
    Missing,
    NotANumber(String),
}

/// Parses a plot's displayed price. Surrounding whitespace is ignored.
pub fn parse_price_label(label: Option<&str>) -> Result<u32, PriceLabelError> {
    let Some(label) = label else {
        return Err(PriceLabelError::Missing);
    };
    let trimmed = label.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| PriceLabelError::NotANumber(trimmed.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet
// ─────────────────────────────────────────────────────────────────────────────

/// Currency, shop catalogue and built plots. Every mutation goes straight
/// through to [`PlayerPrefs`].
#[derive(Resource, Debug, Clone, Default)]
pub struct Wallet {
    balance: u32,
    items: Vec<ShopItem>,
    built: BTreeSet<PlotId>,
}

impl Wallet {
    /// Restores the wallet from prefs, writing `starting_balance` the first
    /// time the game runs.
    pub fn load<'a>(
        prefs: &mut PlayerPrefs,
        starting_balance: u32,
        items: Vec<ShopItem>,
        plot_ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        if !prefs.has_key(keys::PLAYER_MONEY) {
            prefs.set_int_logged(keys::PLAYER_MONEY, starting_balance as i64);
        }
        let mut wallet = Self {
            balance: 0,
            items,
            built: BTreeSet::new(),
        };
        wallet.reload(prefs, plot_ids);
        wallet
    }

    /// Re-reads balance and flags. Used when returning to the town after
    /// the assembly scene has written its results.
    pub fn reload<'a>(
        &mut self,
        prefs: &PlayerPrefs,
        plot_ids: impl IntoIterator<Item = &'a str>,
    ) {
        let stored = prefs.get_int(keys::PLAYER_MONEY, 0);
        self.balance = stored.clamp(0, u32::MAX as i64) as u32;

        for item in &mut self.items {
            item.purchased = prefs.get_flag(&keys::shop_item_purchased(&item.name));
        }

        self.built.clear();
        for plot_id in plot_ids {
            if prefs.get_flag(&keys::plot_built(plot_id)) {
                self.built.insert(plot_id.to_string());
            }
        }
        // A bought item keeps its plot built even if the flag write was lost.
        for item in self.items.iter().filter(|i| i.purchased) {
            if let Some(LinkedObject::Plot(plot_id)) = &item.activates {
                self.built.insert(plot_id.clone());
            }
        }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn find_item(&self, name: &str) -> Option<&ShopItem> {
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    fn find_item_mut(&mut self, name: &str) -> Option<&mut ShopItem> {
        self.items
            .iter_mut()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    pub fn is_purchased(&self, name: &str) -> bool {
        self.find_item(name).is_some_and(|item| item.purchased)
    }

    /// Registered shop price, or 0 when `key` is not in the catalogue.
    pub fn registered_price(&self, key: &str) -> u32 {
        self.find_item(key).map(|item| item.price).unwrap_or(0)
    }

    /// Price lookup used by plot selection: the catalogue wins when it has a
    /// positive price, otherwise the displayed label is parsed.
    pub fn price_of(&self, key: &str, label: Option<&str>) -> u32 {
        let registered = self.registered_price(key);
        if registered > 0 {
            return registered;
        }
        match parse_price_label(label) {
            Ok(price) => price,
            Err(PriceLabelError::Missing) => {
                error!("[Economy] '{}' has no price label. Treating as free.", key);
                0
            }
            Err(PriceLabelError::NotANumber(text)) => {
                error!(
                    "[Economy] Could not parse price label '{}' for '{}'. Treating as free.",
                    text, key
                );
                0
            }
        }
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }

    /// Refuses and leaves the balance untouched when `amount` exceeds it.
    pub fn debit(&mut self, amount: u32, prefs: &mut PlayerPrefs) -> bool {
        if amount > self.balance {
            warn!(
                "[Economy] Tried to spend {} but only have {}. Refused.",
                amount, self.balance
            );
            return false;
        }
        self.balance -= amount;
        prefs.set_int_logged(keys::PLAYER_MONEY, self.balance as i64);
        info!("[Economy] -{}. New balance: {}", amount, self.balance);
        true
    }

    pub fn credit(&mut self, amount: u32, prefs: &mut PlayerPrefs) {
        self.balance = self.balance.saturating_add(amount);
        prefs.set_int_logged(keys::PLAYER_MONEY, self.balance as i64);
        info!("[Economy] +{}. New balance: {}", amount, self.balance);
    }

    pub fn purchase(&mut self, name: &str, prefs: &mut PlayerPrefs) -> PurchaseOutcome {
        let Some(item) = self.find_item(name) else {
            warn!("[Economy] Unknown shop item '{}'.", name);
            return PurchaseOutcome::UnknownItem;
        };
        if item.purchased {
            return PurchaseOutcome::AlreadyOwned;
        }
        let price = item.price;
        if !self.can_afford(price) {
            return PurchaseOutcome::Unaffordable {
                price,
                balance: self.balance,
            };
        }

        self.debit(price, prefs);

        let mut activates = None;
        if let Some(item) = self.find_item_mut(name) {
            item.purchased = true;
            prefs.set_flag_logged(keys::shop_item_purchased(&item.name), true);
            activates = item.activates.clone();
            info!("[Economy] Purchased '{}' for {}.", item.name, price);
        }

        if let Some(LinkedObject::Plot(plot_id)) = &activates {
            self.mark_built(plot_id, prefs);
        }

        PurchaseOutcome::Purchased { price, activates }
    }

    pub fn is_built(&self, plot_id: &str) -> bool {
        self.built.contains(plot_id)
    }

    pub fn mark_built(&mut self, plot_id: &str, prefs: &mut PlayerPrefs) {
        if self.built.insert(plot_id.to_string()) {
            prefs.set_flag_logged(keys::plot_built(plot_id), true);
            info!("[Economy] Plot '{}' is now built.", plot_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<ShopItem> {
        vec![
            ShopItem::new("Fountain", 250)
                .linked_to(LinkedObject::Decoration("Fountain".to_string())),
            ShopItem::new("Park", 400).linked_to(LinkedObject::Plot("Plot_4".to_string())),
            ShopItem::new("Plot_3", 900),
        ]
    }

    fn wallet_with(balance: u32, prefs: &mut PlayerPrefs) -> Wallet {
        Wallet::load(prefs, balance, catalogue(), ["Plot_1", "Plot_4"])
    }

    #[test]
    fn test_first_load_writes_starting_balance() {
        let mut prefs = PlayerPrefs::in_memory();
        let wallet = wallet_with(1000, &mut prefs);
        assert_eq!(wallet.balance(), 1000);
        assert_eq!(prefs.get_int(keys::PLAYER_MONEY, 0), 1000);
    }

    #[test]
    fn test_existing_balance_wins_over_starting_balance() {
        let mut prefs = PlayerPrefs::in_memory();
        prefs.set_int(keys::PLAYER_MONEY, 42).unwrap();
        let wallet = wallet_with(1000, &mut prefs);
        assert_eq!(wallet.balance(), 42);
    }

    #[test]
    fn test_negative_stored_balance_is_clamped() {
        let mut prefs = PlayerPrefs::in_memory();
        prefs.set_int(keys::PLAYER_MONEY, -5).unwrap();
        assert_eq!(wallet_with(1000, &mut prefs).balance(), 0);
    }

    #[test]
    fn test_debit_refuses_overdraft() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut wallet = wallet_with(100, &mut prefs);
        assert!(!wallet.debit(300, &mut prefs));
        assert_eq!(wallet.balance(), 100);
        assert!(wallet.debit(100, &mut prefs));
        assert_eq!(wallet.balance(), 0);
        assert_eq!(prefs.get_int(keys::PLAYER_MONEY, -1), 0);
    }

    #[test]
    fn test_credit_saturates() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut wallet = wallet_with(10, &mut prefs);
        wallet.credit(u32::MAX, &mut prefs);
        assert_eq!(wallet.balance(), u32::MAX);
    }

    #[test]
    fn test_purchase_is_idempotent() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut wallet = wallet_with(1000, &mut prefs);

        let first = wallet.purchase("fountain", &mut prefs);
        assert_eq!(
            first,
            PurchaseOutcome::Purchased {
                price: 250,
                activates: Some(LinkedObject::Decoration("Fountain".to_string())),
            }
        );
        assert_eq!(wallet.purchase("Fountain", &mut prefs), PurchaseOutcome::AlreadyOwned);
        assert_eq!(wallet.balance(), 750);
        assert!(prefs.get_flag("ShopItem_Fountain_Purchased"));
    }

    #[test]
    fn test_purchase_unaffordable_leaves_state_alone() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut wallet = wallet_with(100, &mut prefs);
        assert_eq!(
            wallet.purchase("Park", &mut prefs),
            PurchaseOutcome::Unaffordable {
                price: 400,
                balance: 100
            }
        );
        assert_eq!(wallet.balance(), 100);
        assert!(!wallet.is_purchased("Park"));
        assert!(!wallet.is_built("Plot_4"));
    }

    #[test]
    fn test_purchase_unknown_item() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut wallet = wallet_with(100, &mut prefs);
        assert_eq!(
            wallet.purchase("Castle", &mut prefs),
            PurchaseOutcome::UnknownItem
        );
        assert!(!PurchaseOutcome::UnknownItem.succeeded());
    }

    #[test]
    fn test_plot_link_persists_built_flag() {
        let mut prefs = PlayerPrefs::in_memory();
        let mut wallet = wallet_with(1000, &mut prefs);
        wallet.purchase("Park", &mut prefs);
        assert!(wallet.is_built("Plot_4"));
        assert!(prefs.get_flag("Plot_4_Built"));

        let reloaded = wallet_with(0, &mut prefs);
        assert!(reloaded.is_built("Plot_4"));
        assert!(reloaded.is_purchased("PARK"));
        assert_eq!(reloaded.balance(), 600);
    }

    #[test]
    fn test_price_of_prefers_positive_registered_price() {
        let mut prefs = PlayerPrefs::in_memory();
        let wallet = wallet_with(0, &mut prefs);
        assert_eq!(wallet.price_of("Plot_3", Some("800")), 900);
        assert_eq!(wallet.price_of("Plot_1", Some(" 300 ")), 300);
        assert_eq!(wallet.price_of("Plot_2", Some("free!")), 0);
        assert_eq!(wallet.price_of("Plot_2", None), 0);
    }

    #[test]
    fn test_parse_price_label_errors() {
        assert_eq!(parse_price_label(None), Err(PriceLabelError::Missing));
        assert_eq!(
            parse_price_label(Some("12a")),
            Err(PriceLabelError::NotANumber("12a".to_string()))
        );
        assert_eq!(parse_price_label(Some("0")), Ok(0));
    }
}
