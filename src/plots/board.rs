use bevy::prelude::*;

use crate::data::vec2;
use crate::shared::*;

/// Runtime view of one configured plot.
#[derive(Debug, Clone)]
pub struct PlotState {
    pub id: PlotId,
    pub price_label: Option<String>,
    pub scene: Option<String>,
    pub region: Rect,
    /// Bought through the plot's own BUY button.
    pub purchased: bool,
}

/// The ordered plot allow-list. A plot's index is its position here.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlotBoard {
    pub plots: Vec<PlotState>,
}

impl PlotBoard {
    pub fn from_config(config: &GameConfig, prefs: &PlayerPrefs) -> Self {
        let plots = config
            .plots
            .iter()
            .map(|plot| {
                let purchased = prefs.get_flag(&keys::plot_purchased(&plot.id));
                PlotState {
                    id: plot.id.clone(),
                    price_label: if purchased {
                        Some("0".to_string())
                    } else {
                        plot.price_label.clone()
                    },
                    scene: plot.scene.clone(),
                    region: Rect::from_center_size(vec2(plot.position), vec2(plot.size)),
                    purchased,
                }
            })
            .collect();
        Self { plots }
    }

    pub fn get(&self, index: usize) -> Option<&PlotState> {
        self.plots.get(index)
    }

    pub fn index_of(&self, plot_id: &str) -> Option<usize> {
        self.plots.iter().position(|p| p.id == plot_id)
    }

    /// Zero once purchased, otherwise the wallet's price for this plot.
    pub fn price(&self, index: usize, wallet: &Wallet) -> u32 {
        match self.plots.get(index) {
            Some(plot) if plot.purchased => 0,
            Some(plot) => wallet.price_of(&plot.id, plot.price_label.as_deref()),
            None => 0,
        }
    }

    pub fn scene(&self, index: usize) -> Option<&str> {
        self.plots.get(index).and_then(|p| p.scene.as_deref())
    }

    /// Zeroes the displayed price and persists the purchase.
    pub fn mark_purchased(&mut self, index: usize, prefs: &mut PlayerPrefs) {
        let Some(plot) = self.plots.get_mut(index) else {
            return;
        };
        plot.purchased = true;
        plot.price_label = Some("0".to_string());
        prefs.set_flag_logged(keys::plot_purchased(&plot.id), true);
    }

    pub fn is_completed(&self, index: usize, prefs: &PlayerPrefs) -> bool {
        prefs.get_flag(&keys::plot_success(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_survives_rebuild() {
        let config = GameConfig::default();
        let mut prefs = PlayerPrefs::in_memory();
        let wallet = Wallet::load(&mut prefs, 1000, Vec::new(), config.plot_ids());

        let mut board = PlotBoard::from_config(&config, &prefs);
        assert_eq!(board.price(0, &wallet), 300);

        board.mark_purchased(0, &mut prefs);
        assert_eq!(board.price(0, &wallet), 0);
        assert_eq!(board.plots[0].price_label.as_deref(), Some("0"));

        let rebuilt = PlotBoard::from_config(&config, &prefs);
        assert!(rebuilt.plots[0].purchased);
        assert_eq!(rebuilt.price(0, &wallet), 0);
        assert_eq!(rebuilt.price(1, &wallet), 500);
    }

    #[test]
    fn test_out_of_range_index_is_free_and_sceneless() {
        let board = PlotBoard::default();
        let wallet = Wallet::default();
        assert_eq!(board.price(3, &wallet), 0);
        assert_eq!(board.scene(3), None);
    }
}
