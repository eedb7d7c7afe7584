//! Plot selection state machine.
//!
//! The selector never touches the ECS directly. Each transition returns the
//! list of effects the caller must apply (highlight, action panel, message,
//! scene load), which keeps every transition testable without an `App`.

use bevy::prelude::*;

use super::board::PlotBoard;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Unaffordable { plot: usize, cost: u32 },
    Affordable { plot: usize, cost: u32 },
    /// Bought; the action button reads BUILD.
    Purchased { plot: usize },
}

impl SelectionState {
    pub fn plot(&self) -> Option<usize> {
        match *self {
            SelectionState::Idle => None,
            SelectionState::Unaffordable { plot, .. }
            | SelectionState::Affordable { plot, .. }
            | SelectionState::Purchased { plot } => Some(plot),
        }
    }

    pub fn face(&self) -> Option<ActionFace> {
        match *self {
            SelectionState::Idle => None,
            SelectionState::Unaffordable { cost, .. } => Some(ActionFace::Buy {
                cost,
                affordable: false,
            }),
            SelectionState::Affordable { cost, .. } => Some(ActionFace::Buy {
                cost,
                affordable: true,
            }),
            SelectionState::Purchased { .. } => Some(ActionFace::Build),
        }
    }
}

/// What a pointer press landed on in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerHit {
    Nothing,
    /// A world region that is not on the plot allow-list.
    Blocked,
    Plot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEffect {
    Sfx(&'static str),
    /// Move the highlight marker to this plot, or remove it.
    Highlight(Option<usize>),
    ShowActions(ActionFace),
    HideActions,
    Message(Option<UserMessage>),
    LoadScene { scene: String, plot: usize },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PlotSelector {
    state: SelectionState,
    actions_visible: bool,
}

impl PlotSelector {
    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn actions_visible(&self) -> bool {
        self.actions_visible
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.plot()
    }

    fn evaluate(plot: usize, board: &PlotBoard, wallet: &Wallet) -> SelectionState {
        let cost = board.price(plot, wallet);
        if cost == 0 {
            SelectionState::Purchased { plot }
        } else if wallet.can_afford(cost) {
            SelectionState::Affordable { plot, cost }
        } else {
            SelectionState::Unaffordable { plot, cost }
        }
    }

    fn clear(&mut self) -> Vec<SelectorEffect> {
        self.state = SelectionState::Idle;
        self.actions_visible = false;
        vec![
            SelectorEffect::Highlight(None),
            SelectorEffect::HideActions,
            SelectorEffect::Message(None),
        ]
    }

    pub fn pointer_down(
        &mut self,
        hit: PointerHit,
        board: &PlotBoard,
        wallet: &Wallet,
    ) -> Vec<SelectorEffect> {
        match hit {
            PointerHit::Plot(plot) if board.get(plot).is_some() => {
                if self.state.plot() == Some(plot) && self.actions_visible {
                    return Vec::new();
                }
                self.state = Self::evaluate(plot, board, wallet);
                self.actions_visible = true;
                let mut effects = vec![
                    SelectorEffect::Sfx(SFX_CLICK),
                    SelectorEffect::Highlight(Some(plot)),
                    SelectorEffect::Message(None),
                ];
                effects.extend(self.state.face().map(SelectorEffect::ShowActions));
                effects
            }
            _ => self.deselect(),
        }
    }

    pub fn deselect(&mut self) -> Vec<SelectorEffect> {
        if self.state == SelectionState::Idle && !self.actions_visible {
            return Vec::new();
        }
        self.clear()
    }

    /// Drops the selection if it points at `plot`, e.g. after the plot was built.
    pub fn forget(&mut self, plot: usize) -> Vec<SelectorEffect> {
        if self.state.plot() == Some(plot) {
            self.clear()
        } else {
            Vec::new()
        }
    }

    /// The BUY / BUILD button.
    pub fn press_action(
        &mut self,
        board: &mut PlotBoard,
        wallet: &mut Wallet,
        prefs: &mut PlayerPrefs,
    ) -> Vec<SelectorEffect> {
        match self.state {
            SelectionState::Idle => Vec::new(),
            SelectionState::Unaffordable { plot, .. } | SelectionState::Affordable { plot, .. } => {
                self.buy(plot, board, wallet, prefs)
            }
            SelectionState::Purchased { plot } => self.build(plot, board, prefs),
        }
    }

    fn buy(
        &mut self,
        plot: usize,
        board: &mut PlotBoard,
        wallet: &mut Wallet,
        prefs: &mut PlayerPrefs,
    ) -> Vec<SelectorEffect> {
        // Balance may have moved since the plot was selected.
        self.state = Self::evaluate(plot, board, wallet);
        match self.state {
            SelectionState::Unaffordable { cost, .. } => {
                info!(
                    "[Plots] Cannot afford plot {} ({} > {}).",
                    plot,
                    cost,
                    wallet.balance()
                );
                vec![
                    SelectorEffect::Sfx(SFX_ERROR),
                    SelectorEffect::Message(Some(UserMessage::NotEnoughMoney)),
                    SelectorEffect::ShowActions(ActionFace::Buy {
                        cost,
                        affordable: false,
                    }),
                ]
            }
            SelectionState::Affordable { cost, .. } => {
                if !wallet.debit(cost, prefs) {
                    return Vec::new();
                }
                board.mark_purchased(plot, prefs);
                self.state = SelectionState::Purchased { plot };
                info!("[Plots] Bought plot {} for {}.", plot, cost);
                vec![
                    SelectorEffect::Sfx(SFX_PURCHASE),
                    SelectorEffect::ShowActions(ActionFace::Build),
                ]
            }
            SelectionState::Purchased { .. } => {
                vec![SelectorEffect::ShowActions(ActionFace::Build)]
            }
            SelectionState::Idle => Vec::new(),
        }
    }

    fn build(
        &mut self,
        plot: usize,
        board: &PlotBoard,
        prefs: &mut PlayerPrefs,
    ) -> Vec<SelectorEffect> {
        if board.is_completed(plot, prefs) {
            return vec![
                SelectorEffect::Sfx(SFX_ERROR),
                SelectorEffect::Message(Some(UserMessage::AlreadyBuilt)),
            ];
        }
        let Some(scene) = board.scene(plot).map(str::to_string) else {
            error!("[Plots] Plot {} has no assembly scene. Nothing to build.", plot);
            return Vec::new();
        };

        prefs.set_int_logged(keys::CURRENT_PLOT_INDEX, plot as i64);
        info!("[Plots] Building plot {} in scene '{}'.", plot, scene);
        let mut effects = self.clear();
        effects.push(SelectorEffect::LoadScene { scene, plot });
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        board: PlotBoard,
        wallet: Wallet,
        prefs: PlayerPrefs,
        selector: PlotSelector,
    }

    fn fixture(balance: u32) -> Fixture {
        let config = GameConfig::default();
        let mut prefs = PlayerPrefs::in_memory();
        let wallet = Wallet::load(&mut prefs, balance, Vec::new(), config.plot_ids());
        Fixture {
            board: PlotBoard::from_config(&config, &prefs),
            wallet,
            prefs,
            selector: PlotSelector::default(),
        }
    }

    impl Fixture {
        fn click(&mut self, hit: PointerHit) -> Vec<SelectorEffect> {
            self.selector.pointer_down(hit, &self.board, &self.wallet)
        }

        fn act(&mut self) -> Vec<SelectorEffect> {
            self.selector
                .press_action(&mut self.board, &mut self.wallet, &mut self.prefs)
        }
    }

    #[test]
    fn test_select_affordable_plot() {
        let mut f = fixture(1000);
        let effects = f.click(PointerHit::Plot(0));
        assert_eq!(
            f.selector.state(),
            SelectionState::Affordable { plot: 0, cost: 300 }
        );
        assert!(effects.contains(&SelectorEffect::Highlight(Some(0))));
        assert!(effects.contains(&SelectorEffect::ShowActions(ActionFace::Buy {
            cost: 300,
            affordable: true
        })));
    }

    #[test]
    fn test_buy_debits_and_zeroes_price() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(0));
        let effects = f.act();

        assert_eq!(f.wallet.balance(), 700);
        assert_eq!(f.prefs.get_int(keys::PLAYER_MONEY, 0), 700);
        assert_eq!(f.board.price(0, &f.wallet), 0);
        assert!(f.prefs.get_flag("Plot_1_Purchased"));
        assert_eq!(f.selector.state(), SelectionState::Purchased { plot: 0 });
        assert!(effects.contains(&SelectorEffect::ShowActions(ActionFace::Build)));
    }

    #[test]
    fn test_buy_without_funds_shows_message() {
        let mut f = fixture(100);
        f.click(PointerHit::Plot(0));
        let effects = f.act();

        assert_eq!(f.wallet.balance(), 100);
        assert_eq!(
            f.selector.state(),
            SelectionState::Unaffordable { plot: 0, cost: 300 }
        );
        assert!(effects.contains(&SelectorEffect::Message(Some(UserMessage::NotEnoughMoney))));
    }

    #[test]
    fn test_deselect_clears_error_message() {
        let mut f = fixture(100);
        f.click(PointerHit::Plot(0));
        f.act();

        let effects = f.selector.deselect();
        assert!(effects.contains(&SelectorEffect::Message(None)));
        assert!(effects.contains(&SelectorEffect::HideActions));
        assert_eq!(f.selector.state(), SelectionState::Idle);
    }

    #[test]
    fn test_balance_is_rechecked_on_press() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(2));
        assert_eq!(
            f.selector.state(),
            SelectionState::Affordable { plot: 2, cost: 800 }
        );

        f.wallet.debit(900, &mut f.prefs);
        f.act();
        assert_eq!(f.wallet.balance(), 100);
        assert_eq!(
            f.selector.state(),
            SelectionState::Unaffordable { plot: 2, cost: 800 }
        );
    }

    #[test]
    fn test_reclicking_selected_plot_is_noop() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(1));
        assert!(f.click(PointerHit::Plot(1)).is_empty());
        assert_eq!(f.selector.selected(), Some(1));
    }

    #[test]
    fn test_clicking_elsewhere_switches_or_clears() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(0));
        let effects = f.click(PointerHit::Plot(1));
        assert!(effects.contains(&SelectorEffect::Highlight(Some(1))));
        assert_eq!(f.selector.selected(), Some(1));

        let effects = f.click(PointerHit::Blocked);
        assert_eq!(
            effects,
            vec![
                SelectorEffect::Highlight(None),
                SelectorEffect::HideActions,
                SelectorEffect::Message(None),
            ]
        );
        assert_eq!(f.selector.state(), SelectionState::Idle);
        assert!(f.click(PointerHit::Nothing).is_empty());
    }

    #[test]
    fn test_unknown_plot_index_deselects() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(0));
        f.click(PointerHit::Plot(42));
        assert_eq!(f.selector.state(), SelectionState::Idle);
    }

    #[test]
    fn test_build_writes_handoff_and_loads_scene() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(1));
        f.act();
        let effects = f.act();

        assert_eq!(f.prefs.get_int(keys::CURRENT_PLOT_INDEX, -1), 1);
        assert!(effects.contains(&SelectorEffect::LoadScene {
            scene: "Plot_2".to_string(),
            plot: 1
        }));
        assert_eq!(f.selector.state(), SelectionState::Idle);
        assert!(!f.selector.actions_visible());
    }

    #[test]
    fn test_completed_plot_reports_already_built() {
        let mut f = fixture(1000);
        f.prefs.set_flag(keys::plot_success(0), true).unwrap();
        f.click(PointerHit::Plot(0));
        f.act();
        let effects = f.act();

        assert!(effects.contains(&SelectorEffect::Message(Some(UserMessage::AlreadyBuilt))));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, SelectorEffect::LoadScene { .. })));
        assert_eq!(f.selector.state(), SelectionState::Purchased { plot: 0 });
        assert!(!f.prefs.has_key(keys::CURRENT_PLOT_INDEX));
    }

    #[test]
    fn test_missing_scene_does_nothing() {
        let mut f = fixture(1000);
        f.board.plots[0].scene = None;
        f.click(PointerHit::Plot(0));
        f.act();
        assert!(f.act().is_empty());
        assert_eq!(f.selector.state(), SelectionState::Purchased { plot: 0 });
    }

    #[test]
    fn test_balance_never_negative_over_repeated_buys() {
        let mut f = fixture(900);
        for plot in [2, 1, 0, 2, 1, 0] {
            f.click(PointerHit::Plot(plot));
            f.act();
        }
        // 800 for Plot_3, then 100 left; the rest are refused.
        assert_eq!(f.wallet.balance(), 100);
        assert!(f.board.plots[2].purchased);
        assert!(!f.board.plots[0].purchased);
    }

    #[test]
    fn test_forget_only_clears_matching_selection() {
        let mut f = fixture(1000);
        f.click(PointerHit::Plot(3));
        assert!(f.selector.forget(1).is_empty());
        assert!(!f.selector.forget(3).is_empty());
        assert_eq!(f.selector.selected(), None);
    }
}
