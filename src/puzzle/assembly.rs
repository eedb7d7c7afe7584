use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    Win,
    Lose,
}

/// Placement count, countdown and the one-shot outcome of an assembly run.
#[derive(Resource, Debug, Clone)]
pub struct AssemblyPuzzle {
    pub total_parts: usize,
    /// Plot handed off by the town, if any.
    pub plot_index: Option<usize>,
    placed: usize,
    remaining_secs: f32,
    timer_running: bool,
    outcome: Option<PuzzleOutcome>,
}

impl AssemblyPuzzle {
    pub fn new(total_parts: usize, time_limit_secs: f32, plot_index: Option<usize>) -> Self {
        Self {
            total_parts,
            plot_index,
            placed: 0,
            remaining_secs: time_limit_secs.max(0.0),
            timer_running: false,
            outcome: None,
        }
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_secs
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn outcome(&self) -> Option<PuzzleOutcome> {
        self.outcome
    }

    pub fn accepts_input(&self) -> bool {
        self.outcome.is_none()
    }

    /// The countdown starts with the first drag. Returns true if it started now.
    pub fn start_timer(&mut self) -> bool {
        if self.timer_running || self.outcome.is_some() {
            return false;
        }
        self.timer_running = true;
        true
    }

    /// Counts one part as placed. Returns `Win` on the placement that
    /// completes the house.
    pub fn record_placement(&mut self) -> Option<PuzzleOutcome> {
        if self.outcome.is_some() || self.placed >= self.total_parts {
            return None;
        }
        self.placed += 1;
        if self.placed == self.total_parts {
            self.outcome = Some(PuzzleOutcome::Win);
            self.timer_running = false;
            return self.outcome;
        }
        None
    }

    /// Returns `Lose` on the step the countdown runs out.
    pub fn tick(&mut self, dt: f32) -> Option<PuzzleOutcome> {
        if !self.timer_running || self.outcome.is_some() {
            return None;
        }
        self.remaining_secs = (self.remaining_secs - dt).max(0.0);
        if self.remaining_secs <= 0.0 {
            self.timer_running = false;
            self.outcome = Some(PuzzleOutcome::Lose);
            return self.outcome;
        }
        None
    }
}

/// `MM:SS`, seconds rounded down.
pub fn format_countdown(secs: f32) -> String {
    let total = secs.max(0.0).floor() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_waits_for_first_drag() {
        let mut puzzle = AssemblyPuzzle::new(5, 240.0, Some(0));
        assert_eq!(puzzle.tick(100.0), None);
        assert_eq!(puzzle.remaining_secs(), 240.0);

        assert!(puzzle.start_timer());
        assert!(!puzzle.start_timer());
        puzzle.tick(40.0);
        assert_eq!(puzzle.remaining_secs(), 200.0);
    }

    #[test]
    fn test_all_parts_placed_wins_once() {
        let mut puzzle = AssemblyPuzzle::new(5, 240.0, Some(1));
        puzzle.start_timer();
        puzzle.tick(230.0);

        let outcomes: Vec<_> = (0..6).filter_map(|_| puzzle.record_placement()).collect();
        assert_eq!(outcomes, vec![PuzzleOutcome::Win]);
        assert_eq!(puzzle.placed(), 5);
        assert_eq!(puzzle.tick(20.0), None);
        assert_eq!(puzzle.outcome(), Some(PuzzleOutcome::Win));
    }

    #[test]
    fn test_timeout_loses_and_locks_placements() {
        let mut puzzle = AssemblyPuzzle::new(5, 240.0, None);
        puzzle.start_timer();
        for _ in 0..4 {
            puzzle.record_placement();
        }
        assert_eq!(puzzle.tick(300.0), Some(PuzzleOutcome::Lose));
        assert_eq!(puzzle.remaining_secs(), 0.0);
        assert_eq!(puzzle.tick(1.0), None);

        assert_eq!(puzzle.record_placement(), None);
        assert_eq!(puzzle.placed(), 4);
        assert!(!puzzle.accepts_input());
    }

    #[test]
    fn test_placement_before_tick_beats_expiry() {
        let mut puzzle = AssemblyPuzzle::new(1, 0.1, None);
        puzzle.start_timer();
        // Same frame: release is handled first, then the timer.
        assert_eq!(puzzle.record_placement(), Some(PuzzleOutcome::Win));
        assert_eq!(puzzle.tick(0.5), None);
        assert_eq!(puzzle.outcome(), Some(PuzzleOutcome::Win));
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(240.0), "04:00");
        assert_eq!(format_countdown(59.9), "00:59");
        assert_eq!(format_countdown(-3.0), "00:00");
    }
}
