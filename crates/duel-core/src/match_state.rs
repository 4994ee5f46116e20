//! Match lifecycle: running, paused, decided, frozen.

use duel_common::Side;
use serde::{Deserialize, Serialize};

use crate::clock::Countdown;

/// Lifecycle state of one match.
///
/// Once a winner is set it never changes. After the death delay elapses the
/// match stops running and further ticks do nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    running: bool,
    paused: bool,
    winner: Option<Side>,
    tick: u64,
    death_delay: Countdown,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// A fresh, running, unpaused match.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: true,
            paused: false,
            winner: None,
            tick: 0,
            death_delay: Countdown::IDLE,
        }
    }

    /// Whether the simulation still advances.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the simulation is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// The winner, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Whether a winner has been set.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether fighters still accept input and can hit each other.
    #[must_use]
    pub const fn accepts_input(&self) -> bool {
        self.running && self.winner.is_none()
    }

    /// Ticks simulated so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Ticks left before the match freezes, zero if not counting.
    #[must_use]
    pub const fn death_delay_remaining(&self) -> u32 {
        self.death_delay.remaining()
    }

    /// Terminal display text, e.g. `"Enemy Wins"`.
    #[must_use]
    pub fn outcome_message(&self) -> Option<String> {
        self.winner.map(|side| format!("{} Wins", side.label()))
    }

    /// Sets the winner and starts the death delay.
    ///
    /// Returns false, changing nothing, if a winner is already set.
    pub fn declare_winner(&mut self, winner: Side, death_delay: u32) -> bool {
        if self.winner.is_some() {
            return false;
        }
        self.winner = Some(winner);
        if death_delay == 0 {
            self.running = false;
        } else {
            self.death_delay.start(death_delay);
        }
        true
    }

    /// Counts one simulated tick and the death delay with it.
    ///
    /// Returns true on the tick the match freezes.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick += 1;
        if self.death_delay.tick() {
            self.running = false;
            return true;
        }
        false
    }

    /// Flips pause. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_is_sticky() {
        let mut state = MatchState::new();
        assert!(state.declare_winner(Side::Player, 3));
        assert!(!state.declare_winner(Side::Enemy, 3));
        assert_eq!(state.winner(), Some(Side::Player));
        assert_eq!(state.outcome_message().as_deref(), Some("Player Wins"));
        assert!(!state.accepts_input());
        assert!(state.is_running());
    }

    #[test]
    fn test_freezes_after_delay() {
        let mut state = MatchState::new();
        state.declare_winner(Side::Enemy, 3);
        assert!(!state.advance());
        assert!(!state.advance());
        assert!(state.advance());
        assert!(!state.is_running());

        let tick = state.tick();
        assert!(!state.advance());
        assert_eq!(state.tick(), tick);
    }

    #[test]
    fn test_zero_delay_freezes_immediately() {
        let mut state = MatchState::new();
        state.declare_winner(Side::Enemy, 0);
        assert!(!state.is_running());
    }

    #[test]
    fn test_toggle_pause() {
        let mut state = MatchState::new();
        assert!(state.toggle_pause());
        assert!(state.is_paused());
        assert!(!state.toggle_pause());
        assert!(!state.is_paused());
    }
}
