//! Tick timing: the fixed-step frame ticker and per-tick countdowns.
//!
//! Every timer in a match is a [`Countdown`] decremented once per simulated
//! tick. Nothing counts wall-clock time, so a paused match freezes attack
//! windows, cooldowns and ability durations along with everything else.

use serde::{Deserialize, Serialize};

/// A timer measured in simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// An elapsed countdown.
    pub const IDLE: Self = Self { remaining: 0 };

    /// Creates a countdown that runs for `ticks` ticks.
    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// Restarts the countdown.
    pub fn start(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Stops the countdown without waiting for it to elapse.
    pub fn cancel(&mut self) {
        self.remaining = 0;
    }

    /// Whether ticks remain.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.remaining > 0
    }

    /// Ticks left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advances one tick. Returns true on the tick the countdown elapses.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// Fixed-step ticker driven by rendered-frame deltas.
///
/// The host calls [`FrameTicker::advance`] once per rendered frame and runs
/// that many simulation steps.
#[derive(Debug, Clone)]
pub struct FrameTicker {
    /// Fixed timestep delta in seconds
    fixed_dt: f32,
    /// Accumulated unsimulated time
    accumulator: f32,
    /// Maximum frame delta accepted (prevents spiral of death)
    max_dt: f32,
    /// Maximum steps returned for one frame
    max_steps: u32,
    /// Whether stepping is suspended
    paused: bool,
    /// Total steps handed out
    total_steps: u64,
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameTicker {
    /// Create a ticker for the given simulation rate.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            max_dt: 0.25,
            max_steps: 10,
            paused: false,
            total_steps: 0,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Total steps handed out since creation.
    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Whether the ticker is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Accumulate one frame's delta and return how many fixed steps to run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if self.paused {
            return 0;
        }

        self.accumulator += frame_dt.clamp(0.0, self.max_dt);
        let mut count = 0;
        while self.accumulator >= self.fixed_dt && count < self.max_steps {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind after the step cap: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_steps += u64::from(count);
        count
    }

    /// Suspend stepping.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume stepping from the current state, without catch-up.
    pub fn resume(&mut self) {
        self.paused = false;
        self.accumulator = 0.0;
    }

    /// Flip between paused and running.
    pub fn toggle(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_elapses_once() {
        let mut c = Countdown::new(2);
        assert!(c.is_running());
        assert!(!c.tick());
        assert!(c.tick());
        assert!(!c.is_running());
        assert!(!c.tick());
    }

    #[test]
    fn test_countdown_cancel() {
        let mut c = Countdown::IDLE;
        c.start(5);
        assert_eq!(c.remaining(), 5);
        c.cancel();
        assert!(!c.is_running());
    }

    #[test]
    fn test_ticker_steps_per_frame() {
        let mut ticker = FrameTicker::new(60);
        assert_eq!(ticker.advance(1.0 / 60.0 + 0.0001), 1);
        assert_eq!(ticker.advance(2.0 / 60.0), 2);
        assert_eq!(ticker.total_steps(), 3);
    }

    #[test]
    fn test_ticker_clamps_long_frames() {
        let mut ticker = FrameTicker::new(60);
        // A 5 second hitch is clamped to 0.25 s, then to 10 steps
        assert_eq!(ticker.advance(5.0), 10);
        assert_eq!(ticker.advance(0.0), 0);
    }

    #[test]
    fn test_ticker_pause_has_no_catch_up() {
        let mut ticker = FrameTicker::new(60);
        ticker.advance(0.01);
        ticker.pause();
        assert_eq!(ticker.advance(1.0), 0);
        ticker.resume();
        // Partial frame accumulated before the pause was dropped
        assert_eq!(ticker.advance(0.01), 0);
        assert!(!ticker.is_paused());
    }
}
