//! Computer-controlled opponent.
//!
//! A [`Bot`] looks at both fighters and emits the same [`InputSnapshot`] a
//! human would. Decisions are throttled to a fixed interval; between
//! decisions the chosen direction stays held.

use duel_common::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::clock::Countdown;
use crate::config::MatchConfig;
use crate::fighter::{Fighter, MoveDirection, MAX_POWER};
use crate::input::InputSnapshot;

/// Bot tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Time between decisions
    pub decision_interval_ms: u32,
    /// Distance from a ring edge at which the bot heads back toward its opponent
    pub boundary_margin: f32,
    /// Chance of jumping on a decision while grounded
    pub jump_chance: f32,
    /// Horizontal distance at which the bot swings
    pub attack_range: f32,
    /// Chance that an in-range swing is an upper rather than a lower attack
    pub upper_attack_bias: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            decision_interval_ms: 300,
            boundary_margin: 100.0,
            jump_chance: 0.08,
            attack_range: 120.0,
            upper_attack_bias: 0.5,
        }
    }
}

impl BotConfig {
    /// Checks that probabilities are in range and the interval is nonzero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision_interval_ms == 0 {
            return Err(ConfigError::InvalidMatch(
                "bot decision interval must be positive".into(),
            ));
        }
        for (name, chance) in [
            ("jump_chance", self.jump_chance),
            ("upper_attack_bias", self.upper_attack_bias),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::InvalidMatch(format!(
                    "bot {name} must be within [0, 1], got {chance}"
                )));
            }
        }
        if self.boundary_margin < 0.0 || self.attack_range < 0.0 {
            return Err(ConfigError::InvalidMatch(
                "bot distances must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Throttled random opponent.
#[derive(Debug, Clone)]
pub struct Bot {
    rng: fastrand::Rng,
    interval: u32,
    next_decision: Countdown,
    direction: MoveDirection,
    decisions: u64,
}

impl Bot {
    /// Creates a bot with a fixed seed so matches replay identically.
    #[must_use]
    pub fn new(config: &MatchConfig, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            interval: config.ms_to_ticks(config.bot.decision_interval_ms).max(1),
            next_decision: Countdown::IDLE,
            direction: MoveDirection::Hold,
            decisions: 0,
        }
    }

    /// Direction currently held.
    #[must_use]
    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    /// Number of decisions made so far.
    #[must_use]
    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Produces this tick's input for `me` facing `opponent`.
    pub fn think(
        &mut self,
        me: &Fighter,
        opponent: &Fighter,
        config: &MatchConfig,
    ) -> InputSnapshot {
        if me.is_dead() {
            self.direction = MoveDirection::Hold;
            return InputSnapshot::new();
        }

        let mut input = InputSnapshot::new();
        let deciding = !self.next_decision.is_running() || self.next_decision.tick();
        if deciding {
            self.next_decision.start(self.interval);
            self.decisions += 1;
            self.direction = self.choose_direction(me, opponent, config);

            if me.body.is_grounded(config.ground_y) && self.rng.f32() < config.bot.jump_chance {
                input.jump = true;
            }

            let distance = me.body.position.horizontal_distance(opponent.body.position);
            if distance <= config.bot.attack_range {
                if self.rng.f32() < config.bot.upper_attack_bias {
                    input.attack_upper = true;
                } else {
                    input.attack_lower = true;
                }
            }

            input.special = me.power() >= MAX_POWER;
            trace!(side = %me.side(), direction = ?self.direction, "Bot decision");
        }

        match self.direction {
            MoveDirection::Left => input.left = true,
            MoveDirection::Right => input.right = true,
            MoveDirection::Hold => {}
        }
        input
    }

    fn choose_direction(
        &mut self,
        me: &Fighter,
        opponent: &Fighter,
        config: &MatchConfig,
    ) -> MoveDirection {
        let x = me.body.position.x;
        let margin = config.bot.boundary_margin;
        let near_edge =
            x <= config.ring_out_min_x + margin || x >= config.ring_out_max_x - margin;
        if near_edge {
            return if opponent.body.position.x < x {
                MoveDirection::Left
            } else {
                MoveDirection::Right
            };
        }
        match self.rng.u8(0..3) {
            0 => MoveDirection::Left,
            1 => MoveDirection::Right,
            _ => MoveDirection::Hold,
        }
    }
}
