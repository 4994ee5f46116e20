//! Match tuning.
//!
//! Durations are authored in milliseconds and converted to simulation ticks
//! at the configured tick rate, so every timer in a match is a tick count.

use duel_common::{ConfigError, Vec2};
use serde::{Deserialize, Serialize};

use crate::ai::BotConfig;

/// Arena, physics and timing parameters for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Floor line; bodies never extend below it
    pub ground_y: f32,
    /// Downward acceleration added to airborne bodies per tick
    pub gravity: f32,
    /// Left edge of the in-bounds interval for a fighter's x
    pub ring_out_min_x: f32,
    /// Right edge of the in-bounds interval for a fighter's x
    pub ring_out_max_x: f32,
    /// Where the player side spawns
    pub player_spawn: Vec2,
    /// Where the enemy side spawns
    pub enemy_spawn: Vec2,
    /// How long an attack can land after it starts
    pub attack_window_ms: u32,
    /// Upper attack cooldown
    pub upper_cooldown_ms: u32,
    /// Lower attack cooldown
    pub lower_cooldown_ms: u32,
    /// How long a special ability stays in effect
    pub ability_duration_ms: u32,
    /// Delay between a knockout and the simulation freezing
    pub death_delay_ms: u32,
    /// Bot tuning
    pub bot: BotConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            ground_y: 576.0,
            gravity: 0.2,
            ring_out_min_x: 0.0,
            ring_out_max_x: 974.0,
            player_spawn: Vec2::new(100.0, 0.0),
            enemy_spawn: Vec2::new(800.0, 0.0),
            attack_window_ms: 800,
            upper_cooldown_ms: 5000,
            lower_cooldown_ms: 3000,
            ability_duration_ms: 5000,
            death_delay_ms: 1500,
            bot: BotConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a duration in milliseconds to whole ticks, rounding up.
    #[must_use]
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        let rate = u64::from(self.tick_rate.max(1));
        (u64::from(ms) * rate).div_ceil(1000) as u32
    }

    /// Active window length in ticks.
    #[must_use]
    pub fn attack_window_ticks(&self) -> u32 {
        self.ms_to_ticks(self.attack_window_ms)
    }

    /// Upper attack cooldown in ticks.
    #[must_use]
    pub fn upper_cooldown_ticks(&self) -> u32 {
        self.ms_to_ticks(self.upper_cooldown_ms)
    }

    /// Lower attack cooldown in ticks.
    #[must_use]
    pub fn lower_cooldown_ticks(&self) -> u32 {
        self.ms_to_ticks(self.lower_cooldown_ms)
    }

    /// Special ability duration in ticks.
    #[must_use]
    pub fn ability_duration_ticks(&self) -> u32 {
        self.ms_to_ticks(self.ability_duration_ms)
    }

    /// Knockout-to-freeze delay in ticks.
    #[must_use]
    pub fn death_delay_ticks(&self) -> u32 {
        self.ms_to_ticks(self.death_delay_ms)
    }

    /// Seconds covered by one tick.
    #[must_use]
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Checks that the tuning is self-consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidMatch("tick_rate must be positive".into()));
        }
        if self.ring_out_min_x >= self.ring_out_max_x {
            return Err(ConfigError::InvalidMatch(format!(
                "ring-out interval [{}, {}] is empty",
                self.ring_out_min_x, self.ring_out_max_x
            )));
        }
        if self.gravity <= 0.0 {
            return Err(ConfigError::InvalidMatch("gravity must be positive".into()));
        }
        let window = self.attack_window_ticks();
        if window == 0 {
            return Err(ConfigError::InvalidMatch("attack window must be positive".into()));
        }
        // An attack must not be re-throwable while its own window is open.
        if self.upper_cooldown_ticks() <= window || self.lower_cooldown_ticks() <= window {
            return Err(ConfigError::InvalidMatch(
                "attack cooldowns must outlast the attack window".into(),
            ));
        }
        self.bot.validate()
    }
}
