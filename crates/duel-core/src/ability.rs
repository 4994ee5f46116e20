//! Power-meter special abilities.
//!
//! Each character carries one [`AbilityKind`]. A full meter unlocks it; the
//! effect table in [`AbilityKind::effect`] decides what it changes, and
//! [`AbilityState`] times it out.

use serde::{Deserialize, Serialize};

use crate::clock::Countdown;

/// Character-specific special ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Doubles outgoing damage.
    Fury,
    /// Lower attacks shove the target too.
    Knockback,
    /// Restores health to full.
    Renewal,
    /// Doubles the upper attack's push.
    Surge,
}

/// What an ability changes while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityEffect {
    /// Multiplier on upper and lower damage
    pub damage_multiplier: f32,
    /// Multiplier on the push distance
    pub push_multiplier: f32,
    /// Whether lower attacks also push
    pub lower_attack_pushes: bool,
    /// Whether activation refills health (instant, nothing to revert)
    pub restores_health: bool,
}

impl AbilityEffect {
    /// No modification.
    pub const NEUTRAL: Self = Self {
        damage_multiplier: 1.0,
        push_multiplier: 1.0,
        lower_attack_pushes: false,
        restores_health: false,
    };
}

impl Default for AbilityEffect {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl AbilityKind {
    /// Effect table.
    #[must_use]
    pub const fn effect(self) -> AbilityEffect {
        match self {
            Self::Fury => AbilityEffect {
                damage_multiplier: 2.0,
                ..AbilityEffect::NEUTRAL
            },
            Self::Knockback => AbilityEffect {
                lower_attack_pushes: true,
                ..AbilityEffect::NEUTRAL
            },
            Self::Renewal => AbilityEffect {
                restores_health: true,
                ..AbilityEffect::NEUTRAL
            },
            Self::Surge => AbilityEffect {
                push_multiplier: 2.0,
                ..AbilityEffect::NEUTRAL
            },
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Fury => "Fury",
            Self::Knockback => "Knockback",
            Self::Renewal => "Renewal",
            Self::Surge => "Surge",
        }
    }

    /// Get all ability kinds.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Fury, Self::Knockback, Self::Renewal, Self::Surge]
    }
}

/// The currently running ability of one fighter, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AbilityState {
    active: Option<AbilityKind>,
    timer: Countdown,
}

impl AbilityState {
    /// Starts `kind` for `duration` ticks, replacing any running ability.
    pub fn activate(&mut self, kind: AbilityKind, duration: u32) {
        self.active = Some(kind);
        self.timer.start(duration.max(1));
    }

    /// The running ability.
    #[must_use]
    pub fn active(&self) -> Option<AbilityKind> {
        self.active
    }

    /// Ticks until the running ability reverts.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }

    /// Current modifiers; neutral when nothing runs.
    #[must_use]
    pub fn effect(&self) -> AbilityEffect {
        self.active.map_or(AbilityEffect::NEUTRAL, AbilityKind::effect)
    }

    /// Advances one tick. Returns the ability that just reverted.
    pub fn tick(&mut self) -> Option<AbilityKind> {
        if self.timer.tick() {
            return self.active.take();
        }
        None
    }

    /// Drops any running ability.
    pub fn clear(&mut self) {
        self.active = None;
        self.timer.cancel();
    }
}
