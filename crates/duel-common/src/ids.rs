//! Identifiers for fighters and the two sides of a match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for fighter IDs.
static FIGHTER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a fighter instance.
///
/// A reset match builds fresh fighters, so IDs from a previous round are no
/// longer part of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FighterId(u64);

impl FighterId {
    /// Creates a new unique fighter ID.
    #[must_use]
    pub fn new() -> Self {
        Self(FIGHTER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a fighter ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for FighterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left-hand starting side, usually the human.
    Player,
    /// Right-hand starting side, usually the bot.
    Enemy,
}

impl Side {
    /// Both sides in evaluation order.
    pub const ALL: [Side; 2] = [Side::Player, Side::Enemy];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }

    /// Index into a two-element per-side array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Enemy => 1,
        }
    }

    /// Display label used in outcome messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Enemy => "Enemy",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
