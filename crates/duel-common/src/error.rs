//! Error types for the duel simulation.

use thiserror::Error;

use crate::ids::{FighterId, Side};

/// Top-level error type for duel operations.
#[derive(Debug, Error)]
pub enum DuelError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Match misuse errors
    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and roster errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Roster text could not be parsed
    #[error("failed to parse roster: {0}")]
    RosterParse(String),

    /// No character with this name in the roster
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    /// A character profile has an out-of-range value
    #[error("invalid profile {name}: {reason}")]
    InvalidProfile {
        /// Profile name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Match tuning is inconsistent
    #[error("invalid match config: {0}")]
    InvalidMatch(String),

    /// The roster lists the same name twice
    #[error("duplicate character: {0}")]
    DuplicateCharacter(String),
}

/// Programmer misuse of a running match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The fighter ID does not belong to this match
    #[error("fighter {0} is not part of this match")]
    UnknownFighter(FighterId),

    /// An attacker was paired with itself
    #[error("{0} cannot fight itself")]
    SameSide(Side),
}

/// Result type alias for duel operations.
pub type DuelResult<T> = Result<T, DuelError>;
