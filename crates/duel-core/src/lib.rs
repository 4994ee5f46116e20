//! # Duel Core
//!
//! Simulation core for a two-fighter, side-view fighting game.
//!
//! This crate provides everything that happens between reading input and
//! drawing a frame:
//! - Fixed-step tick timing and per-tick countdowns
//! - Body physics (gravity, landing, facing)
//! - Fighters with attacks, blocking, cooldowns and a power meter
//! - Special abilities as a tagged effect table
//! - Animation state selection and sprite frame cursors
//! - Attack collision detection and resolution
//! - The match controller: ring-out, knockouts, pause, reset
//! - A throttled bot opponent
//! - Keyboard mapping to per-side input snapshots
//! - Render and HUD descriptions, and a match event bus
//! - Match configuration and a RON character roster

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ability;
pub mod ai;
pub mod animation;
pub mod body;
pub mod clock;
pub mod combat;
pub mod config;
pub mod controller;
pub mod events;
pub mod fighter;
pub mod input;
pub mod match_state;
pub mod profile;
pub mod render;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ability::*;
    pub use crate::ai::*;
    pub use crate::animation::*;
    pub use crate::body::*;
    pub use crate::clock::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::events::*;
    pub use crate::fighter::*;
    pub use crate::input::*;
    pub use crate::match_state::*;
    pub use crate::profile::*;
    pub use crate::render::*;
}

pub use prelude::*;
