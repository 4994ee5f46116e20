//! # Duel
//!
//! Headless runner for the duel simulation.
//!
//! Loads `duel.toml` (or the path given as the first argument), sets up a
//! match between two roster characters, drives it with bots and logs what
//! happens. Set `RUST_LOG=duel=debug` for hits and gauges, or
//! `duel=trace` for every drawn frame.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("duel=info".parse()?))
        .init();

    info!("Duel starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    let summary = app::run(config)?;
    match &summary.outcome {
        Some(outcome) => info!(ticks = summary.ticks, "{outcome}"),
        None => info!(ticks = summary.ticks, "No winner"),
    }

    info!("Duel shutdown complete");
    Ok(())
}
