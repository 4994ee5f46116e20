//! Engine configuration.
//!
//! Picks the characters, which sides the bot plays, frame pacing and where
//! to write the match summary. Match tuning lives in the `[match]` table.
//! Configuration can be loaded from and saved to a TOML file.

use anyhow::{Context, Result};
use duel_common::Side;
use duel_core::{MatchConfig, Roster};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "duel.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Fighters ===
    /// Player character name
    pub player: String,
    /// Enemy character name
    pub enemy: String,
    /// Bot drives the player side
    pub bot_player: bool,
    /// Bot drives the enemy side
    pub bot_enemy: bool,
    /// Bot seed (None = derived from the clock)
    pub seed: Option<u64>,
    /// RON roster file (None = built-in roster)
    pub roster_path: Option<PathBuf>,

    // === Loop ===
    /// Frames per second driven into the ticker
    pub target_fps: u32,
    /// Stop after this many frames even without a winner
    pub max_frames: u64,
    /// Pace frames against the wall clock instead of running flat out
    pub realtime: bool,
    /// Log fighter frames every N ticks (0 = never)
    pub trace_every: u64,

    // === Output ===
    /// Where to write the JSON match summary
    pub summary_path: Option<PathBuf>,

    /// Match tuning
    #[serde(rename = "match")]
    pub match_config: MatchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player: "Kenji".into(),
            enemy: "Brutus".into(),
            bot_player: true,
            bot_enemy: true,
            seed: None,
            roster_path: None,

            target_fps: 60,
            max_frames: 60 * 120,
            realtime: false,
            trace_every: 60,

            summary_path: None,

            match_config: MatchConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to the default file location.
    #[allow(dead_code)]
    pub fn save(&self) -> io::Result<()> {
        self.save_to(CONFIG_FILE)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp loop settings to sensible ranges.
    pub fn validate(&mut self) {
        self.target_fps = self.target_fps.clamp(1, 240);
        self.max_frames = self.max_frames.max(1);
    }

    /// Whether the bot drives a side.
    #[must_use]
    pub fn is_bot(&self, side: Side) -> bool {
        match side {
            Side::Player => self.bot_player,
            Side::Enemy => self.bot_enemy,
        }
    }

    /// The roster characters are picked from.
    pub fn roster(&self) -> Result<Roster> {
        let Some(path) = &self.roster_path else {
            return Ok(Roster::builtin());
        };
        let roster =
            Roster::load(path).with_context(|| format!("loading roster {}", path.display()))?;
        info!(characters = roster.characters.len(), "Loaded roster from {}", path.display());
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.player, "Kenji");
        assert!(config.is_bot(Side::Enemy));
        assert_eq!(config.match_config, MatchConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig {
            target_fps: 0,
            max_frames: 0,
            ..EngineConfig::default()
        };
        config.validate();
        assert_eq!(config.target_fps, 1);
        assert_eq!(config.max_frames, 1);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("duel.toml");

        let mut config = EngineConfig::default();
        config.enemy = "Mira".into();
        config.bot_player = false;
        config.seed = Some(12345);
        config.match_config.gravity = 0.3;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("duel.toml");
        fs::write(&config_path, "enemy = \"Vega\"\n\n[match]\ndeath_delay_ms = 500\n")
            .expect("write");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded.enemy, "Vega");
        assert_eq!(loaded.player, "Kenji");
        assert_eq!(loaded.match_config.death_delay_ms, 500);
        assert_eq!(loaded.match_config.gravity, 0.2);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/duel.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_load_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("duel.toml");
        fs::write(&config_path, "player = [").expect("write");
        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }

    #[test]
    fn test_roster_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let roster_path = temp_dir.path().join("roster.ron");
        let text = Roster::builtin().to_ron_string().expect("serialize");
        fs::write(&roster_path, text).expect("write");

        let config = EngineConfig {
            roster_path: Some(roster_path),
            ..EngineConfig::default()
        };
        let roster = config.roster().expect("roster loads");
        assert!(roster.get("Mira").is_ok());
    }

    #[test]
    fn test_missing_roster_is_error() {
        let config = EngineConfig {
            roster_path: Some(PathBuf::from("/nonexistent/roster.ron")),
            ..EngineConfig::default()
        };
        assert!(config.roster().is_err());
    }
}
