//! Application lifecycle management.
//!
//! Headless match loop: paces frames, turns frame deltas into fixed
//! simulation ticks, feeds bot or idle input to each side, draws to a
//! logging sink and reports events until the match freezes or the frame
//! limit runs out.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace, warn};

use duel_common::Side;
use duel_core::{
    Bot, EventHandler, FighterFrame, FrameTicker, HudSnapshot, InputSnapshot, MatchContext,
    MatchEvent, RenderSink,
};

use crate::config::EngineConfig;
use crate::timing::FramePacer;

/// Render sink that writes fighter frames to the trace log.
#[derive(Debug, Default)]
pub struct TraceSink {
    /// Log every N ticks (0 = never)
    every: u64,
    /// Tick of the frame being drawn
    tick: u64,
    /// Fighter frames handed to the sink
    frames_drawn: u64,
}

impl TraceSink {
    /// Create a sink logging every `every` ticks.
    #[must_use]
    pub fn new(every: u64) -> Self {
        Self {
            every,
            ..Self::default()
        }
    }

    fn due(&self) -> bool {
        self.every > 0 && self.tick % self.every == 0
    }
}

impl RenderSink for TraceSink {
    fn draw_fighter(&mut self, frame: &FighterFrame) {
        self.frames_drawn += 1;
        if self.due() {
            trace!(
                side = %frame.side,
                character = %frame.character,
                action = frame.action_name(),
                frame = frame.frame,
                x = frame.position.x,
                y = frame.position.y,
                facing_right = frame.facing_right,
                "draw"
            );
        }
    }

    fn draw_hud(&mut self, hud: &HudSnapshot) {
        self.tick = hud.tick;
        if self.due() {
            debug!(
                tick = hud.tick,
                player_health = hud.health_of(Side::Player),
                enemy_health = hud.health_of(Side::Enemy),
                player_power = hud.power_of(Side::Player),
                enemy_power = hud.power_of(Side::Enemy),
                "hud"
            );
        }
    }
}

/// Event handler that logs match events and keeps tallies.
#[derive(Debug, Default)]
pub struct EventLog {
    /// Hits landed, by attacker
    hits: [u32; 2],
    /// Specials used, by side
    abilities: [u32; 2],
    /// Sides that rang out
    ring_outs: Vec<Side>,
}

impl EventHandler for EventLog {
    fn handle(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::Hit {
                attacker,
                defender,
                kind,
                damage,
            } => {
                self.hits[attacker.index()] += 1;
                debug!(%attacker, %defender, ?kind, damage, "Hit");
            },
            MatchEvent::AbilityActivated { side, ability } => {
                self.abilities[side.index()] += 1;
                info!(%side, ability = ability.display_name(), "Special ability");
            },
            MatchEvent::AbilityExpired { side, ability } => {
                debug!(%side, ability = ability.display_name(), "Special ability expired");
            },
            MatchEvent::RingOut { side } => {
                self.ring_outs.push(*side);
                info!(%side, "Ring out");
            },
            MatchEvent::KnockedOut { side } => info!(%side, "Knocked out"),
            MatchEvent::MatchOver { message, .. } => info!("{message}"),
            MatchEvent::HealthChanged { side, health } => {
                debug!(%side, health, "Health changed");
            },
            MatchEvent::PowerChanged { side, power } => debug!(%side, power, "Power changed"),
            MatchEvent::Paused => info!("Paused"),
            MatchEvent::Resumed => info!("Resumed"),
            MatchEvent::Reset => info!("Reset"),
        }
    }
}

/// What happened in one run, written out as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    /// Player character
    pub player: String,
    /// Enemy character
    pub enemy: String,
    /// Winning side, if decided
    pub winner: Option<Side>,
    /// Outcome text, if decided
    pub outcome: Option<String>,
    /// Simulation ticks run
    pub ticks: u64,
    /// Frames run
    pub frames: u64,
    /// Hits landed, player then enemy
    pub hits: [u32; 2],
    /// Specials used, player then enemy
    pub abilities: [u32; 2],
    /// Sides that rang out
    pub ring_outs: Vec<Side>,
    /// Final health, player then enemy
    pub health: [f32; 2],
    /// Final power, player then enemy
    pub power: [f32; 2],
    /// Seed the bots ran with
    pub seed: u64,
}

/// The headless match runner.
pub struct App {
    config: EngineConfig,
    ctx: MatchContext,
    bots: [Option<Bot>; 2],
    ticker: FrameTicker,
    pacer: FramePacer,
    sink: TraceSink,
    log: EventLog,
    frames: u64,
    seed: u64,
}

impl App {
    /// Set up a match from configuration.
    pub fn new(mut config: EngineConfig) -> Result<Self> {
        config.validate();

        let roster = config.roster()?;
        let player = roster.get(&config.player)?.clone();
        let enemy = roster.get(&config.enemy)?.clone();
        let ctx = MatchContext::new(config.match_config.clone(), player, enemy)
            .context("setting up match")?;

        let seed = config.seed.unwrap_or_else(clock_seed);
        let bots = Side::ALL.map(|side| {
            config.is_bot(side).then(|| {
                // Distinct stream per side
                let stream = seed ^ (side.index() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                Bot::new(ctx.config(), stream)
            })
        });

        info!(
            player = %config.player,
            enemy = %config.enemy,
            seed,
            bot_player = config.bot_player,
            bot_enemy = config.bot_enemy,
            "Match ready"
        );

        Ok(Self {
            ticker: FrameTicker::new(ctx.config().tick_rate),
            pacer: FramePacer::new(config.target_fps, config.realtime),
            sink: TraceSink::new(config.trace_every),
            log: EventLog::default(),
            frames: 0,
            seed,
            bots,
            ctx,
            config,
        })
    }

    /// The match being run.
    #[must_use]
    pub fn context(&self) -> &MatchContext {
        &self.ctx
    }

    /// Pause or resume both the match and the ticker.
    #[allow(dead_code)]
    pub fn toggle_pause(&mut self) {
        let paused = self.ctx.toggle_pause();
        if paused != self.ticker.is_paused() {
            self.ticker.toggle();
        }
    }

    /// Run until the match freezes or the frame limit is hit.
    pub fn run(&mut self) -> Result<MatchSummary> {
        while self.frames < self.config.max_frames && self.ctx.state().is_running() {
            self.frame()?;
            self.pacer.sleep_remainder();
        }

        if self.ctx.state().is_running() {
            warn!(frames = self.frames, "Frame limit reached without a winner");
        }
        info!(
            frames = self.frames,
            ticks = self.context().state().tick(),
            fps = self.pacer.current_fps(),
            target_fps = self.pacer.target_fps(),
            "Run finished"
        );
        Ok(self.summary())
    }

    /// Run one frame: zero or more ticks, then draw and report.
    pub fn frame(&mut self) -> Result<()> {
        let dt = self.pacer.delta_time();
        let steps = self.ticker.advance(dt);
        for _ in 0..steps {
            let inputs = self.inputs();
            self.ctx.tick(&inputs)?;
        }

        self.ctx.draw(&mut self.sink);
        self.ctx.bus().dispatch(&mut self.log);
        self.frames += 1;
        Ok(())
    }

    fn inputs(&mut self) -> [InputSnapshot; 2] {
        let mut inputs = [InputSnapshot::new(); 2];
        for side in Side::ALL {
            if let Some(bot) = &mut self.bots[side.index()] {
                inputs[side.index()] = bot.think(
                    self.ctx.fighter(side),
                    self.ctx.fighter(side.opponent()),
                    self.ctx.config(),
                );
            }
        }
        inputs
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn summary(&self) -> MatchSummary {
        let hud = self.ctx.hud();
        MatchSummary {
            player: self.ctx.fighter(Side::Player).profile().name.clone(),
            enemy: self.ctx.fighter(Side::Enemy).profile().name.clone(),
            winner: self.ctx.state().winner(),
            outcome: hud.outcome,
            ticks: hud.tick,
            frames: self.frames,
            hits: self.log.hits,
            abilities: self.log.abilities,
            ring_outs: self.log.ring_outs.clone(),
            health: hud.health,
            power: hud.power,
            seed: self.seed,
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

/// Write a summary as pretty JSON.
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &MatchSummary) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).with_context(|| format!("writing summary {}", path.display()))?;
    info!("Wrote summary to {}", path.display());
    Ok(())
}

/// Runs one match to completion.
pub fn run(config: EngineConfig) -> Result<MatchSummary> {
    let summary_path = config.summary_path.clone();
    let mut app = App::new(config)?;
    let summary = app.run()?;
    if let Some(path) = summary_path {
        write_summary(path, &summary)?;
    }
    Ok(summary)
}
