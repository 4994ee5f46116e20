//! What the core hands to a renderer.
//!
//! The core never draws. Each tick it describes both fighters as
//! [`FighterFrame`]s and the overlay as a [`HudSnapshot`]; a [`RenderSink`]
//! turns those into pixels, log lines or anything else.

use duel_common::{Side, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::AnimationAction;
use crate::fighter::Fighter;

/// Draw description of one fighter for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterFrame {
    /// Which side
    pub side: Side,
    /// Character name, used to pick the sprite set
    pub character: String,
    /// Current animation
    pub action: AnimationAction,
    /// Frame index within the action's sheet
    pub frame: u32,
    /// Frames in the action's sheet
    pub frames_max: u32,
    /// Body origin
    pub position: Vec2,
    /// Facing the right edge of the arena
    pub facing_right: bool,
    /// Draw scale
    pub scale: f32,
    /// Sprite origin relative to the body origin
    pub crop_offset: Vec2,
}

impl FighterFrame {
    /// Describes a fighter as it stands now.
    #[must_use]
    pub fn of(fighter: &Fighter) -> Self {
        let action = fighter.current_action();
        let sheet = fighter.profile().sprites.get(action);
        Self {
            side: fighter.side(),
            character: fighter.profile().name.clone(),
            action,
            frame: fighter.frame(),
            frames_max: sheet.frames_max,
            position: fighter.body.position,
            facing_right: fighter.body.facing_right,
            scale: sheet.scale,
            crop_offset: sheet.crop_offset,
        }
    }

    /// Animation name as the sprite loader keys it.
    #[must_use]
    pub fn action_name(&self) -> &'static str {
        self.action.name()
    }

    /// Where the sprite's top-left corner goes.
    #[must_use]
    pub fn sprite_origin(&self) -> Vec2 {
        self.position - self.crop_offset
    }
}

/// Overlay state: bars, pause and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Health per side, indexed by [`Side::index`]
    pub health: [f32; 2],
    /// Power per side, indexed by [`Side::index`]
    pub power: [f32; 2],
    /// Simulation paused
    pub paused: bool,
    /// Outcome text once the match is decided
    pub outcome: Option<String>,
    /// Ticks simulated so far
    pub tick: u64,
}

impl HudSnapshot {
    /// Health of one side.
    #[must_use]
    pub fn health_of(&self, side: Side) -> f32 {
        self.health[side.index()]
    }

    /// Power of one side.
    #[must_use]
    pub fn power_of(&self, side: Side) -> f32 {
        self.power[side.index()]
    }
}

/// Receives draw descriptions every tick.
pub trait RenderSink {
    /// Draws one fighter.
    fn draw_fighter(&mut self, frame: &FighterFrame);

    /// Draws the overlay. Does nothing by default.
    fn draw_hud(&mut self, _hud: &HudSnapshot) {}
}

/// Sink that keeps the last frames it was given.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    /// Fighter frames in draw order
    pub frames: Vec<FighterFrame>,
    /// Last overlay
    pub hud: Option<HudSnapshot>,
}

impl RenderSink for FrameRecorder {
    fn draw_fighter(&mut self, frame: &FighterFrame) {
        self.frames.push(frame.clone());
    }

    fn draw_hud(&mut self, hud: &HudSnapshot) {
        self.hud = Some(hud.clone());
    }
}
