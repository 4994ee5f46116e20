//! Animation state selection.
//!
//! The action is chosen from fighter flags every tick, independent of any
//! renderer. The [`Animator`] keeps the sprite frame cursor for the chosen
//! action.

use serde::{Deserialize, Serialize};

/// Named animation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationAction {
    /// Standing still
    #[default]
    Idle,
    /// Moving horizontally
    Run,
    /// Airborne
    Jump,
    /// Upper attack window
    AttackUpper,
    /// Lower attack window
    AttackLower,
    /// Block stance
    Block,
    /// Knocked out
    Death,
}

impl AnimationAction {
    /// Name used by sprite sets and renderers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::AttackUpper => "attackUpper",
            Self::AttackLower => "attackLower",
            Self::Block => "block",
            Self::Death => "death",
        }
    }

    /// Whether this is one of the attack actions.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::AttackUpper | Self::AttackLower)
    }

    /// Picks the action for this tick.
    ///
    /// Priority: death, attack, jump, block, run, idle.
    #[must_use]
    pub fn select(flags: AnimationFlags) -> Self {
        if flags.dead {
            Self::Death
        } else if flags.upper_window {
            Self::AttackUpper
        } else if flags.lower_window {
            Self::AttackLower
        } else if flags.airborne {
            Self::Jump
        } else if flags.blocking {
            Self::Block
        } else if flags.moving {
            Self::Run
        } else {
            Self::Idle
        }
    }
}

/// Fighter state the action is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationFlags {
    /// Fighter is knocked out
    pub dead: bool,
    /// Upper attack window open
    pub upper_window: bool,
    /// Lower attack window open
    pub lower_window: bool,
    /// Jumping and not yet landed
    pub airborne: bool,
    /// Block stance held
    pub blocking: bool,
    /// Horizontal input active
    pub moving: bool,
}

/// Current action plus sprite frame cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Animator {
    action: AnimationAction,
    frame: u32,
    elapsed: u32,
}

impl Animator {
    /// Creates an animator in the idle action.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current action.
    #[must_use]
    pub fn action(&self) -> AnimationAction {
        self.action
    }

    /// Current sprite frame index.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Switches action. Re-entering the current action keeps the cursor.
    /// Returns true when the action changed.
    pub fn set_action(&mut self, action: AnimationAction) -> bool {
        if self.action == action {
            return false;
        }
        self.action = action;
        self.frame = 0;
        self.elapsed = 0;
        true
    }

    /// Advances the frame cursor by one tick.
    ///
    /// The frame moves every `frames_hold` ticks and wraps at `frames_max`,
    /// except for death, which holds its last frame.
    pub fn advance(&mut self, frames_max: u32, frames_hold: u32) {
        let frames_max = frames_max.max(1);
        self.elapsed = self.elapsed.wrapping_add(1);
        if self.elapsed % frames_hold.max(1) != 0 {
            return;
        }
        if self.frame + 1 < frames_max {
            self.frame += 1;
        } else if self.action != AnimationAction::Death {
            self.frame = 0;
        }
    }
}
