//! Side-view body physics.
//!
//! A [`Body`] is an upright axis-aligned box with a velocity, integrated once
//! per tick against a flat floor. Fighters own one; decorative props may use
//! one on its own.

use duel_common::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Physical body of a fighter or prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub position: Vec2,
    /// Per-tick displacement
    pub velocity: Vec2,
    /// Box width
    pub width: f32,
    /// Box height
    pub height: f32,
    /// Whether the body faces right
    pub facing_right: bool,
    /// Whether the body left the ground by jumping and has not landed yet
    pub is_jumping: bool,
}

impl Body {
    /// Creates a resting body at `position`.
    #[must_use]
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            width,
            height,
            facing_right: true,
            is_jumping: false,
        }
    }

    /// The body's bounding rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.width, self.height)
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.position.x + self.width / 2.0
    }

    /// Whether the feet rest on the floor.
    #[must_use]
    pub fn is_grounded(&self, ground_y: f32) -> bool {
        self.position.y + self.height >= ground_y
    }

    /// Advances one tick.
    ///
    /// Moves by the velocity, then either lands on the floor (clamping the
    /// position, zeroing vertical speed and clearing the jump) or falls
    /// under gravity. Returns true only on a tick that ended a jump.
    pub fn integrate(&mut self, gravity: f32, ground_y: f32) -> bool {
        self.position += self.velocity;

        if self.position.y + self.height >= ground_y {
            self.position.y = ground_y - self.height;
            self.velocity.y = 0.0;
            let landed = self.is_jumping;
            self.is_jumping = false;
            landed
        } else {
            self.velocity.y += gravity;
            false
        }
    }

    /// Faces toward a point on the x axis.
    pub fn face_toward(&mut self, x: f32) {
        self.facing_right = self.position.x < x;
    }

    /// Moves horizontally by `distance` (no collision, no clamping).
    pub fn shove(&mut self, distance: f32) {
        self.position.x += distance;
    }
}
