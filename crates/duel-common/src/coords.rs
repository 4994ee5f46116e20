//! Screen-space value types: vectors and axis-aligned rectangles.
//!
//! The arena uses screen coordinates: `x` grows to the right and `y` grows
//! downward, so the floor is the largest `y` a body may reach.

use serde::{Deserialize, Serialize};

/// 2D vector for positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new Vec2.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale the vector by a scalar.
    #[must_use]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Horizontal distance to another point.
    #[must_use]
    pub fn horizontal_distance(self, other: Self) -> f32 {
        (self.x - other.x).abs()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub position: Vec2,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            width,
            height,
        }
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.position.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }

    /// Checks whether the horizontal spans overlap. Touching edges count.
    #[must_use]
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.right() >= other.left() && self.left() <= other.right()
    }

    /// Checks whether the vertical spans overlap. Touching edges count.
    #[must_use]
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.bottom() >= other.top() && self.top() <= other.bottom()
    }

    /// Checks if this rectangle overlaps another. Touching edges count.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_horizontally(other) && self.overlaps_vertically(other)
    }

    /// Returns the rectangle moved by an offset.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            position: self.position + offset,
            ..*self
        }
    }
}
