//! Integer pixel coordinates.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A point on screen, in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Pixels right of the origin.
    pub x: i32,
    /// Pixels below the origin.
    pub y: i32,
}

impl Point {
    /// The screen origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a point from its coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// An axis-aligned rectangle given by its inclusive edges.
///
/// Screen space grows downwards, so `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Builds bounds from a top-left corner and a size.
    ///
    /// A zero or negative extent collapses that axis onto the corner.
    #[must_use]
    pub fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width.max(0)),
            bottom: top.saturating_add(height.max(0)),
        }
    }

    /// Horizontal extent, or `None` if it does not fit in an `i32`.
    #[must_use]
    pub fn width(&self) -> Option<i32> {
        self.right.checked_sub(self.left)
    }

    /// Vertical extent, or `None` if it does not fit in an `i32`.
    #[must_use]
    pub fn height(&self) -> Option<i32> {
        self.bottom.checked_sub(self.top)
    }

    /// Returns `true` if `point` lies on or inside the edges.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.top..=self.bottom).contains(&point.y)
    }

    /// Moves `point` onto the nearest position inside the bounds.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        // `max` then `min` so inverted bounds never panic like `i32::clamp`.
        Point::new(
            point.x.max(self.left).min(self.right),
            point.y.max(self.top).min(self.bottom),
        )
    }
}
