//! Spatial components.
//!
//! [`Position`] places an entity on screen; [`Rotation`] turns its sprite
//! about an origin when drawn. Both carry their owning entity id like every
//! other value struct.

use glam::Vec2;
use manic_component::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::screen::Point;

/// Where an entity is on screen.
///
/// Nearly every gameplay entity has one; movement, clamping and rendering
/// all read it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    /// Owning entity.
    pub entity: Entity,
    /// Top-left of the entity in pixels.
    pub point: Point,
}

impl Position {
    /// Create a position from raw coordinates.
    #[must_use]
    pub fn new(entity: Entity, x: i32, y: i32) -> Self {
        Self {
            entity,
            point: Point::new(x, y),
        }
    }

    /// Shift the position by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Point) -> Self {
        self.point += offset;
        self
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// Draw-time rotation of an entity's sprite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rotation {
    /// Owning entity.
    pub entity: Entity,
    /// Clockwise rotation in radians.
    pub radians: f32,
    /// Pivot relative to the sprite's top-left corner.
    pub origin: Vec2,
}

impl Rotation {
    /// No rotation about the sprite's corner.
    #[must_use]
    pub fn none(entity: Entity) -> Self {
        Self {
            entity,
            radians: 0.0,
            origin: Vec2::ZERO,
        }
    }

    /// Rotate further by `radians`, wrapped into `[0, TAU)`.
    #[must_use]
    pub fn rotated(mut self, radians: f32) -> Self {
        self.radians = (self.radians + radians).rem_euclid(std::f32::consts::TAU);
        self
    }
}

impl Component for Rotation {
    fn type_name() -> &'static str {
        "Rotation"
    }
}
