//! Gameplay component value structs.
//!
//! Every struct carries the id of the entity it belongs to and implements
//! [`Component`], so it can live in a
//! [`ComponentStore`](manic_component::ComponentStore). The spatial types
//! live in [`manic_math`]; everything else the systems consume is here.

use manic_component::{Component, Entity};
use manic_math::{Bounds, Vec2};
use serde::{Deserialize, Serialize};

/// Direction and speed of a moving entity.
///
/// `velocity` is a direction; the movement system normalises it before use,
/// so its length does not affect how fast the entity travels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    /// Owning entity.
    pub entity: Entity,
    /// Direction of travel.
    pub velocity: Vec2,
    /// Pixels per second.
    pub speed: i32,
    /// Upper limit applied to `speed` every frame.
    pub max_speed: i32,
}

impl Movement {
    /// A stationary entity that may move at up to `max_speed`.
    #[must_use]
    pub fn idle(entity: Entity, speed: i32, max_speed: i32) -> Self {
        Self {
            entity,
            velocity: Vec2::ZERO,
            speed,
            max_speed,
        }
    }

    /// Same speed limits, heading along `velocity`.
    #[must_use]
    pub fn heading(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Component for Movement {
    fn type_name() -> &'static str {
        "Movement"
    }
}

/// A countdown in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timer {
    /// Owning entity.
    pub entity: Entity,
    /// Total duration.
    pub length_ms: u32,
    /// Elapsed time, never above `length_ms`.
    pub value_ms: u32,
    /// Destroy the entity once the timer finishes.
    pub despawn_on_finish: bool,
}

impl Timer {
    /// A timer starting from zero that leaves its entity alive when it ends.
    #[must_use]
    pub fn new(entity: Entity, length_ms: u32) -> Self {
        Self {
            entity,
            length_ms,
            value_ms: 0,
            despawn_on_finish: false,
        }
    }

    /// A timer whose entity is destroyed when it runs out.
    #[must_use]
    pub fn lifetime(entity: Entity, length_ms: u32) -> Self {
        Self {
            despawn_on_finish: true,
            ..Self::new(entity, length_ms)
        }
    }

    /// Advance by `elapsed_ms`, saturating at the length.
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.value_ms = self.value_ms.saturating_add(elapsed_ms).min(self.length_ms);
    }

    /// Returns `true` once the elapsed time reaches the length.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.value_ms >= self.length_ms
    }

    /// Time left before the timer finishes.
    #[must_use]
    pub fn remaining_ms(&self) -> u32 {
        self.length_ms.saturating_sub(self.value_ms)
    }
}

impl Component for Timer {
    fn type_name() -> &'static str {
        "Timer"
    }
}

/// Opaque reference to a loaded image, issued by whoever owns the textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u32);

/// A static image drawn at the entity's position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprite {
    /// Owning entity.
    pub entity: Entity,
    /// Image to draw.
    pub image: ImageHandle,
    /// Hidden sprites are skipped by the renderer.
    pub visible: bool,
}

impl Sprite {
    /// A visible sprite.
    #[must_use]
    pub fn new(entity: Entity, image: ImageHandle) -> Self {
        Self {
            entity,
            image,
            visible: true,
        }
    }
}

impl Component for Sprite {
    fn type_name() -> &'static str {
        "Sprite"
    }
}

/// Marks an entity as steered by player input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerControl {
    /// Owning entity.
    pub entity: Entity,
}

impl Component for PlayerControl {
    fn type_name() -> &'static str {
        "PlayerControl"
    }
}

/// Keeps an entity's position inside a rectangle after every move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Confined {
    /// Owning entity.
    pub entity: Entity,
    /// Inclusive rectangle the position is clamped into.
    pub bounds: Bounds,
}

impl Component for Confined {
    fn type_name() -> &'static str {
        "Confined"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_timer_saturates_at_length() {
        let mut t = Timer::new(Entity(0), 250);
        t.advance(100);
        assert_eq!(t.value_ms, 100);
        assert_eq!(t.remaining_ms(), 150);
        assert!(!t.is_finished());

        t.advance(u32::MAX);
        assert_eq!(t.value_ms, 250);
        assert_eq!(t.remaining_ms(), 0);
        assert!(t.is_finished());
    }

    #[test]
    fn test_overrun_timer_has_nothing_remaining() {
        let json = r#"{"entity":1,"length_ms":100,"value_ms":400,"despawn_on_finish":false}"#;
        let t: Timer = serde_json::from_str(json).unwrap();
        assert_eq!(t.remaining_ms(), 0);
        assert!(t.is_finished());
    }

    #[test]
    fn test_zero_length_timer_is_finished() {
        assert!(Timer::lifetime(Entity(2), 0).is_finished());
    }

    #[test]
    fn test_movement_builders() {
        let m = Movement::idle(Entity(1), 120, 200);
        assert_eq!(m.velocity, Vec2::ZERO);
        let m = m.heading(Vec2::new(0.0, -1.0));
        assert_eq!(m.velocity, Vec2::new(0.0, -1.0));
        assert_eq!(m.speed, 120);
        assert_eq!(m.max_speed, 200);
    }

    #[test]
    fn test_sprite_starts_visible() {
        let s = Sprite::new(Entity(4), ImageHandle(7));
        assert!(s.visible);
        assert_eq!(s.image, ImageHandle(7));
    }

    #[test]
    fn test_component_type_ids_are_distinct() {
        let ids: HashSet<_> = [
            Movement::component_type_id(),
            Timer::component_type_id(),
            Sprite::component_type_id(),
            PlayerControl::component_type_id(),
            Confined::component_type_id(),
        ]
        .into_iter()
        .collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_confined_deserializes_from_json() {
        let json = r#"{"entity":3,"bounds":{"left":0,"top":0,"right":640,"bottom":480}}"#;
        let c: Confined = serde_json::from_str(json).unwrap();
        assert_eq!(c.entity, Entity(3));
        assert_eq!(c.bounds.right, 640);
    }
}
