//! # manic_math
//!
//! Screen-space math for the shooter. Re-exports [`glam`] for vector
//! arithmetic and defines the integer pixel types plus the spatial
//! components that implement [`Component`](manic_component::Component).

pub mod screen;
pub mod transform;

// Re-export glam types for convenience.
pub use glam::Vec2;

pub use screen::{Bounds, Point};
pub use transform::{Position, Rotation};
