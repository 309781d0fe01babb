//! # manic_system
//!
//! Per-frame update logic for the shooter.
//!
//! A [`System`] declares what it reads and writes through a
//! [`QueryDescriptor`](manic_component::QueryDescriptor) and mutates the
//! [`World`](manic_component::World) it receives in a [`FrameContext`]. The
//! [`Pipeline`] validates every declaration once and then runs the systems
//! in registration order, one frame at a time:
//!
//! 1. [`InputSystem`] turns sampled actions into player velocity.
//! 2. [`MovementSystem`] integrates velocity into position.
//! 3. [`TimerSystem`] advances countdowns and despawns expired entities.
//! 4. [`RenderSystem`] hands draw commands to a [`Canvas`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use manic_component::World;
//! use manic_system::{MovementSystem, Pipeline, TimerSystem};
//!
//! let mut world = World::new();
//! let mut pipeline = Pipeline::new();
//! pipeline.push(MovementSystem::new());
//! pipeline.push(TimerSystem::new());
//!
//! pipeline.validate(&world).unwrap();
//! pipeline.run_frame(&mut world, 1, Duration::from_millis(16)).unwrap();
//! ```

pub mod context;
pub mod error;
pub mod input;
pub mod movement;
pub mod pipeline;
pub mod render;
pub mod system;
pub mod timer;

pub use context::FrameContext;
pub use error::SystemError;
pub use input::{Action, ButtonState, InputSource, InputSystem, ScriptedInput};
pub use movement::MovementSystem;
pub use pipeline::Pipeline;
pub use render::{Canvas, DrawCommand, RenderSystem};
pub use system::System;
pub use timer::TimerSystem;
