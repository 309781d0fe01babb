//! Per-frame execution context provided to systems.

use std::time::Duration;

use manic_component::World;

/// Context handed to every system on each frame.
///
/// Holds the frame metadata and exclusive access to the world. Systems run
/// one after another, so each sees the writes of the systems before it.
#[derive(Debug)]
pub struct FrameContext<'w> {
    /// The current tick ID.
    pub tick_id: u64,
    /// Time since the previous frame.
    pub elapsed: Duration,
    /// The world being updated.
    pub world: &'w mut World,
}

impl<'w> FrameContext<'w> {
    /// Create a new context for a frame.
    #[must_use]
    pub fn new(world: &'w mut World, tick_id: u64, elapsed: Duration) -> Self {
        Self {
            tick_id,
            elapsed,
            world,
        }
    }

    /// Elapsed time in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
