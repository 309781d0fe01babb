//! The system contract.

use crate::context::FrameContext;
use crate::error::SystemError;
use manic_component::QueryDescriptor;

/// A unit of per-frame game logic.
pub trait System {
    /// Human-readable system name (e.g. `"movement"`), used in logs and errors.
    fn name(&self) -> &'static str;

    /// The component types this system reads and writes.
    ///
    /// Checked against the registry before the first frame.
    fn query(&self) -> QueryDescriptor;

    /// Advance this system's concern by one frame.
    ///
    /// # Errors
    ///
    /// Any error aborts the rest of the frame.
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), SystemError>;
}
