//! Storage-layer error types.

use crate::entity::Entity;

/// Errors raised by the allocator, the component stores and the registry.
///
/// None of these are recovered locally. They propagate to the calling
/// system and from there to the frame driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The monotonic id counter cannot advance any further.
    #[error("entity id space exhausted")]
    ExhaustedIds,

    /// An id was released that the allocator never issued.
    #[error("{0} was never allocated")]
    NotAllocated(Entity),

    /// An id was released while already waiting in the free queue.
    #[error("{0} was already released")]
    AlreadyReleased(Entity),

    /// Indexed read or write on an id the store does not hold.
    #[error("{entity} has no `{component}` component")]
    KeyNotFound {
        /// The missing entity.
        entity: Entity,
        /// Name of the component store that was queried.
        component: &'static str,
    },

    /// `add` on an id the store already holds.
    #[error("{entity} already has a `{component}` component")]
    DuplicateEntity {
        /// The entity that was added twice.
        entity: Entity,
        /// Name of the component store.
        component: &'static str,
    },

    /// Lookup of a component type that was never registered.
    #[error("component `{0}` is not registered")]
    NotRegistered(String),

    /// A component type was registered twice.
    #[error("component `{0}` is already registered")]
    DuplicateRegistration(&'static str),

    /// The registered store for a type name holds a different Rust type.
    #[error("component `{0}` is registered with a different Rust type")]
    TypeMismatch(&'static str),
}
