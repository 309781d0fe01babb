//! Query descriptors for system data access declarations.
//!
//! A [`QueryDescriptor`] lists the component types a system reads and
//! writes. The frame pipeline checks every listed type against the registry
//! before the first frame, so a missing store fails at startup instead of
//! inside some later update.

use crate::component::{Component, ComponentMeta};
use crate::error::EcsError;
use crate::registry::ComponentRegistry;

/// Describes the data access requirements of a system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Component types the system only reads.
    pub reads: Vec<ComponentMeta>,
    /// Component types the system writes back.
    pub writes: Vec<ComponentMeta>,
}

impl QueryDescriptor {
    /// Create a new empty query descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a read-only component requirement.
    #[must_use]
    pub fn read<T: Component>(mut self) -> Self {
        self.reads.push(T::meta());
        self
    }

    /// Add a read-write component requirement.
    #[must_use]
    pub fn write<T: Component>(mut self) -> Self {
        self.writes.push(T::meta());
        self
    }

    /// Returns every component type this query touches, reads first.
    #[must_use]
    pub fn all_accessed(&self) -> Vec<ComponentMeta> {
        let mut types = Vec::with_capacity(self.reads.len() + self.writes.len());
        types.extend_from_slice(&self.reads);
        types.extend_from_slice(&self.writes);
        types
    }

    /// Checks that every accessed component has a store.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotRegistered`] naming the first missing component.
    pub fn check(&self, registry: &ComponentRegistry) -> Result<(), EcsError> {
        match self
            .all_accessed()
            .into_iter()
            .find(|meta| !registry.contains_id(meta.type_id))
        {
            Some(missing) => Err(EcsError::NotRegistered(missing.name.to_owned())),
            None => Ok(()),
        }
    }
}
