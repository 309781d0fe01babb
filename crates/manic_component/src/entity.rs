//! Entity type and allocation utilities.
//!
//! An [`Entity`] is a lightweight `u32` identifier with no inherent data.
//! Identifiers are unique among live entities only: a released id goes to
//! the back of a FIFO free queue and is handed out again before the counter
//! advances.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::EcsError;

/// A unique entity identifier.
///
/// Entities are pure identifiers and carry no data of their own. Components
/// are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u32);

impl Entity {
    /// Create an entity from a raw `u32` identifier.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw `u32` identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Issues and recycles entity ids.
///
/// Fresh ids come from a monotonic counter starting at 0. Released ids are
/// queued and always consulted before the counter.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u32,
    exhausted: bool,
    free: VecDeque<Entity>,
    /// Mirror of `free` for O(1) double-release detection.
    free_set: HashSet<Entity>,
}

impl EntityAllocator {
    /// Creates a new allocator whose first id is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id, preferring the oldest released one.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ExhaustedIds`] once every `u32` has been issued
    /// and nothing is waiting in the free queue.
    pub fn allocate(&mut self) -> Result<Entity, EcsError> {
        if let Some(entity) = self.free.pop_front() {
            self.free_set.remove(&entity);
            trace!(%entity, "reused entity id");
            return Ok(entity);
        }

        if self.exhausted {
            return Err(EcsError::ExhaustedIds);
        }

        let entity = Entity(self.next_id);
        match self.next_id.checked_add(1) {
            Some(next) => self.next_id = next,
            None => self.exhausted = true,
        }
        Ok(entity)
    }

    /// Returns `entity` to the free queue.
    ///
    /// The allocator does not touch any component store; callers that own
    /// component data should go through [`World::destroy`](crate::World::destroy).
    ///
    /// # Errors
    ///
    /// [`EcsError::NotAllocated`] if the id was never issued,
    /// [`EcsError::AlreadyReleased`] if it is already queued.
    pub fn release(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.check_live(entity)?;
        self.free_set.insert(entity);
        self.free.push_back(entity);
        trace!(%entity, free = self.free.len(), "released entity id");
        Ok(())
    }

    /// Returns `true` if `entity` has been issued and not released since.
    #[must_use]
    pub fn is_live(&self, entity: Entity) -> bool {
        self.check_live(entity).is_ok()
    }

    /// Explains why `entity` is not live.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotAllocated`] if the id was never issued,
    /// [`EcsError::AlreadyReleased`] if it sits in the free queue.
    pub fn check_live(&self, entity: Entity) -> Result<(), EcsError> {
        if !self.was_issued(entity) {
            return Err(EcsError::NotAllocated(entity));
        }
        if self.free_set.contains(&entity) {
            return Err(EcsError::AlreadyReleased(entity));
        }
        Ok(())
    }

    /// Number of ids currently held by live entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.issued_count() - self.free.len()
    }

    /// Number of released ids waiting for reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    fn was_issued(&self, entity: Entity) -> bool {
        self.exhausted || entity.0 < self.next_id
    }

    fn issued_count(&self) -> usize {
        if self.exhausted {
            u32::MAX as usize + 1
        } else {
            self.next_id as usize
        }
    }
}
