//! Typed per-component storage.
//!
//! A [`ComponentStore`] holds one value struct per participating entity in
//! an [`AvlTree`] keyed by [`Entity`]. Reads return copies; a modified copy
//! only takes effect once it is written back with [`ComponentStore::set`].

use tracing::trace;

use crate::avl::AvlTree;
use crate::component::Component;
use crate::entity::Entity;
use crate::error::EcsError;

/// All values of component type `T`, keyed by entity.
#[derive(Debug, Clone)]
pub struct ComponentStore<T> {
    elements: AvlTree<Entity, T>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self {
            elements: AvlTree::default(),
        }
    }
}

impl<T: Component> ComponentStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `entity` to this component with an initial value.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateEntity`] if `entity` is already present. The
    /// stored value is left unchanged.
    pub fn add(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        if !self.elements.insert(entity, value) {
            return Err(EcsError::DuplicateEntity {
                entity,
                component: T::type_name(),
            });
        }
        trace!(%entity, component = T::type_name(), "component added");
        Ok(())
    }

    /// Unsubscribes `entity`, returning its last value. Absent ids are a no-op.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let removed = self.elements.remove(&entity);
        if removed.is_some() {
            trace!(%entity, component = T::type_name(), "component removed");
        }
        removed
    }

    /// Returns `true` if `entity` has this component.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.elements.contains(&entity)
    }

    /// Number of subscribed entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no entity has this component.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns a copy of `entity`'s value.
    ///
    /// # Errors
    ///
    /// [`EcsError::KeyNotFound`] if `entity` is absent.
    pub fn get(&self, entity: Entity) -> Result<T, EcsError> {
        self.get_ref(entity).cloned()
    }

    /// Borrows `entity`'s value without copying it.
    ///
    /// # Errors
    ///
    /// [`EcsError::KeyNotFound`] if `entity` is absent.
    pub fn get_ref(&self, entity: Entity) -> Result<&T, EcsError> {
        self.elements
            .find(&entity)
            .ok_or_else(|| Self::not_found(entity))
    }

    /// Overwrites `entity`'s value. This never inserts.
    ///
    /// # Errors
    ///
    /// [`EcsError::KeyNotFound`] if `entity` is absent; use
    /// [`ComponentStore::add`] to subscribe new entities.
    pub fn set(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        let slot = self
            .elements
            .find_mut(&entity)
            .ok_or_else(|| Self::not_found(entity))?;
        *slot = value;
        Ok(())
    }

    /// Snapshot of every stored value. Order is unspecified.
    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.elements
            .preorder()
            .into_iter()
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Snapshot of every subscribed entity. Order is unspecified.
    ///
    /// Systems iterate this snapshot, so adding or removing entries while
    /// walking it is safe.
    #[must_use]
    pub fn keys(&self) -> Vec<Entity> {
        self.elements
            .preorder()
            .into_iter()
            .map(|(entity, _)| *entity)
            .collect()
    }

    /// Iterates `(entity, value)` pairs in ascending entity order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.elements.iter().map(|(entity, value)| (*entity, value))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    fn not_found(entity: Entity) -> EcsError {
        EcsError::KeyNotFound {
            entity,
            component: T::type_name(),
        }
    }
}
