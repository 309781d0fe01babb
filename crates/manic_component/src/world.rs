//! World state: the allocator and the component registry in one context.
//!
//! The [`World`] is passed explicitly to whatever needs entity or component
//! access. Entity destruction goes through [`World::destroy`], which strips
//! the id from every store before the allocator may hand it out again.

use tracing::debug;

use crate::component::Component;
use crate::entity::{Entity, EntityAllocator};
use crate::error::EcsError;
use crate::registry::ComponentRegistry;
use crate::store::ComponentStore;

/// Entity allocation plus every registered component store.
#[derive(Debug, Default)]
pub struct World {
    /// Entity ID allocator.
    allocator: EntityAllocator,
    /// One store per component type.
    registry: ComponentRegistry,
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an entity with no components.
    ///
    /// # Errors
    ///
    /// [`EcsError::ExhaustedIds`] when no id is available.
    pub fn spawn(&mut self) -> Result<Entity, EcsError> {
        let entity = self.allocator.allocate()?;
        debug!(%entity, live = self.allocator.live_count(), "spawned entity");
        Ok(entity)
    }

    /// Removes `entity` from every store, then releases its id.
    ///
    /// Returns the number of stores that held the entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotAllocated`] or [`EcsError::AlreadyReleased`] if the id
    /// is not live. Stores are left untouched in that case.
    pub fn destroy(&mut self, entity: Entity) -> Result<usize, EcsError> {
        self.allocator.check_live(entity)?;
        let removed = self.registry.remove_entity(entity);
        self.allocator.release(entity)?;
        debug!(%entity, stores = removed, "destroyed entity");
        Ok(removed)
    }

    /// Returns `true` if `entity` is allocated and not destroyed.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_live(entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.allocator.live_count()
    }

    /// Returns a reference to the allocator.
    #[must_use]
    pub fn allocator(&self) -> &EntityAllocator {
        &self.allocator
    }

    /// Returns a reference to the component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns a mutable reference to the component registry.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Shorthand for `registry().get::<T>()`.
    ///
    /// # Errors
    ///
    /// See [`ComponentRegistry::get`].
    pub fn store<T: Component>(&self) -> Result<&ComponentStore<T>, EcsError> {
        self.registry.get::<T>()
    }

    /// Shorthand for `registry_mut().get_mut::<T>()`.
    ///
    /// # Errors
    ///
    /// See [`ComponentRegistry::get_mut`].
    pub fn store_mut<T: Component>(&mut self) -> Result<&mut ComponentStore<T>, EcsError> {
        self.registry.get_mut::<T>()
    }

    /// Destroys every live entity. Registrations survive.
    pub fn reset(&mut self) {
        self.registry.clear_entities();
        self.allocator = EntityAllocator::new();
        debug!("world reset");
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        entity: Entity,
    }

    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Hp {
        entity: Entity,
        value: u8,
    }

    impl Component for Hp {
        fn type_name() -> &'static str {
            "Hp"
        }
    }

    fn world_with_stores() -> World {
        let mut world = World::new();
        world.registry_mut().register_default::<Tag>().unwrap();
        world.registry_mut().register_default::<Hp>().unwrap();
        world
    }

    #[test]
    fn test_spawn_allocates_sequential_ids() {
        let mut world = World::new();
        assert_eq!(world.spawn().unwrap(), Entity(0));
        assert_eq!(world.spawn().unwrap(), Entity(1));
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_destroy_strips_every_store_before_reuse() {
        let mut world = world_with_stores();
        let e = world.spawn().unwrap();
        world.store_mut::<Tag>().unwrap().add(e, Tag { entity: e }).unwrap();
        world
            .store_mut::<Hp>()
            .unwrap()
            .add(e, Hp { entity: e, value: 3 })
            .unwrap();

        assert_eq!(world.destroy(e).unwrap(), 2);
        assert!(!world.is_alive(e));

        // The recycled id starts clean: no stale component data.
        let reused = world.spawn().unwrap();
        assert_eq!(reused, e);
        assert!(!world.store::<Tag>().unwrap().contains(reused));
        assert!(!world.store::<Hp>().unwrap().contains(reused));
    }

    #[test]
    fn test_destroy_dead_entity_fails_without_side_effects() {
        let mut world = world_with_stores();
        let e = world.spawn().unwrap();
        world.destroy(e).unwrap();
        assert_eq!(world.destroy(e), Err(EcsError::AlreadyReleased(e)));

        // Stores accept any id, but destroy only acts on live ones.
        let stray = Entity(50);
        world.store_mut::<Tag>().unwrap().add(stray, Tag { entity: stray }).unwrap();
        assert_eq!(world.destroy(stray), Err(EcsError::NotAllocated(stray)));
        assert!(world.store::<Tag>().unwrap().contains(stray));
        assert_eq!(world.allocator().free_count(), 1);
    }

    #[test]
    fn test_destroy_entity_with_no_components() {
        let mut world = world_with_stores();
        let e = world.spawn().unwrap();
        assert_eq!(world.destroy(e).unwrap(), 0);
    }

    #[test]
    fn test_reset_clears_entities_and_ids() {
        let mut world = world_with_stores();
        for _ in 0..3 {
            let e = world.spawn().unwrap();
            world.store_mut::<Tag>().unwrap().add(e, Tag { entity: e }).unwrap();
        }
        world.reset();
        assert_eq!(world.entity_count(), 0);
        assert!(world.store::<Tag>().unwrap().is_empty());
        assert_eq!(world.spawn().unwrap(), Entity(0));
    }
}
