//! Component registry: one store per component type.
//!
//! Stores are kept type-erased behind [`ErasedStore`] and keyed by
//! [`ComponentTypeId`]. Typed access goes through a checked downcast, so a
//! lookup either yields the right `ComponentStore<T>` or an error naming the
//! component; it never silently produces an empty store.

use std::any::Any;
use std::collections::HashMap;

use tracing::debug;

use crate::component::{Component, ComponentMeta, ComponentTypeId};
use crate::entity::Entity;
use crate::error::EcsError;
use crate::store::ComponentStore;

/// Operations every store supports without knowing its value type.
pub trait ErasedStore {
    /// Name and id of the stored component type.
    fn meta(&self) -> ComponentMeta;

    /// Removes `entity` if present. Returns `true` if it was.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Returns `true` if `entity` is present.
    fn contains_entity(&self, entity: Entity) -> bool;

    /// Number of entries.
    fn count(&self) -> usize;

    /// Drops every entry.
    fn clear(&mut self);

    /// Upcast for downcasting to the concrete store.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete store.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn meta(&self) -> ComponentMeta {
        T::meta()
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn count(&self) -> usize {
        ComponentStore::count(self)
    }

    fn clear(&mut self) {
        ComponentStore::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Maps each component type to its single store.
#[derive(Default)]
pub struct ComponentRegistry {
    stores: HashMap<ComponentTypeId, Box<dyn ErasedStore>>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `store` as the store for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateRegistration`] if `T` already has a store.
    pub fn register<T: Component>(&mut self, store: ComponentStore<T>) -> Result<(), EcsError> {
        let type_id = T::component_type_id();
        if self.stores.contains_key(&type_id) {
            return Err(EcsError::DuplicateRegistration(T::type_name()));
        }
        debug!(component = T::type_name(), %type_id, entries = store.count(), "registered component store");
        self.stores.insert(type_id, Box::new(store));
        Ok(())
    }

    /// Registers an empty store for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateRegistration`] if `T` already has a store.
    pub fn register_default<T: Component>(&mut self) -> Result<(), EcsError> {
        self.register(ComponentStore::<T>::new())
    }

    /// Returns the store for `T`, creating an empty one first if needed.
    ///
    /// # Errors
    ///
    /// [`EcsError::TypeMismatch`] if another Rust type already registered
    /// under `T`'s name.
    pub fn ensure<T: Component>(&mut self) -> Result<&mut ComponentStore<T>, EcsError> {
        let store = self
            .stores
            .entry(T::component_type_id())
            .or_insert_with(|| {
                debug!(component = T::type_name(), "created component store on demand");
                Box::new(ComponentStore::<T>::new())
            });
        store
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .ok_or(EcsError::TypeMismatch(T::type_name()))
    }

    /// Returns `true` if `T` has a store.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.contains_id(T::component_type_id())
    }

    /// Returns `true` if a store is registered under `type_id`.
    #[must_use]
    pub fn contains_id(&self, type_id: ComponentTypeId) -> bool {
        self.stores.contains_key(&type_id)
    }

    /// Borrows the store for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotRegistered`] if `T` has no store,
    /// [`EcsError::TypeMismatch`] if the registered store holds another type.
    pub fn get<T: Component>(&self) -> Result<&ComponentStore<T>, EcsError> {
        self.stores
            .get(&T::component_type_id())
            .ok_or_else(|| EcsError::NotRegistered(T::type_name().to_owned()))?
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
            .ok_or(EcsError::TypeMismatch(T::type_name()))
    }

    /// Mutably borrows the store for `T`.
    ///
    /// # Errors
    ///
    /// Same as [`ComponentRegistry::get`].
    pub fn get_mut<T: Component>(&mut self) -> Result<&mut ComponentStore<T>, EcsError> {
        self.stores
            .get_mut(&T::component_type_id())
            .ok_or_else(|| EcsError::NotRegistered(T::type_name().to_owned()))?
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .ok_or(EcsError::TypeMismatch(T::type_name()))
    }

    /// Removes `entity` from every store. Returns how many stores held it.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        self.stores
            .values_mut()
            .map(|store| store.remove_entity(entity))
            .filter(|removed| *removed)
            .count()
    }

    /// Names of the components `entity` currently participates in, sorted.
    #[must_use]
    pub fn components_of(&self, entity: Entity) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .stores
            .values()
            .filter(|store| store.contains_entity(entity))
            .map(|store| store.meta().name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Empties every store. Registrations are kept.
    pub fn clear_entities(&mut self) {
        for store in self.stores.values_mut() {
            store.clear();
        }
    }

    /// Names of all registered components, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.stores.values().map(|s| s.meta().name).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for store in self.stores.values() {
            map.entry(&store.meta().name, &store.count());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Position {
        entity: Entity,
        x: i32,
        y: i32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Speed {
        entity: Entity,
        value: i32,
    }

    impl Component for Speed {
        fn type_name() -> &'static str {
            "Speed"
        }
    }

    /// Different Rust type claiming the `Position` name.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Impostor;

    impl Component for Impostor {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[test]
    fn test_get_before_register_fails() {
        let registry = ComponentRegistry::new();
        assert_eq!(
            registry.get::<Position>().unwrap_err(),
            EcsError::NotRegistered("Position".to_owned())
        );
        assert!(!registry.contains::<Position>());
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Position>().unwrap();
        assert_eq!(
            registry.register_default::<Position>(),
            Err(EcsError::DuplicateRegistration("Position"))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registered_store_keeps_initial_entries() {
        let mut store = ComponentStore::new();
        store
            .add(Entity(4), Position { entity: Entity(4), x: 1, y: 2 })
            .unwrap();

        let mut registry = ComponentRegistry::new();
        registry.register(store).unwrap();
        let fetched = registry.get::<Position>().unwrap();
        assert_eq!(fetched.get(Entity(4)).unwrap().x, 1);
    }

    #[test]
    fn test_get_mut_writes_are_visible() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Speed>().unwrap();
        registry
            .get_mut::<Speed>()
            .unwrap()
            .add(Entity(0), Speed { entity: Entity(0), value: 3 })
            .unwrap();
        assert_eq!(registry.get::<Speed>().unwrap().get(Entity(0)).unwrap().value, 3);
    }

    #[test]
    fn test_ensure_creates_once() {
        let mut registry = ComponentRegistry::new();
        registry
            .ensure::<Speed>()
            .unwrap()
            .add(Entity(1), Speed { entity: Entity(1), value: 9 })
            .unwrap();
        // Second call returns the same store, not a fresh one.
        assert_eq!(registry.ensure::<Speed>().unwrap().count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_collision_is_type_mismatch() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Position>().unwrap();
        assert!(matches!(
            registry.get::<Impostor>(),
            Err(EcsError::TypeMismatch("Position"))
        ));
        assert!(matches!(
            registry.ensure::<Impostor>(),
            Err(EcsError::TypeMismatch("Position"))
        ));
    }

    #[test]
    fn test_remove_entity_sweeps_all_stores() {
        let mut registry = ComponentRegistry::new();
        registry.register_default::<Position>().unwrap();
        registry.register_default::<Speed>().unwrap();

        let e = Entity(2);
        registry
            .get_mut::<Position>()
            .unwrap()
            .add(e, Position { entity: e, x: 0, y: 0 })
            .unwrap();
        registry
            .get_mut::<Speed>()
            .unwrap()
            .add(e, Speed { entity: e, value: 1 })
            .unwrap();
        assert_eq!(registry.components_of(e), vec!["Position", "Speed"]);

        assert_eq!(registry.remove_entity(e), 2);
        assert!(registry.components_of(e).is_empty());
        assert_eq!(registry.remove_entity(e), 0);
    }

    #[test]
    fn test_clear_entities_keeps_registrations() {
        let mut registry = ComponentRegistry::new();
        registry
            .ensure::<Speed>()
            .unwrap()
            .add(Entity(0), Speed { entity: Entity(0), value: 1 })
            .unwrap();
        registry.clear_entities();
        assert!(registry.contains::<Speed>());
        assert!(registry.get::<Speed>().unwrap().is_empty());
        assert_eq!(registry.type_names(), vec!["Speed"]);
    }
}
