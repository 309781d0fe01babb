//! # manic_component
//!
//! The storage core of the shooter's entity-component system.
//!
//! This crate provides:
//!
//! - [`Entity`] / [`EntityAllocator`]: `u32` ids recycled through a FIFO free queue.
//! - [`AvlTree`]: the balanced index behind every store.
//! - [`ComponentStore`]: one component type's values, keyed by entity.
//! - [`Component`] trait: the contract every value struct satisfies.
//! - [`ComponentRegistry`]: exactly one store per component type.
//! - [`World`]: allocator and registry as one explicit context.
//! - [`QueryDescriptor`]: declarative data access requirements for systems.

pub mod avl;
pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod registry;
pub mod store;
pub mod world;

pub use avl::AvlTree;
pub use component::{Component, ComponentMeta, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use error::EcsError;
pub use query::QueryDescriptor;
pub use registry::{ComponentRegistry, ErasedStore};
pub use store::ComponentStore;
pub use world::World;
