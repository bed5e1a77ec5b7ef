//! # engine_component
//!
//! The entity/component core of the engine: what a component is, how kinds
//! are described and looked up, and how instances are stored.
//!
//! This crate provides:
//!
//! - [`Entity`] / [`EntityAllocator`]: opaque `u64` ids that are never reused.
//! - [`Component`] / [`ComponentKind`]: lifecycle hooks and static kind description.
//! - [`PropertyDescriptor`]: reflected, JSON-valued property access.
//! - [`Registry`]: the catalog of known kinds.
//! - [`Storage`]: slot arena with per-entity ordered component lists and tombstones.
//! - [`HookContext`]: what a lifecycle hook can see and change.
//! - [`World`]: storage, id generator and registry bundled together.

pub mod component;
pub mod context;
pub mod entity;
pub mod error;
pub mod property;
pub mod registry;
pub mod storage;
pub mod world;

pub use component::{
    Component, ComponentHeader, ComponentInstance, ComponentKind, ComponentTypeId,
    ErasedComponent, Hook, HookResult,
};
pub use context::{Command, Commands, HookContext};
pub use entity::{Entity, EntityAllocator};
pub use error::ComponentError;
pub use property::{
    ENTITY_ID_PROPERTY, PathSegment, PropertyDescriptor, PropertyType, parse_key_path, write_path,
};
pub use registry::{Constructor, KindInfo, Registry};
pub use storage::Storage;
pub use world::{HookFailure, World};
