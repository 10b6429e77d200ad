//! Entity Component System (ECS) implementation
//!
//! Dense per-type stores owned by a registry, with a world context tying in
//! entity allocation and deferred despawns.

pub mod entity;
pub mod error;
pub mod registry;
pub mod store;
pub mod world;

pub use entity::{Entity, EntityAllocator};
pub use error::StoreError;
pub use registry::{Registry, RegistryReport, StoreCount};
pub use store::{Component, ComponentStorage, ComponentStore};
pub use world::World;
