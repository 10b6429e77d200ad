//! World - explicit context object handed to every system

use std::collections::HashSet;

use log::debug;

use super::entity::EntityAllocator;
use super::{Entity, Registry};

/// Holds the entity allocator, the component registry and the despawn queue.
///
/// Systems never remove components for an entity while iterating a store;
/// they call [`World::despawn`] and the engine applies the queue once the
/// step is over.
pub struct World {
    entities: EntityAllocator,
    registry: Registry,
    despawn_queue: Vec<Entity>,
    queued: HashSet<Entity>,
}

impl World {
    pub fn new(registry: Registry) -> Self {
        Self {
            entities: EntityAllocator::new(),
            registry,
            despawn_queue: Vec::new(),
            queued: HashSet::new(),
        }
    }

    pub fn spawn(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Queue an entity for removal at the end of the current step.
    pub fn despawn(&mut self, entity: Entity) {
        if self.queued.insert(entity) {
            self.despawn_queue.push(entity);
        }
    }

    pub fn despawn_immediate(&mut self, entity: Entity) {
        self.registry.remove_all_components_of(entity);
    }

    pub fn pending_despawns(&self) -> &[Entity] {
        &self.despawn_queue
    }

    /// Apply queued despawns, returning how many were processed.
    pub fn flush_despawns(&mut self) -> usize {
        let queue = std::mem::take(&mut self.despawn_queue);
        self.queued.clear();
        for entity in &queue {
            self.registry.remove_all_components_of(*entity);
        }
        if !queue.is_empty() {
            debug!("despawned {} entities", queue.len());
        }
        queue.len()
    }

    /// Drop all non-persistent components, keeping exempt stores such as the
    /// current scene marker.
    pub fn restart(&mut self) {
        self.despawn_queue.clear();
        self.queued.clear();
        self.registry.clear_all_components();
    }

    pub fn entities_issued(&self) -> u64 {
        self.entities.issued()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}
