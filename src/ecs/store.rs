//! Dense component storage
//!
//! Each component type lives in its own [`ComponentStore`]: two parallel
//! vectors (owning entity, component value) plus an index from entity to slot.
//! Removal swaps the last slot into the hole, so iteration order is insertion
//! order only until the first removal.

use std::any::Any;
use std::collections::HashMap;

use super::{Entity, StoreError};

/// Marker for types that can be stored per entity.
pub trait Component: 'static {}

/// Type-erased view of a store, used by the registry for bulk operations.
pub trait ComponentStorage {
    fn has(&self, entity: Entity) -> bool;
    fn remove_entity(&mut self, entity: Entity);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete storage for a specific component type.
///
/// References handed out by [`insert`](Self::insert), [`get`](Self::get) and
/// friends borrow the store, so they cannot outlive the next mutation. Slot
/// positions seen through [`entities`](Self::entities) are only stable until
/// the next insert or remove.
pub struct ComponentStore<T: Component> {
    entities: Vec<Entity>,
    components: Vec<T>,
    index: HashMap<Entity, usize>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            components: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Attach `component` to `entity`.
    ///
    /// Fails with [`StoreError::DuplicateEntity`] if the entity already has a
    /// value here; use [`replace`](Self::replace) to overwrite.
    pub fn insert(&mut self, entity: Entity, component: T) -> Result<&mut T, StoreError> {
        if self.index.contains_key(&entity) {
            return Err(StoreError::DuplicateEntity {
                entity,
                component: Self::component_name(),
            });
        }
        let slot = self.components.len();
        self.entities.push(entity);
        self.components.push(component);
        self.index.insert(entity, slot);
        Ok(&mut self.components[slot])
    }

    /// Insert or overwrite, returning the previous value if there was one.
    pub fn replace(&mut self, entity: Entity, component: T) -> Option<T> {
        match self.index.get(&entity) {
            Some(&slot) => Some(std::mem::replace(&mut self.components[slot], component)),
            None => {
                self.index.insert(entity, self.components.len());
                self.entities.push(entity);
                self.components.push(component);
                None
            }
        }
    }

    pub fn get(&self, entity: Entity) -> Result<&T, StoreError> {
        match self.index.get(&entity) {
            Some(&slot) => Ok(&self.components[slot]),
            None => Err(self.not_found(entity)),
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T, StoreError> {
        match self.index.get(&entity) {
            Some(&slot) => Ok(&mut self.components[slot]),
            None => Err(self.not_found(entity)),
        }
    }

    pub fn has(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Detach and return the entity's component. Absent entities are a no-op.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        let last = self.components.len() - 1;
        if slot != last {
            let moved = self.entities[last];
            self.index.insert(moved, slot);
        }
        self.entities.swap_remove(slot);
        Some(self.components.swap_remove(slot))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
        self.index.clear();
    }

    /// Owning entities in dense order, parallel to [`components`](Self::components).
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn components(&self) -> &[T] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    fn component_name() -> &'static str {
        std::any::type_name::<T>()
    }

    fn not_found(&self, entity: Entity) -> StoreError {
        StoreError::NotFound {
            entity,
            component: Self::component_name(),
        }
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for ComponentStore<T> {
    fn has(&self, entity: Entity) -> bool {
        ComponentStore::has(self, entity)
    }

    fn remove_entity(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn clear(&mut self) {
        ComponentStore::clear(self);
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn type_name(&self) -> &'static str {
        Self::component_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
