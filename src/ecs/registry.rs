//! Registry - owner of every component store
//!
//! Stores only come into existence through [`Registry::register`], which also
//! records the store in the handle list used by the bulk operations. There is
//! no way to own a store the registry cannot see.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use log::debug;
use serde::Serialize;

use super::{Component, ComponentStorage, ComponentStore, Entity, StoreError};

/// Count of live components in one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreCount {
    pub component: &'static str,
    pub count: usize,
}

/// Read-only summary of the registry, suitable for diagnostics output.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryReport {
    pub registered_stores: usize,
    pub total_components: usize,
    pub stores: Vec<StoreCount>,
}

#[derive(Default)]
pub struct Registry {
    stores: Vec<Box<dyn ComponentStorage>>,
    slots: HashMap<TypeId, usize>,
    persistent: HashSet<TypeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the store for `T`. Registering a type twice keeps the first store.
    pub fn register<T: Component>(&mut self) -> &mut Self {
        let type_id = TypeId::of::<T>();
        if !self.slots.contains_key(&type_id) {
            self.slots.insert(type_id, self.stores.len());
            self.stores.push(Box::new(ComponentStore::<T>::new()));
        }
        self
    }

    /// Register `T` and exempt it from [`clear_all_components`](Self::clear_all_components).
    pub fn register_persistent<T: Component>(&mut self) -> &mut Self {
        self.register::<T>();
        self.exempt_from_clear::<T>()
    }

    pub fn exempt_from_clear<T: Component>(&mut self) -> &mut Self {
        self.persistent.insert(TypeId::of::<T>());
        self
    }

    pub fn is_exempt<T: Component>(&self) -> bool {
        self.persistent.contains(&TypeId::of::<T>())
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    pub fn store<T: Component>(&self) -> Result<&ComponentStore<T>, StoreError> {
        let slot = self.slot_of::<T>()?;
        self.stores[slot]
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
            .ok_or_else(unregistered::<T>)
    }

    pub fn store_mut<T: Component>(&mut self) -> Result<&mut ComponentStore<T>, StoreError> {
        let slot = self.slot_of::<T>()?;
        self.stores[slot]
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .ok_or_else(unregistered::<T>)
    }

    /// Borrow one store for reading and a different one for writing.
    pub fn stores_mut<A: Component, B: Component>(
        &mut self,
    ) -> Result<(&ComponentStore<A>, &mut ComponentStore<B>), StoreError> {
        let read = self.slot_of::<A>()?;
        let write = self.slot_of::<B>()?;
        if read == write {
            return Err(StoreError::Aliased {
                component: std::any::type_name::<A>(),
            });
        }

        let (read_store, write_store) = if read < write {
            let (head, tail) = self.stores.split_at_mut(write);
            (&head[read], &mut tail[0])
        } else {
            let (head, tail) = self.stores.split_at_mut(read);
            (&tail[0], &mut head[write])
        };

        let read_store = read_store
            .as_any()
            .downcast_ref::<ComponentStore<A>>()
            .ok_or_else(unregistered::<A>)?;
        let write_store = write_store
            .as_any_mut()
            .downcast_mut::<ComponentStore<B>>()
            .ok_or_else(unregistered::<B>)?;
        Ok((read_store, write_store))
    }

    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<&mut T, StoreError> {
        self.store_mut::<T>()?.insert(entity, component)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, StoreError> {
        self.store::<T>()?.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, StoreError> {
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// False for unregistered types as well as for entities without the component.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.store::<T>().map(|store| store.has(entity)).unwrap_or(false)
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.store_mut::<T>().ok()?.remove(entity)
    }

    /// Empty every store except those on the persistence exemption list.
    pub fn clear_all_components(&mut self) {
        let exempt: HashSet<usize> = self
            .persistent
            .iter()
            .filter_map(|type_id| self.slots.get(type_id).copied())
            .collect();
        for (slot, store) in self.stores.iter_mut().enumerate() {
            if !exempt.contains(&slot) {
                store.clear();
            }
        }
        debug!(
            "cleared {} component stores ({} exempt)",
            self.stores.len() - exempt.len(),
            exempt.len()
        );
    }

    pub fn remove_all_components_of(&mut self, entity: Entity) {
        for store in &mut self.stores {
            store.remove_entity(entity);
        }
    }

    /// Non-empty stores with their sizes, in registration order.
    pub fn component_counts(&self) -> Vec<StoreCount> {
        self.stores
            .iter()
            .filter(|store| !store.is_empty())
            .map(|store| StoreCount {
                component: store.type_name(),
                count: store.len(),
            })
            .collect()
    }

    /// Names of every component type attached to `entity`.
    pub fn components_of(&self, entity: Entity) -> Vec<&'static str> {
        self.stores
            .iter()
            .filter(|store| store.has(entity))
            .map(|store| store.type_name())
            .collect()
    }

    pub fn log_component_counts(&self) {
        for count in self.component_counts() {
            debug!("{}: {}", count.component, count.count);
        }
    }

    pub fn log_components_of(&self, entity: Entity) {
        debug!("{entity}: [{}]", self.components_of(entity).join(", "));
    }

    pub fn report(&self) -> RegistryReport {
        let stores = self.component_counts();
        RegistryReport {
            registered_stores: self.stores.len(),
            total_components: stores.iter().map(|s| s.count).sum(),
            stores,
        }
    }

    fn slot_of<T: Component>(&self) -> Result<usize, StoreError> {
        self.slots
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or_else(unregistered::<T>)
    }
}

fn unregistered<T: Component>() -> StoreError {
    StoreError::Unregistered {
        component: std::any::type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityAllocator;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Debug, PartialEq)]
    struct Health(i32);
    impl Component for Health {}

    #[derive(Debug, PartialEq)]
    struct Level(&'static str);
    impl Component for Level {}

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register::<Position>()
            .register::<Health>()
            .register_persistent::<Level>();
        registry
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = registry();
        let entity = EntityAllocator::new().allocate();
        registry.insert(entity, Health(3)).unwrap();

        registry.register::<Health>();
        assert_eq!(registry.store_count(), 3);
        assert_eq!(registry.get::<Health>(entity).unwrap(), &Health(3));
    }

    #[test]
    fn test_unregistered_type_is_reported() {
        struct Unknown;
        impl Component for Unknown {}

        let mut registry = registry();
        let entity = EntityAllocator::new().allocate();
        assert!(matches!(
            registry.insert(entity, Unknown),
            Err(StoreError::Unregistered { .. })
        ));
        assert!(!registry.has::<Unknown>(entity));
        assert!(registry.remove::<Unknown>(entity).is_none());
    }

    #[test]
    fn test_clear_all_respects_exemptions() {
        let mut registry = registry();
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        registry.insert(a, Position { x: 1.0, y: 2.0 }).unwrap();
        registry.insert(b, Health(10)).unwrap();
        registry.insert(b, Level("garden")).unwrap();

        registry.clear_all_components();

        assert!(!registry.has::<Position>(a));
        assert!(!registry.has::<Health>(b));
        assert_eq!(registry.get::<Level>(b).unwrap(), &Level("garden"));
        assert!(registry.is_exempt::<Level>());
        assert!(!registry.is_exempt::<Health>());
    }

    #[test]
    fn test_remove_all_components_of_entity() {
        let mut registry = registry();
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        for entity in [a, b] {
            registry.insert(entity, Position { x: 0.0, y: 0.0 }).unwrap();
            registry.insert(entity, Health(1)).unwrap();
            registry.insert(entity, Level("hall")).unwrap();
        }

        registry.remove_all_components_of(a);
        registry.remove_all_components_of(a);

        assert!(!registry.has::<Position>(a));
        assert!(!registry.has::<Health>(a));
        assert!(!registry.has::<Level>(a));
        assert!(registry.has::<Position>(b));
        assert!(registry.has::<Health>(b));
        assert!(registry.has::<Level>(b));
    }

    #[test]
    fn test_split_borrow_of_two_stores() {
        let mut registry = registry();
        let entity = EntityAllocator::new().allocate();
        registry.insert(entity, Position { x: 4.0, y: 0.0 }).unwrap();
        registry.insert(entity, Health(0)).unwrap();

        let (positions, health) = registry.stores_mut::<Position, Health>().unwrap();
        health.get_mut(entity).unwrap().0 = positions.get(entity).unwrap().x as i32;
        assert_eq!(registry.get::<Health>(entity).unwrap(), &Health(4));

        let (health, positions) = registry.stores_mut::<Health, Position>().unwrap();
        positions.get_mut(entity).unwrap().y = health.get(entity).unwrap().0 as f32;
        assert_eq!(registry.get::<Position>(entity).unwrap().y, 4.0);

        assert!(matches!(
            registry.stores_mut::<Health, Health>(),
            Err(StoreError::Aliased { .. })
        ));
    }

    #[test]
    fn test_introspection_does_not_mutate() {
        let mut registry = registry();
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        registry.insert(a, Position { x: 0.0, y: 0.0 }).unwrap();
        registry.insert(b, Position { x: 1.0, y: 1.0 }).unwrap();
        registry.insert(a, Health(5)).unwrap();

        let counts = registry.component_counts();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].count, 1);

        let names = registry.components_of(a);
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("Position"));
        assert!(names[1].ends_with("Health"));

        registry.log_component_counts();
        registry.log_components_of(a);

        let report = registry.report();
        assert_eq!(report.registered_stores, 3);
        assert_eq!(report.total_components, 3);
        assert_eq!(registry.store::<Position>().unwrap().len(), 2);
    }
}
