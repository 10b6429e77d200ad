//! Entity management

use serde::{Deserialize, Serialize};

/// Opaque entity identity. Carries no data; components are looked up by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity allocator
///
/// Identities are never recycled: a destroyed entity's value can only show up
/// again after an explicit [`EntityAllocator::reset`].
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    pub fn allocate(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity(id)
    }

    /// Number of identities handed out since creation or the last reset.
    pub fn issued(&self) -> u64 {
        self.next_id
    }

    pub fn reset(&mut self) {
        self.next_id = 0;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_allocation() {
        let mut allocator = EntityAllocator::new();

        let e1 = allocator.allocate();
        assert_eq!(e1.raw(), 0);

        let e2 = allocator.allocate();
        assert_eq!(e2.raw(), 1);

        assert_eq!(allocator.issued(), 2);
    }

    #[test]
    fn test_identities_are_not_reused() {
        let mut allocator = EntityAllocator::new();

        let ids: Vec<_> = (0..64).map(|_| allocator.allocate()).collect();
        let unique: std::collections::HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(!unique.contains(&allocator.allocate()));
    }

    #[test]
    fn test_reset_restarts_counter() {
        let mut allocator = EntityAllocator::new();
        allocator.allocate();
        allocator.allocate();

        allocator.reset();
        assert_eq!(allocator.issued(), 0);
        assert_eq!(allocator.allocate().raw(), 0);
    }
}
