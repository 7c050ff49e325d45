//! Entity identifiers

/// Identifier assigned when an entity is created and carried by every
/// system that refers to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Monotonic id allocator, one per loaded map
#[derive(Debug, Default)]
pub struct EntityIds {
    next: u32,
}

impl EntityIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id.
    pub fn alloc(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids = EntityIds::new();
        let a = ids.alloc();
        let b = ids.alloc();
        assert_ne!(a, b);
        assert_eq!(ids.allocated(), 2);
    }
}
