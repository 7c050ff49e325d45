//! Entity to leaf membership, built once after all entities are known

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::level::LeafGraph;
use crate::math::Aabb;

/// Which leaves each dynamic entity overlaps. Read-only after `build`.
#[derive(Clone, Debug, Default)]
pub struct EntityLeafIndex {
    leaves: HashMap<EntityId, Vec<usize>>,
}

impl EntityLeafIndex {
    /// Record, for every entity, the leaves whose bounds overlap its bounds.
    /// Entities without bounds get no leaves.
    pub fn build(
        graph: &LeafGraph,
        entities: impl IntoIterator<Item = (EntityId, Option<Aabb>)>,
    ) -> Self {
        let leaves = entities
            .into_iter()
            .map(|(id, bounds)| {
                let leaves = bounds.map(|b| graph.overlapping(&b)).unwrap_or_default();
                if leaves.is_empty() {
                    log::debug!("Entity {:?} overlaps no leaf and will never be visible", id);
                }
                (id, leaves)
            })
            .collect();
        Self { leaves }
    }

    /// Leaves overlapped by `id`; empty for unknown entities
    pub fn leaves_of(&self, id: EntityId) -> &[usize] {
        self.leaves.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &[usize])> {
        self.leaves.iter().map(|(id, leaves)| (*id, leaves.as_slice()))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.leaves.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}
