//! Inside-map boundary tracking for foreign scene content.
//!
//! Content that should be hidden while the viewer is inside this map is
//! registered once at load. The registry is only walked when the viewer
//! crosses the map boundary, never on ordinary frames.

use crate::entity::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryCrossing {
    Entered,
    Exited,
}

#[derive(Debug, Default)]
pub struct InsideMapRegistry {
    ids: Vec<EntityId>,
    inside: bool,
}

impl InsideMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content whose renderability depends on the viewer being
    /// outside this map.
    pub fn register(&mut self, id: EntityId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn registered(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Feed this frame's inside flag. On a crossing, `visit` is called once
    /// per registered id with its new renderability (hidden on enter, shown
    /// on exit).
    pub fn update(
        &mut self,
        inside: bool,
        mut visit: impl FnMut(EntityId, bool),
    ) -> Option<BoundaryCrossing> {
        if inside == self.inside {
            return None;
        }
        self.inside = inside;

        let crossing = if inside { BoundaryCrossing::Entered } else { BoundaryCrossing::Exited };
        log::debug!("Viewer {:?} map, toggling {} foreign entities", crossing, self.ids.len());
        for &id in &self.ids {
            visit(id, !inside);
        }
        Some(crossing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_once_per_crossing() {
        let mut reg = InsideMapRegistry::new();
        reg.register(EntityId(1));
        reg.register(EntityId(2));
        reg.register(EntityId(1));
        assert_eq!(reg.registered().len(), 2);

        let mut calls = Vec::new();
        assert_eq!(reg.update(false, |id, r| calls.push((id, r))), None);
        assert_eq!(reg.update(true, |id, r| calls.push((id, r))), Some(BoundaryCrossing::Entered));
        assert_eq!(reg.update(true, |id, r| calls.push((id, r))), None);
        assert_eq!(calls, vec![(EntityId(1), false), (EntityId(2), false)]);

        calls.clear();
        assert_eq!(reg.update(false, |id, r| calls.push((id, r))), Some(BoundaryCrossing::Exited));
        assert_eq!(calls, vec![(EntityId(1), true), (EntityId(2), true)]);
        assert!(!reg.is_inside());
    }
}
