//! Per-frame potentially-visible-set evaluation for one map.
//!
//! The evaluator keeps the set of leaves the viewer overlapped last time
//! (the frozen set). While the viewer stays inside the map and overlaps the
//! same leaves, the previous result is reused; otherwise the face bits and
//! entity flags are rebuilt from the leaves' precomputed visibility.

use std::collections::HashSet;

use crate::entity::EntityId;
use crate::level::LeafGraph;
use crate::math::Aabb;

use super::entity_index::EntityLeafIndex;

/// Coarse viewer position relative to the map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MapState {
    #[default]
    Outside,
    Inside,
}

/// What one `evaluate` call did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// No compiled visibility; everything is drawn and nothing is computed
    AlwaysVisible,
    /// Viewer does not overlap the map; nothing map-owned is visible
    Outside,
    /// Same leaves as last time; previous result reused
    Unchanged,
    /// Leaf set changed; face bits and entity flags rebuilt
    Recomputed,
}

#[derive(Debug)]
pub struct VisibilityEvaluator {
    /// One bit per face index
    pvs: Vec<bool>,
    visible_entities: HashSet<EntityId>,
    /// Leaves overlapped at the last recompute; `None` forces the next one
    frozen: Option<Vec<usize>>,
    state: MapState,
    always_visible: bool,
    map_bounds: Option<Aabb>,
}

impl VisibilityEvaluator {
    /// Set up for a map with `face_count` faces (highest face index + 1).
    ///
    /// A level without compiled visibility, or `novis`, marks every face
    /// visible here and never recomputes.
    pub fn new(
        graph: &LeafGraph,
        face_count: usize,
        map_bounds: Option<Aabb>,
        novis: bool,
    ) -> Self {
        let always_visible = novis || !graph.is_compiled();
        if always_visible {
            log::info!("No leaf visibility for this map, drawing all {} faces", face_count);
        }
        Self {
            pvs: vec![always_visible; face_count],
            visible_entities: HashSet::new(),
            frozen: None,
            state: MapState::Outside,
            always_visible,
            map_bounds,
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_always_visible(&self) -> bool {
        self.always_visible
    }

    pub fn map_bounds(&self) -> Option<Aabb> {
        self.map_bounds
    }

    /// Does the viewer overlap the map at all?
    pub fn viewer_inside(&self, viewer: &Aabb) -> bool {
        self.map_bounds.is_some_and(|b| b.intersects(viewer))
    }

    /// Run one frame of the state machine.
    pub fn evaluate(
        &mut self,
        viewer: &Aabb,
        graph: &LeafGraph,
        index: &EntityLeafIndex,
    ) -> Evaluation {
        if self.always_visible {
            return Evaluation::AlwaysVisible;
        }

        if !self.viewer_inside(viewer) {
            if self.state == MapState::Inside {
                log::debug!("Viewer left map, clearing visible set");
                self.clear();
                self.frozen = None;
                self.state = MapState::Outside;
            }
            return Evaluation::Outside;
        }
        self.state = MapState::Inside;

        let overlap = graph.overlapping(viewer);
        if self.frozen.as_ref() == Some(&overlap) {
            return Evaluation::Unchanged;
        }

        self.recompute(&overlap, graph, index);
        log::debug!(
            "Viewer leaves {:?}: {} faces, {} entities visible",
            overlap,
            self.visible_face_count(),
            self.visible_entities.len()
        );
        self.frozen = Some(overlap);
        Evaluation::Recomputed
    }

    fn clear(&mut self) {
        self.pvs.fill(false);
        self.visible_entities.clear();
    }

    fn recompute(&mut self, overlap: &[usize], graph: &LeafGraph, index: &EntityLeafIndex) {
        self.clear();

        for leaf in overlap.iter().filter_map(|&l| graph.leaf(l)) {
            for seen in leaf.visible_leaves.iter_ones().filter_map(|v| graph.leaf(v)) {
                for &face in &seen.faces {
                    // faces contributed by embedded models may lie past the end
                    if let Some(bit) = self.pvs.get_mut(face) {
                        *bit = true;
                    }
                }
            }

            for (id, leaves) in index.entities() {
                if leaf.visible_leaves.any_of(leaves) {
                    self.visible_entities.insert(id);
                }
            }
        }
    }

    /// Out-of-range faces are never visible unless the map has no visibility.
    pub fn is_face_visible(&self, face: usize) -> bool {
        self.always_visible || self.pvs.get(face).copied().unwrap_or(false)
    }

    pub fn is_entity_visible(&self, id: EntityId) -> bool {
        self.always_visible || self.visible_entities.contains(&id)
    }

    pub fn visible_faces(&self) -> &[bool] {
        &self.pvs
    }

    pub fn visible_face_count(&self) -> usize {
        self.pvs.iter().filter(|&&b| b).count()
    }

    /// Leaves overlapped at the last recompute
    pub fn frozen_leaves(&self) -> &[usize] {
        self.frozen.as_deref().unwrap_or(&[])
    }
}
