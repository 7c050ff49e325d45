//! Geometry batcher: splits triangle soup into renderer-sized batches.
//!
//! Input streams are flat triangle lists (every three vertices form one
//! triangle). Output batches hold at most `capacity` vertices each and,
//! concatenated in order, reproduce the input stream.

use std::ops::Range;

use crate::core::{Error, Result};
use crate::core::types::{Vec2, Vec3};
use crate::math::{BoundsAccumulator, Transform};

use super::vertex::Vertex;

/// Largest vertex count addressable by 16-bit indices, and a multiple of 3
pub const DEFAULT_BATCH_CAPACITY: usize = 65535;

/// One renderer-submittable run of world-space vertices
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSegment {
    pub vertices: Vec<Vertex>,
}

impl BatchSegment {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Reverse triangle order (and therefore winding) in place.
///
/// Element `i` swaps with element `n - 1 - i` in both arrays, so a vertex
/// keeps its UV. An empty `uvs` slice is left alone.
pub fn reverse_winding(positions: &mut [Vec3], uvs: &mut [Vec2]) {
    positions.reverse();
    uvs.reverse();
}

/// Splits vertex streams into batches of at most `capacity` vertices.
#[derive(Clone, Copy, Debug)]
pub struct GeometryBatcher {
    capacity: usize,
}

impl GeometryBatcher {
    /// Create a batcher. `capacity` must be positive and a multiple of 3 so
    /// that no triangle straddles two batches.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("batch capacity must be positive".into()));
        }
        if capacity % 3 != 0 {
            return Err(Error::Config(format!(
                "batch capacity {capacity} is not a multiple of 3"
            )));
        }
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check that a stream is a whole number of triangles and that UVs, if
    /// present, pair one-to-one with positions.
    pub fn validate(positions: &[Vec3], uvs: &[Vec2]) -> Result<()> {
        if positions.len() % 3 != 0 {
            return Err(Error::MalformedMesh(format!(
                "vertex count {} is not a multiple of 3",
                positions.len()
            )));
        }
        if !uvs.is_empty() && uvs.len() != positions.len() {
            return Err(Error::MalformedMesh(format!(
                "{} uvs for {} positions",
                uvs.len(),
                positions.len()
            )));
        }
        Ok(())
    }

    /// Consecutive index ranges covering `0..len`, each at most `capacity` long.
    pub fn segment_ranges(&self, len: usize) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..len)
            .step_by(self.capacity)
            .map(move |start| start..(start + self.capacity).min(len))
    }

    /// Transform and segment a stream in its given order.
    ///
    /// Every world-space position is folded into `bounds`.
    pub fn batch(
        &self,
        positions: &[Vec3],
        uvs: &[Vec2],
        transform: &Transform,
        bounds: &mut BoundsAccumulator,
    ) -> Result<Vec<BatchSegment>> {
        Self::validate(positions, uvs)?;

        let batches = self
            .segment_ranges(positions.len())
            .map(|range| {
                let vertices = range
                    .map(|i| {
                        let uv = uvs.get(i).copied().unwrap_or(Vec2::ZERO);
                        let v = Vertex::from_position_uv(positions[i], uv).transformed(transform);
                        bounds.extend(v.position());
                        v
                    })
                    .collect();
                BatchSegment { vertices }
            })
            .collect();

        Ok(batches)
    }

    /// Batch a legacy model frame: validate, flip to the renderer's winding,
    /// then segment.
    pub fn batch_reversed(
        &self,
        mut positions: Vec<Vec3>,
        mut uvs: Vec<Vec2>,
        transform: &Transform,
        bounds: &mut BoundsAccumulator,
    ) -> Result<Vec<BatchSegment>> {
        Self::validate(&positions, &uvs)?;
        reverse_winding(&mut positions, &mut uvs);
        self.batch(&positions, &uvs, transform, bounds)
    }
}

impl Default for GeometryBatcher {
    fn default() -> Self {
        Self { capacity: DEFAULT_BATCH_CAPACITY }
    }
}
