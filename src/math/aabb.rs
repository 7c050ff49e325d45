//! Axis-aligned bounding box

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate AABB enclosing a single point
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Smallest AABB enclosing every point, or `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut aabb = Aabb::from_point(iter.next()?);
        for p in iter {
            aabb.expand(p);
        }
        Some(aabb)
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn half_extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// The eight corners, bit 0 = x, bit 1 = y, bit 2 = z selecting max
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if two AABBs intersect (touching faces count)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Expand AABB to include point
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Scale every corner uniformly about the origin, then move the result
    /// back so it shares this box's center.
    pub fn scaled_about_center(&self, factor: f32) -> Aabb {
        let scaled = Aabb::from_points(self.corners().map(|c| c * factor))
            .unwrap_or(*self);
        let offset = self.center() - scaled.center();
        Aabb::new(scaled.min + offset, scaled.max + offset)
    }
}

/// Running min/max over a stream of points.
///
/// The first point seeds both corners; later points extend them
/// component-wise.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundsAccumulator {
    bounds: Option<Aabb>,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, point: Vec3) {
        match &mut self.bounds {
            Some(aabb) => aabb.expand(point),
            None => self.bounds = Some(Aabb::from_point(point)),
        }
    }

    /// Fold another accumulator's bounds into this one
    pub fn merge(&mut self, other: &BoundsAccumulator) {
        if let Some(b) = other.bounds {
            self.bounds = Some(match self.bounds {
                Some(a) => a.merged(&b),
                None => b,
            });
        }
    }

    /// Final bounds, `None` if no point was ever seen
    pub fn finish(&self) -> Option<Aabb> {
        self.bounds
    }
}
