//! GPU vertex layout shared by level and model batches

use bytemuck::{Pod, Zeroable};

use crate::core::types::{Vec2, Vec3, Vec4};
use crate::math::Transform;

/// Interleaved vertex (48 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// xyz tangent, w handedness
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tangent: Vec4, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tangent: tangent.to_array(),
            uv: uv.to_array(),
        }
    }

    /// Position-and-UV vertex as produced by animated model frames.
    /// Normal points up, tangent along +X.
    pub fn from_position_uv(position: Vec3, uv: Vec2) -> Self {
        Self::new(position, Vec3::Z, Vec4::new(1.0, 0.0, 0.0, 1.0), uv)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    /// Move into world space; directions are rotated only.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let tangent = Vec4::from_array(self.tangent);
        let t = transform.apply_direction(tangent.truncate());
        Self {
            position: transform.apply(self.position()).to_array(),
            normal: transform.apply_direction(Vec3::from_array(self.normal)).to_array(),
            tangent: [t.x, t.y, t.z, tangent.w],
            uv: self.uv,
        }
    }
}

/// View a vertex slice as raw bytes for upload.
pub fn vertex_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
        let verts = [Vertex::default(); 3];
        assert_eq!(vertex_bytes(&verts).len(), 144);
    }

    #[test]
    fn test_transformed_keeps_uv_and_handedness() {
        let v = Vertex::new(
            Vec3::X,
            Vec3::Z,
            Vec4::new(1.0, 0.0, 0.0, -1.0),
            Vec2::new(0.25, 0.75),
        );
        let t = Transform::from_position(Vec3::new(0.0, 0.0, 5.0));
        let w = v.transformed(&t);
        assert_eq!(w.position(), Vec3::new(1.0, 0.0, 5.0));
        assert_eq!(w.normal, [0.0, 0.0, 1.0]);
        assert_eq!(w.tangent[3], -1.0);
        assert_eq!(w.uv(), Vec2::new(0.25, 0.75));
    }
}
