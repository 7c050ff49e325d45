//! Rigid entity transform (position + rotation)

use glam::EulerRot;

use crate::core::types::{Mat4, Quat, Vec3};

/// Placement of an entity in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Identity transform (no translation or rotation).
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Build from an entity origin and `(pitch, yaw, roll)` angles in degrees.
    ///
    /// The level is Z-up: yaw turns about Z, pitch about Y, roll about X.
    pub fn from_angles(origin: Vec3, angles: Vec3) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            angles.y.to_radians(),
            angles.x.to_radians(),
            angles.z.to_radians(),
        );
        Self::new(origin, rotation)
    }

    /// `rotate(local, rotation) + position`
    #[inline]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.position
    }

    /// Rotate a direction (normals, tangents) without translating it.
    #[inline]
    pub fn apply_direction(&self, dir: Vec3) -> Vec3 {
        self.rotation * dir
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_noop() {
        let t = Transform::identity();
        assert_eq!(t.apply(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_yaw_then_translate() {
        let t = Transform::from_angles(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0));
        let p = t.apply(Vec3::X);
        assert!((p - Vec3::new(10.0, 1.0, 0.0)).length() < 1e-5, "got {p:?}");
    }

    #[test]
    fn test_matches_matrix() {
        let t = Transform::from_angles(Vec3::new(1.0, 2.0, 3.0), Vec3::new(15.0, 30.0, 45.0));
        let v = Vec3::new(-4.0, 0.5, 2.0);
        let via_mat = t.to_mat4().transform_point3(v);
        assert!((t.apply(v) - via_mat).length() < 1e-4);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let t = Transform::from_position(Vec3::splat(100.0));
        assert_eq!(t.apply_direction(Vec3::Z), Vec3::Z);
    }
}
