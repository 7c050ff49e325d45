//! Entity keyvalue record as supplied by the entity parser

use crate::core::types::Vec3;
use crate::math::Transform;

/// How an entity is blended into the scene
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Normal,
    Color,
    Texture,
    Glow,
    Solid,
    Additive,
}

impl RenderMode {
    /// Decode the `rendermode` integer; unknown codes fall back to `Normal`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => RenderMode::Color,
            2 => RenderMode::Texture,
            3 => RenderMode::Glow,
            4 => RenderMode::Solid,
            5 => RenderMode::Additive,
            _ => RenderMode::Normal,
        }
    }

    /// Whether `render_amount` drives opacity
    pub fn uses_render_amount(&self) -> bool {
        matches!(
            self,
            RenderMode::Color | RenderMode::Texture | RenderMode::Glow | RenderMode::Additive
        )
    }
}

/// Typed subset of an entity's keyvalues
#[derive(Clone, Debug, PartialEq)]
pub struct EntityKeyValues {
    pub origin: Vec3,
    /// `(pitch, yaw, roll)` in degrees
    pub angles: Vec3,
    pub render_mode: RenderMode,
    /// 0..=255
    pub render_amount: u8,
    /// RGB 0..=255
    pub render_color: [u8; 3],
    /// Requested body part, if any
    pub body: Option<usize>,
    /// Requested submodel of the active body part, if any
    pub submodel: Option<usize>,
}

impl Default for EntityKeyValues {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            angles: Vec3::ZERO,
            render_mode: RenderMode::Normal,
            render_amount: 255,
            render_color: [255, 255, 255],
            body: None,
            submodel: None,
        }
    }
}

impl EntityKeyValues {
    pub fn transform(&self) -> Transform {
        Transform::from_angles(self.origin, self.angles)
    }

    pub fn render_color_vec(&self) -> Vec3 {
        Vec3::new(
            self.render_color[0] as f32,
            self.render_color[1] as f32,
            self.render_color[2] as f32,
        ) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_codes() {
        assert_eq!(RenderMode::from_code(0), RenderMode::Normal);
        assert_eq!(RenderMode::from_code(5), RenderMode::Additive);
        assert_eq!(RenderMode::from_code(42), RenderMode::Normal);
        assert!(!RenderMode::Solid.uses_render_amount());
        assert!(RenderMode::Texture.uses_render_amount());
    }

    #[test]
    fn test_defaults() {
        let kv = EntityKeyValues::default();
        assert_eq!(kv.render_color_vec(), Vec3::ONE);
        assert_eq!(kv.transform(), Transform::identity());
    }
}
