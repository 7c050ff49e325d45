//! Closest-light tint for animated models

use crate::core::types::Vec3;
use crate::entity::{EntityKeyValues, RenderMode};

/// Candidate light source
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub position: Vec3,
    /// Linear RGB 0..1
    pub color: Vec3,
}

/// Pick the light nearest to `origin`.
///
/// Scans left to right and only replaces the best on a strictly smaller
/// distance, so the first of several equidistant lights wins.
pub fn closest_light(origin: Vec3, lights: &[LightSource]) -> Option<&LightSource> {
    let mut best: Option<(&LightSource, f32)> = None;
    for light in lights {
        let d = light.position.distance_squared(origin);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((light, d)),
        }
    }
    best.map(|(light, _)| light)
}

/// Uniform color and opacity applied to every batch of a model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTint {
    pub color: Vec3,
    pub alpha: f32,
}

impl Default for RenderTint {
    fn default() -> Self {
        Self::WHITE
    }
}

impl RenderTint {
    /// Neutral white, fully opaque
    pub const WHITE: RenderTint = RenderTint { color: Vec3::ONE, alpha: 1.0 };

    /// Combine the nearest light with the entity's render settings.
    pub fn resolve(keyvalues: &EntityKeyValues, light: Option<&LightSource>) -> Self {
        let mut tint = match light {
            Some(l) => RenderTint { color: l.color, alpha: 1.0 },
            None => RenderTint::WHITE,
        };
        if keyvalues.render_mode == RenderMode::Color {
            tint.color = keyvalues.render_color_vec();
        }
        if keyvalues.render_mode.uses_render_amount() {
            tint.alpha = keyvalues.render_amount as f32 / 255.0;
        }
        tint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_at(x: f32, r: f32) -> LightSource {
        LightSource { position: Vec3::new(x, 0.0, 0.0), color: Vec3::new(r, 0.0, 0.0) }
    }

    #[test]
    fn test_picks_nearest() {
        let lights = [light_at(10.0, 0.1), light_at(3.0, 0.2), light_at(7.0, 0.3)];
        let best = closest_light(Vec3::ZERO, &lights).unwrap();
        assert_eq!(*best, lights[1]);
    }

    #[test]
    fn test_first_wins_on_tie() {
        let lights = [light_at(5.0, 0.1), light_at(-5.0, 0.2)];
        assert_eq!(*closest_light(Vec3::ZERO, &lights).unwrap(), lights[0]);
    }

    #[test]
    fn test_no_lights_is_white() {
        assert!(closest_light(Vec3::ZERO, &[]).is_none());
        let tint = RenderTint::resolve(&EntityKeyValues::default(), None);
        assert_eq!(tint, RenderTint::WHITE);
    }

    #[test]
    fn test_render_modes_shape_tint() {
        let light = light_at(1.0, 0.5);
        let mut kv = EntityKeyValues {
            render_mode: RenderMode::Texture,
            render_amount: 51,
            ..Default::default()
        };
        let tint = RenderTint::resolve(&kv, Some(&light));
        assert_eq!(tint.color, light.color);
        assert!((tint.alpha - 0.2).abs() < 1e-6);

        kv.render_mode = RenderMode::Color;
        kv.render_color = [0, 255, 0];
        let tint = RenderTint::resolve(&kv, Some(&light));
        assert_eq!(tint.color, Vec3::new(0.0, 1.0, 0.0));

        kv.render_mode = RenderMode::Solid;
        assert_eq!(RenderTint::resolve(&kv, None).alpha, 1.0);
    }
}
