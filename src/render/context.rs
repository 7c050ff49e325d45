//! Per-frame render context passed down the draw path

use crate::core::types::Vec3;
use crate::math::Aabb;

/// Draw toggles, fixed for the lifetime of a map instance unless the host
/// changes them between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub draw_world: bool,
    pub draw_models: bool,
    /// Playback rate for animated models
    pub animation_fps: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_world: true,
            draw_models: true,
            animation_fps: 10.0,
        }
    }
}

/// Everything one frame needs to know about the viewer
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub frame: u64,
    /// Seconds since the map was loaded
    pub time: f32,
    pub viewer: Aabb,
    pub settings: &'a RenderSettings,
}

impl<'a> FrameContext<'a> {
    pub fn new(frame: u64, time: f32, viewer: Aabb, settings: &'a RenderSettings) -> Self {
        Self { frame, time, viewer, settings }
    }

    /// Context for a viewer represented by a box of `half_extent` around `eye`
    pub fn at_eye(
        frame: u64,
        time: f32,
        eye: Vec3,
        half_extent: Vec3,
        settings: &'a RenderSettings,
    ) -> Self {
        Self::new(frame, time, Aabb::from_center_half_extent(eye, half_extent), settings)
    }
}
