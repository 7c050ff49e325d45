//! Map loading configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::{GeometryBatcher, DEFAULT_BATCH_CAPACITY};
use crate::core::{Error, Result};
use crate::render::RenderSettings;

/// Configuration for loading and drawing one map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Maximum vertices per batch (positive multiple of 3)
    pub batch_capacity: usize,
    /// Uniform scale of the world bounds used to size the sky
    pub sky_scale: f32,
    /// Ignore compiled visibility and draw everything
    pub novis: bool,
    /// Blocking worker threads for background texture loads
    pub texture_threads: usize,
    /// Animated model playback rate
    pub animation_fps: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            sky_scale: 2.0,
            novis: false,
            texture_threads: 2,
            animation_fps: 10.0,
        }
    }
}

impl MapConfig {
    pub fn validate(&self) -> Result<()> {
        // capacity rules live with the batcher
        GeometryBatcher::new(self.batch_capacity)?;
        if self.sky_scale.is_nan() || self.sky_scale <= 0.0 {
            return Err(Error::Config(format!(
                "sky_scale must be positive, got {}",
                self.sky_scale
            )));
        }
        if self.texture_threads == 0 {
            return Err(Error::Config("texture_threads must be at least 1".into()));
        }
        if self.animation_fps.is_nan() || self.animation_fps < 0.0 {
            return Err(Error::Config(format!(
                "animation_fps must not be negative, got {}",
                self.animation_fps
            )));
        }
        Ok(())
    }

    pub fn batcher(&self) -> Result<GeometryBatcher> {
        GeometryBatcher::new(self.batch_capacity)
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            animation_fps: self.animation_fps,
            ..Default::default()
        }
    }

    /// Load from a JSON file and validate. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MapConfig::default().validate().is_ok());
        assert_eq!(MapConfig::default().batcher().unwrap().capacity(), DEFAULT_BATCH_CAPACITY);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            MapConfig { batch_capacity: 0, ..Default::default() },
            MapConfig { batch_capacity: 100, ..Default::default() },
            MapConfig { sky_scale: 0.0, ..Default::default() },
            MapConfig { sky_scale: f32::NAN, ..Default::default() },
            MapConfig { texture_threads: 0, ..Default::default() },
            MapConfig { animation_fps: -1.0, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{config:?}");
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps").join("config.json");
        let config = MapConfig { batch_capacity: 999, novis: true, ..Default::default() };
        config.save(&path).unwrap();
        assert_eq!(MapConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "sky_scale": 4.0 }"#).unwrap();
        let config = MapConfig::load(&path).unwrap();
        assert_eq!(config.sky_scale, 4.0);
        assert_eq!(config.batch_capacity, DEFAULT_BATCH_CAPACITY);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "batch_capacity": 4 }"#).unwrap();
        assert!(matches!(MapConfig::load(&path), Err(Error::Config(_))));
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(MapConfig::load(&path), Err(Error::Json(_))));
        assert!(matches!(MapConfig::load(&dir.path().join("missing.json")), Err(Error::Io(_))));
    }
}
