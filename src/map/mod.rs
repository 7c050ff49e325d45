//! Loaded map orchestration

pub mod config;
pub mod instance;

pub use config::MapConfig;
pub use instance::{FrameStats, MapAssets, MapInstance, MapModel, MapModelSource, ModelInstance};
