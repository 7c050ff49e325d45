//! Bspview - leaf-visibility culling and mesh batching for BSP maps

pub mod core;
pub mod math;
pub mod batch;
pub mod level;
pub mod entity;
pub mod model;
pub mod visibility;
pub mod render;
pub mod map;
