//! Mathematical utilities and data structures

pub mod aabb;
pub mod transform;

pub use aabb::{Aabb, BoundsAccumulator};
pub use transform::Transform;
