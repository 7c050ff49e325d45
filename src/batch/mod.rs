//! Vertex layout and geometry batching

pub mod vertex;
pub mod batcher;
pub mod skipped;

pub use vertex::{Vertex, vertex_bytes};
pub use batcher::{BatchSegment, GeometryBatcher, DEFAULT_BATCH_CAPACITY, reverse_winding};
pub use skipped::{MeshLocation, SkippedMesh};
