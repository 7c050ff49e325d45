//! Level data: leaf graph, static surface batches and textures

pub mod leaf;
pub mod geometry;
pub mod texture;

pub use leaf::{Leaf, LeafBits, LeafGraph};
pub use geometry::{Batch, LevelGeometry, StaticAssembler, SurfaceMesh};
pub use texture::{
    TextureCache, TextureHandle, TextureLoadResult, TextureLoader, TextureRef, TextureResolver,
};
