//! Render-side context and the renderer seam

pub mod context;
pub mod renderer;

pub use context::{FrameContext, RenderSettings};
pub use renderer::{DrawBatch, DrawSource, Renderer};
