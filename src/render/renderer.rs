//! Host renderer interface

use crate::batch::Vertex;
use crate::entity::EntityId;
use crate::level::TextureRef;
use crate::model::RenderTint;

/// Where a submitted batch came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawSource {
    World { face: usize },
    MapModel(EntityId),
    Model(EntityId),
}

/// Borrowed view of one batch ready for drawing
#[derive(Clone, Copy, Debug)]
pub struct DrawBatch<'a> {
    pub source: DrawSource,
    pub vertices: &'a [Vertex],
    /// `None` for plain triangle lists
    pub indices: Option<&'a [u32]>,
    /// Read last; may have been patched since the previous frame
    pub texture: TextureRef,
    pub tint: RenderTint,
}

/// Accepts finished batches. Implemented by the host engine.
pub trait Renderer {
    fn draw(&mut self, batch: &DrawBatch<'_>);
}
