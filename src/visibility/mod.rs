//! Leaf-based visibility: which batches and entities to draw this frame

pub mod entity_index;
pub mod evaluator;
pub mod boundary;

pub use entity_index::EntityLeafIndex;
pub use evaluator::{Evaluation, MapState, VisibilityEvaluator};
pub use boundary::{BoundaryCrossing, InsideMapRegistry};
