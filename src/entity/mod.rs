//! Entity identity and keyvalues

pub mod id;
pub mod keyvalues;

pub use id::{EntityId, EntityIds};
pub use keyvalues::{EntityKeyValues, RenderMode};
