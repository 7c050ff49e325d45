//! Animated models: assembly, submodel selection and lighting tint

pub mod animated;
pub mod submodel;
pub mod light;

pub use animated::{
    AnimatedModel, Animation, BodyPart, BodyPartSource, FrameSource, ModelAssembler, ModelSource,
    Submodel, SubmodelSource,
};
pub use submodel::SubmodelTable;
pub use light::{closest_light, LightSource, RenderTint};
