//! Records of meshes dropped during assembly

use std::fmt;

use crate::core::Error;

/// Where in the source asset a mesh came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshLocation {
    /// Level or map-model surface
    Surface { index: usize, face: usize },
    /// One frame of an animated model
    Frame {
        body_part: usize,
        submodel: usize,
        animation: usize,
        frame: usize,
    },
}

impl fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLocation::Surface { index, face } => write!(f, "surface {index} (face {face})"),
            MeshLocation::Frame { body_part, submodel, animation, frame } => write!(
                f,
                "body part {body_part} submodel {submodel} animation {animation} frame {frame}"
            ),
        }
    }
}

/// A mesh that failed validation and was left out; assembly carried on.
#[derive(Debug)]
pub struct SkippedMesh {
    pub location: MeshLocation,
    pub error: Error,
}

impl SkippedMesh {
    pub(crate) fn new(location: MeshLocation, error: Error) -> Self {
        log::warn!("Skipping {}: {}", location, error);
        Self { location, error }
    }
}
