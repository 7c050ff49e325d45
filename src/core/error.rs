//! Error types for bspview

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Triangle soup or index list that cannot be turned into a batch
    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
