//! # Error Types
//!
//! Errors produced by the massing core. Asset and geometry failures are
//! reported through [`MassingError`]; the session logs them and keeps running.

use thiserror::Error;

/// Result type for massing operations
pub type Result<T> = std::result::Result<T, MassingError>;

/// Errors that can occur while building, classifying, loading or exporting models
#[derive(Error, Debug)]
pub enum MassingError {
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("invalid footprint: {0}")]
    InvalidFootprint(String),

    #[error("triangulation failed: {0}")]
    Triangulation(String),

    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("malformed glTF: {0}")]
    Gltf(String),

    #[error("no active model")]
    NoActiveModel,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
