//! Error types for the simulation core.
//!
//! Nothing inside a running frame is fatal. These errors only surface at the
//! edges: loading assets and building a configuration.

use std::path::PathBuf;

/// Failure to produce a texture from the asset loader.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Errors returned to the embedding application.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error(transparent)]
    Asset(#[from] AssetError),
}
