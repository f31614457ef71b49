//! Startup-level error type.
//!
//! Only failures that happen before the server accepts connections live
//! here. Anything that can go wrong during a render pass is recovered where
//! it happens (see [`crate::embed::EmbedError`]).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("profile JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bind error: {0}")]
    Bind(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
