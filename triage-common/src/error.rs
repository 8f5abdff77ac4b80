//! Common error types for ticket triage

use thiserror::Error;

/// Common result type for triage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the triage crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error (model artifacts)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model artifact is structurally invalid or inference failed
    #[error("Model error: {0}")]
    Model(String),
}
