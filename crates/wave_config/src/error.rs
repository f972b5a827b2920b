//! Error types for configuration files

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reading or writing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be rendered as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
