//! Error types for external processes and export

use std::path::PathBuf;
use thiserror::Error;

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Errors that can occur while running commands or exporting
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Command could not be started
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file required for export is missing
    #[error("{} not found!", .0.display())]
    MissingArtifact(PathBuf),

    /// Export was cancelled
    #[error("Export cancelled")]
    Cancelled,
}
