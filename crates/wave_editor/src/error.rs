//! Error types for the editor

use thiserror::Error;

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors surfaced by editor operations
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Reload(#[from] wave_hot_reload::ReloadError),

    #[error(transparent)]
    Config(#[from] wave_config::ConfigError),

    #[error(transparent)]
    Process(#[from] wave_process::ProcessError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A background job of this kind is still running
    #[error("{0} already in progress")]
    Busy(&'static str),
}
