//! Error types for hot-reload

use std::path::PathBuf;
use thiserror::Error;
use wave_map::MapError;
use wave_module::ModuleError;

/// Result type for hot-reload operations
pub type Result<T> = std::result::Result<T, ReloadError>;

/// Errors that can occur while watching or reloading a module
#[derive(Debug, Error)]
pub enum ReloadError {
    /// Loading the module or constructing its map failed
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// Modification time of the watched path is unavailable
    #[error("Cannot read modification time of '{}': {source}", .path.display())]
    StatError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reload requested before any module was loaded
    #[error("No game logic module has been loaded")]
    NoModulePath,

    /// The new map was installed but failed to initialize
    #[error("New map failed to initialize: {0}")]
    Initialize(#[from] MapError),
}

impl ReloadError {
    /// Create a stat error
    pub fn stat_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReloadError::StatError {
            path: path.into(),
            source,
        }
    }

    /// Whether the previously running module and map are still in place
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReloadError::Initialize(_))
    }
}
