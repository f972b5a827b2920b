//! Error types for dynamic module handling

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for module operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Errors that can occur while loading a module or creating its map
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Module file missing, malformed or with unresolved dependencies
    #[error("Failed to load module '{path}': {message}")]
    LoadError {
        path: PathBuf,
        message: String,
    },

    /// Module does not export a required symbol
    #[error("Symbol '{symbol}' not found in module '{library}'")]
    SymbolNotFound {
        library: String,
        symbol: String,
    },

    /// The module factory produced no map
    #[error("Factory in module '{library}' returned null")]
    FactoryReturnedNull {
        library: String,
    },

    /// The module factory panicked
    #[error("Factory in module '{library}' panicked: {message}")]
    FactoryPanicked {
        library: String,
        message: String,
    },

    /// Module was built against another boundary version
    #[error("Version mismatch: module API version {module_version}, expected {expected_version}")]
    VersionMismatch {
        module_version: u32,
        expected_version: u32,
    },
}

impl ModuleError {
    /// Create a load error
    pub fn load_error(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ModuleError::LoadError {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a symbol not found error
    pub fn symbol_not_found(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        ModuleError::SymbolNotFound {
            library: library.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a null factory result error
    pub fn factory_returned_null(library: impl Into<String>) -> Self {
        ModuleError::FactoryReturnedNull {
            library: library.into(),
        }
    }

    /// Whether the error happened before any map code ran
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            ModuleError::LoadError { .. }
                | ModuleError::SymbolNotFound { .. }
                | ModuleError::VersionMismatch { .. }
        )
    }
}
