//! Error types for map management

use thiserror::Error;

/// Result type for map operations
pub type MapResult<T> = std::result::Result<T, MapError>;

/// Errors that can occur while creating or switching maps
#[derive(Debug, Error)]
pub enum MapError {
    /// No factory registered under this id
    #[error("Map '{id}' is not registered (available: {})", format_available(.available))]
    UnknownMapId {
        id: String,
        available: Vec<String>,
    },

    /// Operation requires a loaded map
    #[error("No current map")]
    NoCurrentMap,

    /// Factory produced no map
    #[error("Factory for map '{0}' returned null")]
    FactoryReturnedNull(String),

    /// Factory panicked while constructing the map
    #[error("Factory for map '{id}' panicked: {message}")]
    FactoryPanicked {
        id: String,
        message: String,
    },

    /// Map failed during Initialize
    #[error("Map '{id}' failed to initialize: {message}")]
    InitializeFailed {
        id: String,
        message: String,
    },

    /// Failure reported by a map living in a loaded module
    #[error("{0}")]
    Foreign(String),
}

impl MapError {
    /// Create an unknown map id error
    pub fn unknown_map(id: impl Into<String>, available: Vec<String>) -> Self {
        MapError::UnknownMapId {
            id: id.into(),
            available,
        }
    }

    /// Create an initialize failure
    pub fn initialize_failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::InitializeFailed {
            id: id.into(),
            message: message.into(),
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    available
        .iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_map_lists_known_ids() {
        let err = MapError::unknown_map("Missing", vec!["A".into(), "B".into()]);
        assert_eq!(
            err.to_string(),
            "Map 'Missing' is not registered (available: 'A' 'B')"
        );

        let err = MapError::unknown_map("Missing", Vec::new());
        assert!(err.to_string().ends_with("(available: none)"));
    }
}
