//! Hot-reload configuration

use std::path::PathBuf;
use std::time::Duration;
use wave_module::ffi::CREATE_MAP_SYMBOL;

/// Configuration for hot-reload
#[derive(Debug, Clone)]
pub struct HotReloadConfig {
    /// Minimum time between two modification-time checks
    pub poll_interval: Duration,
    /// Whether file changes trigger a reload at all
    pub watch_enabled: bool,
    /// Name of the factory export in game-logic modules
    pub factory_symbol: String,
    /// Where private copies of loaded modules go; next to the module when unset
    pub shadow_dir: Option<PathBuf>,
    /// Scene size handed to every new map
    pub scene_width: f32,
    pub scene_height: f32,
}

impl Default for HotReloadConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            watch_enabled: true,
            factory_symbol: CREATE_MAP_SYMBOL.to_string(),
            shadow_dir: None,
            scene_width: 1280.0,
            scene_height: 720.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HotReloadConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(config.watch_enabled);
        assert_eq!(config.factory_symbol, "wave_create_game_map");
        assert!(config.shadow_dir.is_none());
    }
}
