//! # wave_config - Game Configuration
//!
//! Window, scene and export settings persisted as a flat `key=value` file
//! (`config.ini`). The editor writes it, exported games read it at startup.
//!
//! ```
//! use wave_config::GameConfig;
//!
//! let config = GameConfig::parse("width=1920\nheight=1080\nb_Vsync=false");
//! assert_eq!(config.window.width, 1920);
//! assert!(!config.window.vsync);
//! ```

mod config;
mod error;
mod export;

pub use config::{GameConfig, WindowConfig, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, Result};
pub use export::ExportSettings;
