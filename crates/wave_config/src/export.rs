//! Settings chosen for an exported build

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options for packaging a standalone game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output directory, relative to the working directory
    pub output_dir: PathBuf,
    /// Name of the exported executable, without extension
    pub game_name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub fullscreen: bool,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("Export"),
            game_name: "MyGame".to_string(),
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
            fullscreen: false,
            resizable: true,
            vsync: true,
        }
    }
}

impl ExportSettings {
    /// File name of the exported executable on this platform
    pub fn executable_name(&self) -> String {
        format!("{}{}", self.game_name, std::env::consts::EXE_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_name() {
        let settings = ExportSettings {
            game_name: "Blaster".to_string(),
            ..Default::default()
        };
        assert!(settings.executable_name().starts_with("Blaster"));
        assert!(settings.executable_name().ends_with(std::env::consts::EXE_SUFFIX));
    }
}
