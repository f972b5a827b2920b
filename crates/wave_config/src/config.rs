//! Window and scene configuration
//!
//! # File Format
//!
//! One `key=value` pair per line. Lines starting with `#` or `;` are
//! comments, whitespace around keys and values is ignored, and unknown keys
//! are skipped.
//!
//! ```text
//! # Game Configuration File
//! # Window Settings
//! width=1280
//! height=720
//! b_Fullscreen=false
//! b_Resizable=true
//! b_Vsync=true
//! target_fps=60
//! title=My Game
//! scene_width=1280
//! scene_height=720
//! scene_fps=60
//! ```

use crate::error::{ConfigError, Result};
use crate::export::ExportSettings;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Default file name next to the executable
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

/// Window and editor scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub resizable: bool,
    pub vsync: bool,
    pub target_fps: u32,
    pub title: String,

    /// Editor scene viewport
    pub scene_width: u32,
    pub scene_height: u32,
    pub scene_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            resizable: true,
            vsync: true,
            target_fps: 60,
            title: "My Game".to_string(),
            scene_width: 1280,
            scene_height: 720,
            scene_fps: 60,
        }
    }
}

/// Game configuration
///
/// Constructed once at startup and handed to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub window: WindowConfig,
}

impl GameConfig {
    /// Parse configuration text on top of the defaults
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        config.merge(content);
        config
    }

    /// Apply every recognised line of `content` to this configuration
    pub fn merge(&mut self, content: &str) {
        let window = &mut self.window;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "width" => parse_number(key, value, &mut window.width),
                "height" => parse_number(key, value, &mut window.height),
                "b_Fullscreen" => window.fullscreen = parse_bool(value),
                "b_Resizable" => window.resizable = parse_bool(value),
                "b_Vsync" => window.vsync = parse_bool(value),
                "target_fps" => parse_number(key, value, &mut window.target_fps),
                "title" => window.title = value.to_string(),
                "scene_width" => parse_number(key, value, &mut window.scene_width),
                "scene_height" => parse_number(key, value, &mut window.scene_height),
                "scene_fps" => parse_number(key, value, &mut window.scene_fps),
                _ => log::debug!("Ignoring unknown config key '{}'", key),
            }
        }
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io(e),
        })?;

        log::info!("Loaded configuration from: {}", path.display());
        Ok(Self::parse(&content))
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Write configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_config_string())?;
        log::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Render the configuration in file format
    pub fn to_config_string(&self) -> String {
        let w = &self.window;
        let mut out = String::new();
        out.push_str("# Game Configuration File\n");
        out.push_str("# Window Settings\n");
        let _ = writeln!(out, "width={}", w.width);
        let _ = writeln!(out, "height={}", w.height);
        let _ = writeln!(out, "b_Fullscreen={}", w.fullscreen);
        let _ = writeln!(out, "b_Resizable={}", w.resizable);
        let _ = writeln!(out, "b_Vsync={}", w.vsync);
        let _ = writeln!(out, "target_fps={}", w.target_fps);
        let _ = writeln!(out, "title={}", single_line(&w.title));
        let _ = writeln!(out, "scene_width={}", w.scene_width);
        let _ = writeln!(out, "scene_height={}", w.scene_height);
        let _ = writeln!(out, "scene_fps={}", w.scene_fps);
        out
    }

    /// Effective settings as pretty-printed JSON, for `--print-config`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overwrite the window settings chosen for an export
    pub fn apply_export_settings(&mut self, settings: &ExportSettings) {
        let w = &mut self.window;
        w.width = settings.window_width;
        w.height = settings.window_height;
        w.fullscreen = settings.fullscreen;
        w.resizable = settings.resizable;
        w.vsync = settings.vsync;
        w.target_fps = settings.target_fps;
    }
}

fn parse_bool(value: &str) -> bool {
    value == "true" || value == "1"
}

fn parse_number<T: FromStr>(key: &str, value: &str, target: &mut T) {
    match value.parse() {
        Ok(parsed) => *target = parsed,
        Err(_) => log::warn!("Invalid value '{}' for '{}', keeping previous value", value, key),
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(!config.window.fullscreen);
        assert!(config.window.resizable);
        assert!(config.window.vsync);
        assert_eq!(config.window.title, "My Game");
        assert_eq!(config.window.scene_fps, 60);
    }

    #[test]
    fn test_parse_comments_and_whitespace() {
        let config = GameConfig::parse(
            "# comment\n; another\n\n  width = 800 \nheight=600\nb_Fullscreen=1\ntitle =  Space Game  \nunknown=5\nno equals sign\n",
        );
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert!(config.window.fullscreen);
        assert_eq!(config.window.title, "Space Game");
    }

    #[test]
    fn test_invalid_number_keeps_default() {
        let config = GameConfig::parse("width=wide\ntarget_fps=-3\nheight=900");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.target_fps, 60);
        assert_eq!(config.window.height, 900);
    }

    #[test]
    fn test_bool_parsing() {
        let config = GameConfig::parse("b_Vsync=false\nb_Resizable=yes");
        assert!(!config.window.vsync);
        // Only `true` and `1` count as true
        assert!(!config.window.resizable);
    }

    #[test]
    fn test_config_string_header() {
        let text = GameConfig::default().to_config_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("# Game Configuration File"));
        assert_eq!(lines.next(), Some("# Window Settings"));
        assert!(text.contains("b_Fullscreen=false\n"));
        assert!(text.contains("title=My Game\n"));
    }

    #[test]
    fn test_title_newlines_are_flattened() {
        let mut config = GameConfig::default();
        config.window.title = "Two\nLines".to_string();
        let parsed = GameConfig::parse(&config.to_config_string());
        assert_eq!(parsed.window.title, "Two Lines");
        assert_eq!(parsed.window.scene_width, 1280);
    }
}
