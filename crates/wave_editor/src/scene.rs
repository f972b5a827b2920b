//! Editor scene viewport settings

use wave_config::{ExportSettings, WindowConfig};

pub const MIN_SCENE_WIDTH: u32 = 320;
pub const MIN_SCENE_HEIGHT: u32 = 240;
pub const MAX_SCENE_WIDTH: u32 = 7680;
pub const MAX_SCENE_HEIGHT: u32 = 4320;

/// Resolution presets offered for the scene viewport
pub const RESOLUTION_PRESETS: [(u32, u32, &str); 5] = [
    (1920, 1080, "Full HD"),
    (1600, 900, "HD+"),
    (1280, 720, "HD"),
    (1024, 768, "4:3"),
    (800, 600, "SVGA"),
];

/// Frame rate presets; 0 is unlimited
pub const FPS_PRESETS: [u32; 6] = [30, 60, 120, 144, 240, 0];

/// Size and frame rate of the scene the game runs in while editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSettings {
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl SceneSettings {
    /// Settings with the resolution clamped to the supported range
    pub fn new(width: u32, height: u32, target_fps: u32) -> Self {
        Self {
            width: width.clamp(MIN_SCENE_WIDTH, MAX_SCENE_WIDTH),
            height: height.clamp(MIN_SCENE_HEIGHT, MAX_SCENE_HEIGHT),
            target_fps,
        }
    }

    pub fn from_window(window: &WindowConfig) -> Self {
        Self::new(window.scene_width, window.scene_height, window.scene_fps)
    }

    /// Write into the `scene_*` keys of a window config
    pub fn store(&self, window: &mut WindowConfig) {
        window.scene_width = self.width;
        window.scene_height = self.height;
        window.scene_fps = self.target_fps;
    }

    /// Use the scene resolution as the export window size
    pub fn copy_to_export(&self, export: &mut ExportSettings) {
        export.window_width = self.width;
        export.window_height = self.height;
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::from_window(&WindowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_is_clamped() {
        let scene = SceneSettings::new(100, 10_000, 30);
        assert_eq!(scene.width, MIN_SCENE_WIDTH);
        assert_eq!(scene.height, MAX_SCENE_HEIGHT);
        assert_eq!(scene.target_fps, 30);
    }

    #[test]
    fn test_store_and_copy() {
        let scene = SceneSettings::new(800, 600, 144);
        let mut window = WindowConfig::default();
        scene.store(&mut window);
        assert_eq!((window.scene_width, window.scene_height, window.scene_fps), (800, 600, 144));
        assert_eq!(SceneSettings::from_window(&window), scene);

        let mut export = ExportSettings::default();
        scene.copy_to_export(&mut export);
        assert_eq!((export.window_width, export.window_height), (800, 600));
    }
}
