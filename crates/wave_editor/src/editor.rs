//! The editor session
//!
//! [`GameEditor`] is the headless form of the editor window: the toolbar
//! buttons, scene settings, map selection and export panels are methods,
//! and one call to [`GameEditor::frame`] is one frame of the scene view.

use crate::error::{EditorError, Result};
use crate::frame_stats::FrameStats;
use crate::scene::SceneSettings;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use wave_config::{ExportSettings, GameConfig};
use wave_hot_reload::{HotReloadConfig, LibraryLoader, ModuleLoader, ReloadCoordinator};
use wave_map::Renderer;
use wave_process::{run_command, ExportJob, ExportSources, LogBuffer, Severity};

/// How game logic is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Shell command that rebuilds the module
    pub command: String,
    /// Directory removed by "clean build folder"
    pub build_dir: PathBuf,
    /// Module the build produces
    pub module_path: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        let module = wave_module::library_filename(crate::DEFAULT_MODULE_NAME);
        Self {
            command: format!("cargo build -p {}", crate::DEFAULT_MODULE_NAME),
            build_dir: PathBuf::from("target"),
            module_path: PathBuf::from("target").join("debug").join(module),
        }
    }
}

#[derive(Debug, Default)]
struct CompileState {
    compiling: AtomicBool,
    reload_requested: AtomicBool,
}

/// Editor session state
pub struct GameEditor<L: ModuleLoader = LibraryLoader> {
    coordinator: ReloadCoordinator<L>,
    config: GameConfig,
    config_path: PathBuf,
    scene: SceneSettings,
    build: BuildSettings,
    console: LogBuffer,
    compile: Arc<CompileState>,
    compile_thread: Option<JoinHandle<()>>,
    export_settings: ExportSettings,
    export: Option<ExportJob>,
    stats: FrameStats,
}

impl GameEditor<LibraryLoader> {
    /// Editor loading game logic from shared libraries
    pub fn new(config: GameConfig, config_path: impl Into<PathBuf>, build: BuildSettings) -> Self {
        let loader = LibraryLoader::default();
        Self::with_loader(config, config_path, build, loader)
    }
}

impl<L: ModuleLoader> GameEditor<L> {
    /// Editor with a custom module source
    pub fn with_loader(
        config: GameConfig,
        config_path: impl Into<PathBuf>,
        build: BuildSettings,
        loader: L,
    ) -> Self {
        let scene = SceneSettings::from_window(&config.window);
        let reload_config = HotReloadConfig {
            scene_width: scene.width as f32,
            scene_height: scene.height as f32,
            ..HotReloadConfig::default()
        };
        let mut coordinator = ReloadCoordinator::with_loader(reload_config, loader);
        coordinator.host_mut().set_target_fps(scene.target_fps);

        let mut export_settings = ExportSettings::default();
        scene.copy_to_export(&mut export_settings);

        Self {
            coordinator,
            config,
            config_path: config_path.into(),
            scene,
            build,
            console: LogBuffer::new(),
            compile: Arc::new(CompileState::default()),
            compile_thread: None,
            export_settings,
            export: None,
            stats: FrameStats::new(),
        }
    }

    // ========== Game Logic ==========

    /// Load game logic, showing the placeholder scene on failure
    pub fn load_game_logic(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.coordinator.load_game_logic(path) {
            Ok(()) => {
                self.console
                    .push(format!("Loaded game logic: {}", path.display()));
                true
            }
            Err(e) => {
                self.console.push(format!("ERROR: {}", e));
                false
            }
        }
    }

    /// Reload the current module, keeping the play state
    pub fn reload_game_logic(&mut self) -> bool {
        self.coordinator.reload_game_logic()
    }

    // ========== Toolbar ==========

    pub fn play(&mut self) {
        self.coordinator.set_playing(true);
    }

    pub fn stop(&mut self) {
        self.coordinator.set_playing(false);
    }

    pub fn toggle_play(&mut self) {
        let playing = self.coordinator.is_playing();
        self.coordinator.set_playing(!playing);
    }

    pub fn is_playing(&self) -> bool {
        self.coordinator.is_playing()
    }

    /// Stop and recreate the current map
    ///
    /// Goes through the root registry when there is one, otherwise re-runs
    /// the root map's initialize.
    pub fn restart(&mut self) -> bool {
        self.stop();
        let host = self.coordinator.host_mut();
        let result = match host.directory() {
            Some(directory) => directory.reload_current_map(),
            None => host.reset_map(),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                self.console.push(format!("WARNING: Restart failed: {}", e));
                false
            }
        }
    }

    /// Stop and reload the module from disk
    ///
    /// Falls back to resetting the running map when the reload fails.
    pub fn reset_game(&mut self) -> bool {
        self.stop();
        if self.coordinator.reload_game_logic() {
            return true;
        }
        if let Err(e) = self.coordinator.host_mut().reset_map() {
            log::debug!("Reset after failed reload: {}", e);
        }
        false
    }

    /// Run the build command in the background
    ///
    /// Returns false when a build is already running. A successful build
    /// reloads the module on the next [`frame`](Self::frame).
    pub fn recompile(&mut self) -> bool {
        if self.compile.compiling.swap(true, Ordering::SeqCst) {
            self.console.push("WARNING: Build already in progress");
            return false;
        }
        self.stop();
        self.join_compile_thread();

        self.console.push("Starting build process...");

        let output_log = self.console.clone();
        let complete_log = self.console.clone();
        let compile = self.compile.clone();
        let handle = run_command(
            self.build.command.clone(),
            move |line, is_error| {
                let severity = if is_error {
                    Severity::Error
                } else {
                    Severity::classify(line)
                };
                output_log.push_with(line, severity);
            },
            move |success| {
                if success {
                    complete_log.push("Build Successful.");
                    compile.reload_requested.store(true, Ordering::SeqCst);
                } else {
                    complete_log.push("ERROR: Build Failed.");
                }
                compile.compiling.store(false, Ordering::SeqCst);
            },
        );
        self.compile_thread = Some(handle);
        true
    }

    pub fn is_compiling(&self) -> bool {
        self.compile.compiling.load(Ordering::SeqCst)
    }

    fn join_compile_thread(&mut self) {
        if let Some(handle) = self.compile_thread.take() {
            if handle.join().is_err() {
                log::error!("Build worker panicked");
            }
        }
    }

    /// Reload after a finished build
    fn apply_build_result(&mut self) {
        if !self.compile.reload_requested.swap(false, Ordering::SeqCst) {
            return;
        }
        self.join_compile_thread();

        let reloaded = if self.coordinator.module_path().is_some() {
            self.coordinator.reload_game_logic()
        } else {
            let path = self.build.module_path.clone();
            self.load_game_logic(path)
        };
        if !reloaded {
            self.console
                .push("WARNING: Build finished but the game logic could not be reloaded");
        }
    }

    /// Delete the build folder
    pub fn clean_build_folder(&mut self) -> Result<bool> {
        let dir = &self.build.build_dir;
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(dir)?;
        self.console
            .push(format!("Deleted build folder: {}", dir.display()));
        Ok(true)
    }

    // ========== Frame ==========

    /// One editor frame: reload if needed, update while playing, draw
    pub fn frame(&mut self, now: Instant, delta_time: f32, renderer: &mut dyn Renderer) {
        self.stats.record(delta_time);
        self.apply_build_result();
        self.coordinator.tick(now, delta_time, renderer);
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    // ========== Scene Settings ==========

    pub fn scene_settings(&self) -> SceneSettings {
        self.scene
    }

    /// Resize the scene; the resolution is clamped to the supported range
    pub fn set_scene_resolution(&mut self, width: u32, height: u32) {
        let scene = SceneSettings::new(width, height, self.scene.target_fps);
        if (scene.width, scene.height) != (self.scene.width, self.scene.height) {
            self.coordinator
                .host_mut()
                .set_scene_bounds(scene.width as f32, scene.height as f32);
        }
        self.scene = scene;
    }

    pub fn set_scene_fps(&mut self, fps: u32) {
        if fps != self.scene.target_fps {
            self.coordinator.host_mut().set_target_fps(fps);
        }
        self.scene.target_fps = fps;
    }

    /// Use the scene resolution for the export window
    pub fn copy_scene_to_export(&mut self) {
        self.scene.copy_to_export(&mut self.export_settings);
    }

    /// Persist scene settings to the config file
    pub fn save_config(&mut self) -> Result<()> {
        self.scene.store(&mut self.config.window);
        self.config.save(&self.config_path)?;
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // ========== Map Selection ==========

    /// Maps offered by the root registry, sorted
    pub fn available_maps(&mut self) -> Vec<String> {
        self.coordinator
            .host_mut()
            .directory()
            .map(|dir| dir.available_maps())
            .unwrap_or_default()
    }

    pub fn current_map_id(&mut self) -> Option<String> {
        self.coordinator.host_mut().current_map_id()
    }

    /// Switch the root registry to `map_id`
    pub fn select_map(&mut self, map_id: &str) -> bool {
        let Some(directory) = self.coordinator.host_mut().directory() else {
            self.console
                .push("WARNING: Loaded game logic has no map registry");
            return false;
        };
        match directory.goto_map(map_id, false) {
            Ok(()) => {
                self.console.push(format!("Switched to map: {}", map_id));
                true
            }
            Err(e) => {
                self.console.push(format!("ERROR: {}", e));
                false
            }
        }
    }

    // ========== Export ==========

    pub fn export_settings(&self) -> &ExportSettings {
        &self.export_settings
    }

    pub fn export_settings_mut(&mut self) -> &mut ExportSettings {
        &mut self.export_settings
    }

    /// Start exporting a standalone game
    pub fn start_export(&mut self, sources: ExportSources) -> Result<()> {
        if self.is_exporting() {
            return Err(EditorError::Busy("Export"));
        }
        if let Some(mut finished) = self.export.take() {
            finished.wait();
        }
        let job = ExportJob::start(self.export_settings.clone(), self.config.clone(), sources);
        self.export = Some(job);
        Ok(())
    }

    pub fn is_exporting(&self) -> bool {
        self.export.as_ref().map_or(false, ExportJob::is_exporting)
    }

    /// The current or last export
    pub fn export_job(&mut self) -> Option<&mut ExportJob> {
        self.export.as_mut()
    }

    // ========== State ==========

    /// Build and editor output
    pub fn console(&self) -> &LogBuffer {
        &self.console
    }

    pub fn coordinator(&self) -> &ReloadCoordinator<L> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ReloadCoordinator<L> {
        &mut self.coordinator
    }
}

impl<L: ModuleLoader> Drop for GameEditor<L> {
    fn drop(&mut self) {
        self.join_compile_thread();
    }
}
