//! The reload sequence
//!
//! [`ReloadCoordinator`] owns the installed module, the host slot running its
//! map and the watcher over the module file. A reload builds the new map
//! before anything old is torn down, destroys the old map before the old
//! module is released, and only then installs the new pair.

use crate::config::HotReloadConfig;
use crate::error::{ReloadError, Result};
use crate::loader::{LibraryLoader, ModuleLease, ModuleLoader};
use crate::watcher::{modified_time, ModuleWatcher, WatchStatus};
use std::path::{Path, PathBuf};
use std::time::Instant;
use wave_map::{catch_panic, GameHost, Renderer};
use wave_module::ModuleError;

/// Drives loading, swapping and per-frame ticking of game-logic modules
pub struct ReloadCoordinator<L: ModuleLoader = LibraryLoader> {
    config: HotReloadConfig,
    loader: L,
    /// Declared before `lease`: the map goes before its module
    host: GameHost,
    lease: Option<ModuleLease>,
    watcher: ModuleWatcher,
    module_path: Option<PathBuf>,
    /// Set while the watched file cannot be read
    watch_failed: bool,
    playing: bool,
}

impl ReloadCoordinator<LibraryLoader> {
    /// Coordinator loading shared libraries
    pub fn new(config: HotReloadConfig) -> Self {
        let mut loader = LibraryLoader::new(config.factory_symbol.clone());
        if let Some(dir) = &config.shadow_dir {
            loader = loader.with_shadow_dir(dir);
        }
        Self::with_loader(config, loader)
    }
}

impl<L: ModuleLoader> ReloadCoordinator<L> {
    /// Coordinator using a custom module source
    pub fn with_loader(config: HotReloadConfig, loader: L) -> Self {
        let host = GameHost::new(config.scene_width, config.scene_height);
        let watcher = ModuleWatcher::new(config.poll_interval);
        Self {
            config,
            loader,
            host,
            lease: None,
            watcher,
            module_path: None,
            watch_failed: false,
            playing: false,
        }
    }

    // ========== Loading ==========

    /// Load the module at `path` and make its map current
    ///
    /// Failures while loading the module or constructing its map leave the
    /// running module and map untouched. Once the new map exists the old map
    /// is destroyed, the old module released and the new pair installed.
    /// If the new map then fails to initialize, the host is left empty while
    /// the new module stays installed; the error is still returned.
    pub fn load_game_logic(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Loading game logic from '{}'", path.display());

        // Timestamp before loading, so a write that lands mid-reload is seen
        // by the next poll.
        let observed = modified_time(path).ok();

        // 1-2. Load the module and resolve its factory
        let module = self.loader.load(path).map_err(|e| {
            log::error!("Failed to load game logic: {}", e);
            ReloadError::from(e)
        })?;

        // 3. Construct the provisional map
        let name = module.name().to_string();
        let candidate = module.clone();
        let map = match catch_panic(move || candidate.create_map()) {
            Ok(Ok(map)) => map,
            Ok(Err(e)) => {
                log::error!("Failed to create map, unloading '{}': {}", name, e);
                return Err(e.into());
            }
            Err(message) => {
                log::error!("Map factory panicked, unloading '{}': {}", name, message);
                return Err(ModuleError::FactoryPanicked {
                    library: name,
                    message,
                }
                .into());
            }
        };

        // 4. Destroy the running map
        if let Some(old_map) = self.host.take_map() {
            log::info!("Destroying map '{}'", old_map.name());
            drop(old_map);
        }

        // 5. Release the previous module
        if let Some(old_lease) = self.lease.take() {
            old_lease.release();
        }

        // 6. Install the new module and map
        self.lease = Some(ModuleLease::new(module));
        self.module_path = Some(path.to_path_buf());
        let installed = self.host.set_map(Some(map));

        // 7. Remember what was loaded
        self.watcher.watch_with_baseline(path, observed);
        if observed.is_none() {
            if let Err(e) = self.watcher.mark_current() {
                log::warn!("{}", e);
            }
        }

        match installed {
            Ok(()) => {
                log::info!("Game logic '{}' loaded", name);
                Ok(())
            }
            Err(e) => {
                log::error!("Game logic '{}' loaded but its map is not running: {}", name, e);
                Err(e.into())
            }
        }
    }

    /// Reload the current module file, keeping the play state
    ///
    /// Play is paused for the duration of the reload and restored afterwards,
    /// whether or not the reload succeeded.
    pub fn reload_game_logic(&mut self) -> bool {
        let Some(path) = self.module_path.clone() else {
            log::warn!("{}", ReloadError::NoModulePath);
            return false;
        };

        let was_playing = self.playing;
        self.playing = false;
        let result = self.load_game_logic(&path);
        self.playing = was_playing;

        result.is_ok()
    }

    /// Reload when the module file changed since the last check
    ///
    /// Checks at most once per poll interval. Returns whether a reload
    /// happened and succeeded.
    pub fn poll_for_changes(&mut self, now: Instant) -> bool {
        if !self.config.watch_enabled || self.module_path.is_none() {
            return false;
        }

        if !self.watcher.poll_due(now) {
            return false;
        }
        let status = match self.watcher.observe() {
            Ok(status) => status,
            Err(e) => {
                // Usually the build is rewriting the file; warn once
                if !self.watch_failed {
                    log::warn!("Cannot check game logic for changes: {}", e);
                    self.watch_failed = true;
                }
                return false;
            }
        };
        if self.watch_failed {
            log::info!("Game logic file is readable again");
            self.watch_failed = false;
        }

        match status {
            WatchStatus::Changed => {
                log::info!("Game logic changed on disk, reloading");
                self.reload_game_logic()
            }
            WatchStatus::Unchanged => false,
        }
    }

    /// One frame: check for changes, update while playing, draw
    pub fn tick(&mut self, now: Instant, delta_time: f32, renderer: &mut dyn Renderer) {
        self.poll_for_changes(now);
        if self.playing {
            self.host.update(delta_time);
        }
        self.host.draw(renderer);
    }

    /// Destroy the map and release the module
    pub fn unload_game_logic(&mut self) {
        drop(self.host.take_map());
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
        self.watcher.unwatch();
        self.module_path = None;
        self.watch_failed = false;
    }

    // ========== State ==========

    pub fn config(&self) -> &HotReloadConfig {
        &self.config
    }

    pub fn host(&self) -> &GameHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut GameHost {
        &mut self.host
    }

    pub fn watcher(&self) -> &ModuleWatcher {
        &self.watcher
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    pub fn has_module(&self) -> bool {
        self.lease.is_some()
    }

    /// Name of the installed module
    pub fn module_name(&self) -> Option<&str> {
        self.lease.as_ref().map(|lease| lease.name())
    }

    pub fn module_path(&self) -> Option<&Path> {
        self.module_path.as_deref()
    }

    /// Whether the last change check could not read the module file
    pub fn watch_failed(&self) -> bool {
        self.watch_failed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            log::info!("{}", if playing { "Playing" } else { "Stopped" });
        }
        self.playing = playing;
    }
}

impl<L: ModuleLoader> Drop for ReloadCoordinator<L> {
    fn drop(&mut self) {
        drop(self.host.take_map());
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
    }
}
