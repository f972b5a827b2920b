//! Where modules come from and how long they stay
//!
//! The coordinator only sees these traits, so the reload sequence can be
//! driven by real libraries or by in-process test modules alike.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use wave_map::GameMap;
use wave_module::{GameModule, ModuleError};

/// A loaded unit of game logic
pub trait LogicModule: Send + Sync + 'static {
    /// Display name
    fn name(&self) -> &str;

    /// File the module was loaded from
    fn path(&self) -> &Path;

    /// Construct the module's root map
    ///
    /// The returned map must keep the module alive for as long as it exists.
    fn create_map(self: Arc<Self>) -> Result<Box<dyn GameMap>, ModuleError>;
}

impl LogicModule for GameModule {
    fn name(&self) -> &str {
        GameModule::name(self)
    }

    fn path(&self) -> &Path {
        GameModule::path(self)
    }

    fn create_map(self: Arc<Self>) -> Result<Box<dyn GameMap>, ModuleError> {
        let map = GameModule::create_map(&self)?;
        Ok(Box::new(map))
    }
}

/// Loads modules from disk
pub trait ModuleLoader {
    fn load(&mut self, path: &Path) -> Result<Arc<dyn LogicModule>, ModuleError>;
}

/// Directory created next to a module for its shadow copies
pub const SHADOW_DIR_NAME: &str = ".wave_shadow";

/// [`ModuleLoader`] backed by shared libraries
///
/// Every load opens a fresh shadow copy of the module file, so reloading
/// the same path runs the code currently on disk. Modules keep reporting
/// the original path.
#[derive(Debug, Clone)]
pub struct LibraryLoader {
    factory_symbol: String,
    shadow_dir: Option<PathBuf>,
}

impl LibraryLoader {
    pub fn new(factory_symbol: impl Into<String>) -> Self {
        Self {
            factory_symbol: factory_symbol.into(),
            shadow_dir: None,
        }
    }

    /// Put shadow copies in `dir` instead of next to each module
    pub fn with_shadow_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shadow_dir = Some(dir.into());
        self
    }

    /// Directory holding the shadow copies of `path`
    pub fn shadow_dir_for(&self, path: &Path) -> PathBuf {
        match &self.shadow_dir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(SHADOW_DIR_NAME),
        }
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new(wave_module::ffi::CREATE_MAP_SYMBOL)
    }
}

impl ModuleLoader for LibraryLoader {
    fn load(&mut self, path: &Path) -> Result<Arc<dyn LogicModule>, ModuleError> {
        let shadow_dir = self.shadow_dir_for(path);
        let module = GameModule::load_shadowed(path, shadow_dir, &self.factory_symbol)?;
        Ok(Arc::new(module))
    }
}

/// Exclusive claim on the installed module
///
/// Releasing the lease is the only way the coordinator lets go of a module,
/// and it does so only after the module's map was destroyed.
pub struct ModuleLease {
    module: Arc<dyn LogicModule>,
}

impl ModuleLease {
    pub fn new(module: Arc<dyn LogicModule>) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &Arc<dyn LogicModule> {
        &self.module
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    /// Whether objects created from the module are still alive
    pub fn in_use(&self) -> bool {
        Arc::strong_count(&self.module) > 1
    }

    /// Give the module back
    ///
    /// Logs a warning when something still holds it; the library then stays
    /// loaded until that last owner is gone.
    pub fn release(self) {
        if self.in_use() {
            log::warn!(
                "Module '{}' released while {} object(s) still reference it",
                self.module.name(),
                Arc::strong_count(&self.module) - 1
            );
        } else {
            log::info!("Released module '{}'", self.module.name());
        }
    }
}

impl std::fmt::Debug for ModuleLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLease")
            .field("name", &self.module.name())
            .field("path", &self.module.path())
            .field("in_use", &self.in_use())
            .finish()
    }
}
