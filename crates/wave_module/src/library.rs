//! Dynamic loading of game-logic modules
//!
//! Handles loading, symbol resolution, and unloading of module libraries.

use crate::error::{ModuleError, Result};
use crate::ffi::*;
use crate::native_map::NativeMap;
use libloading::{Library, Symbol};
use std::any::Any;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;

/// Information about a loaded module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module file path
    pub path: PathBuf,
    /// File the library was actually opened from
    pub loaded_from: PathBuf,
    /// Module name
    pub name: String,
    /// Version string
    pub version: String,
    /// Boundary API version
    pub api_version: u32,
}

/// A loaded game-logic module
///
/// Maps created from it hold an `Arc` of the module, so the library is only
/// unmapped once the last of them is gone.
pub struct GameModule {
    /// Library info
    info: ModuleInfo,
    /// Resolved factory; valid exactly as long as `library`
    create_map: CreateGameMapFn,
    /// The underlying library handle
    library: Library,
    /// Private copy `library` was opened from; removed once the library is
    /// closed, so it must stay declared after `library`
    shadow: Option<TempPath>,
}

impl GameModule {
    /// Load a module from a path
    ///
    /// Fails with `LoadError` when the file is missing or not a loadable
    /// library, `VersionMismatch` when it targets another boundary version,
    /// and `SymbolNotFound` when the factory export is absent. In every
    /// failure case the library is released again before returning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_factory(path, CREATE_MAP_SYMBOL)
    }

    /// Load a module whose factory is exported under another name
    pub fn load_with_factory(path: impl AsRef<Path>, factory_symbol: &str) -> Result<Self> {
        let path = path.as_ref();
        Self::open(path, path, factory_symbol, None)
    }

    /// Load a private copy of the module at `path`
    ///
    /// The file is copied into `shadow_dir` under a unique name and the copy
    /// is opened. The loader matches libraries by file name, so opening the
    /// same path twice would hand back the already loaded code; a fresh copy
    /// always maps the current file contents. [`path`](Self::path) still
    /// reports `path`. The copy is deleted after the library is closed.
    pub fn load_shadowed(
        path: impl AsRef<Path>,
        shadow_dir: impl AsRef<Path>,
        factory_symbol: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        let shadow = shadow_copy(path, shadow_dir.as_ref())?;
        let loaded_from = shadow.to_path_buf();
        Self::open(path, &loaded_from, factory_symbol, Some(shadow))
    }

    fn open(
        path: &Path,
        loaded_from: &Path,
        factory_symbol: &str,
        shadow: Option<TempPath>,
    ) -> Result<Self> {
        // Load the library
        let library = unsafe { Library::new(loaded_from) }
            .map_err(|e| ModuleError::load_error(path, e.to_string()))?;

        // Module info is optional
        let info_fn: Option<ModuleInfoFn> = unsafe {
            library
                .get(symbol_name(MODULE_INFO_SYMBOL).as_bytes())
                .ok()
                .map(|s: Symbol<ModuleInfoFn>| *s)
        };

        let fallback_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let info = match info_fn {
            Some(get_info) => {
                let raw = get_info();
                if raw.api_version != WAVE_MODULE_API_VERSION {
                    return Err(ModuleError::VersionMismatch {
                        module_version: raw.api_version,
                        expected_version: WAVE_MODULE_API_VERSION,
                    });
                }
                ModuleInfo {
                    path: path.to_path_buf(),
                    loaded_from: loaded_from.to_path_buf(),
                    name: unsafe { c_string_or(raw.name, &fallback_name) },
                    version: unsafe { c_string_or(raw.version, "0.0.0") },
                    api_version: raw.api_version,
                }
            }
            None => ModuleInfo {
                path: path.to_path_buf(),
                loaded_from: loaded_from.to_path_buf(),
                name: fallback_name,
                version: "0.0.0".to_string(),
                api_version: WAVE_MODULE_API_VERSION,
            },
        };

        // Resolve the factory
        let create_map: CreateGameMapFn = unsafe {
            library
                .get(symbol_name(factory_symbol).as_bytes())
                .map(|s: Symbol<CreateGameMapFn>| *s)
                .map_err(|_| ModuleError::symbol_not_found(info.name.clone(), factory_symbol))?
        };

        // Forward module logging into the host logger when supported
        let install_logger: Option<InstallLoggerFn> = unsafe {
            library
                .get(symbol_name(INSTALL_LOGGER_SYMBOL).as_bytes())
                .ok()
                .map(|s: Symbol<InstallLoggerFn>| *s)
        };
        if let Some(install) = install_logger {
            install(FfiLogSink { write: host_log }, log::max_level() as u32);
        }

        log::info!(
            "Loaded game module '{}' v{} from '{}'",
            info.name,
            info.version,
            info.path.display()
        );

        Ok(Self {
            info,
            create_map,
            library,
            shadow,
        })
    }

    /// Module information
    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn path(&self) -> &Path {
        &self.info.path
    }

    /// File the library was opened from; differs from `path` for shadow loads
    pub fn loaded_from(&self) -> &Path {
        &self.info.loaded_from
    }

    pub fn is_shadowed(&self) -> bool {
        self.shadow.is_some()
    }

    /// Resolve an arbitrary export
    ///
    /// # Safety
    ///
    /// `T` must match the export's real signature, and the returned value
    /// must not be used after this module is dropped.
    pub unsafe fn resolve_symbol<T: Copy>(&self, name: &str) -> Result<T> {
        self.library
            .get(symbol_name(name).as_bytes())
            .map(|s: Symbol<T>| *s)
            .map_err(|_| ModuleError::symbol_not_found(self.info.name.clone(), name))
    }

    /// Construct the module's root map
    ///
    /// The returned map keeps this module alive.
    pub fn create_map(self: &Arc<Self>) -> Result<NativeMap> {
        let object = (self.create_map)();
        if object.is_null() {
            let err = ModuleError::factory_returned_null(self.info.name.clone());
            log::error!("{}", err);
            return Err(err);
        }

        let keepalive: Arc<dyn Any + Send + Sync> = self.clone();
        // Safety: the object was just produced by this module's factory and
        // the map keeps the module loaded.
        unsafe { NativeMap::from_raw(object, keepalive) }
            .ok_or_else(|| ModuleError::factory_returned_null(self.info.name.clone()))
    }
}

impl Drop for GameModule {
    fn drop(&mut self) {
        log::info!("Unloading game module '{}'", self.info.name);
    }
}

/// Release a module
///
/// When something else (normally a live map) still holds the module, only
/// this reference is released and a warning is logged; the OS handle goes
/// away with the last owner.
pub fn unload(module: Arc<GameModule>) {
    match Arc::try_unwrap(module) {
        Ok(module) => drop(module),
        Err(module) => log::warn!(
            "Module '{}' is still in use ({} other owners), deferring unload",
            module.info.name,
            Arc::strong_count(&module) - 1
        ),
    }
}

/// Copy `source` to a uniquely named file in `shadow_dir`
///
/// The copy keeps the file stem as a prefix and the extension, e.g.
/// `libgame.so` becomes `libgame-a1B2c3.so`.
fn shadow_copy(source: &Path, shadow_dir: &Path) -> Result<TempPath> {
    if !source.is_file() {
        return Err(ModuleError::load_error(source, "file not found"));
    }
    let copy_error =
        |e: std::io::Error| ModuleError::load_error(source, format!("shadow copy failed: {}", e));

    std::fs::create_dir_all(shadow_dir).map_err(copy_error)?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");
    let suffix = source
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    let shadow = tempfile::Builder::new()
        .prefix(&format!("{}-", stem))
        .suffix(&suffix)
        .tempfile_in(shadow_dir)
        .map_err(copy_error)?
        .into_temp_path();
    std::fs::copy(source, &shadow).map_err(copy_error)?;

    log::debug!(
        "Shadow copy of '{}' at '{}'",
        source.display(),
        shadow.display()
    );
    Ok(shadow)
}

fn symbol_name(name: &str) -> String {
    format!("{}\0", name)
}

unsafe fn c_string_or(ptr: *const std::ffi::c_char, fallback: &str) -> String {
    if ptr.is_null() {
        fallback.to_string()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

extern "C" fn host_log(
    level: u32,
    target: *const u8,
    target_len: usize,
    message: *const u8,
    message_len: usize,
) {
    let target = unsafe { string_from_raw(target, target_len) };
    let message = unsafe { string_from_raw(message, message_len) };
    log::log!(target: target.as_str(), level_from_raw(level), "{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_module.so");

        let err = GameModule::load(&path).err().unwrap();
        assert!(matches!(err, ModuleError::LoadError { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_load_garbage_file() {
        let mut file = tempfile::Builder::new().suffix(".so").tempfile().unwrap();
        file.write_all(b"definitely not a shared library").unwrap();

        let err = GameModule::load(file.path()).err().unwrap();
        assert!(matches!(err, ModuleError::LoadError { .. }));
    }

    #[test]
    fn test_shadow_copies_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("libgame.so");
        std::fs::write(&source, b"module bytes").unwrap();
        let shadow_dir = dir.path().join("shadow");

        let first = shadow_copy(&source, &shadow_dir).unwrap();
        let second = shadow_copy(&source, &shadow_dir).unwrap();
        assert_ne!(first.to_path_buf(), second.to_path_buf());

        for copy in [&first, &second] {
            let name = copy.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("libgame-"));
            assert!(name.ends_with(".so"));
            assert_eq!(std::fs::read(copy).unwrap(), b"module bytes");
        }

        drop(first);
        drop(second);
        assert_eq!(std::fs::read_dir(&shadow_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_shadowed_load_failure_removes_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("libbroken.so");
        std::fs::write(&source, b"definitely not a shared library").unwrap();
        let shadow_dir = dir.path().join("shadow");

        let err = GameModule::load_shadowed(&source, &shadow_dir, CREATE_MAP_SYMBOL)
            .err()
            .unwrap();
        match err {
            ModuleError::LoadError { path, .. } => assert_eq!(path, source),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(std::fs::read_dir(&shadow_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_shadowed_load_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameModule::load_shadowed(
            dir.path().join("missing.so"),
            dir.path().join("shadow"),
            CREATE_MAP_SYMBOL,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ModuleError::LoadError { .. }));
        assert!(!dir.path().join("shadow").exists());
    }

    #[test]
    fn test_symbol_name_is_nul_terminated() {
        assert_eq!(symbol_name(CREATE_MAP_SYMBOL), "wave_create_game_map\0");
    }
}
