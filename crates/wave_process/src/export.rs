//! Packaging a standalone game
//!
//! An export directory holds exactly one game executable, the game-logic
//! module, the runtime libraries it needs, a `config.ini` and optionally an
//! `Assets/` tree. The job runs on a worker thread; the main thread only
//! reads its atomic flags and log lines.

use crate::error::{ProcessError, Result};
use crate::log_buffer::LogBuffer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use wave_config::{ExportSettings, GameConfig, DEFAULT_CONFIG_FILE};

/// Asset folder that belongs to the editor and is never exported
pub const ENGINE_CONTENT_DIR: &str = "EngineContent";

/// Name of the assets folder in source and export trees
pub const ASSETS_DIR: &str = "Assets";

/// Files an export is assembled from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSources {
    /// Prebuilt game runtime executable
    pub runtime_executable: PathBuf,
    /// Game-logic module artifact
    pub module: PathBuf,
    /// Native libraries the runtime loads
    pub runtime_libraries: Vec<PathBuf>,
    /// Project asset folder, skipped when absent
    pub assets_dir: PathBuf,
}

/// Expected contents of an export directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    pub module_file: String,
    pub runtime_libraries: Vec<String>,
}

impl ExportLayout {
    /// Layout produced from `sources`
    pub fn for_sources(sources: &ExportSources) -> Self {
        Self {
            module_file: file_name(&sources.module),
            runtime_libraries: sources.runtime_libraries.iter().map(|p| file_name(p)).collect(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `path` is a game executable on this platform
pub fn is_platform_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(windows)]
    {
        path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("exe"))
    }

    #[cfg(not(windows))]
    {
        use std::os::unix::fs::PermissionsExt;
        let is_library = path
            .extension()
            .map_or(false, |ext| ext == "so" || ext == "dylib");
        metadata.permissions().mode() & 0o111 != 0 && !is_library
    }
}

/// Check an export directory by presence of its artifacts
///
/// Requires exactly one platform executable, the module and every runtime
/// library. The assets folder is optional. Findings go to `log`.
pub fn validate_export_dir(dir: &Path, layout: &ExportLayout, log: &LogBuffer) -> bool {
    log.push(format!("Checking export directory: {}", dir.display()));

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log.push(format!("ERROR: Cannot read export directory: {}", e));
            return false;
        }
    };

    let mut ok = true;

    let executables: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_platform_executable(path))
        .collect();
    match executables.as_slice() {
        [exe] => log.push(format!("Found game executable: {}", file_name(exe))),
        [] => {
            log.push("ERROR: Missing game executable");
            ok = false;
        }
        many => {
            log.push(format!(
                "ERROR: Expected one game executable, found {}",
                many.len()
            ));
            ok = false;
        }
    }

    let mut require = |name: &str| {
        let exists = dir.join(name).exists();
        log.push(format!(
            "Checking: {} - {}",
            name,
            if exists { "EXISTS" } else { "MISSING" }
        ));
        ok &= exists;
    };
    require(&layout.module_file);
    for library in &layout.runtime_libraries {
        require(library);
    }

    if dir.join(ASSETS_DIR).is_dir() {
        log.push("Found Assets folder in export");
    } else {
        log.push("No Assets folder found - this is OK if game has no assets");
    }

    ok
}

/// Copy `src` into `dst` recursively, overwriting files
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// ========== Export Job ==========

#[derive(Debug, Default)]
struct ExportStatus {
    exporting: AtomicBool,
    cancel: AtomicBool,
    success: AtomicBool,
}

/// A running or finished export
pub struct ExportJob {
    status: Arc<ExportStatus>,
    log: LogBuffer,
    handle: Option<JoinHandle<()>>,
}

impl ExportJob {
    /// Start exporting on a worker thread
    pub fn start(settings: ExportSettings, config: GameConfig, sources: ExportSources) -> Self {
        let status = Arc::new(ExportStatus::default());
        status.exporting.store(true, Ordering::SeqCst);
        let log = LogBuffer::new();

        let worker_status = status.clone();
        let worker_log = log.clone();
        let handle = std::thread::spawn(move || {
            let result = run_export(&settings, config, &sources, &worker_log, &worker_status.cancel);
            let success = match result {
                Ok(valid) => valid,
                Err(e) => {
                    worker_log.push(format!("ERROR: {}", e));
                    false
                }
            };
            worker_status.success.store(success, Ordering::SeqCst);
            worker_status.exporting.store(false, Ordering::SeqCst);
        });

        Self {
            status,
            log,
            handle: Some(handle),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.status.exporting.load(Ordering::SeqCst)
    }

    /// Whether the finished export validated
    pub fn succeeded(&self) -> bool {
        !self.is_exporting() && self.status.success.load(Ordering::SeqCst)
    }

    /// Ask the worker to stop after its current step
    pub fn cancel(&self) {
        self.status.cancel.store(true, Ordering::SeqCst);
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Block until the worker is done; returns success
    pub fn wait(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                self.log.push("ERROR: Export worker panicked");
                self.status.exporting.store(false, Ordering::SeqCst);
                return false;
            }
        }
        self.succeeded()
    }
}

impl Drop for ExportJob {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
            self.wait();
        }
    }
}

fn check_cancelled(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::SeqCst) {
        Err(ProcessError::Cancelled)
    } else {
        Ok(())
    }
}

fn require_source(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ProcessError::MissingArtifact(path.to_path_buf()))
    }
}

fn run_export(
    settings: &ExportSettings,
    mut config: GameConfig,
    sources: &ExportSources,
    log: &LogBuffer,
    cancel: &AtomicBool,
) -> Result<bool> {
    log.push("Starting export...");

    require_source(&sources.runtime_executable)?;
    require_source(&sources.module)?;
    for library in &sources.runtime_libraries {
        require_source(library)?;
    }

    let out = settings.output_dir.as_path();
    fs::create_dir_all(out)?;

    check_cancelled(cancel)?;
    let exe_name = settings.executable_name();
    log.push(format!("Creating game executable: {}", exe_name));
    fs::copy(&sources.runtime_executable, out.join(&exe_name))?;

    check_cancelled(cancel)?;
    log.push("Creating game configuration...");
    config.apply_export_settings(settings);
    fs::write(out.join(DEFAULT_CONFIG_FILE), config.to_config_string())?;

    check_cancelled(cancel)?;
    let module_name = file_name(&sources.module);
    log.push(format!("Copying {}...", module_name));
    fs::copy(&sources.module, out.join(&module_name))?;

    for library in &sources.runtime_libraries {
        check_cancelled(cancel)?;
        let name = file_name(library);
        log.push(format!("Copying {}...", name));
        fs::copy(library, out.join(&name))?;
    }

    check_cancelled(cancel)?;
    copy_assets(&sources.assets_dir, &out.join(ASSETS_DIR), log)?;

    let layout = ExportLayout::for_sources(sources);
    log.push(format!("Validating export folder: {}", out.display()));
    let valid = validate_export_dir(out, &layout, log);
    if valid {
        log.push("Export completed successfully!");
    } else {
        log.push("ERROR: Export validation failed - check export folder contents");
    }
    Ok(valid)
}

fn copy_assets(src: &Path, dst: &Path, log: &LogBuffer) -> Result<()> {
    if !src.is_dir() {
        log.push("No Assets folder found - skipping asset copy");
        return Ok(());
    }

    log.push("Copying game assets...");
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if entry.file_type()?.is_dir() {
            if name_str == ENGINE_CONTENT_DIR {
                continue;
            }
            copy_dir_recursive(&entry.path(), &dst.join(&name))?;
            log.push(format!("Copied asset folder: {}", name_str));
        } else {
            fs::copy(entry.path(), dst.join(&name))?;
            log.push(format!("Copied asset file: {}", name_str));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_uses_file_names() {
        let sources = ExportSources {
            runtime_executable: PathBuf::from("bin/wave_game"),
            module: PathBuf::from("target/debug/libdemo.so"),
            runtime_libraries: vec![PathBuf::from("lib/libaudio.so")],
            assets_dir: PathBuf::from("Assets"),
        };
        let layout = ExportLayout::for_sources(&sources);
        assert_eq!(layout.module_file, "libdemo.so");
        assert_eq!(layout.runtime_libraries, vec!["libaudio.so".to_string()]);
    }

    #[test]
    fn test_copy_dir_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::write(src.join("nested/b.txt"), "b").unwrap();

        let dst = dir.path().join("dst");
        copy_dir_recursive(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_missing_directory_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogBuffer::new();
        let layout = ExportLayout {
            module_file: "libdemo.so".into(),
            runtime_libraries: Vec::new(),
        };
        assert!(!validate_export_dir(&dir.path().join("nope"), &layout, &log));
        assert!(log.contains("Cannot read export directory"));
    }

    #[test]
    fn test_assets_skip_engine_content() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Assets");
        fs::create_dir_all(src.join(ENGINE_CONTENT_DIR)).unwrap();
        fs::create_dir_all(src.join("Textures")).unwrap();
        fs::write(src.join("Textures/ball.png"), [0u8; 4]).unwrap();
        fs::write(src.join(ENGINE_CONTENT_DIR).join("icon.png"), [0u8; 4]).unwrap();

        let dst = dir.path().join("out");
        let log = LogBuffer::new();
        copy_assets(&src, &dst, &log).unwrap();
        assert!(dst.join("Textures/ball.png").exists());
        assert!(!dst.join(ENGINE_CONTENT_DIR).exists());
    }

    #[test]
    fn test_missing_assets_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogBuffer::new();
        copy_assets(&dir.path().join("Assets"), &dir.path().join("out"), &log).unwrap();
        assert!(log.contains("No Assets folder found - skipping asset copy"));
        assert!(!dir.path().join("out").exists());
    }
}
