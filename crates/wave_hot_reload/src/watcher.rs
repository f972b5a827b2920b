//! Modification-time polling of the module file
//!
//! Checks run on a fixed interval rather than every frame. The first
//! observation of a path only records a baseline; it never reports a change.

use crate::error::{ReloadError, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Outcome of comparing a path against its last known timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    Changed,
    Unchanged,
}

/// Modification time of `path`
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| ReloadError::stat_error(path, e))
}

/// Compare the current modification time of `path` against `last`
///
/// Returns the status together with the observed time. Without a previous
/// timestamp the result is always `Unchanged`.
pub fn poll(path: &Path, last: Option<SystemTime>) -> Result<(WatchStatus, SystemTime)> {
    let modified = modified_time(path)?;
    let status = match last {
        Some(previous) if previous != modified => WatchStatus::Changed,
        _ => WatchStatus::Unchanged,
    };
    Ok((status, modified))
}

/// Watches one module file for modification
#[derive(Debug)]
pub struct ModuleWatcher {
    path: Option<PathBuf>,
    last_modified: Option<SystemTime>,
    interval: Duration,
    last_check: Option<Instant>,
}

impl ModuleWatcher {
    /// Create a watcher checking at most once per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            path: None,
            last_modified: None,
            interval,
            last_check: None,
        }
    }

    /// Start watching `path`; the next observation becomes the baseline
    pub fn watch(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        log::debug!("Watching module for changes: {}", path.display());
        self.path = Some(path);
        self.last_modified = None;
    }

    /// Start watching `path` with an already known timestamp
    pub fn watch_with_baseline(&mut self, path: impl Into<PathBuf>, modified: Option<SystemTime>) {
        self.watch(path);
        self.last_modified = modified;
    }

    /// Stop watching
    pub fn unwatch(&mut self) {
        self.path = None;
        self.last_modified = None;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a check is due at `now`; starts a new interval when it is
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.last_check {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_check = Some(now);
                true
            }
        }
    }

    /// Stat the watched path right away
    ///
    /// A `Changed` result is consumed: the observed time becomes the new
    /// baseline, so the same modification is reported only once.
    pub fn observe(&mut self) -> Result<WatchStatus> {
        let path = self.path.as_deref().ok_or(ReloadError::NoModulePath)?;
        let (status, modified) = poll(path, self.last_modified)?;

        if self.last_modified.is_none() {
            log::debug!("Recorded baseline timestamp for {}", path.display());
        }
        self.last_modified = Some(modified);
        Ok(status)
    }

    /// Observe the watched path if a check is due at `now`
    pub fn check(&mut self, now: Instant) -> Result<WatchStatus> {
        if self.path.is_none() || !self.poll_due(now) {
            return Ok(WatchStatus::Unchanged);
        }
        self.observe()
    }

    /// Record the current timestamp as the baseline without reporting
    pub fn mark_current(&mut self) -> Result<()> {
        let path = self.path.as_deref().ok_or(ReloadError::NoModulePath)?;
        self.last_modified = Some(modified_time(path)?);
        Ok(())
    }
}

impl Default for ModuleWatcher {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
