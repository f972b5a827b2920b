//! # wave_editor - Editor Session and Game Runtime
//!
//! The editor keeps a game-logic module loaded, reloads it whenever the
//! module file changes or a build finishes, and exposes the toolbar, scene
//! settings, map selection and export operations of the editor window.
//! Rendering goes into any [`wave_map::Renderer`]; the binaries record into a
//! [`wave_map::CommandBuffer`].
//!
//! ```text
//!   recompile ──► build thread ──► reload_requested ─┐
//!                                                    ▼
//!   frame() ──► ReloadCoordinator::tick ──► GameHost ──► root map
//!                  │
//!                  └─ ModuleWatcher (0.5 s mtime poll)
//! ```

pub mod args;
mod editor;
mod error;
pub mod frame_stats;
pub mod logging;
pub mod scene;

pub use args::LaunchArgs;
pub use editor::{BuildSettings, GameEditor};
pub use error::{EditorError, Result};
pub use frame_stats::FrameStats;
pub use scene::SceneSettings;

/// Crate name of the game-logic module built by default
pub const DEFAULT_MODULE_NAME: &str = "wave_demo_logic";
