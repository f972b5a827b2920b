//! # wave_hot_reload - Game Logic Hot-Reload
//!
//! Watches the game-logic module on disk and swaps it out while the host
//! keeps running.
//!
//! ## Reload Sequence
//!
//! ```text
//!  file changed ──▶ load new module ──▶ create new map ──┐
//!                        │ fail              │ fail       │
//!                        ▼                   ▼            ▼
//!                   keep running        unload new,   destroy old map
//!                                       keep running       │
//!                                                          ▼
//!                                                   release old module
//!                                                          │
//!                                                          ▼
//!                                            install + initialize new map
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use wave_hot_reload::{HotReloadConfig, ReloadCoordinator};
//!
//! let mut coordinator = ReloadCoordinator::new(HotReloadConfig::default());
//! coordinator.load_game_logic("target/debug/libgame_logic.so")?;
//! coordinator.set_playing(true);
//!
//! loop {
//!     coordinator.tick(Instant::now(), delta_time, &mut renderer);
//! }
//! ```

mod config;
mod coordinator;
mod error;
mod loader;
mod watcher;

pub use config::HotReloadConfig;
pub use coordinator::ReloadCoordinator;
pub use error::{ReloadError, Result};
pub use loader::{LibraryLoader, LogicModule, ModuleLease, ModuleLoader, SHADOW_DIR_NAME};
pub use watcher::{modified_time, poll, ModuleWatcher, WatchStatus};
