//! # wave_map - Game Maps
//!
//! The unit of swappable game logic in Wave Engine is a *map*. This crate
//! defines what a map is and who owns it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │    GameHost     │────▶│  root GameMap   │  (native or from a module)
//! │ (engine slot)   │     └────────┬────────┘
//! └─────────────────┘              │ often a
//!                                  ▼
//!                         ┌─────────────────┐     ┌─────────────────┐
//!                         │   MapManager    │────▶│ current GameMap │
//!                         │ (named factories)│◀────│ (transition cb) │
//!                         └─────────────────┘     └─────────────────┘
//! ```
//!
//! A map asks for a switch through the transition callback it was given at
//! creation. The manager applies the request after the map's `update`
//! returns, so a map is never destroyed while it is running.
//!
//! ## Example
//!
//! ```
//! use wave_map::prelude::*;
//!
//! #[derive(Default)]
//! struct Menu {
//!     base: MapBase,
//! }
//!
//! impl GameMap for Menu {
//!     fn base(&self) -> &MapBase { &self.base }
//!     fn base_mut(&mut self) -> &mut MapBase { &mut self.base }
//! }
//!
//! let mut manager = MapManager::new();
//! manager.register_map::<Menu>("Menu", "Title screen");
//! manager.goto_map("Menu", false).unwrap();
//! assert!(manager.is_current_map("Menu"));
//! ```

mod error;
mod host;
mod manager;
mod map;
mod panic;
mod render;

pub use error::{MapError, MapResult};
pub use host::GameHost;
pub use manager::{MapFactory, MapInfo, MapManager, TransitionRequest};
pub use map::{
    EmptyMap, GameMap, MapBase, MapDirectory, SceneBounds, TransitionCallback, DEFAULT_TARGET_FPS,
};
pub use panic::{catch_panic, panic_message};
pub use render::{
    draw_placeholder, Color, CommandBuffer, DrawCommand, Renderer, NO_MAP_MESSAGE, REGISTER_HINT,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{MapError, MapResult};
    pub use crate::host::GameHost;
    pub use crate::manager::MapManager;
    pub use crate::map::{GameMap, MapBase, MapDirectory, SceneBounds};
    pub use crate::render::{Color, CommandBuffer, Renderer};
}
