//! # wave_module - Dynamic Game-Logic Modules
//!
//! Game logic is compiled into a shared library (DLL/SO/DYLIB) that the
//! editor loads, runs and swaps out while it keeps running.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  Game logic     │────▶│  cdylib         │  export_game_map!(factory)
//! │  (GameMap impls)│     │  (module)       │
//! └─────────────────┘     └────────┬────────┘
//!                                  │ C ABI (ffi)
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │   GameModule    │◀────│   libloading    │
//! │  (host side)    │     │                 │
//! └────────┬────────┘     └─────────────────┘
//!          │ create_map
//!          ▼
//! ┌─────────────────┐
//! │   NativeMap     │ ◀── holds Arc<GameModule>
//! │  (dyn GameMap)  │
//! └─────────────────┘
//! ```
//!
//! Rust trait objects never cross the boundary. The module hands out a
//! handle plus a `#[repr(C)]` function table, and [`NativeMap`] turns that
//! back into a [`wave_map::GameMap`] on the host side.
//!
//! ## Module Side
//!
//! ```ignore
//! use wave_map::prelude::*;
//!
//! fn create_game_map() -> Option<Box<dyn GameMap>> {
//!     let mut manager = MapManager::new();
//!     manager.register_map::<MainMenu>("MainMenu", "Title screen");
//!     manager.goto_map("MainMenu", false).ok()?;
//!     Some(Box::new(manager))
//! }
//!
//! wave_module::export_game_map!(create_game_map);
//! ```
//!
//! ## Host Side
//!
//! ```ignore
//! let module = Arc::new(GameModule::load("target/debug/libgame_logic.so")?);
//! let map = module.create_map()?;
//! host.set_map(Some(Box::new(map)))?;
//! ```

mod error;
pub mod export;
pub mod ffi;
mod library;
mod native_map;

pub use error::{ModuleError, Result};
pub use library::{unload, GameModule, ModuleInfo};
pub use native_map::NativeMap;

/// Platform file name for a module called `name`
///
/// `game_logic` becomes `libgame_logic.so`, `libgame_logic.dylib` or
/// `game_logic.dll`.
pub fn library_filename(name: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        name,
        std::env::consts::DLL_SUFFIX
    )
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ModuleError, Result};
    pub use crate::library::{GameModule, ModuleInfo};
    pub use crate::native_map::NativeMap;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_filename() {
        let name = library_filename("game_logic");
        assert!(name.contains("game_logic"));
        assert!(name.ends_with(std::env::consts::DLL_SUFFIX));
    }
}
