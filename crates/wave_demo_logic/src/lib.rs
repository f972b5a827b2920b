//! # wave_demo_logic - Sample Game Logic
//!
//! Built as a shared library and loaded by the editor or the game runtime.
//! The root map is a [`MapManager`] with a title screen and a level; edit
//! either one, rebuild, and the running editor swaps the new code in.

mod demo_level;
mod main_menu;

pub use demo_level::DemoLevel;
pub use main_menu::MainMenu;

use wave_map::{GameMap, MapManager};

pub const MAIN_MENU: &str = "MainMenu";
pub const DEMO_LEVEL: &str = "DemoLevel";

/// Root map of the module
pub fn create_game_map() -> Option<Box<dyn GameMap>> {
    let mut manager = MapManager::new();
    manager.register_map::<MainMenu>(MAIN_MENU, "Title screen");
    manager.register_map::<DemoLevel>(DEMO_LEVEL, "Bouncing ball level");

    if let Err(e) = manager.goto_map(MAIN_MENU, false) {
        log::error!("Could not open the main menu: {}", e);
        return None;
    }
    Some(Box::new(manager))
}

wave_module::export_game_map!(create_game_map);
