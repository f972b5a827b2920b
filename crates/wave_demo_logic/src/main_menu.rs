//! Title screen

use wave_map::{Color, GameMap, MapBase, MapResult, Renderer};

/// Game title; `WAVE_DEMO_TITLE` at build time replaces it
pub const TITLE: &str = match option_env!("WAVE_DEMO_TITLE") {
    Some(title) => title,
    None => "Shadow Woods",
};
const OPTIONS: [&str; 2] = ["PLAY GAME", "EXIT"];

/// Seconds before the menu starts the level on its own
pub const AUTO_START_SECONDS: f32 = 3.0;

/// Title screen that starts the level after a short attract delay
#[derive(Debug)]
pub struct MainMenu {
    base: MapBase,
    time: f32,
    pulse_scale: f32,
    selected: usize,
    started: bool,
}

impl MainMenu {
    pub fn new() -> Self {
        Self {
            base: MapBase::new("Main Menu"),
            time: 0.0,
            pulse_scale: 1.0,
            selected: 0,
            started: false,
        }
    }
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMap for MainMenu {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }

    fn initialize(&mut self) -> MapResult<()> {
        self.time = 0.0;
        self.started = false;
        log::info!("[MainMenu] Initialized");
        Ok(())
    }

    fn update(&mut self, delta_time: f32) {
        self.time += delta_time;
        self.pulse_scale = 1.0 + (self.time * 3.0).sin() * 0.05;

        if !self.started && self.time >= AUTO_START_SECONDS {
            self.started = true;
            self.base.request_goto_map(crate::DEMO_LEVEL, false);
        }
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        let bounds = self.base.scene_bounds();
        renderer.clear(Color::BLACK);

        let title_size = 80.0;
        let title_x = (bounds.width - TITLE.len() as f32 * title_size * 0.5) / 2.0;
        renderer.draw_text(TITLE, title_x + 4.0, 254.0, title_size, Color::new(0, 0, 0, 180));
        renderer.draw_text(TITLE, title_x, 250.0, title_size, Color::GOLD);

        for (i, option) in OPTIONS.iter().enumerate() {
            let is_selected = i == self.selected;
            let size = if is_selected { 40.0 * self.pulse_scale } else { 40.0 };
            let x = (bounds.width - option.len() as f32 * size * 0.5) / 2.0;
            let y = 400.0 + i as f32 * 60.0;
            if is_selected {
                renderer.draw_text(">", x - 30.0, y, size, Color::ORANGE);
            }
            let color = if is_selected { Color::WHITE } else { Color::GRAY };
            renderer.draw_text(option, x, y, size, color);
        }
    }
}
