//! A ball bouncing around the scene

use wave_map::{Color, GameMap, MapBase, MapResult, Renderer};

pub const BALL_SIZE: f32 = 24.0;
const BALL_SPEED: f32 = 360.0;

/// Wall hits before the level returns to the menu
pub const BOUNCES_PER_ROUND: u32 = 12;

#[derive(Debug)]
pub struct DemoLevel {
    base: MapBase,
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    bounces: u32,
    finished: bool,
}

impl DemoLevel {
    pub fn new() -> Self {
        Self {
            base: MapBase::new("Demo Level"),
            x: 0.0,
            y: 0.0,
            vx: BALL_SPEED,
            vy: BALL_SPEED * 0.75,
            bounces: 0,
            finished: false,
        }
    }

    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl Default for DemoLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMap for DemoLevel {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }

    fn initialize(&mut self) -> MapResult<()> {
        let bounds = self.base.scene_bounds();
        self.x = (bounds.width - BALL_SIZE) / 2.0;
        self.y = (bounds.height - BALL_SIZE) / 2.0;
        self.bounces = 0;
        self.finished = false;
        log::info!("[DemoLevel] Initialized in {}x{} scene", bounds.width, bounds.height);
        Ok(())
    }

    fn update(&mut self, delta_time: f32) {
        if self.finished {
            return;
        }
        let bounds = self.base.scene_bounds();
        let max_x = (bounds.width - BALL_SIZE).max(0.0);
        let max_y = (bounds.height - BALL_SIZE).max(0.0);

        self.x += self.vx * delta_time;
        self.y += self.vy * delta_time;

        if self.x <= 0.0 || self.x >= max_x {
            self.x = self.x.clamp(0.0, max_x);
            self.vx = -self.vx;
            self.bounces += 1;
        }
        if self.y <= 0.0 || self.y >= max_y {
            self.y = self.y.clamp(0.0, max_y);
            self.vy = -self.vy;
            self.bounces += 1;
        }

        if self.bounces >= BOUNCES_PER_ROUND {
            self.finished = true;
            log::info!("[DemoLevel] Round over after {} bounces", self.bounces);
            self.base.request_goto_map(crate::MAIN_MENU, false);
        }
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        renderer.clear(Color::RAY_WHITE);
        renderer.draw_rect(self.x, self.y, BALL_SIZE, BALL_SIZE, Color::RED);
        renderer.draw_text(
            &format!("Bounces: {}/{}", self.bounces, BOUNCES_PER_ROUND),
            10.0,
            10.0,
            20.0,
            Color::DARK_GRAY,
        );
    }
}
