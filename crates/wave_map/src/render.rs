//! Draw interface between maps and the host's render target
//!
//! The host owns the actual framebuffer. Maps only see a [`Renderer`], which
//! keeps them independent of the graphics backend and lets the same map code
//! run inside a dynamically loaded module.

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RAY_WHITE: Self = Self::rgb(245, 245, 245);
    pub const GRAY: Self = Self::rgb(130, 130, 130);
    pub const DARK_GRAY: Self = Self::rgb(80, 80, 80);
    pub const RED: Self = Self::rgb(230, 41, 55);
    pub const ORANGE: Self = Self::rgb(255, 161, 0);
    pub const GOLD: Self = Self::rgb(255, 200, 100);
    pub const SKY_BLUE: Self = Self::rgb(102, 191, 255);
    pub const BLANK: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Drawing surface handed to maps each frame
pub trait Renderer {
    /// Clear the whole target
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle
    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Draw a line of text with its top-left corner at (x, y)
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    },
}

/// Renderer that records draw calls instead of rasterizing them
///
/// Headless hosts hand one of these to the map every frame and forward the
/// recorded commands to whatever presents the scene.
#[derive(Debug, Default, Clone)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in submission order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop all recorded commands, keeping the allocation
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over all text drawn this frame
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Renderer for CommandBuffer {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }
}

/// Text shown when no map is loaded
pub const NO_MAP_MESSAGE: &str = "No map loaded - use goto_map() to load a map";

/// Hint shown below [`NO_MAP_MESSAGE`]
pub const REGISTER_HINT: &str = "Register maps using register_map::<YourMap>(\"MAP_ID\")";

/// Draw the diagnostic placeholder used when there is nothing to show
pub fn draw_placeholder(renderer: &mut dyn Renderer, width: f32, height: f32) {
    renderer.draw_rect(0.0, 0.0, width, height, Color::DARK_GRAY);
    renderer.draw_text(NO_MAP_MESSAGE, 50.0, 50.0, 20.0, Color::RED);
    renderer.draw_text(REGISTER_HINT, 50.0, 100.0, 16.0, Color::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_buffer_records_in_order() {
        let mut buffer = CommandBuffer::new();
        buffer.clear(Color::BLACK);
        buffer.draw_rect(1.0, 2.0, 3.0, 4.0, Color::RED);
        buffer.draw_text("hello", 0.0, 0.0, 12.0, Color::WHITE);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.commands()[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(buffer.texts().collect::<Vec<_>>(), vec!["hello"]);

        buffer.reset();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_placeholder_covers_scene() {
        let mut buffer = CommandBuffer::new();
        draw_placeholder(&mut buffer, 640.0, 360.0);

        assert_eq!(
            buffer.commands()[0],
            DrawCommand::Rect {
                x: 0.0,
                y: 0.0,
                width: 640.0,
                height: 360.0,
                color: Color::DARK_GRAY,
            }
        );
        assert!(buffer.texts().any(|t| t == NO_MAP_MESSAGE));
    }
}
