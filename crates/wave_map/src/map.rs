//! The game map abstraction
//!
//! A map is the unit of swappable game logic. It may be implemented in the
//! host process or inside a dynamically loaded module; either way the host
//! only talks to it through [`GameMap`].

use crate::error::MapResult;
use crate::render::Renderer;

/// Default target frame rate for new maps
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Size of the scene viewport a map draws into
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneBounds {
    pub width: f32,
    pub height: f32,
}

impl SceneBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Capability injected into a map so it can ask its owner to switch maps
///
/// Arguments are the target map id and whether to force a reload when the
/// target is already current.
pub type TransitionCallback = Box<dyn Fn(&str, bool) + Send + Sync>;

/// State shared by every map implementation
pub struct MapBase {
    name: String,
    bounds: SceneBounds,
    target_fps: u32,
    transition: Option<TransitionCallback>,
}

impl MapBase {
    /// Create map state with the given display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: SceneBounds::default(),
            target_fps: DEFAULT_TARGET_FPS,
            transition: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn scene_bounds(&self) -> SceneBounds {
        self.bounds
    }

    pub fn set_scene_bounds(&mut self, width: f32, height: f32) {
        self.bounds = SceneBounds::new(width, height);
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps;
    }

    pub fn set_transition_callback(&mut self, callback: TransitionCallback) {
        self.transition = Some(callback);
    }

    pub fn has_transition_callback(&self) -> bool {
        self.transition.is_some()
    }

    /// Ask the owner to switch to another map
    ///
    /// The switch happens after the current update returns, never while the
    /// requesting map is still on the stack.
    pub fn request_goto_map(&self, map_id: &str, force_reload: bool) {
        match &self.transition {
            Some(callback) => callback(map_id, force_reload),
            None => log::warn!(
                "Map '{}' requested '{}' but no transition callback is set",
                self.name,
                map_id
            ),
        }
    }
}

impl Default for MapBase {
    fn default() -> Self {
        Self::new("DefaultMap")
    }
}

impl std::fmt::Debug for MapBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapBase")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("target_fps", &self.target_fps)
            .field("has_transition", &self.transition.is_some())
            .finish()
    }
}

/// Read/switch access to a registry of named maps
///
/// Implemented by [`crate::MapManager`] and by foreign maps that export a
/// registry across the module boundary.
pub trait MapDirectory {
    /// Ids of every registered map
    fn available_maps(&self) -> Vec<String>;

    /// Id of the loaded map, if any
    fn current_map_id(&self) -> Option<String>;

    /// Switch to a registered map
    fn goto_map(&mut self, map_id: &str, force_reload: bool) -> MapResult<()>;

    /// Recreate the current map from its factory
    fn reload_current_map(&mut self) -> MapResult<()>;
}

/// A polymorphic game map
///
/// Only `base`/`base_mut` are required; everything else has a default that
/// operates on the shared [`MapBase`].
pub trait GameMap: Send {
    fn base(&self) -> &MapBase;

    fn base_mut(&mut self) -> &mut MapBase;

    /// Called once after the map became current
    fn initialize(&mut self) -> MapResult<()> {
        Ok(())
    }

    /// Advance simulation by `delta_time` seconds
    fn update(&mut self, delta_time: f32) {
        let _ = delta_time;
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        let _ = renderer;
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn set_scene_bounds(&mut self, width: f32, height: f32) {
        self.base_mut().set_scene_bounds(width, height);
    }

    fn scene_bounds(&self) -> SceneBounds {
        self.base().scene_bounds()
    }

    fn set_target_fps(&mut self, fps: u32) {
        self.base_mut().set_target_fps(fps);
    }

    fn target_fps(&self) -> u32 {
        self.base().target_fps()
    }

    fn set_transition_callback(&mut self, callback: TransitionCallback) {
        self.base_mut().set_transition_callback(callback);
    }

    /// Registry access if this map is itself a map registry
    fn as_directory(&mut self) -> Option<&mut dyn MapDirectory> {
        None
    }
}

/// A map that does nothing
///
/// Useful as a stand-in when a host needs some map but has none to offer.
#[derive(Debug, Default)]
pub struct EmptyMap {
    base: MapBase,
}

impl EmptyMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameMap for EmptyMap {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }
}
