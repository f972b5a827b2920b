//! The host-side slot holding the running root map

use crate::error::{MapError, MapResult};
use crate::manager::TransitionRequest;
use crate::map::{GameMap, MapDirectory, SceneBounds, TransitionCallback, DEFAULT_TARGET_FPS};
use crate::panic::catch_panic;
use crate::render::{draw_placeholder, Renderer};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Owns the root map of a running game and drives it each frame
///
/// The root map is exclusively owned here. It may be a plain map or a
/// registry exposing [`MapDirectory`]; transitions requested by the root are
/// routed into that directory.
pub struct GameHost {
    map: Option<Box<dyn GameMap>>,
    bounds: SceneBounds,
    target_fps: u32,
    transitions: Arc<Mutex<VecDeque<TransitionRequest>>>,
}

impl GameHost {
    /// Create an empty host drawing into a scene of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            map: None,
            bounds: SceneBounds::new(width, height),
            target_fps: DEFAULT_TARGET_FPS,
            transitions: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }

    pub fn map(&self) -> Option<&dyn GameMap> {
        self.map.as_deref()
    }

    pub fn map_mut(&mut self) -> Option<&mut (dyn GameMap + 'static)> {
        self.map.as_deref_mut()
    }

    /// Install a new root map, destroying the previous one first
    ///
    /// The new map receives the host's scene bounds, target frame rate and a
    /// transition callback, then `initialize` runs. If initialization fails
    /// the map is discarded and the host stays empty.
    pub fn set_map(&mut self, map: Option<Box<dyn GameMap>>) -> MapResult<()> {
        drop(self.map.take());
        self.transitions.lock().clear();

        let Some(mut map) = map else {
            return Ok(());
        };

        map.set_scene_bounds(self.bounds.width, self.bounds.height);
        map.set_target_fps(self.target_fps);
        map.set_transition_callback(self.transition_callback());

        let name = map.name().to_string();
        match catch_panic(|| map.initialize()) {
            Ok(Ok(())) => {
                log::info!("Map '{}' installed", name);
                self.map = Some(map);
                Ok(())
            }
            Ok(Err(e)) => {
                log::error!("Map '{}' failed to initialize, host left empty: {}", name, e);
                Err(MapError::initialize_failed(name, e.to_string()))
            }
            Err(message) => {
                log::error!("Map '{}' panicked in initialize, host left empty: {}", name, message);
                Err(MapError::initialize_failed(name, message))
            }
        }
    }

    /// Remove the root map without destroying it
    pub fn take_map(&mut self) -> Option<Box<dyn GameMap>> {
        self.transitions.lock().clear();
        self.map.take()
    }

    /// Re-run `initialize` on the current map
    pub fn reset_map(&mut self) -> MapResult<()> {
        let Some(map) = self.map.as_mut() else {
            return Err(MapError::NoCurrentMap);
        };

        let name = map.name().to_string();
        match catch_panic(|| map.initialize()) {
            Ok(result) => result,
            Err(message) => {
                log::error!("Map '{}' panicked during reset: {}", name, message);
                Err(MapError::initialize_failed(name, message))
            }
        }
    }

    /// Advance the root map and apply any transitions it requested
    pub fn update(&mut self, delta_time: f32) {
        if let Some(map) = self.map.as_mut() {
            if let Err(message) = catch_panic(|| map.update(delta_time)) {
                log::error!("Map '{}' panicked in update: {}", map.name(), message);
            }
        }
        self.process_transitions();
    }

    /// Draw the root map, or the placeholder when there is none
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        match self.map.as_mut() {
            Some(map) => {
                if let Err(message) = catch_panic(|| map.draw(renderer)) {
                    log::error!("Map '{}' panicked in draw: {}", map.name(), message);
                }
            }
            None => draw_placeholder(renderer, self.bounds.width, self.bounds.height),
        }
    }

    pub fn scene_bounds(&self) -> SceneBounds {
        self.bounds
    }

    /// Resize the scene, forwarding to the root map
    pub fn set_scene_bounds(&mut self, width: f32, height: f32) {
        self.bounds = SceneBounds::new(width, height);
        if let Some(map) = self.map.as_mut() {
            map.set_scene_bounds(width, height);
        }
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps;
        if let Some(map) = self.map.as_mut() {
            map.set_target_fps(fps);
        }
    }

    /// Registry interface of the root map, if it has one
    pub fn directory(&mut self) -> Option<&mut dyn MapDirectory> {
        self.map.as_mut().and_then(|map| map.as_directory())
    }

    /// Id of the map currently shown by the root registry
    pub fn current_map_id(&mut self) -> Option<String> {
        self.directory().and_then(|dir| dir.current_map_id())
    }

    fn transition_callback(&self) -> TransitionCallback {
        let queue = Arc::downgrade(&self.transitions);
        Box::new(move |map_id: &str, force_reload: bool| {
            if let Some(queue) = queue.upgrade() {
                queue.lock().push_back(TransitionRequest {
                    map_id: map_id.to_string(),
                    force_reload,
                });
            }
        })
    }

    fn process_transitions(&mut self) {
        let pending: Vec<TransitionRequest> = self.transitions.lock().drain(..).collect();
        for request in pending {
            match self.directory() {
                Some(directory) => {
                    if let Err(e) = directory.goto_map(&request.map_id, request.force_reload) {
                        log::warn!("Transition to '{}' failed: {}", request.map_id, e);
                    }
                }
                None => log::warn!(
                    "Root map requested '{}' but it has no map registry",
                    request.map_id
                ),
            }
        }
    }
}

impl Default for GameHost {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
