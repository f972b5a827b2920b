//! Named map registry
//!
//! [`MapManager`] owns a set of named map factories and at most one live map.
//! Switching maps is all-or-nothing: the replacement is constructed first and
//! the current map is only destroyed once the replacement exists.

use crate::error::{MapError, MapResult};
use crate::map::{GameMap, MapBase, MapDirectory, SceneBounds, TransitionCallback};
use crate::panic::catch_panic;
use crate::render::{draw_placeholder, Renderer};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;
use std::sync::Arc;

/// Factory producing a fresh map, or `None` when construction failed
pub type MapFactory = Box<dyn Fn() -> Option<Box<dyn GameMap>> + Send + Sync>;

/// Metadata kept for every registered map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapInfo {
    /// Human readable description
    pub description: String,
    /// Whether this map is the current one
    pub loaded: bool,
}

/// A map switch requested by a running map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub map_id: String,
    pub force_reload: bool,
}

type TransitionQueue = Arc<Mutex<VecDeque<TransitionRequest>>>;

struct MapEntry {
    factory: MapFactory,
    info: MapInfo,
}

/// Registry of named maps holding at most one current map
pub struct MapManager {
    base: MapBase,
    /// Live map; `Some` exactly when `current_id` is `Some`
    current: Option<Box<dyn GameMap>>,
    current_id: Option<String>,
    registry: HashMap<String, MapEntry>,
    /// Requests issued by maps through their transition callback
    transitions: TransitionQueue,
}

impl MapManager {
    /// Create an empty manager
    pub fn new() -> Self {
        log::debug!("[MapManager] Initialized - ready for map registration");
        Self {
            base: MapBase::new("MapManager"),
            current: None,
            current_id: None,
            registry: HashMap::new(),
            transitions: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    // ========== Registration ==========

    /// Register (or replace) a map factory under `map_id`
    ///
    /// Does not touch the current map, even when `map_id` is current.
    pub fn register<F>(&mut self, map_id: impl Into<String>, factory: F, description: impl Into<String>)
    where
        F: Fn() -> Option<Box<dyn GameMap>> + Send + Sync + 'static,
    {
        let map_id = map_id.into();
        let description = description.into();
        let description = if description.is_empty() {
            "No description".to_string()
        } else {
            description
        };

        log::info!("[MapManager] Registered map: {} - {}", map_id, description);

        let loaded = self.current_id.as_deref() == Some(map_id.as_str());
        self.registry.insert(
            map_id,
            MapEntry {
                factory: Box::new(factory),
                info: MapInfo { description, loaded },
            },
        );
    }

    /// Register a map type that can be default-constructed
    pub fn register_map<T>(&mut self, map_id: impl Into<String>, description: impl Into<String>)
    where
        T: GameMap + Default + 'static,
    {
        self.register(
            map_id,
            || Some(Box::new(T::default()) as Box<dyn GameMap>),
            description,
        );
    }

    /// Check whether a map id is registered
    pub fn is_map_registered(&self, map_id: &str) -> bool {
        self.registry.contains_key(map_id)
    }

    /// All registered ids, sorted
    pub fn available_maps(&self) -> Vec<String> {
        let mut maps: Vec<String> = self.registry.keys().cloned().collect();
        maps.sort();
        maps
    }

    /// Metadata for a registered map
    pub fn map_info(&self, map_id: &str) -> Option<&MapInfo> {
        self.registry.get(map_id).map(|entry| &entry.info)
    }

    // ========== Current Map ==========

    /// Id of the current map
    pub fn current_map_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Check whether `map_id` is the live current map
    pub fn is_current_map(&self, map_id: &str) -> bool {
        self.current.is_some() && self.current_id.as_deref() == Some(map_id)
    }

    pub fn current_map(&self) -> Option<&dyn GameMap> {
        self.current.as_deref()
    }

    pub fn current_map_mut(&mut self) -> Option<&mut (dyn GameMap + 'static)> {
        self.current.as_deref_mut()
    }

    /// Switch to `map_id`
    ///
    /// Already current and not forced: no-op success, the factory is not
    /// called. Otherwise the factory runs first; if it fails, nothing changes.
    /// On success the old map is destroyed, then the new one receives the
    /// scene bounds and a transition callback and is initialized.
    pub fn goto_map(&mut self, map_id: &str, force_reload: bool) -> MapResult<()> {
        let Some(entry) = self.registry.get(map_id) else {
            let available = self.available_maps();
            let err = MapError::unknown_map(map_id, available);
            log::error!("[MapManager] {}", err);
            return Err(err);
        };

        if self.current_id.as_deref() == Some(map_id) && !force_reload {
            log::info!("[MapManager] Map '{}' is already loaded", map_id);
            return Ok(());
        }

        log::info!("[MapManager] Switching to map: '{}'", map_id);

        let mut new_map = match catch_panic(|| (entry.factory)()) {
            Ok(Some(map)) => map,
            Ok(None) => {
                let err = MapError::FactoryReturnedNull(map_id.to_string());
                log::error!("[MapManager] {}", err);
                return Err(err);
            }
            Err(message) => {
                let err = MapError::FactoryPanicked {
                    id: map_id.to_string(),
                    message,
                };
                log::error!("[MapManager] {}", err);
                return Err(err);
            }
        };

        // The replacement exists, the old map can go.
        self.retire_current();

        let bounds = self.base.scene_bounds();
        new_map.set_scene_bounds(bounds.width, bounds.height);
        new_map.set_transition_callback(self.transition_callback());

        match catch_panic(|| new_map.initialize()) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::error!("[MapManager] {}", e);
                return Err(MapError::initialize_failed(map_id, e.to_string()));
            }
            Err(message) => {
                let err = MapError::initialize_failed(map_id, message);
                log::error!("[MapManager] {}", err);
                return Err(err);
            }
        }

        self.current = Some(new_map);
        self.current_id = Some(map_id.to_string());
        if let Some(entry) = self.registry.get_mut(map_id) {
            entry.info.loaded = true;
        }

        log::info!("[MapManager] Successfully loaded map: '{}'", map_id);
        Ok(())
    }

    /// Recreate the current map from its factory
    pub fn reload_current_map(&mut self) -> MapResult<()> {
        let Some(map_id) = self.current_id.clone() else {
            log::warn!("[MapManager] No current map to reload");
            return Err(MapError::NoCurrentMap);
        };

        log::info!("[MapManager] Reloading map: '{}'", map_id);
        self.goto_map(&map_id, true)
    }

    /// Destroy the current map and return to the empty state
    pub fn unload_current_map(&mut self) {
        if self.current.is_none() {
            log::info!("[MapManager] No map to unload");
            return;
        }

        if let Some(map_id) = &self.current_id {
            log::info!("[MapManager] Unloading map '{}'", map_id);
        }
        self.retire_current();
        self.transitions.lock().clear();
    }

    fn retire_current(&mut self) {
        // Drop the map before touching metadata so its destructor still sees
        // a consistent registry.
        drop(self.current.take());

        if let Some(old_id) = self.current_id.take() {
            if let Some(entry) = self.registry.get_mut(&old_id) {
                entry.info.loaded = false;
            }
        }
    }

    // ========== Transitions ==========

    /// Callback handed to maps so they can request a switch
    ///
    /// Only holds a weak reference: a request made after the manager is gone
    /// is logged and dropped.
    pub fn transition_callback(&self) -> TransitionCallback {
        let queue = Arc::downgrade(&self.transitions);
        Box::new(move |map_id: &str, force_reload: bool| match queue.upgrade() {
            Some(queue) => queue.lock().push_back(TransitionRequest {
                map_id: map_id.to_string(),
                force_reload,
            }),
            None => log::warn!(
                "[MapManager] Transition to '{}' requested after its manager was dropped",
                map_id
            ),
        })
    }

    /// Number of transition requests waiting to be applied
    pub fn pending_transitions(&self) -> usize {
        self.transitions.lock().len()
    }

    /// Apply the transitions requested so far
    ///
    /// Requests queued while applying (for example from a new map's
    /// `initialize`) wait for the next call. Returns how many succeeded.
    pub fn process_transitions(&mut self) -> usize {
        let pending: Vec<TransitionRequest> = self.transitions.lock().drain(..).collect();

        let mut applied = 0;
        for request in pending {
            match self.goto_map(&request.map_id, request.force_reload) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!(
                    "[MapManager] Transition to '{}' failed: {}",
                    request.map_id,
                    e
                ),
            }
        }
        applied
    }

    // ========== Diagnostics ==========

    /// Multi-line summary of the registry state
    pub fn debug_info(&self) -> String {
        let mut out = String::from("=== MapManager Debug Info ===\n");
        let _ = writeln!(
            out,
            "Current Map: {}",
            self.current_id.as_deref().unwrap_or("None")
        );
        let _ = write!(out, "Registered Maps ({}):", self.registry.len());

        for map_id in self.available_maps() {
            if let Some(info) = self.map_info(&map_id) {
                let _ = write!(
                    out,
                    "\n  - '{}': {} [{}]",
                    map_id,
                    info.description,
                    if info.loaded { "LOADED" } else { "NOT LOADED" }
                );
            }
        }

        if self.registry.is_empty() {
            out.push_str("\n  (No maps registered - call register_map::<YourMap>() to register maps)");
        }
        out
    }
}

impl Default for MapManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MapManager {
    fn drop(&mut self) {
        self.retire_current();
        log::debug!("[MapManager] Destroyed - all maps cleaned up");
    }
}

impl GameMap for MapManager {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }

    fn initialize(&mut self) -> MapResult<()> {
        let bounds = self.base.scene_bounds();
        let callback = self.transition_callback();

        if let Some(map) = self.current.as_mut() {
            map.set_scene_bounds(bounds.width, bounds.height);
            map.set_transition_callback(callback);
            map.initialize()?;
            log::info!(
                "[MapManager] Initialized with map: '{}'",
                self.current_id.as_deref().unwrap_or_default()
            );
        } else if self.registry.is_empty() {
            log::info!("[MapManager] No maps registered yet. Register maps using register_map::<YourMap>()");
        } else {
            log::info!(
                "[MapManager] Maps registered but none loaded yet: {}",
                self.available_maps().join(", ")
            );
        }
        Ok(())
    }

    fn update(&mut self, delta_time: f32) {
        if let Some(map) = self.current.as_mut() {
            map.update(delta_time);
        }
        self.process_transitions();
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        match self.current.as_mut() {
            Some(map) => map.draw(renderer),
            None => {
                let bounds = self.base.scene_bounds();
                draw_placeholder(renderer, bounds.width, bounds.height);
            }
        }
    }

    fn set_scene_bounds(&mut self, width: f32, height: f32) {
        self.base.set_scene_bounds(width, height);
        if let Some(map) = self.current.as_mut() {
            map.set_scene_bounds(width, height);
        }
    }

    fn scene_bounds(&self) -> SceneBounds {
        match &self.current {
            Some(map) => map.scene_bounds(),
            None => self.base.scene_bounds(),
        }
    }

    fn as_directory(&mut self) -> Option<&mut dyn MapDirectory> {
        Some(self)
    }
}

impl MapDirectory for MapManager {
    fn available_maps(&self) -> Vec<String> {
        MapManager::available_maps(self)
    }

    fn current_map_id(&self) -> Option<String> {
        MapManager::current_map_id(self).map(str::to_string)
    }

    fn goto_map(&mut self, map_id: &str, force_reload: bool) -> MapResult<()> {
        MapManager::goto_map(self, map_id, force_reload)
    }

    fn reload_current_map(&mut self) -> MapResult<()> {
        MapManager::reload_current_map(self)
    }
}
