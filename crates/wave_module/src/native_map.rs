//! Host-side view of a map that lives inside a module

use crate::ffi::*;
use std::any::Any;
use std::ffi::c_void;
use std::sync::Arc;
use wave_map::{
    catch_panic, GameMap, MapBase, MapDirectory, MapError, MapResult, Renderer, SceneBounds,
    TransitionCallback,
};

/// A [`GameMap`] whose code lives in a loaded module
///
/// Holds a strong reference to its module, so the code behind the vtable
/// stays mapped for as long as this value exists. Dropping it destroys the
/// foreign map first and releases the module reference last.
pub struct NativeMap {
    handle: MapHandle,
    vtable: FfiMapVTable,
    /// Host-side mirror of name, bounds and target fps
    base: MapBase,
    /// Callback the foreign map calls back into; shared for a stable address
    transition: Option<Arc<TransitionCallback>>,
    module: Arc<dyn Any + Send + Sync>,
}

impl NativeMap {
    /// Wrap a foreign map object
    ///
    /// Returns `None` for a null handle or vtable.
    ///
    /// # Safety
    ///
    /// `object` must come from a module export (or [`crate::export`]) and
    /// must not be owned by anyone else. `module` must keep the code behind
    /// the vtable loaded.
    pub unsafe fn from_raw(object: FfiMapObject, module: Arc<dyn Any + Send + Sync>) -> Option<Self> {
        if object.is_null() {
            return None;
        }

        let vtable = *object.vtable;
        let mut map = Self {
            handle: object.handle,
            vtable,
            base: MapBase::default(),
            transition: None,
            module,
        };

        if let Some(name) = vtable.name {
            let mut collector = StringCollector::new();
            name(map.handle, collector.sink());
            if let Some(n) = collector.strings.pop() {
                map.base.set_name(n);
            }
        }
        Some(map)
    }

    /// Strong reference to whatever keeps this map's code loaded
    pub fn module(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.module
    }

    fn call_fallible(
        &self,
        entry: Option<impl FnOnce(FfiStrSink) -> bool>,
        what: &str,
    ) -> MapResult<()> {
        let Some(entry) = entry else {
            return Err(MapError::Foreign(format!(
                "Map '{}' does not support {}",
                self.base.name(),
                what
            )));
        };

        let mut errors = StringCollector::new();
        if entry(errors.sink()) {
            Ok(())
        } else {
            Err(MapError::Foreign(errors.joined()))
        }
    }
}

impl Drop for NativeMap {
    fn drop(&mut self) {
        match self.vtable.destroy {
            Some(destroy) => destroy(self.handle),
            None => log::warn!(
                "Map '{}' has no destroy entry, leaking it",
                self.base.name()
            ),
        }
        self.handle = MapHandle::null();
        log::debug!("Destroyed native map '{}'", self.base.name());
    }
}

// ========== Renderer Bridge ==========

fn with_renderer(user_data: *mut c_void, f: impl FnOnce(&mut dyn Renderer)) {
    if user_data.is_null() {
        return;
    }
    let renderer = unsafe { &mut *(user_data as *mut &mut dyn Renderer) };
    if let Err(message) = catch_panic(|| f(&mut **renderer)) {
        log::error!("Renderer panicked: {}", message);
    }
}

extern "C" fn render_clear(user_data: *mut c_void, color: FfiColor) {
    with_renderer(user_data, |r| r.clear(color.into()));
}

extern "C" fn render_rect(user_data: *mut c_void, x: f32, y: f32, w: f32, h: f32, color: FfiColor) {
    with_renderer(user_data, |r| r.draw_rect(x, y, w, h, color.into()));
}

extern "C" fn render_text(
    user_data: *mut c_void,
    ptr: *const u8,
    len: usize,
    x: f32,
    y: f32,
    size: f32,
    color: FfiColor,
) {
    let text = unsafe { string_from_raw(ptr, len) };
    with_renderer(user_data, |r| r.draw_text(&text, x, y, size, color.into()));
}

extern "C" fn forward_transition(user_data: *mut c_void, ptr: *const u8, len: usize, force: bool) {
    if user_data.is_null() {
        return;
    }
    let callback = unsafe { &*(user_data as *const TransitionCallback) };
    let map_id = unsafe { string_from_raw(ptr, len) };
    if let Err(message) = catch_panic(|| callback(&map_id, force)) {
        log::error!("Transition callback panicked: {}", message);
    }
}

// ========== GameMap ==========

impl GameMap for NativeMap {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }

    fn initialize(&mut self) -> MapResult<()> {
        let handle = self.handle;
        match self.vtable.initialize {
            Some(initialize) => self.call_fallible(Some(|errors| initialize(handle, errors)), "initialize"),
            None => Ok(()),
        }
    }

    fn update(&mut self, delta_time: f32) {
        if let Some(update) = self.vtable.update {
            if !update(self.handle, delta_time) {
                log::error!("Map '{}' failed during update", self.base.name());
            }
        }
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        let Some(draw) = self.vtable.draw else {
            return;
        };

        let mut target: &mut dyn Renderer = renderer;
        let bridge = FfiRenderer {
            user_data: &mut target as *mut &mut dyn Renderer as *mut c_void,
            clear: render_clear,
            draw_rect: render_rect,
            draw_text: render_text,
        };
        if !draw(self.handle, &bridge) {
            log::error!("Map '{}' failed during draw", self.base.name());
        }
    }

    fn set_scene_bounds(&mut self, width: f32, height: f32) {
        self.base.set_scene_bounds(width, height);
        if let Some(set_bounds) = self.vtable.set_scene_bounds {
            set_bounds(self.handle, width, height);
        }
    }

    fn scene_bounds(&self) -> SceneBounds {
        self.base.scene_bounds()
    }

    fn set_target_fps(&mut self, fps: u32) {
        self.base.set_target_fps(fps);
        if let Some(set_fps) = self.vtable.set_target_fps {
            set_fps(self.handle, fps);
        }
    }

    fn set_transition_callback(&mut self, callback: TransitionCallback) {
        let shared = Arc::new(callback);

        if let Some(set_sink) = self.vtable.set_transition_sink {
            let sink = FfiTransitionSink {
                user_data: Arc::as_ptr(&shared) as *mut c_void,
                request: forward_transition,
            };
            set_sink(self.handle, sink);
        }

        let local = shared.clone();
        self.base
            .set_transition_callback(Box::new(move |map_id: &str, force: bool| (**local)(map_id, force)));
        // The previous callback is released only after the foreign map let go of it.
        self.transition = Some(shared);
    }

    fn as_directory(&mut self) -> Option<&mut dyn MapDirectory> {
        let has_directory = self.vtable.has_directory?;
        if has_directory(self.handle) {
            Some(self)
        } else {
            None
        }
    }
}

// ========== MapDirectory ==========

impl MapDirectory for NativeMap {
    fn available_maps(&self) -> Vec<String> {
        let mut collector = StringCollector::new();
        if let Some(available) = self.vtable.available_maps {
            available(self.handle, collector.sink());
        }
        collector.strings
    }

    fn current_map_id(&self) -> Option<String> {
        let current = self.vtable.current_map_id?;
        let mut collector = StringCollector::new();
        if current(self.handle, collector.sink()) {
            collector.strings.pop()
        } else {
            None
        }
    }

    fn goto_map(&mut self, map_id: &str, force_reload: bool) -> MapResult<()> {
        let handle = self.handle;
        let entry = self.vtable.goto_map.map(|goto| {
            move |errors| goto(handle, map_id.as_ptr(), map_id.len(), force_reload, errors)
        });
        self.call_fallible(entry, "goto_map")
    }

    fn reload_current_map(&mut self) -> MapResult<()> {
        let handle = self.handle;
        let entry = self
            .vtable
            .reload_current_map
            .map(|reload| move |errors| reload(handle, errors));
        self.call_fallible(entry, "reload_current_map")
    }
}
