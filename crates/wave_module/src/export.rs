//! Module-side glue
//!
//! A game-logic crate builds as a `cdylib` and invokes
//! [`export_game_map!`](crate::export_game_map) once. The macro emits the C
//! exports; the functions here adapt a `Box<dyn GameMap>` to the boundary
//! vtable. No panic ever unwinds out of an exported function.

use crate::ffi::*;
use std::ffi::c_void;
use std::sync::OnceLock;
use wave_map::{catch_panic, Color, GameMap, Renderer};

struct ExportedMap {
    map: Box<dyn GameMap>,
}

static MAP_VTABLE: FfiMapVTable = FfiMapVTable {
    destroy: Some(map_destroy),
    initialize: Some(map_initialize),
    update: Some(map_update),
    draw: Some(map_draw),
    name: Some(map_name),
    set_scene_bounds: Some(map_set_scene_bounds),
    set_target_fps: Some(map_set_target_fps),
    set_transition_sink: Some(map_set_transition_sink),
    has_directory: Some(map_has_directory),
    available_maps: Some(map_available_maps),
    current_map_id: Some(map_current_map_id),
    goto_map: Some(map_goto_map),
    reload_current_map: Some(map_reload_current_map),
};

/// Run a factory and hand the result across the boundary
///
/// A `None` result or a panic yields a null object.
pub fn create_exported<F>(factory: F) -> FfiMapObject
where
    F: FnOnce() -> Option<Box<dyn GameMap>>,
{
    match catch_panic(factory) {
        Ok(Some(map)) => export_map(map),
        Ok(None) => {
            log::error!("Game map factory returned no map");
            FfiMapObject::null()
        }
        Err(message) => {
            log::error!("Game map factory panicked: {}", message);
            FfiMapObject::null()
        }
    }
}

/// Transfer ownership of a map to whoever holds the returned object
///
/// The receiver must eventually call the vtable's `destroy`.
pub fn export_map(map: Box<dyn GameMap>) -> FfiMapObject {
    let exported = Box::new(ExportedMap { map });
    FfiMapObject {
        handle: MapHandle {
            ptr: Box::into_raw(exported) as *mut c_void,
        },
        vtable: &MAP_VTABLE,
    }
}

/// Module description; both strings must end with a NUL byte
pub fn module_info(name: &'static str, version: &'static str) -> FfiModuleInfo {
    debug_assert!(name.ends_with('\0') && version.ends_with('\0'));
    FfiModuleInfo {
        api_version: WAVE_MODULE_API_VERSION,
        name: name.as_ptr().cast(),
        version: version.as_ptr().cast(),
    }
}

// ========== Logging ==========

struct ModuleLogger;

static LOGGER: ModuleLogger = ModuleLogger;
static LOG_SINK: OnceLock<FfiLogSink> = OnceLock::new();

impl log::Log for ModuleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = LOG_SINK.get() {
            let target = record.target();
            let message = record.args().to_string();
            (sink.write)(
                level_to_raw(record.level()),
                target.as_ptr(),
                target.len(),
                message.as_ptr(),
                message.len(),
            );
        }
    }

    fn flush(&self) {}
}

/// Route this module's `log` records to the host
///
/// Only the first call has an effect.
pub fn install_logger(sink: FfiLogSink, max_level: u32) {
    if LOG_SINK.set(sink).is_err() {
        return;
    }
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_filter_from_raw(max_level));
    }
}

// ========== VTable Entries ==========

/// Run `f` on the map behind `handle`, containing panics
fn guard<R>(handle: MapHandle, f: impl FnOnce(&mut dyn GameMap) -> R) -> Result<R, String> {
    let exported = unsafe { (handle.ptr as *mut ExportedMap).as_mut() };
    let Some(exported) = exported else {
        return Err("null map handle".to_string());
    };

    catch_panic(|| f(exported.map.as_mut())).map_err(|message| {
        log::error!("Game map '{}' panicked: {}", exported.map.name(), message);
        format!("panicked: {}", message)
    })
}

fn report(errors: FfiStrSink, result: Result<(), String>) -> bool {
    match result {
        Ok(()) => true,
        Err(message) => {
            errors.send(&message);
            false
        }
    }
}

extern "C" fn map_destroy(handle: MapHandle) {
    if handle.is_null() {
        return;
    }
    let exported = unsafe { Box::from_raw(handle.ptr as *mut ExportedMap) };
    if let Err(message) = catch_panic(move || drop(exported)) {
        log::error!("Game map panicked while being destroyed: {}", message);
    }
}

extern "C" fn map_initialize(handle: MapHandle, errors: FfiStrSink) -> bool {
    let result = guard(handle, |map| map.initialize().map_err(|e| e.to_string()));
    report(errors, result.and_then(|r| r))
}

extern "C" fn map_update(handle: MapHandle, delta_time: f32) -> bool {
    guard(handle, |map| map.update(delta_time)).is_ok()
}

struct ForeignRenderer<'a>(&'a FfiRenderer);

impl Renderer for ForeignRenderer<'_> {
    fn clear(&mut self, color: Color) {
        (self.0.clear)(self.0.user_data, color.into());
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        (self.0.draw_rect)(self.0.user_data, x, y, width, height, color.into());
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        (self.0.draw_text)(
            self.0.user_data,
            text.as_ptr(),
            text.len(),
            x,
            y,
            size,
            color.into(),
        );
    }
}

extern "C" fn map_draw(handle: MapHandle, renderer: *const FfiRenderer) -> bool {
    let Some(renderer) = (unsafe { renderer.as_ref() }) else {
        return false;
    };
    guard(handle, |map| map.draw(&mut ForeignRenderer(renderer))).is_ok()
}

extern "C" fn map_name(handle: MapHandle, out: FfiStrSink) {
    let _ = guard(handle, |map| out.send(map.name()));
}

extern "C" fn map_set_scene_bounds(handle: MapHandle, width: f32, height: f32) {
    let _ = guard(handle, |map| map.set_scene_bounds(width, height));
}

extern "C" fn map_set_target_fps(handle: MapHandle, fps: u32) {
    let _ = guard(handle, |map| map.set_target_fps(fps));
}

extern "C" fn map_set_transition_sink(handle: MapHandle, sink: FfiTransitionSink) {
    let _ = guard(handle, |map| {
        map.set_transition_callback(Box::new(move |map_id: &str, force_reload: bool| {
            sink.request(map_id, force_reload)
        }))
    });
}

extern "C" fn map_has_directory(handle: MapHandle) -> bool {
    guard(handle, |map| map.as_directory().is_some()).unwrap_or(false)
}

extern "C" fn map_available_maps(handle: MapHandle, out: FfiStrSink) {
    let _ = guard(handle, |map| {
        if let Some(directory) = map.as_directory() {
            for map_id in directory.available_maps() {
                out.send(&map_id);
            }
        }
    });
}

extern "C" fn map_current_map_id(handle: MapHandle, out: FfiStrSink) -> bool {
    guard(handle, |map| {
        match map.as_directory().and_then(|directory| directory.current_map_id()) {
            Some(map_id) => {
                out.send(&map_id);
                true
            }
            None => false,
        }
    })
    .unwrap_or(false)
}

extern "C" fn map_goto_map(
    handle: MapHandle,
    ptr: *const u8,
    len: usize,
    force: bool,
    errors: FfiStrSink,
) -> bool {
    let map_id = unsafe { string_from_raw(ptr, len) };
    let result = guard(handle, |map| match map.as_directory() {
        Some(directory) => directory.goto_map(&map_id, force).map_err(|e| e.to_string()),
        None => Err(format!("Map '{}' has no map registry", map.name())),
    });
    report(errors, result.and_then(|r| r))
}

extern "C" fn map_reload_current_map(handle: MapHandle, errors: FfiStrSink) -> bool {
    let result = guard(handle, |map| match map.as_directory() {
        Some(directory) => directory.reload_current_map().map_err(|e| e.to_string()),
        None => Err(format!("Map '{}' has no map registry", map.name())),
    });
    report(errors, result.and_then(|r| r))
}

/// Export a map factory from a game-logic `cdylib`
///
/// The factory is any path callable as `fn() -> Option<Box<dyn GameMap>>`.
///
/// ```ignore
/// fn create_game_map() -> Option<Box<dyn GameMap>> {
///     let mut manager = MapManager::new();
///     manager.register_map::<MainMenu>("MainMenu", "Title screen");
///     manager.goto_map("MainMenu", false).ok()?;
///     Some(Box::new(manager))
/// }
///
/// wave_module::export_game_map!(create_game_map);
/// ```
#[macro_export]
macro_rules! export_game_map {
    ($factory:path) => {
        #[no_mangle]
        pub extern "C" fn wave_create_game_map() -> $crate::ffi::FfiMapObject {
            $crate::export::create_exported($factory)
        }

        #[no_mangle]
        pub extern "C" fn wave_module_info() -> $crate::ffi::FfiModuleInfo {
            $crate::export::module_info(
                concat!(env!("CARGO_PKG_NAME"), "\0"),
                concat!(env!("CARGO_PKG_VERSION"), "\0"),
            )
        }

        #[no_mangle]
        pub extern "C" fn wave_install_logger(sink: $crate::ffi::FfiLogSink, max_level: u32) {
            $crate::export::install_logger(sink, max_level)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_map::{EmptyMap, MapManager};

    #[test]
    fn test_create_exported_null_on_none() {
        assert!(create_exported(|| None).is_null());
    }

    #[test]
    fn test_create_exported_null_on_panic() {
        assert!(create_exported(|| panic!("constructor failed")).is_null());
    }

    #[test]
    fn test_exported_map_round_trip() {
        let object = create_exported(|| Some(Box::new(MapManager::new()) as Box<dyn GameMap>));
        assert!(!object.is_null());

        let vtable = unsafe { &*object.vtable };
        let mut names = StringCollector::new();
        (vtable.name.unwrap())(object.handle, names.sink());
        assert_eq!(names.strings, vec!["MapManager"]);
        assert!((vtable.has_directory.unwrap())(object.handle));

        (vtable.destroy.unwrap())(object.handle);
    }

    #[test]
    fn test_goto_without_directory_reports_error() {
        let object = export_map(Box::new(EmptyMap::new()));
        let vtable = unsafe { &*object.vtable };

        let mut errors = StringCollector::new();
        let id = "Level";
        let ok = (vtable.goto_map.unwrap())(object.handle, id.as_ptr(), id.len(), false, errors.sink());
        assert!(!ok);
        assert!(errors.joined().contains("has no map registry"));

        (vtable.destroy.unwrap())(object.handle);
    }

    #[test]
    fn test_module_info_strings() {
        let info = module_info("demo\0", "1.2.3\0");
        assert_eq!(info.api_version, WAVE_MODULE_API_VERSION);
        let name = unsafe { std::ffi::CStr::from_ptr(info.name) };
        assert_eq!(name.to_str().unwrap(), "demo");
    }
}
