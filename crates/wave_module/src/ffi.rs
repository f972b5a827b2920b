//! C ABI types shared by the host and game-logic modules
//!
//! Everything that crosses the module boundary is `#[repr(C)]`. Strings
//! travel as UTF-8 pointer/length pairs and are copied on arrival; nothing
//! allocated on one side is ever freed by the other.

use std::ffi::{c_char, c_void};
use wave_map::Color;

/// Boundary version; bump on any layout change below
pub const WAVE_MODULE_API_VERSION: u32 = 1;

/// Factory export every module must provide
pub const CREATE_MAP_SYMBOL: &str = "wave_create_game_map";

/// Optional export describing the module
pub const MODULE_INFO_SYMBOL: &str = "wave_module_info";

/// Optional export that routes the module's `log` records to the host
pub const INSTALL_LOGGER_SYMBOL: &str = "wave_install_logger";

/// Opaque handle to a map living inside a module
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle {
    pub ptr: *mut c_void,
}

impl MapHandle {
    pub const fn null() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

// Safety: the handle is only dereferenced by the module's own vtable, and
// maps are `Send`.
unsafe impl Send for MapHandle {}
unsafe impl Sync for MapHandle {}

/// RGBA color for FFI
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FfiColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for FfiColor {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

impl From<FfiColor> for Color {
    fn from(c: FfiColor) -> Self {
        Color::new(c.r, c.g, c.b, c.a)
    }
}

/// Receives a string from the other side of the boundary
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiStrSink {
    pub user_data: *mut c_void,
    pub write: extern "C" fn(user_data: *mut c_void, ptr: *const u8, len: usize),
}

impl FfiStrSink {
    /// Hand a string to the sink owner
    pub fn send(&self, s: &str) {
        (self.write)(self.user_data, s.as_ptr(), s.len());
    }
}

/// Host drawing surface seen from a module
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiRenderer {
    pub user_data: *mut c_void,
    pub clear: extern "C" fn(user_data: *mut c_void, color: FfiColor),
    pub draw_rect:
        extern "C" fn(user_data: *mut c_void, x: f32, y: f32, w: f32, h: f32, color: FfiColor),
    pub draw_text: extern "C" fn(
        user_data: *mut c_void,
        ptr: *const u8,
        len: usize,
        x: f32,
        y: f32,
        size: f32,
        color: FfiColor,
    ),
}

/// Transition callback seen from a module
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiTransitionSink {
    pub user_data: *mut c_void,
    pub request: extern "C" fn(user_data: *mut c_void, ptr: *const u8, len: usize, force: bool),
}

impl FfiTransitionSink {
    pub fn request(&self, map_id: &str, force_reload: bool) {
        (self.request)(self.user_data, map_id.as_ptr(), map_id.len(), force_reload);
    }
}

// Safety: the host keeps the callback behind `user_data` alive and
// `Send + Sync` for as long as the module map holds the sink.
unsafe impl Send for FfiTransitionSink {}
unsafe impl Sync for FfiTransitionSink {}

/// Log record forwarder installed into a module
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiLogSink {
    pub write: extern "C" fn(
        level: u32,
        target: *const u8,
        target_len: usize,
        message: *const u8,
        message_len: usize,
    ),
}

/// Function table of a module map
///
/// Fallible entries return `false` and describe the failure through the
/// provided [`FfiStrSink`].
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiMapVTable {
    pub destroy: Option<extern "C" fn(MapHandle)>,
    pub initialize: Option<extern "C" fn(MapHandle, errors: FfiStrSink) -> bool>,
    pub update: Option<extern "C" fn(MapHandle, delta_time: f32) -> bool>,
    pub draw: Option<extern "C" fn(MapHandle, renderer: *const FfiRenderer) -> bool>,
    pub name: Option<extern "C" fn(MapHandle, out: FfiStrSink)>,
    pub set_scene_bounds: Option<extern "C" fn(MapHandle, width: f32, height: f32)>,
    pub set_target_fps: Option<extern "C" fn(MapHandle, fps: u32)>,
    pub set_transition_sink: Option<extern "C" fn(MapHandle, sink: FfiTransitionSink)>,
    pub has_directory: Option<extern "C" fn(MapHandle) -> bool>,
    pub available_maps: Option<extern "C" fn(MapHandle, out: FfiStrSink)>,
    pub current_map_id: Option<extern "C" fn(MapHandle, out: FfiStrSink) -> bool>,
    pub goto_map: Option<
        extern "C" fn(MapHandle, ptr: *const u8, len: usize, force: bool, errors: FfiStrSink) -> bool,
    >,
    pub reload_current_map: Option<extern "C" fn(MapHandle, errors: FfiStrSink) -> bool>,
}

/// A module map: handle plus the table that operates on it
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiMapObject {
    pub handle: MapHandle,
    pub vtable: *const FfiMapVTable,
}

impl FfiMapObject {
    pub const fn null() -> Self {
        Self {
            handle: MapHandle::null(),
            vtable: std::ptr::null(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null() || self.vtable.is_null()
    }
}

/// Module description
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiModuleInfo {
    pub api_version: u32,
    /// NUL-terminated, may be null
    pub name: *const c_char,
    /// NUL-terminated, may be null
    pub version: *const c_char,
}

// ========== Function Signatures ==========

/// `wave_create_game_map`
pub type CreateGameMapFn = extern "C" fn() -> FfiMapObject;

/// `wave_module_info`
pub type ModuleInfoFn = extern "C" fn() -> FfiModuleInfo;

/// `wave_install_logger`
pub type InstallLoggerFn = extern "C" fn(sink: FfiLogSink, max_level: u32);

// ========== Helpers ==========

/// Copy a pointer/length pair into an owned string
///
/// # Safety
///
/// `ptr` must be null or valid for reads of `len` bytes.
pub unsafe fn string_from_raw(ptr: *const u8, len: usize) -> String {
    if ptr.is_null() || len == 0 {
        return String::new();
    }
    String::from_utf8_lossy(std::slice::from_raw_parts(ptr, len)).into_owned()
}

/// Collects strings written through an [`FfiStrSink`]
#[derive(Debug, Default)]
pub struct StringCollector {
    pub strings: Vec<String>,
}

impl StringCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink writing into this collector; valid while `self` is borrowed
    pub fn sink(&mut self) -> FfiStrSink {
        FfiStrSink {
            user_data: self as *mut Self as *mut c_void,
            write: collect_string,
        }
    }

    /// All collected strings joined by newlines
    pub fn joined(&self) -> String {
        self.strings.join("\n")
    }
}

extern "C" fn collect_string(user_data: *mut c_void, ptr: *const u8, len: usize) {
    if user_data.is_null() {
        return;
    }
    let collector = unsafe { &mut *(user_data as *mut StringCollector) };
    collector.strings.push(unsafe { string_from_raw(ptr, len) });
}

/// Encode a log level for the boundary
pub fn level_to_raw(level: log::Level) -> u32 {
    level as u32
}

/// Decode a log level; unknown values map to `Trace`
pub fn level_from_raw(raw: u32) -> log::Level {
    match raw {
        1 => log::Level::Error,
        2 => log::Level::Warn,
        3 => log::Level::Info,
        4 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

/// Decode a level filter; `0` switches logging off
pub fn level_filter_from_raw(raw: u32) -> log::LevelFilter {
    match raw {
        0 => log::LevelFilter::Off,
        raw => level_from_raw(raw).to_level_filter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_object() {
        let object = FfiMapObject::null();
        assert!(object.is_null());
        assert!(object.handle.is_null());
    }

    #[test]
    fn test_string_collector() {
        let mut collector = StringCollector::new();
        let sink = collector.sink();
        sink.send("Menu");
        sink.send("Level");

        assert_eq!(collector.strings, vec!["Menu", "Level"]);
        assert_eq!(collector.joined(), "Menu\nLevel");
    }

    #[test]
    fn test_string_from_raw_null() {
        assert_eq!(unsafe { string_from_raw(std::ptr::null(), 4) }, "");
    }

    #[test]
    fn test_level_encoding() {
        for level in [
            log::Level::Error,
            log::Level::Warn,
            log::Level::Info,
            log::Level::Debug,
            log::Level::Trace,
        ] {
            assert_eq!(level_from_raw(level_to_raw(level)), level);
        }
        assert_eq!(level_filter_from_raw(0), log::LevelFilter::Off);
        assert_eq!(level_filter_from_raw(3), log::LevelFilter::Info);
    }

    #[test]
    fn test_color_conversion() {
        let color: FfiColor = Color::SKY_BLUE.into();
        assert_eq!(Color::from(color), Color::SKY_BLUE);
    }
}
