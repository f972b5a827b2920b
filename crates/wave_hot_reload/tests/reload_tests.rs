//! Integration tests for wave_hot_reload
//!
//! Modules are simulated in-process. Every module, map construction and
//! destruction is written to a shared event log so the ordering of a reload
//! can be asserted.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::result::Result;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use wave_hot_reload::*;
use wave_map::*;
use wave_module::ModuleError;

type EventLog = Arc<Mutex<Vec<String>>>;

/// What the next loaded module will do
#[derive(Clone)]
enum Script {
    /// Module whose factory builds a map with this name
    Map(&'static str),
    /// Module whose factory returns null
    NullFactory,
    /// Module whose map fails in initialize
    FailingInit(&'static str),
    /// The module file cannot be loaded
    LoadFails,
}

struct TestModule {
    name: String,
    path: PathBuf,
    script: Script,
    events: EventLog,
}

impl Drop for TestModule {
    fn drop(&mut self) {
        self.events.lock().push(format!("unload {}", self.name));
    }
}

struct TestMap {
    base: MapBase,
    events: EventLog,
    fail_init: bool,
    _module: Arc<TestModule>,
}

impl GameMap for TestMap {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }

    fn initialize(&mut self) -> MapResult<()> {
        if self.fail_init {
            return Err(MapError::initialize_failed(self.base.name(), "broken build"));
        }
        self.events.lock().push(format!("initialize {}", self.base.name()));
        Ok(())
    }

    fn update(&mut self, _delta_time: f32) {
        self.events.lock().push(format!("update {}", self.base.name()));
    }
}

impl Drop for TestMap {
    fn drop(&mut self) {
        self.events.lock().push(format!("drop {}", self.base.name()));
    }
}

impl LogicModule for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn create_map(self: Arc<Self>) -> Result<Box<dyn GameMap>, ModuleError> {
        let (name, fail_init) = match self.script {
            Script::Map(name) => (name, false),
            Script::FailingInit(name) => (name, true),
            Script::NullFactory | Script::LoadFails => {
                return Err(ModuleError::factory_returned_null(self.name.clone()))
            }
        };
        self.events.lock().push(format!("construct {}", name));
        Ok(Box::new(TestMap {
            base: MapBase::new(name),
            events: self.events.clone(),
            fail_init,
            _module: self.clone(),
        }))
    }
}

struct ScriptedLoader {
    scripts: VecDeque<Script>,
    events: EventLog,
    loads: u32,
}

impl ScriptedLoader {
    fn new(scripts: Vec<Script>, events: &EventLog) -> Self {
        Self {
            scripts: scripts.into(),
            events: events.clone(),
            loads: 0,
        }
    }
}

impl ModuleLoader for ScriptedLoader {
    fn load(&mut self, path: &Path) -> Result<Arc<dyn LogicModule>, ModuleError> {
        let script = self.scripts.pop_front().unwrap_or(Script::LoadFails);
        if let Script::LoadFails = script {
            return Err(ModuleError::load_error(path, "scripted failure"));
        }

        self.loads += 1;
        let name = format!("module{}", self.loads);
        self.events.lock().push(format!("load {}", name));
        Ok(Arc::new(TestModule {
            name,
            path: path.to_path_buf(),
            script,
            events: self.events.clone(),
        }))
    }
}

fn coordinator(scripts: Vec<Script>, events: &EventLog) -> ReloadCoordinator<ScriptedLoader> {
    ReloadCoordinator::with_loader(HotReloadConfig::default(), ScriptedLoader::new(scripts, events))
}

fn position(events: &EventLog, entry: &str) -> usize {
    let log = events.lock();
    log.iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("missing event '{}' in {:?}", entry, *log))
}

#[test]
fn test_initial_load_installs_map() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A")], &events);

    coordinator.load_game_logic("game_logic.so").unwrap();

    assert!(coordinator.has_module());
    assert_eq!(coordinator.module_name(), Some("module1"));
    assert_eq!(coordinator.host().map().unwrap().name(), "A");
    assert_eq!(
        coordinator.host().map().unwrap().scene_bounds(),
        SceneBounds::new(1280.0, 720.0)
    );
}

#[test]
fn test_reload_orders_construct_destroy_unload() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A"), Script::Map("B")], &events);

    coordinator.load_game_logic("game_logic.so").unwrap();
    assert!(coordinator.reload_game_logic());

    let construct_new = position(&events, "construct B");
    let drop_old = position(&events, "drop A");
    let unload_old = position(&events, "unload module1");
    let init_new = position(&events, "initialize B");

    assert!(construct_new < drop_old);
    assert!(drop_old < unload_old);
    assert!(unload_old < init_new);
    assert_eq!(coordinator.module_name(), Some("module2"));
}

#[test]
fn test_null_factory_keeps_previous_state() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A"), Script::NullFactory], &events);
    coordinator.load_game_logic("game_logic.so").unwrap();

    assert!(!coordinator.reload_game_logic());

    assert_eq!(coordinator.module_name(), Some("module1"));
    assert_eq!(coordinator.host().map().unwrap().name(), "A");
    // The rejected module was released, the running one was not
    assert!(events.lock().contains(&"unload module2".to_string()));
    assert!(!events.lock().contains(&"unload module1".to_string()));
    assert!(!events.lock().contains(&"drop A".to_string()));
}

#[test]
fn test_load_failure_keeps_previous_state() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A"), Script::LoadFails], &events);
    coordinator.load_game_logic("game_logic.so").unwrap();

    let err = coordinator.load_game_logic("other.so").unwrap_err();
    assert!(matches!(err, ReloadError::Module(ModuleError::LoadError { .. })));
    assert!(err.is_recoverable());

    assert_eq!(coordinator.module_name(), Some("module1"));
    assert_eq!(coordinator.module_path(), Some(Path::new("game_logic.so")));
}

#[test]
fn test_failed_initialize_leaves_host_empty() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A"), Script::FailingInit("B")], &events);
    coordinator.load_game_logic("game_logic.so").unwrap();

    let err = coordinator.load_game_logic("game_logic.so").unwrap_err();
    assert!(matches!(err, ReloadError::Initialize(_)));
    assert!(!err.is_recoverable());

    assert!(!coordinator.host().has_map());
    assert_eq!(coordinator.module_name(), Some("module2"));

    let mut buffer = CommandBuffer::new();
    coordinator.host_mut().draw(&mut buffer);
    assert!(buffer.texts().any(|t| t == NO_MAP_MESSAGE));
}

#[test]
fn test_reload_preserves_play_state() {
    let events = EventLog::default();
    let mut coordinator = coordinator(
        vec![Script::Map("A"), Script::Map("B"), Script::NullFactory],
        &events,
    );
    coordinator.load_game_logic("game_logic.so").unwrap();

    coordinator.set_playing(true);
    assert!(coordinator.reload_game_logic());
    assert!(coordinator.is_playing());

    assert!(!coordinator.reload_game_logic());
    assert!(coordinator.is_playing());

    coordinator.set_playing(false);
    assert!(!coordinator.reload_game_logic());
    assert!(!coordinator.is_playing());
}

#[test]
fn test_reload_without_module() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![], &events);
    assert!(!coordinator.reload_game_logic());
}

#[test]
fn test_tick_updates_only_while_playing() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A")], &events);
    coordinator.load_game_logic("game_logic.so").unwrap();

    let mut buffer = CommandBuffer::new();
    let now = Instant::now();
    coordinator.tick(now, 0.016, &mut buffer);

    coordinator.set_playing(true);
    coordinator.tick(now, 0.016, &mut buffer);
    coordinator.tick(now, 0.016, &mut buffer);

    let updates = events.lock().iter().filter(|e| *e == "update A").count();
    assert_eq!(updates, 2);
    assert!(buffer.is_empty(), "TestMap draws nothing");
}

#[test]
fn test_file_change_triggers_reload() {
    let events = EventLog::default();
    let dir = tempfile::tempdir().unwrap();
    let module_path = dir.path().join("game_logic.so");
    std::fs::write(&module_path, b"v1").unwrap();
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(5_000_000);
    set_modified(&module_path, base);

    let mut coordinator = coordinator(vec![Script::Map("A"), Script::Map("B")], &events);
    coordinator.load_game_logic(&module_path).unwrap();

    let start = Instant::now();
    assert!(!coordinator.poll_for_changes(start));

    set_modified(&module_path, base + Duration::from_secs(3));
    // Within the interval nothing is checked
    assert!(!coordinator.poll_for_changes(start + Duration::from_millis(100)));
    assert!(coordinator.poll_for_changes(start + Duration::from_millis(700)));
    assert_eq!(coordinator.host().map().unwrap().name(), "B");

    // The same modification is not reported twice
    assert!(!coordinator.poll_for_changes(start + Duration::from_millis(1400)));
}

#[test]
fn test_vanished_module_file_is_reported_until_it_returns() {
    let events = EventLog::default();
    let dir = tempfile::tempdir().unwrap();
    let module_path = dir.path().join("game_logic.so");
    std::fs::write(&module_path, b"v1").unwrap();
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(5_000_000);
    set_modified(&module_path, base);

    let mut coordinator = coordinator(vec![Script::Map("A"), Script::Map("B")], &events);
    coordinator.load_game_logic(&module_path).unwrap();
    assert!(!coordinator.watch_failed());

    std::fs::remove_file(&module_path).unwrap();
    let start = Instant::now();
    assert!(!coordinator.poll_for_changes(start));
    assert!(coordinator.watch_failed());
    assert!(!coordinator.poll_for_changes(start + Duration::from_millis(600)));
    assert!(coordinator.watch_failed());
    assert_eq!(coordinator.host().map().unwrap().name(), "A");

    // Not due yet: the failure stands
    std::fs::write(&module_path, b"v2").unwrap();
    set_modified(&module_path, base + Duration::from_secs(3));
    assert!(!coordinator.poll_for_changes(start + Duration::from_millis(700)));
    assert!(coordinator.watch_failed());

    assert!(coordinator.poll_for_changes(start + Duration::from_millis(1200)));
    assert!(!coordinator.watch_failed());
    assert_eq!(coordinator.host().map().unwrap().name(), "B");
}

#[test]
fn test_drop_destroys_map_before_module() {
    let events = EventLog::default();
    let mut coordinator = coordinator(vec![Script::Map("A")], &events);
    coordinator.load_game_logic("game_logic.so").unwrap();
    drop(coordinator);

    assert!(position(&events, "drop A") < position(&events, "unload module1"));
}

fn set_modified(path: &Path, modified: SystemTime) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(modified).unwrap();
}
