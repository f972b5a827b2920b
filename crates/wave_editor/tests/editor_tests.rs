//! Editor session tests
//!
//! Game logic comes from an in-process loader whose root map is a map
//! registry with two scenes, like a real game-logic module.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wave_config::GameConfig;
use wave_editor::{BuildSettings, GameEditor};
use wave_hot_reload::{LogicModule, ModuleLoader};
use wave_map::*;
use wave_module::ModuleError;

type EventLog = Arc<Mutex<Vec<String>>>;

struct Scene {
    base: MapBase,
    events: EventLog,
}

impl GameMap for Scene {
    fn base(&self) -> &MapBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MapBase {
        &mut self.base
    }

    fn initialize(&mut self) -> MapResult<()> {
        self.events.lock().push(format!("initialize {}", self.base.name()));
        Ok(())
    }

    fn update(&mut self, _delta_time: f32) {
        self.events.lock().push(format!("update {}", self.base.name()));
    }
}

struct TestModule {
    path: PathBuf,
    events: EventLog,
}

impl LogicModule for TestModule {
    fn name(&self) -> &str {
        "test_logic"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn create_map(self: Arc<Self>) -> Result<Box<dyn GameMap>, ModuleError> {
        let mut manager = MapManager::new();
        for id in ["Menu", "Level"] {
            let events = self.events.clone();
            manager.register(
                id,
                move || {
                    Some(Box::new(Scene {
                        base: MapBase::new(id),
                        events: events.clone(),
                    }) as Box<dyn GameMap>)
                },
                "",
            );
        }
        if let Err(e) = manager.goto_map("Menu", false) {
            panic!("{}", e);
        }
        Ok(Box::new(manager))
    }
}

#[derive(Clone, Default)]
struct CountingLoader {
    loads: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    events: EventLog,
}

impl ModuleLoader for CountingLoader {
    fn load(&mut self, path: &Path) -> Result<Arc<dyn LogicModule>, ModuleError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ModuleError::load_error(path, "broken build"));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(TestModule {
            path: path.to_path_buf(),
            events: self.events.clone(),
        }))
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    loader: CountingLoader,
    editor: GameEditor<CountingLoader>,
}

impl Fixture {
    fn new(build_command: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("libgame_logic.so");
        std::fs::write(&module, b"module").unwrap();

        let build = BuildSettings {
            command: build_command.to_string(),
            build_dir: dir.path().join("build"),
            module_path: module.clone(),
        };
        let loader = CountingLoader::default();
        let mut editor = GameEditor::with_loader(
            GameConfig::default(),
            dir.path().join("config.ini"),
            build,
            loader.clone(),
        );
        assert!(editor.load_game_logic(&module));
        Self { dir, loader, editor }
    }

    fn loads(&self) -> usize {
        self.loader.loads.load(Ordering::SeqCst)
    }

    fn count(&self, event: &str) -> usize {
        self.loader.events.lock().iter().filter(|e| *e == event).count()
    }

    fn frame(&mut self) -> CommandBuffer {
        let mut commands = CommandBuffer::new();
        self.editor.frame(Instant::now(), 0.016, &mut commands);
        commands
    }
}

#[test]
fn test_update_runs_only_while_playing() {
    let mut fx = Fixture::new("true");
    fx.frame();
    assert_eq!(fx.count("update Menu"), 0);

    fx.editor.play();
    fx.frame();
    fx.frame();
    assert_eq!(fx.count("update Menu"), 2);

    fx.editor.toggle_play();
    assert!(!fx.editor.is_playing());
    fx.frame();
    assert_eq!(fx.count("update Menu"), 2);
    assert_eq!(fx.editor.frame_stats().history().len(), 4);
}

#[test]
fn test_map_selection_goes_through_registry() {
    let mut fx = Fixture::new("true");
    assert_eq!(fx.editor.available_maps(), vec!["Level", "Menu"]);
    assert_eq!(fx.editor.current_map_id().as_deref(), Some("Menu"));

    assert!(fx.editor.select_map("Level"));
    assert_eq!(fx.editor.current_map_id().as_deref(), Some("Level"));

    assert!(!fx.editor.select_map("Credits"));
    assert_eq!(fx.editor.current_map_id().as_deref(), Some("Level"));
    assert!(fx.editor.console().contains("Credits"));
}

#[test]
fn test_restart_recreates_current_map_and_stops() {
    let mut fx = Fixture::new("true");
    fx.editor.play();
    let before = fx.count("initialize Menu");

    assert!(fx.editor.restart());
    assert!(!fx.editor.is_playing());
    assert_eq!(fx.count("initialize Menu"), before + 1);
    assert_eq!(fx.loads(), 1);
}

#[test]
fn test_reset_game_reloads_module() {
    let mut fx = Fixture::new("true");
    fx.editor.play();

    assert!(fx.editor.reset_game());
    assert!(!fx.editor.is_playing());
    assert_eq!(fx.loads(), 2);
}

#[test]
fn test_reset_game_falls_back_to_map_reset() {
    let mut fx = Fixture::new("true");
    fx.loader.fail.store(true, Ordering::SeqCst);

    assert!(!fx.editor.reset_game());
    assert_eq!(fx.loads(), 1);
    assert!(fx.editor.coordinator().host().has_map());
    assert_eq!(fx.editor.current_map_id().as_deref(), Some("Menu"));
}

fn wait_for_build(fx: &Fixture) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while fx.editor.is_compiling() {
        assert!(Instant::now() < deadline, "build did not finish");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[cfg(unix)]
#[test]
fn test_successful_build_reloads_on_next_frame() {
    let mut fx = Fixture::new("echo compiling game logic");
    fx.editor.play();

    assert!(fx.editor.recompile());
    assert!(!fx.editor.is_playing());
    wait_for_build(&fx);
    assert_eq!(fx.loads(), 1);

    fx.frame();
    assert_eq!(fx.loads(), 2);
    assert!(fx.editor.console().contains("compiling game logic"));
    assert!(fx.editor.console().contains("Build Successful."));

    // The reload is applied once
    fx.frame();
    assert_eq!(fx.loads(), 2);
}

#[cfg(unix)]
#[test]
fn test_failed_build_keeps_running_module() {
    let mut fx = Fixture::new("echo 'error: expected item' >&2; exit 1");
    assert!(fx.editor.recompile());
    wait_for_build(&fx);

    fx.frame();
    assert_eq!(fx.loads(), 1);
    let console = fx.editor.console().snapshot();
    assert!(console
        .iter()
        .any(|line| line.text == "error: expected item" && line.severity == wave_process::Severity::Error));
    assert!(fx.editor.console().contains("Build Failed."));
}

#[test]
fn test_scene_settings_are_clamped_and_persisted() {
    let mut fx = Fixture::new("true");
    fx.editor.set_scene_resolution(100, 600);
    fx.editor.set_scene_fps(144);

    let scene = fx.editor.scene_settings();
    assert_eq!((scene.width, scene.height, scene.target_fps), (320, 600, 144));
    assert_eq!(
        fx.editor.coordinator().host().scene_bounds(),
        SceneBounds::new(320.0, 600.0)
    );
    assert_eq!(fx.editor.coordinator().host().target_fps(), 144);

    fx.editor.copy_scene_to_export();
    assert_eq!(fx.editor.export_settings().window_width, 320);

    fx.editor.save_config().unwrap();
    let saved = GameConfig::load(fx.dir.path().join("config.ini")).unwrap();
    assert_eq!(saved.window.scene_width, 320);
    assert_eq!(saved.window.scene_height, 600);
    assert_eq!(saved.window.scene_fps, 144);
}

#[test]
fn test_clean_build_folder() {
    let mut fx = Fixture::new("true");
    let build = fx.dir.path().join("build");
    std::fs::create_dir_all(build.join("debug")).unwrap();
    std::fs::write(build.join("debug/out.o"), b"obj").unwrap();

    assert!(fx.editor.clean_build_folder().unwrap());
    assert!(!build.exists());
    assert!(!fx.editor.clean_build_folder().unwrap());
}

#[test]
fn test_export_with_missing_runtime_fails() {
    let mut fx = Fixture::new("true");
    fx.editor.export_settings_mut().output_dir = fx.dir.path().join("Export");

    let sources = wave_process::ExportSources {
        runtime_executable: fx.dir.path().join("missing_runtime"),
        module: fx.dir.path().join("libgame_logic.so"),
        runtime_libraries: Vec::new(),
        assets_dir: fx.dir.path().join("Assets"),
    };
    fx.editor.start_export(sources).unwrap();

    let job = fx.editor.export_job().unwrap();
    assert!(!job.wait());
    assert!(job.log().contains("missing_runtime not found!"));
}
