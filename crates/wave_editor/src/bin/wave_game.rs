//! Wave Engine game runtime
//!
//! Loads `config.ini` and the game-logic module, then runs the root map at
//! the configured frame rate. Without a loadable module the game runs with
//! no map and shows the placeholder scene.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wave_config::GameConfig;
use wave_editor::logging::{init_logging, install_panic_hook};
use wave_editor::{LaunchArgs, DEFAULT_MODULE_NAME};
use wave_map::{CommandBuffer, GameHost};
use wave_module::GameModule;

fn main() {
    init_logging();
    install_panic_hook();
    log::info!("Starting game runtime...");

    let args = LaunchArgs::from_env();
    let config = GameConfig::load_or_default(&args.config_path);

    if args.print_config {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to print configuration: {}", e),
        }
        return;
    }
    let window = &config.window;
    log::info!("{} ({}x{} @ {} fps)", window.title, window.width, window.height, window.target_fps);

    let mut host = GameHost::new(window.width as f32, window.height as f32);
    host.set_target_fps(window.target_fps);

    let module_path = args.module_path.clone().unwrap_or_else(default_module_path);
    let module = match GameModule::load(&module_path) {
        Ok(module) => Some(Arc::new(module)),
        Err(e) => {
            log::error!("Fatal error: failed to load game logic: {}", e);
            None
        }
    };

    match module.as_ref().map(|m| m.create_map()) {
        Some(Ok(map)) => {
            if let Err(e) = host.set_map(Some(Box::new(map))) {
                log::error!("{}", e);
            }
        }
        Some(Err(e)) => log::error!("{}", e),
        None => {}
    }
    if !host.has_map() {
        log::error!("Running without game logic (no map loaded)");
    }

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst)) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let mut commands = CommandBuffer::new();
    let mut last_frame = Instant::now();
    let mut frame: u64 = 0;
    while running.load(Ordering::SeqCst) && args.frames.map_or(true, |limit| frame < limit) {
        let now = Instant::now();
        let delta_time = (now - last_frame).as_secs_f32();
        last_frame = now;

        commands.reset();
        host.update(delta_time);
        host.draw(&mut commands);
        frame += 1;

        if host.target_fps() > 0 {
            let budget = Duration::from_secs_f32(1.0 / host.target_fps() as f32);
            if let Some(remaining) = budget.checked_sub(now.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    // Map first, then the module its code lives in
    drop(host);
    if let Some(module) = module {
        wave_module::unload(module);
    }
    log::info!("Game runtime stopped after {} frames", frame);
}

/// The module next to the executable, falling back to the working directory
fn default_module_path() -> PathBuf {
    let file = wave_module::library_filename(DEFAULT_MODULE_NAME);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file)))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(file))
}
