//! Wave Engine editor
//!
//! Runs a game-logic module headless with hot reload: the module is
//! reloaded whenever its file changes on disk. Frames are drawn into a
//! command buffer at the configured scene frame rate.
//!
//! Run with: cargo run -p wave_editor -- [module_path] [--config <file>] [--frames <n>] [--print-config]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wave_config::GameConfig;
use wave_editor::logging::{init_logging, install_panic_hook};
use wave_editor::{BuildSettings, GameEditor, LaunchArgs};
use wave_map::CommandBuffer;

fn main() {
    init_logging();
    install_panic_hook();

    let args = LaunchArgs::from_env();
    let config = GameConfig::load_or_default(&args.config_path);

    if args.print_config {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to print configuration: {}", e),
        }
        return;
    }

    let mut build = BuildSettings::default();
    if let Some(command) = args.build_command.clone() {
        build.command = command;
    }
    let module_path = args
        .module_path
        .clone()
        .unwrap_or_else(|| build.module_path.clone());

    let mut editor = GameEditor::new(config, &args.config_path, build);

    // The placeholder scene is shown if this fails
    editor.load_game_logic(&module_path);
    editor.play();

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst)) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }

    run(&mut editor, &running, args.frames);

    log::info!("{}", editor.frame_stats().summary());
    if let Err(e) = editor.save_config() {
        log::error!("Failed to save configuration: {}", e);
    }
}

fn run(editor: &mut GameEditor, running: &AtomicBool, frames: Option<u64>) {
    let mut commands = CommandBuffer::new();
    let mut last_frame = Instant::now();
    let mut frame: u64 = 0;

    while running.load(Ordering::SeqCst) && frames.map_or(true, |limit| frame < limit) {
        let now = Instant::now();
        let delta_time = (now - last_frame).as_secs_f32();
        last_frame = now;

        commands.reset();
        editor.frame(now, delta_time, &mut commands);
        frame += 1;

        let fps = editor.scene_settings().target_fps;
        if fps > 0 {
            let budget = Duration::from_secs_f32(1.0 / fps as f32);
            if let Some(remaining) = budget.checked_sub(now.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    log::info!("Editor stopped after {} frames", frame);
}
