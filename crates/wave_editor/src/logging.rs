//! Logger and panic hook shared by the binaries

use log::Level;
use std::io::Write;

/// Initialize `env_logger` with an `info` default filter
///
/// Error and warning records carry `ERROR: `/`WARNING: ` markers so consoles
/// reading the output can classify them.
pub fn init_logging() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let marker = match record.level() {
                Level::Error => "ERROR: ",
                Level::Warn => "WARNING: ",
                _ => "",
            };
            writeln!(buf, "{}[{}] {}", marker, record.target(), record.args())
        })
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Log panics instead of printing them
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC CAUGHT: {}", panic_info);
    }));
}
