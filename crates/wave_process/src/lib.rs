//! # wave_process - External Commands and Export
//!
//! Everything that runs beside the main loop: build commands whose output is
//! streamed line by line, the console buffers those lines land in, and the
//! export job that packages a standalone game.
//!
//! Worker threads never touch engine state. They append to a [`LogBuffer`]
//! and flip atomic flags; the main thread reads both.

mod error;
pub mod export;
mod log_buffer;
mod runner;

pub use error::{ProcessError, Result};
pub use export::{validate_export_dir, ExportJob, ExportLayout, ExportSources};
pub use log_buffer::{LogBuffer, LogLine, Severity};
pub use runner::{run_command, run_command_sync, shell_command};
