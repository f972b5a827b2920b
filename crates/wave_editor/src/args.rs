//! Command line of the editor and game binaries
//!
//! `[module_path] [--config <file>] [--frames <n>] [--build <command>] [--print-config]`

use std::path::PathBuf;
use wave_config::DEFAULT_CONFIG_FILE;

/// Parsed launch arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Game-logic module to load
    pub module_path: Option<PathBuf>,
    pub config_path: PathBuf,
    /// Stop after this many frames; run until interrupted otherwise
    pub frames: Option<u64>,
    /// Build command used by recompile
    pub build_command: Option<String>,
    /// Print the effective configuration as JSON and exit
    pub print_config: bool,
}

impl Default for LaunchArgs {
    fn default() -> Self {
        Self {
            module_path: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            frames: None,
            build_command: None,
            print_config: false,
        }
    }
}

impl LaunchArgs {
    /// Parse the process arguments
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Parse arguments, not including the program name
    ///
    /// Unknown flags and malformed values are logged and ignored.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => match args.next() {
                    Some(path) => parsed.config_path = PathBuf::from(path),
                    None => log::warn!("--config needs a file"),
                },
                "--frames" => match args.next().map(|n| n.parse::<u64>()) {
                    Some(Ok(n)) => parsed.frames = Some(n),
                    Some(Err(e)) => log::warn!("Invalid --frames value: {}", e),
                    None => log::warn!("--frames needs a count"),
                },
                "--build" => match args.next() {
                    Some(command) => parsed.build_command = Some(command),
                    None => log::warn!("--build needs a command"),
                },
                "--print-config" => parsed.print_config = true,
                flag if flag.starts_with("--") => log::warn!("Unknown option: {}", flag),
                _ => {
                    if parsed.module_path.is_none() {
                        parsed.module_path = Some(PathBuf::from(arg));
                    } else {
                        log::warn!("Ignoring extra argument: {}", arg);
                    }
                }
            }
        }
        parsed
    }
}
