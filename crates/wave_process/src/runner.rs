//! Running external commands with streamed output
//!
//! Every invocation reports its output line by line through
//! `on_output(line, is_error_stream)` and ends with exactly one
//! `on_complete(succeeded)`.

use crate::error::{ProcessError, Result};
use crossbeam_channel::{unbounded, Sender};
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

/// Build the platform shell invocation for `command`
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Run `command` to completion on the calling thread
///
/// Returns whether it exited successfully. Output lines from both streams
/// are delivered in the order they were read.
pub fn run_command_sync<F>(command: &str, mut on_output: F) -> Result<bool>
where
    F: FnMut(&str, bool),
{
    let mut child = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let (tx, rx) = unbounded::<(String, bool)>();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(stdout, false, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(stderr, true, tx.clone()));
    }
    drop(tx);

    // Ends once both readers hit end of stream
    for (line, is_error) in rx {
        on_output(&line, is_error);
    }
    for reader in readers {
        let _ = reader.join();
    }

    let status = child.wait()?;
    log::debug!("'{}' exited with {}", command, status);
    Ok(status.success())
}

/// Run `command` on a background thread
///
/// The callbacks run on that thread. A command that cannot be started
/// reports one error line followed by `on_complete(false)`.
pub fn run_command<O, C>(command: impl Into<String>, mut on_output: O, on_complete: C) -> JoinHandle<()>
where
    O: FnMut(&str, bool) + Send + 'static,
    C: FnOnce(bool) + Send + 'static,
{
    let command = command.into();
    thread::spawn(move || {
        log::info!("Running command: {}", command);
        let succeeded = match run_command_sync(&command, &mut on_output) {
            Ok(succeeded) => succeeded,
            Err(e) => {
                on_output(&format!("Failed to create process: {}", e), true);
                false
            }
        };
        on_complete(succeeded);
    })
}

fn spawn_reader<R>(stream: R, is_error: bool, tx: Sender<(String, bool)>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n' | b'\r')) {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send((line, is_error)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send((format!("Failed to read output: {}", e), true));
                    break;
                }
            }
        }
    })
}
