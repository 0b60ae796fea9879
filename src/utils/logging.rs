//! `tracing` subscriber setup.
//!
//! The terminal belongs to the UI while the game runs, so the interactive
//! binary logs to a file. Headless tools log to stderr. Both honor `RUST_LOG`.

use super::persistence::data_path;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILENAME: &str = "banana-runner.log";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Append logs to ~/.banana-runner/banana-runner.log. Returns the log path.
pub fn init_file_logging() -> io::Result<PathBuf> {
    let path = data_path(LOG_FILENAME)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(path)
}

/// Log to stderr, for the simulator and one-shot commands.
pub fn init_stderr_logging(default_level: &str) {
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(io::stderr)
        .try_init();
}
