//! JSON persistence helpers for ~/.banana-runner/ files.
//!
//! Everything the game keeps on disk (config, local account store, offline
//! score cache) is a pretty-printed JSON document written through here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = ".banana-runner";

/// Get the ~/.banana-runner/ directory path, creating it if needed.
pub fn data_dir() -> io::Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    let dir = home_dir.join(DATA_DIR_NAME);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the full path for a file in ~/.banana-runner/.
pub fn data_path(filename: &str) -> io::Result<PathBuf> {
    Ok(data_dir()?.join(filename))
}

/// Load a JSON file from ~/.banana-runner/, returning `T::default()` if missing or invalid.
pub fn load_json_or_default<T: Default + serde::de::DeserializeOwned>(filename: &str) -> T {
    match data_path(filename) {
        Ok(path) => load_json_file_or_default(&path),
        Err(_) => T::default(),
    }
}

/// Load a JSON file at an explicit path, returning `T::default()` if missing or invalid.
pub fn load_json_file_or_default<T: Default + serde::de::DeserializeOwned>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
        Err(_) => T::default(),
    }
}

/// Load a JSON file at an explicit path. A missing file yields `Ok(None)`;
/// an unreadable or malformed one is an error.
pub fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Save a value as pretty-printed JSON to ~/.banana-runner/.
pub fn save_json<T: serde::Serialize>(filename: &str, data: &T) -> io::Result<()> {
    let path = data_path(filename)?;
    save_json_file(&path, data)
}

/// Save a value as pretty-printed JSON at an explicit path.
///
/// Writes to a sibling temp file first and renames it over the target, so
/// a crash mid-write leaves the previous document intact.
pub fn save_json_file<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Unique scratch directory for tests.
#[cfg(test)]
pub fn test_dir(prefix: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "banana-runner-{}-{}-{}",
        prefix,
        std::process::id(),
        test_id
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}
