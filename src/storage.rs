use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::models::Task;

/// Key holding the serialized task collection.
pub const TASKS_KEY: &str = "taskflow_tasks";
/// Key holding the preferred colour theme.
pub const THEME_KEY: &str = "taskflow_theme";

/// Durable string key-value store backing the task collection.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns the directory the file store lives in when none is given.
///
/// The path is determined in the following order:
/// 1. `TASKFLOW_DIR` environment variable.
/// 2. `~/.local/share/taskflow` (on Linux).
/// 3. `.` (fallback).
pub fn default_data_dir() -> PathBuf {
    std::env::var("TASKFLOW_DIR").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("taskflow");
        p
    })
}

/// Stores each key as a file of the same name inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens a store in `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut f = match OpenOptions::new().read(true).open(self.key_path(key)) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(Some(s))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.key_path(key))?;
        f.write_all(value.as_bytes())?;
        f.sync_all()?;
        Ok(())
    }
}

/// In-process store, useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads the task collection.
///
/// Returns an empty vector if nothing is stored or the stored value cannot be
/// read or parsed.
pub fn load_tasks<S: KeyValueStore + ?Sized>(storage: &S) -> Vec<Task> {
    let raw = match storage.get(TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored tasks, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "Stored tasks are malformed, starting empty");
            Vec::new()
        }
    }
}

/// Saves the whole task collection, overwriting the previous value.
pub fn save_tasks<S: KeyValueStore + ?Sized>(storage: &mut S, tasks: &[Task]) -> Result<(), StorageError> {
    let s = serde_json::to_string(tasks)?;
    storage.set(TASKS_KEY, &s)
}
