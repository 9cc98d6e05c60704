//! Persistent key/value state.
//!
//! The state file is a single flat JSON object at the project root. Each
//! ecosystem stores its last installed fingerprint under its own key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// A flat JSON object persisted to one file.
///
/// Reads never fail: a missing file, a missing key, or a file that cannot be
/// parsed all read as absent. Writes rewrite the whole file. There is no
/// locking, so only one process may use a given file at a time.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// File name used at the project root.
    pub const FILE_NAME: &'static str = ".dotrun.json";

    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the store for a project directory.
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(Self::FILE_NAME))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Get the raw JSON value stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.load().remove(key)
    }

    /// Get the value under `key` decoded as `T`.
    ///
    /// A value whose shape does not match `T` reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(
                    "Ignoring unrecognised '{}' entry in {}: {}",
                    key,
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Store `value` under `key` and persist immediately.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(anyhow::Error::from)?;
        let mut state = self.load();
        state.insert(key.to_string(), value);
        self.save(&state)
    }

    /// Delete the backing file. Returns whether a file was removed.
    pub fn remove(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }

    fn load(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Map::new(),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(
                    "State file {} is not a JSON object, treating as empty",
                    self.path.display()
                );
                Map::new()
            }
            Err(e) => {
                warn!(
                    "State file {} is unreadable ({}), treating as empty",
                    self.path.display(),
                    e
                );
                Map::new()
            }
        }
    }

    // Write to a sibling temp file, then rename over the original.
    fn save(&self, state: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string(state).map_err(anyhow::Error::from)?;

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        debug!("Wrote state to {}", self.path.display());
        Ok(())
    }
}
