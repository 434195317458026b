//! Persistence bridge: JSON blobs in a key/value store.
//!
//! The editor never depends on storage succeeding. Loads degrade to "nothing
//! stored" and saves report a [`StorageError`] that callers log and drop, so
//! a broken backend only means the session is not remembered.

use fp_core::catalog::Template;
use fp_core::model::Project;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key holding the serialized project.
pub const PROJECT_KEY: &str = "inventario.proyecto";

/// Key holding the serialized catalog list.
pub const CATALOG_KEY: &str = "catalogo.items";

// ─── Errors ──────────────────────────────────────────────────────────────

/// Errors a storage backend can report.
#[derive(Debug)]
pub enum StorageError {
    /// File system failure.
    Io(io::Error),
    /// The backend is missing or refused access (e.g. no `localStorage`).
    Unavailable(String),
    /// Serializing the value failed.
    Encode(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            StorageError::Encode(e) => write!(f, "encoding error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Encode(e) => Some(e),
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Encode(e)
    }
}

// ─── Backends ────────────────────────────────────────────────────────────

/// A string key/value store, shaped like browser `localStorage`.
pub trait KeyValueStore {
    /// Read the value for `key`; `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same entries, so a caller can keep a
/// handle and inspect what a store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory (`<dir>/<key>.json`).
///
/// Writes go through a temp file and a rename so a crash mid-write leaves
/// the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let final_path = self.path_for(key);
        let tmp_path = final_path.with_extension("json.tmp");

        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

// ─── Project / catalog blobs ─────────────────────────────────────────────

/// Read the stored project. Missing, unreadable, or malformed data all
/// yield `None` so the caller starts from the built-in default.
pub fn load_project(store: &dyn KeyValueStore) -> Option<Project> {
    let value = read_json(store, PROJECT_KEY)?;
    if !value.get("elementos").is_some_and(Value::is_array) {
        log::warn!("stored project has no `elementos` array; ignoring it");
        return None;
    }
    match Project::deserialize(&value) {
        Ok(project) => Some(project),
        Err(e) => {
            log::warn!("stored project is malformed ({e}); ignoring it");
            None
        }
    }
}

pub fn save_project(store: &mut dyn KeyValueStore, project: &Project) -> Result<(), StorageError> {
    let text = serde_json::to_string(project)?;
    store.set(PROJECT_KEY, &text)
}

/// Read the stored catalog list, if it is an array of templates.
pub fn load_catalog(store: &dyn KeyValueStore) -> Option<Vec<Template>> {
    let value = read_json(store, CATALOG_KEY)?;
    if !value.is_array() {
        log::warn!("stored catalog is not an array; ignoring it");
        return None;
    }
    match Vec::<Template>::deserialize(&value) {
        Ok(items) => Some(items),
        Err(e) => {
            log::warn!("stored catalog is malformed ({e}); ignoring it");
            None
        }
    }
}

pub fn save_catalog(store: &mut dyn KeyValueStore, items: &[Template]) -> Result<(), StorageError> {
    let text = serde_json::to_string(items)?;
    store.set(CATALOG_KEY, &text)
}

fn read_json(store: &dyn KeyValueStore, key: &str) -> Option<Value> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("reading `{key}` failed: {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("`{key}` does not hold valid JSON: {e}");
            None
        }
    }
}
