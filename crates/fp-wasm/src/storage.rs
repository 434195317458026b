//! `localStorage` backend for the layout and catalog stores.

use fp_editor::{KeyValueStore, StorageError};
use wasm_bindgen::JsValue;

/// Browser `localStorage`, keyed exactly like the in-memory and file stores.
#[derive(Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Fails when there is no window (workers) or storage is disabled.
    pub fn open() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_unavailable)?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(js_unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Throws QuotaExceededError when full.
        self.storage.set_item(key, value).map_err(js_unavailable)
    }
}

fn js_unavailable(err: JsValue) -> StorageError {
    let msg = err.as_string().unwrap_or_else(|| format!("{err:?}"));
    StorageError::Unavailable(msg)
}
