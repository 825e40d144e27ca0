//! Durable Local Key-Value Store
//!
//! A namespaced key-value store persisted as one JSON file under the app
//! directory. Backs the offline entity snapshots (`local_prompts`,
//! `local_variables`, `local_history`) and short-lived token storage.
//! Read failures degrade to empty results; nothing here panics over a bad
//! file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use tracing::warn;

use crate::utils::error::AppResult;
use crate::utils::paths::{ensure_promptdeck_dir, storage_path};

/// Namespaced JSON key-value store
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    data: Mutex<HashMap<String, Value>>,
}

impl LocalStore {
    /// Open the store at the default location, creating the app directory
    /// if needed
    pub fn new() -> AppResult<Self> {
        ensure_promptdeck_dir()?;
        Ok(Self::at_path(storage_path()?))
    }

    /// Open the store at an explicit path
    pub fn at_path(path: PathBuf) -> Self {
        let data = Self::load(&path);
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn load(path: &PathBuf) -> HashMap<String, Value> {
        if !path.exists() {
            return HashMap::new();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!("local storage file is corrupt, starting empty: {e}");
                    HashMap::new()
                }
            },
            Err(e) => {
                warn!("could not read local storage file: {e}");
                HashMap::new()
            }
        }
    }

    /// Get the values for the given keys; missing keys are absent from the
    /// result
    pub fn get(&self, keys: &[&str]) -> HashMap<String, Value> {
        let data = self.data.lock().unwrap();
        keys.iter()
            .filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }

    /// Get a single value
    pub fn get_one(&self, key: &str) -> Option<Value> {
        self.data.lock().unwrap().get(key).cloned()
    }

    /// Merge the given entries into the store and persist
    pub fn set(&self, entries: HashMap<String, Value>) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        data.extend(entries);
        self.persist(&data)
    }

    /// Set a single value and persist
    pub fn set_one(&self, key: &str, value: Value) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        data.insert(key.to_string(), value);
        self.persist(&data)
    }

    /// Remove the given keys and persist
    pub fn remove(&self, keys: &[&str]) -> AppResult<()> {
        let mut data = self.data.lock().unwrap();
        for key in keys {
            data.remove(*key);
        }
        self.persist(&data)
    }

    /// Whether the store's directory is reachable
    pub fn is_healthy(&self) -> bool {
        self.path.parent().map(|p| p.exists()).unwrap_or(false)
    }

    fn persist(&self, data: &HashMap<String, Value>) -> AppResult<()> {
        let content = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::at_path(dir.path().join("storage.json"));
        (dir, store)
    }

    #[test]
    fn test_set_and_get() {
        let (_dir, store) = temp_store();
        store.set_one("auth_token", json!("tok_123")).unwrap();

        assert_eq!(store.get_one("auth_token"), Some(json!("tok_123")));
        let map = store.get(&["auth_token", "missing"]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let (_dir, store) = temp_store();
        store.set_one("a", json!(1)).unwrap();
        store.set_one("b", json!(2)).unwrap();
        store.remove(&["a"]).unwrap();

        assert!(store.get_one("a").is_none());
        assert_eq!(store.get_one("b"), Some(json!(2)));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = LocalStore::at_path(path.clone());
        store.set_one("local_prompts", json!([{"promptName": "x"}])).unwrap();
        drop(store);

        let reopened = LocalStore::at_path(path);
        assert!(reopened.get_one("local_prompts").is_some());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = LocalStore::at_path(path);
        assert!(store.get_one("anything").is_none());
    }
}
