//! Persisted string key/value store backing UI state.
//!
//! Entries live in a single `state.json` file. Keys are only ever created or
//! overwritten, never deleted; every write flushes the whole map to disk.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

/// Well-known keys, matching the persisted names the companion web app uses.
pub mod keys {
    /// Identifier of the last selected tab.
    pub const ACTIVE_TAB: &str = "activeTab";
    /// Theme mode: `day` or `night`.
    pub const THEME: &str = "theme";
    /// Prefix for per-item done flags; value is `1` or `0`.
    pub const ITEM_DONE_PREFIX: &str = "itemDone:";
}

pub struct StateStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl StateStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "State store opened");
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    /// Set `key` to `value` and flush to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    /// Read a done flag persisted under `itemDone:<id>`.
    pub fn item_done(&self, id: &str) -> bool {
        self.get(&format!("{}{}", keys::ITEM_DONE_PREFIX, id)) == Some("1")
    }

    /// Persist a done flag under `itemDone:<id>` as `1`/`0`.
    pub fn set_item_done(&mut self, id: &str, done: bool) -> Result<()> {
        let key = format!("{}{}", keys::ITEM_DONE_PREFIX, id);
        self.set(&key, if done { "1" } else { "0" })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_round_trip_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = StateStore::open(path.clone()).unwrap();
        store.set(keys::THEME, "day").unwrap();
        store.set(keys::ACTIVE_TAB, "Postflight").unwrap();

        let reopened = StateStore::open(path).unwrap();
        assert_eq!(reopened.get(keys::THEME), Some("day"));
        assert_eq!(reopened.get(keys::ACTIVE_TAB), Some("Postflight"));
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let (_dir, mut store) = temp_store();
        store.set(keys::THEME, "day").unwrap();
        store.set(keys::THEME, "night").unwrap();
        assert_eq!(store.get(keys::THEME), Some("night"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get(keys::ACTIVE_TAB), None);
        assert!(!store.item_done("Fuel quantity"));
    }

    #[test]
    fn test_item_done_flags() {
        let (_dir, mut store) = temp_store();
        store.set_item_done("Fuel quantity", true).unwrap();
        assert!(store.item_done("Fuel quantity"));
        assert_eq!(store.get("itemDone:Fuel quantity"), Some("1"));

        store.set_item_done("Fuel quantity", false).unwrap();
        assert!(!store.item_done("Fuel quantity"));
        assert_eq!(store.get("itemDone:Fuel quantity"), Some("0"));
    }
}
