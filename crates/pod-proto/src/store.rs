//! Persistent preference store: small JSON values under fixed keys.
//!
//! The whole key space lives in one JSON object on disk.  Every mutation
//! rewrites the file, so what is on disk always mirrors memory.  Values that
//! fail to decode are treated as absent (and logged), never as fatal.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::model::PlaybackSnapshot;

/// The fixed keys the application persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    /// Ordered list of query strings.
    SearchHistory,
    /// Ordered list of queued episodes.
    Queue,
    /// Single playback snapshot.
    PlayerState,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchHistory => "searchHistory",
            Self::Queue => "queue",
            Self::PlayerState => "playerState",
        }
    }
}

pub struct PreferenceStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl PreferenceStore {
    /// Open the store at `path`.  A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load_values(&path);
        debug!("prefs: opened {} ({} keys)", path.display(), values.len());
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        let values = self.lock();
        let raw = values.get(key.as_str())?.clone();
        drop(values);
        match serde_json::from_value(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("prefs: ignoring undecodable '{}': {}", key.as_str(), e);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: StoreKey, value: &T) -> anyhow::Result<()> {
        let encoded = serde_json::to_value(value)?;
        let mut values = self.lock();
        values.insert(key.as_str().to_string(), encoded);
        self.flush(&values)
    }

    pub fn remove(&self, key: StoreKey) -> anyhow::Result<()> {
        let mut values = self.lock();
        if values.remove(key.as_str()).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }

    // ── search history ────────────────────────────────────────────────────────

    pub fn search_history(&self) -> Vec<String> {
        self.get(StoreKey::SearchHistory).unwrap_or_default()
    }

    /// Append `term` unless the exact string is already present.
    /// Returns true when the list changed.
    pub fn push_search_history(&self, term: &str) -> anyhow::Result<bool> {
        let mut history = self.search_history();
        if history.iter().any(|h| h == term) {
            return Ok(false);
        }
        history.push(term.to_string());
        self.set(StoreKey::SearchHistory, &history)?;
        Ok(true)
    }

    pub fn reset_search_history(&self) -> anyhow::Result<()> {
        self.remove(StoreKey::SearchHistory)
    }

    // ── player state ──────────────────────────────────────────────────────────

    pub fn player_state(&self) -> Option<PlaybackSnapshot> {
        self.get(StoreKey::PlayerState)
    }

    pub fn save_player_state(&self, snapshot: &PlaybackSnapshot) -> anyhow::Result<()> {
        self.set(StoreKey::PlayerState, snapshot)
    }

    // ── internals ─────────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flush(&self, values: &Map<String, Value>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn load_values(path: &Path) -> Map<String, Value> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Map::new(),
        };
        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!("prefs: {} is not a JSON object, starting empty: {}", path.display(), e);
                Map::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json"));
        (dir, store)
    }

    #[test]
    fn test_history_never_duplicates() {
        let (_dir, store) = temp_store();
        assert!(store.push_search_history("Serial").unwrap());
        assert!(!store.push_search_history("Serial").unwrap());
        assert!(store.push_search_history("serial").unwrap());
        assert_eq!(store.search_history(), vec!["Serial", "serial"]);
    }

    #[test]
    fn test_history_survives_reopen_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let store = PreferenceStore::open(&path);
            store.push_search_history("a").unwrap();
            store.push_search_history("b").unwrap();
        }
        let store = PreferenceStore::open(&path);
        assert_eq!(store.search_history(), vec!["a", "b"]);

        store.reset_search_history().unwrap();
        assert!(store.search_history().is_empty());
        assert!(PreferenceStore::open(&path).search_history().is_empty());
    }

    #[test]
    fn test_player_state_overwrites() {
        let (_dir, store) = temp_store();
        assert!(store.player_state().is_none());

        let mut snap = PlaybackSnapshot {
            title: "Ep".into(),
            date: "1/2/2023".into(),
            current_time: 10.0,
            duration: 100.0,
            image: String::new(),
            src: "https://cdn.example/ep.mp3".into(),
        };
        store.save_player_state(&snap).unwrap();
        snap.current_time = 15.0;
        store.save_player_state(&snap).unwrap();
        assert_eq!(store.player_state().unwrap().current_time, 15.0);
    }

    #[test]
    fn test_wrong_shape_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"searchHistory": {"not": "a list"}}"#).unwrap();
        let store = PreferenceStore::open(&path);
        assert!(store.search_history().is_empty());
    }

    #[test]
    fn test_garbage_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let store = PreferenceStore::open(&path);
        assert!(store.player_state().is_none());
        store.push_search_history("x").unwrap();
        assert_eq!(PreferenceStore::open(&path).search_history(), vec!["x"]);
    }
}
