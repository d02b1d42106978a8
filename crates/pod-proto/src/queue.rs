//! Listening queue, mirrored to the preference store after every change.
//!
//! Entries are matched by [`EpisodeKey`]; the same episode may be queued
//! more than once.

use std::sync::Arc;
use tracing::{debug, info};

use crate::model::{EpisodeKey, EpisodeSummary};
use crate::store::{PreferenceStore, StoreKey};

/// Ordered listening queue, mirrored to the preference store on every change.
///
/// Duplicates are allowed; insertion order is play order.
pub struct QueueManager {
    entries: Vec<EpisodeSummary>,
    store: Arc<PreferenceStore>,
}

impl QueueManager {
    /// Create a manager and load whatever the store holds.
    pub fn new(store: Arc<PreferenceStore>) -> Self {
        let mut manager = Self {
            entries: Vec::new(),
            store,
        };
        manager.reload();
        manager
    }

    /// Rebuild the in-memory queue from the store, discarding current entries.
    pub fn reload(&mut self) {
        self.entries = self
            .store
            .get::<Vec<EpisodeSummary>>(StoreKey::Queue)
            .unwrap_or_default();
        debug!("queue: loaded {} entries", self.entries.len());
    }

    pub fn enqueue(&mut self, episode: EpisodeSummary) -> anyhow::Result<()> {
        info!("queue: + {}", episode.title);
        self.entries.push(episode);
        self.persist()
    }

    /// Remove every entry with this key.  Returns how many were removed.
    pub fn remove(&mut self, key: &EpisodeKey) -> anyhow::Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| e.key() != *key);
        let removed = before - self.entries.len();
        info!("queue: - {} ({} removed)", key, removed);
        self.persist()?;
        Ok(removed)
    }

    /// Remove every entry whose title matches exactly.
    pub fn remove_title(&mut self, title: &str) -> anyhow::Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| e.title != title);
        let removed = before - self.entries.len();
        info!("queue: - '{}' ({} removed)", title, removed);
        self.persist()?;
        Ok(removed)
    }

    pub fn entries(&self) -> &[EpisodeSummary] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&EpisodeSummary> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &EpisodeKey) -> bool {
        self.entries.iter().any(|e| e.key() == *key)
    }

    /// The entry after the first one with `key`, for auto-advance.
    ///
    /// A key without a feed id (a resumed snapshot) matches on the audio URL.
    pub fn next_after(&self, key: &EpisodeKey) -> Option<&EpisodeSummary> {
        let pos = self.entries.iter().position(|e| match key.feed_id {
            Some(_) => e.key() == *key,
            None => e.enclosure_url == key.enclosure_url,
        })?;
        self.entries.get(pos + 1)
    }

    fn persist(&self) -> anyhow::Result<()> {
        self.store.set(StoreKey::Queue, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(title: &str, url: &str) -> EpisodeSummary {
        EpisodeSummary {
            title: title.into(),
            enclosure_url: url.into(),
            feed_id: Some(42),
            ..Default::default()
        }
    }

    fn manager() -> (tempfile::TempDir, Arc<PreferenceStore>, QueueManager) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PreferenceStore::open(dir.path().join("prefs.json")));
        let queue = QueueManager::new(store.clone());
        (dir, store, queue)
    }

    #[test]
    fn test_absent_key_reloads_empty() {
        let (_dir, _store, queue) = manager();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_by_key_drops_duplicates() {
        let (_dir, store, mut queue) = manager();
        let a = episode("A", "https://cdn.example/a.mp3");
        queue.enqueue(a.clone()).unwrap();
        queue.enqueue(episode("B", "https://cdn.example/b.mp3")).unwrap();
        queue.enqueue(a.clone()).unwrap();
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.remove(&a.key()).unwrap(), 2);
        assert_eq!(queue.len(), 1);
        assert!(!queue.contains(&a.key()));

        let stored: Vec<EpisodeSummary> = store.get(StoreKey::Queue).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "B");
    }

    #[test]
    fn test_same_title_different_episode_kept_by_key() {
        let (_dir, _store, mut queue) = manager();
        let a = episode("Trailer", "https://cdn.example/a.mp3");
        let b = episode("Trailer", "https://cdn.example/b.mp3");
        queue.enqueue(a.clone()).unwrap();
        queue.enqueue(b.clone()).unwrap();

        queue.remove(&a.key()).unwrap();
        assert_eq!(queue.entries(), &[b]);
    }

    #[test]
    fn test_remove_title_drops_all_matches() {
        let (_dir, _store, mut queue) = manager();
        queue.enqueue(episode("Trailer", "https://cdn.example/a.mp3")).unwrap();
        queue.enqueue(episode("Trailer", "https://cdn.example/b.mp3")).unwrap();
        queue.enqueue(episode("Ep 1", "https://cdn.example/c.mp3")).unwrap();

        assert_eq!(queue.remove_title("Trailer").unwrap(), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.remove_title("missing").unwrap(), 0);
    }

    #[test]
    fn test_reload_restores_stored_order() {
        let (_dir, store, mut queue) = manager();
        queue.enqueue(episode("1", "u1")).unwrap();
        queue.enqueue(episode("2", "u2")).unwrap();
        queue.enqueue(episode("3", "u3")).unwrap();

        let fresh = QueueManager::new(store);
        let titles: Vec<_> = fresh.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["1", "2", "3"]);
    }

    #[test]
    fn test_next_after() {
        let (_dir, _store, mut queue) = manager();
        let first = episode("1", "u1");
        let last = episode("2", "u2");
        queue.enqueue(first.clone()).unwrap();
        queue.enqueue(last.clone()).unwrap();

        assert_eq!(queue.next_after(&first.key()), Some(&last));
        assert_eq!(queue.next_after(&last.key()), None);
        assert_eq!(queue.next_after(&episode("x", "nope").key()), None);

        let resumed = EpisodeKey {
            feed_id: None,
            enclosure_url: "u1".into(),
        };
        assert_eq!(queue.next_after(&resumed), Some(&last));
    }
}
