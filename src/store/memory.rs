use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::ResultStore;

/// In-process store. Clones share the same entries, like every page of one tab does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls since creation.
    pub fn write_count(&self) -> usize {
        *recover(&self.writes)
    }

    pub fn is_empty(&self) -> bool {
        recover(&self.entries).is_empty()
    }
}

/// Takes the lock even if a previous holder panicked.
fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Result store lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

impl ResultStore for MemoryStore {
    fn put(&self, key: &str, value: String) {
        debug!("Storing {} ({} bytes)", key, value.len());
        recover(&self.entries).insert(key.to_string(), value);
        *recover(&self.writes) += 1;
    }

    fn get(&self, key: &str) -> Option<String> {
        recover(&self.entries).get(key).cloned()
    }

    fn clear(&self) {
        debug!("Clearing result store");
        recover(&self.entries).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites_and_clones_share_entries() {
        let store = MemoryStore::new();
        let other_page = store.clone();

        store.put("finalScore", "1.2".to_string());
        store.put("finalScore", "3.4".to_string());

        assert_eq!(other_page.get("finalScore").as_deref(), Some("3.4"));
        assert_eq!(other_page.write_count(), 2);
        assert_eq!(store.get("capturedPoses"), None);
    }

    #[test]
    fn clear_removes_everything() {
        let store = MemoryStore::new();
        store.put("finalScore", "2".to_string());
        store.put("capturedPoses", "[]".to_string());
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("finalScore"), None);
    }

    #[test]
    fn writes_survive_a_poisoned_lock() {
        let store = MemoryStore::new();
        let crashed = store.clone();
        let _ = std::thread::spawn(move || {
            let _entries = crashed.entries.lock().unwrap();
            panic!("page crashed while holding the store");
        })
        .join();
        assert!(store.entries.is_poisoned());

        store.put("finalScore", "2".to_string());
        assert_eq!(store.get("finalScore").as_deref(), Some("2"));
        assert_eq!(store.write_count(), 1);
    }
}
