//! In-memory store backend over a concurrent hash map
//!
//! Entries carry an absolute expiry deadline and are evicted lazily: an
//! expired entry is dropped the next time a read or existence check touches
//! it. There is no background sweeper.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::cache::traits::Store;

#[derive(Debug, Clone)]
struct StoredEntry<T> {
    value: T,
    expires_at: Option<Instant>,
}

impl<T> StoredEntry<T> {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

/// Concurrent in-memory key-value store with per-entry TTL.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    entries: DashMap<String, StoredEntry<T>>,
}

impl<T: Clone + Send + Sync + 'static> MemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .count()
    }

    /// Whether the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining lifetime of an entry; `None` for absent, expired, or
    /// unbounded entries
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entry = self.entries.get(key)?;
        let deadline = entry.expires_at?;
        deadline.checked_duration_since(Instant::now())
    }

    fn live_value(&self, key: &str) -> Option<T> {
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        // Removal must happen after the read guard is released; remove()
        // on a held shard would deadlock.
        self.entries.remove(key);
        None
    }
}

impl<T: Clone + Send + Sync + 'static> Store<T> for MemoryStore<T> {
    fn get(&self, key: &str) -> Option<T> {
        self.live_value(key)
    }

    fn get_multiple(&self, keys: &[String]) -> HashMap<String, T> {
        keys.iter()
            .filter_map(|key| self.live_value(key).map(|value| (key.clone(), value)))
            .collect()
    }

    fn set(&self, key: &str, value: T, ttl: Option<Duration>) -> bool {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), StoredEntry { value, expires_at });
        true
    }

    fn set_multiple(&self, items: HashMap<String, T>, ttl: Option<Duration>) -> bool {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        for (key, value) in items {
            self.entries.insert(key, StoredEntry { value, expires_at });
        }
        true
    }

    fn has(&self, key: &str) -> bool {
        self.live_value(key).is_some()
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key);
        true
    }

    fn delete_multiple(&self, keys: &[String]) -> bool {
        for key in keys {
            self.entries.remove(key);
        }
        true
    }

    fn clear(&self) -> bool {
        self.entries.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn set_get_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.set("a", 1u32, None));
        assert_eq!(store.get("a"), Some(1));
        assert!(store.has("a"));
        assert_eq!(store.get("b"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn entries_expire_lazily() {
        let store = MemoryStore::new();
        store.set("short", "v", Some(Duration::from_millis(20)));
        assert!(store.has("short"));
        sleep(Duration::from_millis(40));
        assert!(!store.has("short"));
        assert_eq!(store.get("short"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn ttl_remaining_reports_deadline() {
        let store = MemoryStore::new();
        store.set("timed", 7u8, Some(Duration::from_secs(60)));
        let remaining = store.ttl_remaining("timed").expect("deadline");
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(55));

        store.set("forever", 8u8, None);
        assert_eq!(store.ttl_remaining("forever"), None);
        assert_eq!(store.ttl_remaining("absent"), None);
    }

    #[test]
    fn delete_of_absent_key_succeeds() {
        let store: MemoryStore<u8> = MemoryStore::new();
        assert!(store.delete("ghost"));
    }

    #[test]
    fn batch_operations() {
        let store = MemoryStore::new();
        let items: HashMap<String, u32> =
            [("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
        assert!(store.set_multiple(items, None));

        let found = store.get_multiple(&["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(found.len(), 2);
        assert_eq!(found.get("a"), Some(&1));

        assert!(store.delete_multiple(&["a".to_string(), "c".to_string()]));
        assert!(!store.has("a"));
        assert!(store.has("b"));

        assert!(store.clear());
        assert!(store.is_empty());
    }
}
