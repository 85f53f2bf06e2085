//! In-memory store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::CacheStore;

/// An in-memory store backed by a concurrent hash map.
///
/// Fast and thread-safe, but data is lost when the process exits. Used as
/// the default store and in tests.
///
/// # Example
///
/// ```
/// use newsdesk_lib::cache::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Creates a new store with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn set(&self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), value);
    }

    async fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await, None);

        store.set("k", b"one".to_vec()).await;
        store.set("k", b"two".to_vec()).await;
        assert_eq!(store.get("k").await, Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);

        store.delete("k").await;
        assert_eq!(store.get("k").await, None);
        store.delete("k").await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_keys_with_prefix() {
        let store = InMemoryStore::with_capacity(4);
        store.set("stockNews_AAPL", vec![]).await;
        store.set("stockNews_MSFT", vec![]).await;
        store.set("other_AAPL", vec![]).await;

        let mut keys = store.keys_with_prefix("stockNews_").await;
        keys.sort();
        assert_eq!(keys, vec!["stockNews_AAPL", "stockNews_MSFT"]);
    }
}
