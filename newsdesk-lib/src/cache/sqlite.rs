//! SQLite-backed persistent store.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;
use log::warn;

use super::CacheStore;

/// A persistent store backed by SQLite.
///
/// Entries live in a database file and survive process restarts. Uses WAL
/// journal mode for
/// better concurrent read performance. The single connection serializes
/// individual operations.
///
/// # Example
///
/// ```ignore
/// use newsdesk_lib::cache::SqliteStore;
///
/// // File-based store
/// let store = SqliteStore::open("cache.db").await?;
///
/// // In-memory store (for testing)
/// let store = SqliteStore::open_in_memory().await?;
/// ```
pub struct SqliteStore {
    client: Client,
}

impl SqliteStore {
    /// Opens a store at the specified path.
    ///
    /// Creates the database file and table if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, async_sqlite::Error> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory SQLite store.
    ///
    /// Data is lost when the store is dropped.
    pub async fn open_in_memory() -> Result<Self, async_sqlite::Error> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), async_sqlite::Error> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS cache_entries (
                        key TEXT PRIMARY KEY,
                        value BLOB NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> Result<usize, async_sqlite::Error> {
        self.client
            .conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|count| count as usize)
            })
            .await
    }

    /// Returns `true` if the store is empty.
    pub async fn is_empty(&self) -> Result<bool, async_sqlite::Error> {
        self.len().await.map(|len| len == 0)
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let key = key.to_string();

        let result = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM cache_entries WHERE key = ?")?;
                let mut rows = stmt.query([&key])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, Vec<u8>>(0)?)),
                    None => Ok(None),
                }
            })
            .await;

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!("cache read failed: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) {
        let key = key.to_string();

        let result = self
            .client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO cache_entries (key, value) VALUES (?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![key, value],
                )
            })
            .await;

        if let Err(e) = result {
            warn!("cache write failed: {}", e);
        }
    }

    async fn delete(&self, key: &str) {
        let key = key.to_string();

        let result = self
            .client
            .conn(move |conn| conn.execute("DELETE FROM cache_entries WHERE key = ?", [key]))
            .await;

        if let Err(e) = result {
            warn!("cache delete failed: {}", e);
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        // Prefix match via substr rather than LIKE, which would treat `_` as a wildcard.
        let prefix = prefix.to_string();

        let result = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT key FROM cache_entries WHERE substr(key, 1, length(?1)) = ?1",
                )?;
                let rows = stmt.query_map([&prefix], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()
            })
            .await;

        match result {
            Ok(keys) => keys,
            Err(e) => {
                warn!("cache key listing failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(store.is_empty().await.unwrap());

        store.set("stockNews_AAPL", b"first".to_vec()).await;
        store.set("stockNews_AAPL", b"second".to_vec()).await;
        assert_eq!(store.get("stockNews_AAPL").await, Some(b"second".to_vec()));
        assert_eq!(store.len().await.unwrap(), 1);

        store.delete("stockNews_AAPL").await;
        assert_eq!(store.get("stockNews_AAPL").await, None);
    }

    #[tokio::test]
    async fn test_prefix_treats_underscore_literally() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.set("stockNews_AAPL", vec![1]).await;
        store.set("stockNewsXAAPL", vec![2]).await;

        assert_eq!(
            store.keys_with_prefix("stockNews_").await,
            vec!["stockNews_AAPL".to_string()]
        );
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.set("stockNews_TSLA", b"persisted".to_vec()).await;
        }

        let store = SqliteStore::open(&path).await.unwrap();
        assert_eq!(store.get("stockNews_TSLA").await, Some(b"persisted".to_vec()));
    }
}
