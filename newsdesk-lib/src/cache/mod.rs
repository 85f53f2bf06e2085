//! Client-side caching layer
//!
//! Provides the [`CacheStore`] trait with in-memory and SQLite backends,
//! the [`CacheEnvelope`] stored under each [`CacheKey`], its codec, and the
//! staleness policy the orchestrator applies to it.

mod config;
mod envelope;
mod key;
mod memory;
mod policy;
mod sqlite;

pub use config::*;
pub use envelope::*;
pub use key::*;
pub use memory::*;
pub use policy::*;
pub use sqlite::*;

use std::sync::Arc;

use async_trait::async_trait;

/// Durable key/value persistence for encoded envelopes.
///
/// Stores hold raw bytes and apply no policy of their own: no expiry, no
/// eviction. Every operation is individually atomic, so a reader sees either
/// the previous value or the complete new one.
///
/// Backends swallow their own I/O failures (after logging them): a failed
/// `get` reads as absent and a failed `set` or `delete` is a no-op.
///
/// # Example
///
/// ```ignore
/// use newsdesk_lib::cache::{CacheStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.set("stockNews_AAPL", b"{...}".to_vec()).await;
///
/// if let Some(bytes) = store.get("stockNews_AAPL").await {
///     println!("{} bytes cached", bytes.len());
/// }
/// ```
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Retrieves the bytes stored under `key`.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>);

    /// Removes `key`.
    async fn delete(&self, key: &str);

    /// Lists every key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) {
        (**self).delete(key).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        (**self).keys_with_prefix(prefix).await
    }
}
