//! Remote source seam
//!
//! The orchestrator issues at most one request per cache miss through a
//! [`RemoteSource`]. [`HttpNewsSource`] is the implementation for the news API.

mod http;

pub use http::HttpNewsSource;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::CacheKey;
use crate::cache::Provenance;
use crate::error::SourceError;

/// A result type that can be cached and counted.
pub trait CachePayload: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Number of items, used in user-facing messages.
    fn item_count(&self) -> usize;
}

impl<T> CachePayload for Vec<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn item_count(&self) -> usize {
        self.len()
    }
}

/// A successful response: the payload and how upstream produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResponse<P> {
    /// The result to cache and return.
    pub payload: P,
    /// Upstream metadata, stored alongside the payload.
    pub provenance: Provenance,
}

impl<P> SourceResponse<P> {
    /// Creates a response.
    pub fn new(payload: P, provenance: Provenance) -> Self {
        Self {
            payload,
            provenance,
        }
    }
}

/// Performs the network request behind a cache miss.
///
/// Implementations classify failures into [`SourceError`] so the orchestrator
/// can react to expired sessions and rate limiting.
#[async_trait]
pub trait RemoteSource: Send + Sync + 'static {
    /// Query parameters beyond the key.
    type Params: Send + 'static;

    /// The cached result type.
    type Payload: CachePayload;

    /// Issues one request for `key`.
    async fn fetch(
        &self,
        key: &CacheKey,
        params: Self::Params,
    ) -> Result<SourceResponse<Self::Payload>, SourceError>;
}
