//! Cache envelope and its codec
//!
//! An envelope is the unit persisted under a [`CacheKey`](super::CacheKey):
//! the payload, the provenance reported by the remote source, and the time
//! the orchestrator wrote it. Envelopes are stored as JSON.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;
use crate::error::EncodeError;

/// Where the remote source says the payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// Freshly produced upstream.
    Live,
    /// Served from the upstream's own cache.
    Cache,
}

impl Source {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cache => "server cache",
        }
    }
}

/// How a payload was obtained upstream.
///
/// Passed through untouched: stored with the payload and re-emitted in
/// notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Live or upstream-cached.
    pub source: Source,
    /// Time the upstream spent producing the payload.
    pub fetch_duration_seconds: f64,
    /// Sources (domains) the upstream skipped while producing the payload.
    #[serde(default)]
    pub excluded_sources: BTreeSet<String>,
}

impl Provenance {
    /// Creates provenance with no excluded sources.
    pub fn new(source: Source, fetch_duration_seconds: f64) -> Self {
        Self {
            source,
            fetch_duration_seconds,
            excluded_sources: BTreeSet::new(),
        }
    }

    /// Adds excluded sources.
    pub fn with_excluded<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sources
            .extend(sources.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if the upstream excluded any source.
    pub fn has_exclusions(&self) -> bool {
        !self.excluded_sources.is_empty()
    }
}

/// A persisted payload with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope<T> {
    /// Wall-clock time of the write, in milliseconds since the Unix epoch.
    pub stored_at_epoch_millis: i64,
    /// The cached result.
    pub payload: T,
    /// Upstream metadata.
    pub provenance: Provenance,
}

impl<T> CacheEnvelope<T> {
    /// Age of the envelope at `now_millis`, never negative.
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.stored_at_epoch_millis).max(0)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a, T> {
    stored_at_epoch_millis: i64,
    payload: &'a T,
    provenance: &'a Provenance,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stamp {
    stored_at_epoch_millis: i64,
}

/// Serializes an envelope.
///
/// Output is deterministic for identical input.
pub fn encode<T: Serialize>(
    payload: &T,
    provenance: &Provenance,
    stored_at_epoch_millis: i64,
) -> Result<Vec<u8>, EncodeError> {
    let envelope = EnvelopeRef {
        stored_at_epoch_millis,
        payload,
        provenance,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Deserializes an envelope.
///
/// Never panics: any structural problem is reported as [`DecodeError::Malformed`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<CacheEnvelope<T>, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Reads only the write stamp of an encoded envelope.
///
/// Used for sweeping and eviction, where the payload type does not matter.
pub fn decode_stamp(bytes: &[u8]) -> Result<i64, DecodeError> {
    serde_json::from_slice::<Stamp>(bytes)
        .map(|stamp| stamp.stored_at_epoch_millis)
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}
