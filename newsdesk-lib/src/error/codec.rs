//! Cache envelope codec errors

/// A stored cache entry could not be turned back into an envelope.
///
/// The orchestrator treats this exactly like a miss and deletes the entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not a structurally valid envelope.
    #[error("Malformed cache entry: {0}")]
    Malformed(String),
}

/// A payload could not be serialized into an envelope.
#[derive(Debug, thiserror::Error)]
#[error("Failed to encode cache entry: {0}")]
pub struct EncodeError(#[from] pub serde_json::Error);
