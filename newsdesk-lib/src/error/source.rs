//! Remote source failure classification

use super::ApiError;

/// A classified failure from a remote source.
///
/// The orchestrator branches on the variant: `Unauthorized` triggers
/// re-authentication, `RateLimited` and `Other` are reported as failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The session was rejected by the server.
    #[error("Unauthorized")]
    Unauthorized,

    /// The server's rate limit was exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// Creates an `Other` failure from any message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<ApiError> for SourceError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized
        } else if err.is_rate_limited() {
            Self::RateLimited
        } else {
            Self::Other(err.to_string())
        }
    }
}
