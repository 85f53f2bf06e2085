//! Result of an orchestrated fetch

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server's rate limit was exceeded. No automatic backoff is applied.
    RateLimited,
    /// Any other failure, with a human-readable message.
    Other(String),
}

impl FetchFailure {
    /// The message shown to the user for this failure.
    pub fn message(&self) -> &str {
        match self {
            Self::RateLimited => "Rate limit exceeded, try again later",
            Self::Other(message) => message,
        }
    }
}

/// Terminal outcome of [`FetchOrchestrator::fetch`](crate::FetchOrchestrator::fetch).
///
/// Each variant has already been reported to the notifier by the time the
/// caller sees it, so callers should not notify again.
///
/// # Example
///
/// ```ignore
/// match orchestrator.fetch(&key, query, FreshnessWindow::ON_SEARCH).await {
///     Outcome::Hit(articles) | Outcome::Fetched(articles) => render(articles),
///     Outcome::Unauthenticated => show_login(),
///     Outcome::Failed(_) => {}
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Served from a fresh cache entry. No request was made.
    Hit(T),
    /// Fetched from the remote source and written to the cache.
    Fetched(T),
    /// No usable session. Re-authentication has been requested.
    Unauthenticated,
    /// The request failed. The cache was not touched.
    Failed(FetchFailure),
}

impl<T> Outcome<T> {
    /// Returns `true` if this was served from cache.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Returns `true` if this was freshly fetched.
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    /// Returns `true` if the caller must re-authenticate.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Returns a reference to the payload, if any.
    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Hit(payload) | Self::Fetched(payload) => Some(payload),
            Self::Unauthenticated | Self::Failed(_) => None,
        }
    }

    /// Consumes the outcome and returns the payload, if any.
    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Hit(payload) | Self::Fetched(payload) => Some(payload),
            Self::Unauthenticated | Self::Failed(_) => None,
        }
    }

    /// Returns the failure, if any.
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Maps the payload using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Hit(payload) => Outcome::Hit(f(payload)),
            Self::Fetched(payload) => Outcome::Fetched(f(payload)),
            Self::Unauthenticated => Outcome::Unauthenticated,
            Self::Failed(failure) => Outcome::Failed(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let hit: Outcome<Vec<u8>> = Outcome::Hit(vec![1, 2]);
        assert!(hit.is_hit());
        assert_eq!(hit.payload().map(Vec::len), Some(2));
        assert_eq!(hit.map(|v| v.len()), Outcome::Hit(2));

        let failed: Outcome<()> = Outcome::Failed(FetchFailure::RateLimited);
        assert_eq!(failed.failure(), Some(&FetchFailure::RateLimited));
        assert_eq!(failed.into_payload(), None);
    }
}
