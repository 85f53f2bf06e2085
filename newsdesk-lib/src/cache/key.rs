//! Cache keys

use std::fmt;

/// Namespace used for news search results.
pub const DEFAULT_NAMESPACE: &str = "stockNews";

/// Identifies one cached query.
///
/// Rendered as `<namespace>_<subject>`. Equal inputs always produce equal keys.
///
/// # Example
///
/// ```
/// use newsdesk_lib::cache::CacheKey;
///
/// let key = CacheKey::new("stockNews", "MSFT");
/// assert_eq!(key.as_str(), "stockNews_MSFT");
/// assert_eq!(key.subject(), "MSFT");
/// assert_eq!(key.namespace(), "stockNews");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    raw: String,
    /// Byte offset of the subject within `raw`.
    subject_at: usize,
}

impl CacheKey {
    /// Creates a key from a namespace and a subject identifier.
    pub fn new(namespace: &str, subject: &str) -> Self {
        let raw = format!("{}{}", namespace_prefix(namespace), subject);
        Self {
            raw,
            subject_at: namespace.len() + 1,
        }
    }

    /// Creates a key in the default namespace.
    pub fn news(subject: &str) -> Self {
        Self::new(DEFAULT_NAMESPACE, subject)
    }

    /// The full key as stored.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The subject identifier (e.g. a stock symbol).
    pub fn subject(&self) -> &str {
        &self.raw[self.subject_at..]
    }

    /// The namespace the key lives in.
    pub fn namespace(&self) -> &str {
        &self.raw[..self.subject_at - 1]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// The prefix shared by every key in `namespace`.
pub fn namespace_prefix(namespace: &str) -> String {
    format!("{}_", namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(CacheKey::news("AAPL"), CacheKey::news("AAPL"));
        assert_ne!(CacheKey::news("AAPL"), CacheKey::news("aapl"));
    }

    #[test]
    fn test_subject_with_separator() {
        let key = CacheKey::new("stockNews", "BRK_B");
        assert_eq!(key.subject(), "BRK_B");
        assert_eq!(key.namespace(), "stockNews");
        assert!(key.as_str().starts_with(&namespace_prefix("stockNews")));
    }
}
