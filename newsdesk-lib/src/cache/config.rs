//! Cache configuration

use std::time::Duration;

use super::key::DEFAULT_NAMESPACE;

/// Maximum age at which a cached envelope may be served without a network call.
///
/// Chosen per call site rather than globally: the mount-time display and an
/// active search tolerate different staleness.
///
/// # Example
///
/// ```
/// use newsdesk_lib::cache::FreshnessWindow;
///
/// assert_eq!(FreshnessWindow::ON_SEARCH, FreshnessWindow::from_minutes(60));
/// assert_eq!(FreshnessWindow::ON_MOUNT, FreshnessWindow::from_hours(24));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FreshnessWindow(Duration);

impl FreshnessWindow {
    /// Window used when showing cached results without searching: 24 hours.
    pub const ON_MOUNT: Self = Self(Duration::from_secs(24 * 60 * 60));

    /// Window used for an explicit search: 1 hour.
    pub const ON_SEARCH: Self = Self(Duration::from_secs(60 * 60));

    /// Creates a window from a duration.
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Creates a window of `minutes` minutes.
    pub const fn from_minutes(minutes: u64) -> Self {
        Self(Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// Creates a window of `hours` hours.
    pub const fn from_hours(hours: u64) -> Self {
        Self(Duration::from_secs(hours.saturating_mul(60 * 60)))
    }

    /// The window as a duration.
    pub fn duration(&self) -> Duration {
        self.0
    }

    /// The window in milliseconds, saturating at `i64::MAX`.
    pub fn as_millis(&self) -> i64 {
        i64::try_from(self.0.as_millis()).unwrap_or(i64::MAX)
    }
}

impl From<Duration> for FreshnessWindow {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

/// Configuration for the orchestrator's cache handling.
///
/// # Example
///
/// ```
/// use newsdesk_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_namespace("watchlist")
///     .with_max_entries(100);
/// assert_eq!(config.max_entries, Some(100));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix for every key this orchestrator manages.
    ///
    /// Default: `stockNews`
    pub namespace: String,

    /// Upper bound on stored entries in the namespace.
    ///
    /// When exceeded after a write, the oldest entries are deleted.
    /// Default: unbounded
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Bounds the number of stored entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Removes the entry bound.
    pub fn unbounded(mut self) -> Self {
        self.max_entries = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_windows_saturate() {
        let minutes = FreshnessWindow::from_minutes(u64::MAX / 10);
        assert_eq!(minutes.duration(), Duration::from_secs(u64::MAX));
        assert_eq!(minutes.as_millis(), i64::MAX);

        let hours = FreshnessWindow::from_hours(u64::MAX / 100);
        assert_eq!(hours.duration(), Duration::from_secs(u64::MAX));
        assert!(hours > FreshnessWindow::ON_MOUNT);
    }

    #[test]
    fn test_presets() {
        assert_eq!(FreshnessWindow::from_hours(1), FreshnessWindow::ON_SEARCH);
        assert_eq!(FreshnessWindow::ON_MOUNT.as_millis(), 24 * 60 * 60 * 1000);
    }
}
