//! Notification sink
//!
//! The orchestrator reports every terminal outcome through a [`Notifier`].
//! Notifying is fire-and-forget: a sink can neither block nor fail a fetch.

use std::fmt;

use tokio::sync::mpsc;

use crate::cache::CacheKey;
use crate::cache::Provenance;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Neutral information (e.g. served from cache).
    Info,
    /// A fetch completed.
    Success,
    /// Something the user should know but that did not fail the fetch.
    Warning,
    /// The fetch failed or needs user action.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A user-facing message with optional context.
///
/// # Example
///
/// ```
/// use newsdesk_lib::cache::CacheKey;
/// use newsdesk_lib::notify::{Level, Notification};
///
/// let n = Notification::error("Rate limit exceeded").for_key(&CacheKey::news("AAPL"));
/// assert_eq!(n.level, Level::Error);
/// assert_eq!(n.key.as_ref().map(|k| k.subject()), Some("AAPL"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Text shown to the user.
    pub message: String,
    /// The cache key the notification is about.
    pub key: Option<CacheKey>,
    /// Provenance of the payload involved, if any.
    pub provenance: Option<Provenance>,
}

impl Notification {
    /// Creates a notification at `level`.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            key: None,
            provenance: None,
        }
    }

    /// Creates an info notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    /// Creates a success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    /// Creates a warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    /// Creates an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    /// Attaches the cache key.
    pub fn for_key(mut self, key: &CacheKey) -> Self {
        self.key = Some(key.clone());
        self
    }

    /// Attaches provenance.
    pub fn with_provenance(mut self, provenance: &Provenance) -> Self {
        self.provenance = Some(provenance.clone());
        self
    }
}

/// Receives notifications from the orchestrator.
///
/// Implementations must return promptly and must not panic.
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    fn notify(&self, notification: Notification);
}

impl<F> Notifier for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Writes notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let key = notification
            .key
            .as_ref()
            .map(CacheKey::as_str)
            .unwrap_or("-");
        match notification.level {
            Level::Info | Level::Success => log::info!("[{}] {}", key, notification.message),
            Level::Warning => log::warn!("[{}] {}", key, notification.message),
            Level::Error => log::error!("[{}] {}", key, notification.message),
        }
    }
}

/// Forwards notifications over an unbounded channel.
///
/// Suits frontends that drain a toast queue from their own event loop.
/// Notifications sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiving half of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::info("first"));
        notifier.notify(Notification::warning("second"));

        assert_eq!(rx.recv().await.unwrap().message, "first");
        assert_eq!(rx.recv().await.unwrap().level, Level::Warning);
    }

    #[test]
    fn test_channel_ignores_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::error("nobody listening"));
    }

    #[test]
    fn test_closure_notifier() {
        let seen = std::sync::Mutex::new(Vec::new());
        let notifier = |n: Notification| seen.lock().unwrap().push(n.level);
        notifier.notify(Notification::success("done"));
        assert_eq!(*seen.lock().unwrap(), vec![Level::Success]);
    }
}
