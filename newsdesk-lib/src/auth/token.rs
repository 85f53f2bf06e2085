//! SessionProvider trait and SessionToken

use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::http::SESSION_COOKIE;

/// How long the server honours a session token after login.
pub const SESSION_LIFETIME: std::time::Duration = std::time::Duration::from_secs(3600);

/// A session token issued by the login endpoint.
///
/// Sent back to the API as the `access_token_cookie` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// The opaque token value.
    pub value: String,
    /// When the server stops accepting the token, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    /// Creates a token with unknown expiry.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    /// Creates a token with an expiration time.
    pub fn with_expiry(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Creates a token that expires one [`SESSION_LIFETIME`] from now.
    pub fn issued_now(value: impl Into<String>) -> Self {
        let lifetime = Duration::from_std(SESSION_LIFETIME).unwrap_or(Duration::zero());
        Self::with_expiry(value, Utc::now() + lifetime)
    }

    /// Returns `true` if the token has expired.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns `true` if the token will expire within the given duration.
    pub fn expires_within(&self, duration: Duration) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() + duration >= exp)
    }

    /// The `Cookie` header value carrying this token.
    pub fn as_cookie(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.value)
    }
}

/// Supplies the current session token to outgoing requests.
pub trait SessionProvider: Send + Sync {
    /// The token to send, or `None` to send the request without one.
    fn session(&self) -> Option<SessionToken>;
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn session(&self) -> Option<SessionToken> {
        (**self).session()
    }
}

/// A provider that always returns the same token.
///
/// Useful for testing or scripted use with a known token.
///
/// # Example
///
/// ```
/// use newsdesk_lib::auth::{SessionProvider, StaticSession};
///
/// let provider = StaticSession::new("eyJhbGciOi...");
/// assert!(provider.session().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: SessionToken,
}

impl StaticSession {
    /// Creates a provider for the given token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            token: SessionToken::new(value),
        }
    }

    /// Creates a provider from an existing token.
    pub fn from_token(token: SessionToken) -> Self {
        Self { token }
    }
}

impl SessionProvider for StaticSession {
    fn session(&self) -> Option<SessionToken> {
        Some(self.token.clone())
    }
}
