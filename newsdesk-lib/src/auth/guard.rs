//! AuthGuard trait and the session-backed guard

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use log::info;

use super::SessionProvider;
use super::SessionToken;

/// Answers "is the caller authenticated" and triggers re-authentication.
///
/// Consulted by the orchestrator before every network request. Both methods
/// must return promptly: `is_authenticated` reads cached state and
/// `require_reauth` only schedules whatever navigation the frontend uses.
pub trait AuthGuard: Send + Sync {
    /// Returns `true` if a usable session exists.
    fn is_authenticated(&self) -> bool;

    /// Invalidates the session and asks the user to log in again.
    fn require_reauth(&self);
}

impl<T: AuthGuard + ?Sized> AuthGuard for Arc<T> {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    fn require_reauth(&self) {
        (**self).require_reauth()
    }
}

type ReauthHook = Box<dyn Fn() + Send + Sync>;

/// Holds the current session token.
///
/// Authenticated while it holds a token that has not expired. On
/// `require_reauth` the token is dropped and the optional hook runs; the
/// hook is where a frontend redirects to its login screen.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use newsdesk_lib::auth::{AuthGuard, SessionGuard, SessionToken};
///
/// let guard = Arc::new(SessionGuard::new().on_reauth(|| eprintln!("please log in")));
/// assert!(!guard.is_authenticated());
///
/// guard.establish(SessionToken::issued_now("token"));
/// assert!(guard.is_authenticated());
///
/// guard.require_reauth();
/// assert!(!guard.is_authenticated());
/// ```
#[derive(Default)]
pub struct SessionGuard {
    token: RwLock<Option<SessionToken>>,
    on_reauth: Option<ReauthHook>,
}

impl SessionGuard {
    /// Creates a guard with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a guard that starts with `token`.
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
            on_reauth: None,
        }
    }

    /// Sets the hook run by [`AuthGuard::require_reauth`].
    pub fn on_reauth(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_reauth = Some(Box::new(hook));
        self
    }

    /// Stores a freshly issued token.
    pub fn establish(&self, token: SessionToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drops the token without running the hook (e.g. on logout).
    pub fn clear(&self) -> Option<SessionToken> {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// The current token, expired or not.
    pub fn token(&self) -> Option<SessionToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("authenticated", &self.is_authenticated())
            .field("has_hook", &self.on_reauth.is_some())
            .finish()
    }
}

impl AuthGuard for SessionGuard {
    fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.is_expired())
    }

    fn require_reauth(&self) {
        if self.clear().is_some() {
            info!("session invalidated, re-authentication required");
        }
        if let Some(hook) = &self.on_reauth {
            hook();
        }
    }
}

impl SessionProvider for SessionGuard {
    fn session(&self) -> Option<SessionToken> {
        self.token().filter(|token| !token.is_expired())
    }
}
