//! Authentication
//!
//! The orchestrator only needs the [`AuthGuard`] signal. [`SessionGuard`] is
//! the standard implementation: it holds the session token obtained through
//! [`AccountClient`] and hands it to the HTTP source via [`SessionProvider`].

mod account;
mod guard;
mod token;

pub use account::AccountClient;
pub use guard::AuthGuard;
pub use guard::SessionGuard;
pub use token::SESSION_LIFETIME;
pub use token::SessionProvider;
pub use token::SessionToken;
pub use token::StaticSession;
