//! Authentication error types

/// Errors that can occur during login, registration and logout.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid username or password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The server refused the request (e.g. username or email already taken).
    #[error("Rejected by server: {message}")]
    Rejected { message: String },

    /// Login succeeded but the response carried no session cookie.
    #[error("Login response did not set a session cookie")]
    MissingSessionCookie,

    /// Unexpected HTTP status from an auth endpoint.
    #[error("HTTP {status} from auth endpoint: {message}")]
    Http { status: u16, message: String },

    /// Network error during authentication.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
