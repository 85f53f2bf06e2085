//! Shared HTTP helpers for the news API.

use serde::Deserialize;
use url::Url;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "access_token_cookie";

/// Default API location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Parses a base URL so that relative joins append to its path.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Error body shapes the API uses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    msg: Option<String>,
}

/// Extracts a human-readable message from an error response body.
pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.msg))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        })
}
