//! Account endpoints: register, login, logout

use std::time::Duration;

use log::debug;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use reqwest::header::SET_COOKIE;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use super::SessionToken;
use crate::error::AuthError;
use crate::http::SESSION_COOKIE;
use crate::http::error_message;
use crate::http::parse_base_url;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct WhoAmIResponse {
    logged_in_as: String,
}

/// Client for the account endpoints of the news API.
///
/// Issues session tokens; it does not hold them. Pass the token from
/// [`login`](Self::login) to a [`SessionGuard`](super::SessionGuard).
///
/// # Example
///
/// ```ignore
/// use newsdesk_lib::auth::{AccountClient, SessionGuard};
///
/// let accounts = AccountClient::new("http://localhost:5000")?;
/// let token = accounts.login("alice", "hunter22").await?;
///
/// let guard = SessionGuard::new();
/// guard.establish(token);
/// ```
#[derive(Debug, Clone)]
pub struct AccountClient {
    base_url: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

impl AccountClient {
    /// Creates a client for the API at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        let base_url =
            parse_base_url(base_url).map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base_url,
            http_client: Client::new(),
            timeout: None,
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.http_client.post(url);
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Creates an account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .post(self.endpoint("api/register")?)
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("registered account {}", username);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        Err(match status {
            StatusCode::BAD_REQUEST => AuthError::Rejected { message },
            _ => AuthError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Logs in and returns the session token set by the server.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken, AuthError> {
        let response = self
            .post(self.endpoint("api/login")?)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let token = session_cookie(&response).ok_or(AuthError::MissingSessionCookie)?;
            debug!("logged in as {}", username);
            return Ok(SessionToken::issued_now(token));
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        Err(match status {
            StatusCode::UNAUTHORIZED => AuthError::InvalidCredentials,
            StatusCode::BAD_REQUEST => AuthError::Rejected { message },
            _ => AuthError::Http {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Logs out, asking the server to clear the session cookie.
    pub async fn logout(&self, token: Option<&SessionToken>) -> Result<(), AuthError> {
        let mut request = self.post(self.endpoint("api/logout")?);
        if let Some(token) = token {
            request = request.header(COOKIE, token.as_cookie());
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Http {
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }

    /// Asks the server who the token belongs to.
    ///
    /// Fails with [`AuthError::InvalidCredentials`] if the server no longer
    /// accepts the token.
    pub async fn whoami(&self, token: &SessionToken) -> Result<String, AuthError> {
        let mut request = self
            .http_client
            .get(self.endpoint("api/protected")?)
            .header(COOKIE, token.as_cookie());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            let who: WhoAmIResponse = response.json().await?;
            return Ok(who.logged_in_as);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 422 => AuthError::InvalidCredentials,
            code => AuthError::Http {
                status: code,
                message: error_message(&body, status),
            },
        })
    }
}

/// Finds the session token among the response's `Set-Cookie` headers.
fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
