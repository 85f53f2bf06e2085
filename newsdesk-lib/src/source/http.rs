//! HTTP source for the news endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::COOKIE;
use serde::Deserialize;
use url::Url;

use super::RemoteSource;
use super::SourceResponse;
use crate::auth::SessionProvider;
use crate::cache::CacheKey;
use crate::cache::Provenance;
use crate::cache::Source;
use crate::error::ApiError;
use crate::error::SourceError;
use crate::http::error_message;
use crate::http::parse_base_url;
use crate::model::Article;
use crate::model::NewsQuery;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireSource {
    Api,
    Cache,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    articles: Vec<Article>,
    source: WireSource,
    #[serde(default)]
    fetch_time: f64,
    #[serde(default)]
    blocked_domains: Vec<String>,
}

impl From<NewsResponse> for SourceResponse<Vec<Article>> {
    fn from(response: NewsResponse) -> Self {
        let source = match response.source {
            WireSource::Api => Source::Live,
            WireSource::Cache => Source::Cache,
        };
        let provenance =
            Provenance::new(source, response.fetch_time).with_excluded(response.blocked_domains);
        SourceResponse::new(response.articles, provenance)
    }
}

/// Fetches summarised articles from `GET /api/news`.
///
/// Attaches the session cookie from its [`SessionProvider`] to every request.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use newsdesk_lib::auth::SessionGuard;
/// use newsdesk_lib::source::HttpNewsSource;
///
/// let guard = Arc::new(SessionGuard::new());
/// let source = HttpNewsSource::new("http://localhost:5000", guard.clone())?
///     .with_timeout(Duration::from_secs(120));
/// ```
#[derive(Clone)]
pub struct HttpNewsSource {
    base_url: Url,
    http_client: Client,
    session: Arc<dyn SessionProvider>,
    timeout: Option<Duration>,
}

impl HttpNewsSource {
    /// Creates a source for the API at `base_url`.
    pub fn new(
        base_url: &str,
        session: impl SessionProvider + 'static,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base_url,
            http_client: Client::new(),
            session: Arc::new(session),
            timeout: None,
        })
    }

    /// Sets the request timeout.
    ///
    /// Summarisation is slow on the server side, so keep this generous.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Returns the base URL of the API.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Performs the request and returns the unclassified error on failure.
    pub async fn get_news(
        &self,
        query: &NewsQuery,
    ) -> Result<SourceResponse<Vec<Article>>, ApiError> {
        let mut url = self
            .base_url
            .join("api/news")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("stock", query.stock())
            .append_pair("num_articles", &query.num_articles().to_string());

        let mut request = self.http_client.get(url);
        if let Some(token) = self.session.session() {
            request = request.header(COOKIE, token.as_cookie());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| match self.timeout {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::from(e),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), error_message(&body, status)));
        }

        let news: NewsResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body))?;
        debug!(
            "received {} articles for {} ({:?})",
            news.articles.len(),
            query.stock(),
            news.source
        );
        Ok(news.into())
    }
}

#[async_trait]
impl RemoteSource for HttpNewsSource {
    type Params = NewsQuery;
    type Payload = Vec<Article>;

    async fn fetch(
        &self,
        _key: &CacheKey,
        query: NewsQuery,
    ) -> Result<SourceResponse<Vec<Article>>, SourceError> {
        Ok(self.get_news(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::auth::SessionGuard;
    use crate::auth::StaticSession;

    fn query() -> NewsQuery {
        NewsQuery::new("AAPL", 3).unwrap()
    }

    #[tokio::test]
    async fn test_success_maps_provenance() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/news")
                    .query_param("stock", "AAPL")
                    .query_param("num_articles", "3")
                    .header("cookie", "access_token_cookie=tok");
                then.status(200).json_body(json!({
                    "articles": [
                        {"title": "T1", "summary": "S1", "url": "https://x.example/1", "image_url": "https://x.example/1.jpg"},
                        {"title": "T2", "summary": "S2", "url": "https://x.example/2", "image_url": null}
                    ],
                    "source": "api",
                    "fetch_time": 1.5,
                    "blocked_domains": ["paywalled.example"]
                }));
            })
            .await;

        let source = HttpNewsSource::new(&server.base_url(), StaticSession::new("tok")).unwrap();
        let response = source.fetch(&CacheKey::news("AAPL"), query()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.payload.len(), 2);
        assert_eq!(response.payload[1].image_url, None);
        assert_eq!(response.provenance.source, Source::Live);
        assert_eq!(response.provenance.fetch_duration_seconds, 1.5);
        assert!(response.provenance.excluded_sources.contains("paywalled.example"));
    }

    #[tokio::test]
    async fn test_server_cache_source() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(200).json_body(json!({
                    "articles": [],
                    "source": "cache",
                    "fetch_time": 0.01,
                    "blocked_domains": []
                }));
            })
            .await;

        let source = HttpNewsSource::new(&server.base_url(), StaticSession::new("tok")).unwrap();
        let response = source.get_news(&query()).await.unwrap();
        assert_eq!(response.provenance.source, Source::Cache);
        assert!(!response.provenance.has_exclusions());
    }

    #[tokio::test]
    async fn test_status_classification() {
        for (status, expected) in [
            (401, SourceError::Unauthorized),
            (422, SourceError::Unauthorized),
            (429, SourceError::RateLimited),
        ] {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/api/news");
                    then.status(status).json_body(json!({"msg": "nope"}));
                })
                .await;

            let source =
                HttpNewsSource::new(&server.base_url(), StaticSession::new("tok")).unwrap();
            let result = source.fetch(&CacheKey::news("AAPL"), query()).await;
            assert_eq!(result, Err(expected), "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_server_error_is_other() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(500)
                    .json_body(json!({"error": "Failed to fetch news", "details": "upstream"}));
            })
            .await;

        let source = HttpNewsSource::new(&server.base_url(), StaticSession::new("tok")).unwrap();
        let result = source.fetch(&CacheKey::news("AAPL"), query()).await;
        assert_eq!(
            result,
            Err(SourceError::Other("HTTP 500: Failed to fetch news".to_string()))
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_other() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(200).body("[]");
            })
            .await;

        let source = HttpNewsSource::new(&server.base_url(), StaticSession::new("tok")).unwrap();
        let result = source.fetch(&CacheKey::news("AAPL"), query()).await;
        assert!(matches!(result, Err(SourceError::Other(_))));
    }

    #[tokio::test]
    async fn test_no_cookie_without_session() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news").header_missing("cookie");
                then.status(401).json_body(json!({"msg": "Missing cookie"}));
            })
            .await;

        let source =
            HttpNewsSource::new(&server.base_url(), Arc::new(SessionGuard::new())).unwrap();
        let result = source.fetch(&CacheKey::news("AAPL"), query()).await;

        mock.assert_async().await;
        assert_eq!(result, Err(SourceError::Unauthorized));
    }
}
