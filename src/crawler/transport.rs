//! HTTP transport
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building a client with browser-like headers and bounded timeouts
//! - A redirect policy that follows a limited number of same-host hops
//! - Retrying connect and timeout failures
//! - Error classification for the error log

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Pause before the second attempt; doubled for each further attempt
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Transport-level failures
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("more than {limit} redirect(s)")]
    TooManyRedirects { limit: usize },

    #[error("redirect left {from} for {to}")]
    HostMismatch { from: String, to: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read body: {0}")]
    Body(String),
}

impl TransportError {
    /// Short, stable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "Timeout",
            Self::Connect(_) => "ConnectError",
            Self::TooManyRedirects { .. } => "TooManyRedirects",
            Self::HostMismatch { .. } => "HostMismatch",
            Self::Request(_) => "RequestError",
            Self::Body(_) => "BodyError",
        }
    }

    /// Whether another attempt might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

/// A completed response, with the body fully read
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// URL the response was served from, after redirects
    pub final_url: String,
    /// Number of redirects followed to reach `final_url`
    pub redirect_count: usize,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can turn a URL into a response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
    max_attempts: u32,
}

impl HttpTransport {
    /// Builds the transport from the `[fetch]` table
    ///
    /// # Example
    ///
    /// ```no_run
    /// use domain_trawler::config::FetchConfig;
    /// use domain_trawler::crawler::HttpTransport;
    ///
    /// let transport = HttpTransport::new(&FetchConfig::default()).unwrap();
    /// ```
    pub fn new(config: &FetchConfig) -> Result<Self, TransportError> {
        let client = build_http_client(config)?;
        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let requested = Url::parse(url).map_err(|e| TransportError::Request(e.to_string()))?;

        let response = self
            .client
            .get(requested.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        // The policy caps the chain, so any change of URL is one hop per
        // allowed redirect; with the default cap that is exactly one.
        let redirect_count = usize::from(final_url != requested);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
            final_url: final_url.to_string(),
            redirect_count,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let backoff = RETRY_BACKOFF * 2u32.pow(attempt - 1);
                    tracing::debug!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempt,
                        url,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Builds an HTTP client with the configured headers, timeouts, and
/// redirect policy
pub fn build_http_client(config: &FetchConfig) -> Result<Client, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(
            config.connect_timeout_secs + config.read_timeout_secs,
        ))
        .redirect(same_host_policy(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| TransportError::Request(e.to_string()))
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|e| TransportError::Request(e.to_string()))
}

/// Follows at most `limit` redirects, and only while the host is unchanged
fn same_host_policy(limit: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > limit {
            return attempt.error(TransportError::TooManyRedirects { limit });
        }

        let origin = attempt
            .previous()
            .first()
            .and_then(|u| u.host_str())
            .unwrap_or_default()
            .to_string();
        let target = attempt.url().host_str().unwrap_or_default().to_string();

        if origin != target {
            return attempt.error(TransportError::HostMismatch {
                from: origin,
                to: target,
            });
        }

        attempt.follow()
    })
}

/// Maps a reqwest error onto the transport's error kinds
fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_redirect() {
        if let Some(inner) = find_transport_error(&error) {
            return inner;
        }
    }

    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

fn find_transport_error(error: &reqwest::Error) -> Option<TransportError> {
    let mut source = std::error::Error::source(error);
    while let Some(err) = source {
        if let Some(inner) = err.downcast_ref::<TransportError>() {
            return Some(inner.clone());
        }
        source = err.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> FetchConfig {
        FetchConfig {
            connect_timeout_secs: 2,
            read_timeout_secs: 2,
            max_attempts: 2,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(TransportError::Timeout("t".into()).kind(), "Timeout");
        assert_eq!(TransportError::Connect("c".into()).kind(), "ConnectError");
        assert!(TransportError::Connect("c".into()).is_retryable());
        assert!(!TransportError::TooManyRedirects { limit: 1 }.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&test_config()).unwrap();
        let response = transport
            .fetch(&format!("{}/home", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.redirect_count, 0);
        assert_eq!(response.body, b"<html>hi</html>");
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_fetch_follows_single_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&test_config()).unwrap();
        let response = transport
            .fetch(&format!("{}/old", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.redirect_count, 1);
        assert!(response.final_url.ends_with("/new"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_redirect_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/b"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/c"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&test_config()).unwrap();
        let result = transport.fetch(&format!("{}/a", server.uri())).await;

        assert!(matches!(
            result,
            Err(TransportError::TooManyRedirects { limit: 1 })
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_cross_host_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/away"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "http://other.test/page"),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&test_config()).unwrap();
        let result = transport.fetch(&format!("{}/away", server.uri())).await;

        assert!(matches!(result, Err(TransportError::HostMismatch { .. })));
    }

    #[tokio::test]
    async fn test_fetch_reports_status_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&test_config()).unwrap();
        let response = transport
            .fetch(&format!("{}/broken", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_connect_error() {
        let transport = HttpTransport::new(&test_config()).unwrap();
        let result = transport.fetch("http://127.0.0.1:9/nothing").await;

        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
