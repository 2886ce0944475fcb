//! HTTP transport for the SOOP comment API
//!
//! This module provides the JSON fetcher used by the comment client,
//! with features including:
//! - Optional forwarding proxy (`{proxy}?url={encoded target}`)
//! - Optional rate limiting with governor
//! - Bounded in-flight requests
//! - Retry with exponential backoff on retryable statuses

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client,
};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::CrawlerConfig;
use crate::utils::error::FetchError;

/// A source of JSON documents addressed by URL
///
/// The comment client only talks to this trait, so whether requests go out
/// directly, through a forwarding proxy, or to a scripted test double is
/// decided entirely by the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and decode the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Rewrite `target` so it is fetched through a forwarding proxy
///
/// # Example
/// ```
/// use sooplink::crawler::fetcher::proxied_url;
///
/// let url = proxied_url("https://proxy.example.dev", "https://api.example.com/a?page=2").unwrap();
/// assert_eq!(
///     url,
///     "https://proxy.example.dev/?url=https%3A%2F%2Fapi.example.com%2Fa%3Fpage%3D2"
/// );
/// ```
pub fn proxied_url(proxy_base: &str, target: &str) -> Result<String, FetchError> {
    let mut url = Url::parse(proxy_base)
        .map_err(|e| FetchError::InvalidUrl(format!("{proxy_base}: {e}")))?;
    url.query_pairs_mut().append_pair("url", target);
    Ok(url.into())
}

/// SOOP comment API fetcher
pub struct SoopFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Optional rate limiter to control request frequency
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,

    /// Caps the number of requests in flight
    semaphore: Arc<Semaphore>,

    /// Maximum number of retry attempts for retryable statuses
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,

    /// Forwarding proxy base URL, set once per session
    proxy_url: Option<String>,
}

impl SoopFetcher {
    /// Create a fetcher with default settings and no proxy
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::from_config(&CrawlerConfig::default())
    }

    /// Create a fetcher from crawler configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created, or
    /// `FetchError::InvalidUrl` if the configured proxy URL does not parse
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(Self::default_headers())
            .gzip(true)
            .build()?;

        let rate_limiter = config
            .rate_limit
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        let proxy_url = match config.proxy_url.as_deref().map(str::trim) {
            Some(proxy) if !proxy.is_empty() => {
                Url::parse(proxy).map_err(|e| FetchError::InvalidUrl(format!("{proxy}: {e}")))?;
                Some(proxy.to_string())
            }
            _ => None,
        };

        Ok(Self {
            client,
            rate_limiter,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            max_retries: config.max_retries,
            base_delay_ms: 500,
            proxy_url,
        })
    }

    /// Route every request through `proxy_url`, or go direct with `None`
    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url.filter(|p| !p.trim().is_empty());
        self
    }

    /// Configured proxy base URL
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// The URL that is actually requested for `target`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the proxy base URL does not parse
    pub fn request_url(&self, target: &str) -> Result<String, FetchError> {
        match &self.proxy_url {
            Some(proxy) => proxied_url(proxy, target),
            None => Ok(target.to_string()),
        }
    }

    /// Fetch with exponential backoff retry logic
    async fn fetch_with_retry(&self, url: &str) -> Result<Value, FetchError> {
        let mut last_error = FetchError::MaxRetriesExceeded;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::debug!(url = %url, attempt, delay_ms = delay, "Retrying request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
                        return serde_json::from_slice(&bytes)
                            .map_err(|e| FetchError::Decode(e.to_string()));
                    }

                    last_error = FetchError::ServerError(status.as_u16());
                    if !Self::should_retry(status.as_u16()) {
                        return Err(last_error);
                    }
                }
                Err(e) => {
                    // Connection-level failures are not retried
                    let err = FetchError::from_reqwest(e);
                    if !matches!(err, FetchError::Timeout) {
                        return Err(err);
                    }
                    last_error = err;
                }
            }
        }

        if self.max_retries == 0 {
            Err(last_error)
        } else {
            tracing::debug!(url = %url, error = %last_error, "Retries exhausted");
            Err(FetchError::MaxRetriesExceeded)
        }
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429, 500, 502, 503 and 504.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Headers sent with every request
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers
    }
}

#[async_trait]
impl Transport for SoopFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let request_url = self.request_url(url)?;

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| FetchError::Connect(e.to_string()))?;

        tracing::debug!(url = %url, via_proxy = self.proxy_url.is_some(), "Fetching JSON");

        self.fetch_with_retry(&request_url).await
    }
}
