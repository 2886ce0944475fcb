//! Configuration management for sooplink
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default comment API root
pub const DEFAULT_API_BASE_URL: &str = "https://chapi.sooplive.co.kr/api";

/// Default root of post links
pub const DEFAULT_SITE_BASE_URL: &str = "https://www.sooplive.co.kr";

/// Nickname searched for when none is given
pub const DEFAULT_TARGET_NICK: &str = "애교용";

/// Upper bound on comment pages fetched per post
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint configuration
    pub api: ApiConfig,

    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Highlight search configuration
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Endpoint roots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Comment API root, e.g. `https://chapi.sooplive.co.kr/api`
    pub api_base_url: String,

    /// Root of generated post links, e.g. `https://www.sooplive.co.kr`
    pub site_base_url: String,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of comment pages fetched per post
    pub max_pages: u32,

    /// Maximum number of requests in flight; defaults to `max_pages` so every
    /// page of a post is requested at once
    pub max_concurrent_requests: usize,

    /// Rate limit (requests per second), unthrottled when absent
    pub rate_limit: Option<u32>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries for 429/5xx responses
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,

    /// Forwarding proxy base URL; requests become `{proxy}?url={target}`
    pub proxy_url: Option<String>,
}

/// Highlight search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Nickname used when the caller gives none
    pub default_nick: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            site_base_url: String::from(DEFAULT_SITE_BASE_URL),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            max_concurrent_requests: DEFAULT_MAX_PAGES as usize,
            rate_limit: None,
            request_timeout_secs: 30,
            max_retries: 0,
            user_agent: format!("sooplink/{}", env!("CARGO_PKG_VERSION")),
            proxy_url: None,
        }
    }
}

impl CrawlerConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_nick: String::from(DEFAULT_TARGET_NICK),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Accepted values of `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Accepted values of `logging.format`
const LOG_FORMATS: &[&str] = &["text", "json"];

impl LoggingConfig {
    /// Apply `--log-format` and `--verbose`, which win over file and environment
    #[must_use]
    pub fn with_cli(mut self, format: Option<&str>, verbose: bool) -> Self {
        if let Some(format) = format {
            self.format = format.trim().to_lowercase();
        }
        if verbose {
            self.level = String::from("debug");
        }
        self
    }

    /// `EnvFilter` directive: the crate at `level`, everything else at warn
    pub fn filter_directive(&self) -> String {
        format!("sooplink={},warn", self.level.trim().to_lowercase())
    }

    /// Whether events are written as JSON lines
    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

/// Read and parse an environment variable, `None` when unset or unparsable
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Read a non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Overlay `SOOPLINK_*` environment variables on this configuration
    pub fn apply_env(&mut self) {
        if let Some(v) = env_string("SOOPLINK_API_BASE_URL") {
            self.api.api_base_url = v;
        }
        if let Some(v) = env_string("SOOPLINK_SITE_BASE_URL") {
            self.api.site_base_url = v;
        }
        if let Some(v) = env_parse("SOOPLINK_MAX_PAGES") {
            self.crawler.max_pages = v;
        }
        if let Some(v) = env_parse("SOOPLINK_MAX_CONCURRENT_REQUESTS") {
            self.crawler.max_concurrent_requests = v;
        }
        if let Some(v) = env_parse("SOOPLINK_RATE_LIMIT") {
            self.crawler.rate_limit = Some(v);
        }
        if let Some(v) = env_parse("SOOPLINK_REQUEST_TIMEOUT") {
            self.crawler.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("SOOPLINK_MAX_RETRIES") {
            self.crawler.max_retries = v;
        }
        if let Some(v) = env_string("SOOPLINK_USER_AGENT") {
            self.crawler.user_agent = v;
        }
        if let Some(v) = env_string("SOOPLINK_PROXY_URL") {
            self.crawler.proxy_url = Some(v);
        }
        if let Some(v) = env_string("SOOPLINK_DEFAULT_NICK") {
            self.search.default_nick = v;
        }
        if let Some(v) = env_string("SOOPLINK_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env_string("SOOPLINK_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than 0");
        }

        if self.crawler.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be greater than 0");
        }

        if self.crawler.rate_limit == Some(0) {
            anyhow::bail!("rate_limit must be positive");
        }

        let level = self.logging.level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!("Unknown log level: {}", self.logging.level);
        }

        let format = self.logging.format.trim().to_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            anyhow::bail!("Unknown log format: {}", self.logging.format);
        }

        Url::parse(&self.api.api_base_url)
            .with_context(|| format!("Invalid api_base_url: {}", self.api.api_base_url))?;

        Url::parse(&self.api.site_base_url)
            .with_context(|| format!("Invalid site_base_url: {}", self.api.site_base_url))?;

        if let Some(proxy) = self.proxy_url() {
            Url::parse(proxy).with_context(|| format!("Invalid proxy_url: {proxy}"))?;
        }

        Ok(())
    }

    /// Configured proxy, ignoring blank values
    pub fn proxy_url(&self) -> Option<&str> {
        self.crawler
            .proxy_url
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}
