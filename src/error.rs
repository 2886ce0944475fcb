//! Unified error handling for the sooplink crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`SooplinkErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use thiserror::Error;

use crate::i18n::t;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{FetchError, ParseError};

/// Common trait for all sooplink error types
pub trait SooplinkErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, proxy)
    Network,
    /// URL and payload parsing errors
    Parsing,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl SooplinkErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout | Self::MaxRetriesExceeded | Self::Connect(_) => true,
            Self::ServerError(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::ServerError(code) => t!("errors.fetch.status", status = code).to_string(),
            Self::Timeout => t!("errors.fetch.timeout").to_string(),
            _ => format!("{}: {self}", t!("errors.fetch.error")),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl SooplinkErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::PostIdNotFound(_) => t!("errors.parse.post_id_not_found").to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

/// Unified error type for the sooplink crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SooplinkErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(e) => e.is_recoverable(),
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Fetch(e) => e.localized_desc(),
            Self::Parse(e) => e.localized_desc(),
            Self::Json(e) => format!("{}: {e}", t!("errors.json.error")),
            Self::Config(msg) => format!("{}: {msg}", t!("errors.config.error")),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the request never reached the origin
    ///
    /// From the user's side this is indistinguishable from a blocked
    /// cross-origin request, which a forwarding proxy works around.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_connection_failure(),
            _ => false,
        }
    }

    /// Status line shown to the user when an operation fails
    pub fn status_message(&self) -> String {
        if self.is_connection_failure() {
            t!("status.network_failure").to_string()
        } else {
            t!("status.error", message = self.localized_desc()).to_string()
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
