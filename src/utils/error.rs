//! Error types for the sooplink crawler
//!
//! This module defines the domain error types used by the fetcher and parser.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection could not be established (DNS, refused, TLS, blocked)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Non-success status code
    #[error("HTTP {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,

    /// Response body was not valid JSON
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classify a transport-level reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Whether the request never reached the origin
    ///
    /// This is what a blocked cross-origin or firewalled request looks like from
    /// the caller's side, as opposed to the origin answering with an error status.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Self::Connect(_) => true,
            Self::Http(e) => e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// HTTP status code, if the origin answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError(code) => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// No post (title) number could be resolved from the URL
    #[error("Could not find a post number (title_no) in URL: {0}")]
    PostIdNotFound(String),
}
