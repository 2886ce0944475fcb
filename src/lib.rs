//! sooplink - SOOP station post comment finder
//!
//! Finds the comment a given user left on a SOOP station post and builds a
//! deep link to it, falling back to the plain post link when there is none.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Post URL parsing, HTTP transport and comment pagination
//! - [`parser`] - Comment payload mapping and nickname normalization
//! - [`highlight`] - Highlight search and link construction
//! - [`models`] - Core data structures and types
//! - [`clipboard`] - Copying result links to the system clipboard
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use sooplink::config::Config;
//! use sooplink::highlight::HighlightResolver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let resolver = HighlightResolver::from_config(&config)?;
//!     let result = resolver
//!         .pick_highlight("https://www.sooplive.co.kr/station/abc/post/123", Some("kim"))
//!         .await?;
//!     println!("{}", result.link);
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod clipboard;
pub mod config;
pub mod crawler;
pub mod error;
pub mod highlight;
pub mod i18n;
pub mod models;
pub mod parser;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{CommentClient, PostUrlParser, SoopFetcher, Transport};
    pub use crate::error::{Error, ErrorCategory, Result, SooplinkErrorTrait};
    pub use crate::highlight::HighlightResolver;
    pub use crate::models::{CommentRecord, HighlightResult, PostReference};
    pub use crate::parser::normalize_nick;
}

// Direct re-exports for convenience
pub use models::{CommentRecord, HighlightResult, PostReference};
