//! Comment crawling for SOOP station posts
//!
//! - [`url`] resolves post URLs to station id and post number
//! - [`fetcher`] performs HTTP requests, optionally through a forwarding proxy
//! - [`comment`] walks comment pages and reply threads

pub mod comment;
pub mod fetcher;
pub mod url;

pub use comment::{CommentClient, CommentStats};
pub use fetcher::{proxied_url, SoopFetcher, Transport};
pub use url::{ParsedPostUrl, PostUrlParser};
