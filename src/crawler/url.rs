//! Post URL parsing for SOOP station posts
//!
//! Station posts are addressed in several ways:
//! - `https://www.sooplive.co.kr/station/{station_id}/post/{title_no}`
//! - `https://www.sooplive.co.kr/{station_id}/post/{title_no}`
//! - `.../post/{title_no}` with no station segment at all
//!
//! Patterns are tried from most to least specific and the first match wins.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::models::PostReference;
use crate::utils::error::ParseError;

/// `/station/{id}/post/{no}`
static STATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/station/([^/]+)/post/(\d+)").unwrap());

/// `/{id}/post/{no}`
static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)/post/(\d+)").unwrap());

/// `/post/{no}`
static POST_ONLY_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/post/(\d+)").unwrap());

/// Two path segments right after the host, followed by `/post/`
static BASE_PATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^/]+/([^/]+/[^/]+)/post/").unwrap());

/// Result of parsing a post URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPostUrl {
    /// A post number was found
    Resolved(PostReference),
    /// No pattern matched; the URL does not identify a post
    Unresolved,
}

impl ParsedPostUrl {
    /// Convert into a `Result`, failing with [`ParseError::PostIdNotFound`]
    pub fn into_result(self, url: &str) -> Result<PostReference, ParseError> {
        match self {
            Self::Resolved(post) => Ok(post),
            Self::Unresolved => Err(ParseError::PostIdNotFound(url.to_string())),
        }
    }
}

/// Post URL parser
#[derive(Debug, Clone, Copy, Default)]
pub struct PostUrlParser;

impl PostUrlParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a free-form post URL
    ///
    /// Never fails: anything that cannot be understood is
    /// [`ParsedPostUrl::Unresolved`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sooplink::crawler::url::{ParsedPostUrl, PostUrlParser};
    ///
    /// let parser = PostUrlParser::new();
    /// match parser.parse("https://www.sooplive.co.kr/station/abc/post/123") {
    ///     ParsedPostUrl::Resolved(post) => {
    ///         assert_eq!(post.station_id.as_deref(), Some("abc"));
    ///         assert_eq!(post.title_no, "123");
    ///     }
    ///     ParsedPostUrl::Unresolved => unreachable!(),
    /// }
    /// ```
    pub fn parse(&self, url: &str) -> ParsedPostUrl {
        let Some((station_id, title_no)) = self.extract_ids(url) else {
            return ParsedPostUrl::Unresolved;
        };

        ParsedPostUrl::Resolved(PostReference {
            station_id,
            title_no,
            base_path: self.extract_base_path(url),
        })
    }

    /// Parse a post URL, failing when no post number can be found
    ///
    /// # Errors
    ///
    /// Returns `ParseError::PostIdNotFound` if the URL does not identify a post
    pub fn resolve(&self, url: &str) -> Result<PostReference, ParseError> {
        self.parse(url).into_result(url)
    }

    /// Extract `(station_id, title_no)` from a URL
    ///
    /// For absolute URLs only the path is inspected so the host is never
    /// mistaken for a station id.
    pub fn extract_ids(&self, url: &str) -> Option<(Option<String>, String)> {
        let parsed = Url::parse(url.trim()).ok();
        let haystack = match &parsed {
            Some(u) if u.has_host() => u.path(),
            _ => url.trim(),
        };

        if let Some(caps) = STATION_PATTERN.captures(haystack) {
            return Some((Some(decode_segment(&caps[1])), caps[2].to_string()));
        }

        if let Some(caps) = SEGMENT_PATTERN.captures(haystack) {
            return Some((Some(decode_segment(&caps[1])), caps[2].to_string()));
        }

        if let Some(caps) = POST_ONLY_PATTERN.captures(haystack) {
            return Some((None, caps[1].to_string()));
        }

        None
    }

    /// Path pair preceding `/post/`, used to rebuild the post link
    pub fn extract_base_path(&self, url: &str) -> Option<String> {
        BASE_PATH_PATTERN
            .captures(url.trim())
            .map(|caps| caps[1].to_string())
    }
}

/// Percent-decode a path segment, keeping it as-is if it is not valid UTF-8
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(url: &str) -> PostReference {
        match PostUrlParser::new().parse(url) {
            ParsedPostUrl::Resolved(post) => post,
            ParsedPostUrl::Unresolved => panic!("expected {url} to resolve"),
        }
    }

    #[test]
    fn test_station_pattern() {
        let post = resolved("https://www.sooplive.co.kr/station/st1/post/77");
        assert_eq!(post.station_id.as_deref(), Some("st1"));
        assert_eq!(post.title_no, "77");
        assert_eq!(post.base_path.as_deref(), Some("station/st1"));
    }

    #[test]
    fn test_segment_pattern() {
        let post = resolved("https://ch.sooplive.co.kr/streamer01/post/123456");
        assert_eq!(post.station_id.as_deref(), Some("streamer01"));
        assert_eq!(post.title_no, "123456");
        assert!(post.base_path.is_none());
    }

    #[test]
    fn test_post_only_pattern() {
        let post = resolved("https://www.sooplive.co.kr/post/42");
        assert!(post.station_id.is_none());
        assert_eq!(post.title_no, "42");

        let relative = resolved("/post/42");
        assert!(relative.station_id.is_none());
        assert_eq!(relative.title_no, "42");
    }

    #[test]
    fn test_station_pattern_takes_precedence() {
        // Both the station and the segment patterns match; the station one wins
        let post = resolved("https://www.sooplive.co.kr/x/station/abc/post/5");
        assert_eq!(post.station_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let post = resolved("https://www.sooplive.co.kr/station/abc/post/900?tab=1#comment_noti3");
        assert_eq!(post.station_id.as_deref(), Some("abc"));
        assert_eq!(post.title_no, "900");
    }

    #[test]
    fn test_scheme_less_url() {
        let post = resolved("www.sooplive.co.kr/station/abc/post/9");
        assert_eq!(post.station_id.as_deref(), Some("abc"));
        assert_eq!(post.title_no, "9");
        assert!(post.base_path.is_none());
    }

    #[test]
    fn test_non_ascii_station_is_decoded() {
        let post = resolved("https://www.sooplive.co.kr/station/한글/post/12");
        assert_eq!(post.station_id.as_deref(), Some("한글"));
        assert_eq!(post.base_path.as_deref(), Some("station/한글"));

        let post = resolved("https://www.sooplive.co.kr/%ED%95%9C%EA%B8%80/post/12");
        assert_eq!(post.station_id.as_deref(), Some("한글"));
    }

    #[test]
    fn test_undecodable_station_kept_raw() {
        let post = resolved("https://www.sooplive.co.kr/station/%FF/post/1");
        assert_eq!(post.station_id.as_deref(), Some("%FF"));
    }

    #[test]
    fn test_unresolved() {
        let parser = PostUrlParser::new();
        assert_eq!(parser.parse("https://www.sooplive.co.kr/station/abc"), ParsedPostUrl::Unresolved);
        assert_eq!(parser.parse("https://www.sooplive.co.kr/post/abc"), ParsedPostUrl::Unresolved);
        assert_eq!(parser.parse(""), ParsedPostUrl::Unresolved);
        assert_eq!(parser.parse("not a url at all %%%"), ParsedPostUrl::Unresolved);
    }

    #[test]
    fn test_resolve_error() {
        let err = PostUrlParser::new().resolve("https://example.com/").unwrap_err();
        assert!(matches!(err, ParseError::PostIdNotFound(_)));
    }
}
