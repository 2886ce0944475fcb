//! Highlight search over the comments of a station post
//!
//! [`HighlightResolver`] ties the pieces together: the post URL is resolved to
//! its ids, every comment and reply is fetched, and the first comment whose
//! normalized author nickname equals the normalized target becomes the
//! highlight. Without a match the result still carries a plain post link.

pub mod link;

use crate::config::Config;
use crate::crawler::comment::CommentClient;
use crate::crawler::fetcher::{SoopFetcher, Transport};
use crate::crawler::url::PostUrlParser;
use crate::error::Result;
use crate::models::{CommentRecord, HighlightResult, PostReference};
use crate::parser::nick::normalize_nick;

pub use link::{build_post_link, post_link};

/// Finds a user's comment on a post and builds the link to it
pub struct HighlightResolver<T = SoopFetcher> {
    client: CommentClient<T>,
    parser: PostUrlParser,
    site_base_url: String,
    default_nick: String,
    max_pages: u32,
}

impl HighlightResolver<SoopFetcher> {
    /// Create a resolver backed by the HTTP fetcher
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| crate::error::Error::config(format!("{e:#}")))?;
        let client = CommentClient::from_config(config)?;
        Ok(Self::new(client, config))
    }
}

impl<T: Transport> HighlightResolver<T> {
    /// Create a resolver over an existing comment client
    pub fn new(client: CommentClient<T>, config: &Config) -> Self {
        Self {
            client,
            parser: PostUrlParser::new(),
            site_base_url: config.api.site_base_url.clone(),
            default_nick: config.search.default_nick.clone(),
            max_pages: config.crawler.max_pages,
        }
    }

    /// The comment client used for fetching
    pub fn client(&self) -> &CommentClient<T> {
        &self.client
    }

    /// Nickname searched for when the caller gives none
    pub fn default_nick(&self) -> &str {
        &self.default_nick
    }

    /// Resolve a post URL, failing when it carries no post number
    pub fn resolve_post(&self, url: &str) -> Result<PostReference> {
        Ok(self.parser.resolve(url.trim())?)
    }

    /// Fetch every comment and reply of the post at `url`
    ///
    /// # Errors
    ///
    /// Fails if the URL has no post number or the first comment request fails
    pub async fn fetch_post_comments(
        &self,
        url: &str,
    ) -> Result<(PostReference, Vec<CommentRecord>)> {
        let post = self.resolve_post(url)?;
        let comments = self
            .client
            .fetch_all_comments(post.station_id_str(), &post.title_no, self.max_pages)
            .await?;
        Ok((post, comments))
    }

    /// Find the comment written by `target_nick` on the post at `url`
    ///
    /// A missing or blank `target_nick` falls back to the configured default
    /// nickname. A whitespace-only nickname is treated as missing rather than
    /// searched for literally, so it never picks a comment without an author.
    ///
    /// Only an unresolvable URL or a failed first comment request is an error;
    /// "no such comment" is a normal result with `found == false`.
    pub async fn pick_highlight(
        &self,
        url: &str,
        target_nick: Option<&str>,
    ) -> Result<HighlightResult> {
        let (post, comments) = self.fetch_post_comments(url).await?;

        let target = target_nick
            .map(str::trim)
            .filter(|nick| !nick.is_empty())
            .unwrap_or(self.default_nick.as_str());
        let normalized_target = normalize_nick(target);

        let result = match find_match(&comments, &normalized_target) {
            Some(comment) => {
                let link = post_link(&self.site_base_url, &post, comment.comment_no.as_deref());
                HighlightResult::found(link, comment.clone())
            }
            None => HighlightResult::not_found(post_link(&self.site_base_url, &post, None)),
        };

        tracing::info!(
            title_no = %post.title_no,
            target = %target,
            scanned = comments.len(),
            found = result.found,
            link = %result.link,
            "Highlight search finished"
        );

        Ok(result)
    }
}

/// First comment whose normalized author equals `normalized_target`
///
/// An empty target never matches.
pub fn find_match<'a>(
    comments: &'a [CommentRecord],
    normalized_target: &str,
) -> Option<&'a CommentRecord> {
    if normalized_target.is_empty() {
        return None;
    }
    comments
        .iter()
        .find(|c| normalize_nick(&c.user_nick) == normalized_target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{FetchError, ParseError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[derive(Default)]
    struct StaticTransport {
        responses: HashMap<String, Value>,
    }

    impl StaticTransport {
        fn respond(mut self, url: &str, payload: Value) -> Self {
            self.responses.insert(url.to_string(), payload);
            self
        }
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn get_json(&self, url: &str) -> std::result::Result<Value, FetchError> {
            self.responses
                .get(url)
                .cloned()
                .ok_or(FetchError::ServerError(404))
        }
    }

    const API: &str = "https://api.test/api";
    const POST_URL: &str = "https://www.sooplive.co.kr/station/st1/post/77";

    fn resolver(transport: StaticTransport) -> HighlightResolver<StaticTransport> {
        let config = Config::default();
        HighlightResolver::new(CommentClient::with_transport(transport, API), &config)
    }

    fn single_page(comments: Value) -> StaticTransport {
        StaticTransport::default()
            .respond(&format!("{API}/st1/title/77/comment"), json!({"meta": {"last_page": 1}}))
            .respond(&format!("{API}/st1/title/77/comment?page=1"), json!({ "data": comments }))
    }

    fn nick(user_nick: &str, comment_no: Option<&str>) -> CommentRecord {
        CommentRecord {
            user_nick: user_nick.to_string(),
            comment_no: comment_no.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_match_is_case_insensitive() {
        let comments = vec![nick("Foo", Some("1")), nick("bar", Some("2"))];
        let hit = find_match(&comments, &normalize_nick("FOO")).unwrap();
        assert_eq!(hit.comment_no.as_deref(), Some("1"));
    }

    #[test]
    fn test_find_match_first_wins() {
        let comments = vec![nick("kim", Some("1")), nick(" KIM ", Some("2"))];
        let hit = find_match(&comments, "kim").unwrap();
        assert_eq!(hit.comment_no.as_deref(), Some("1"));
    }

    #[test]
    fn test_find_match_full_width() {
        let comments = vec![nick("ｋｉｍ", Some("3"))];
        assert!(find_match(&comments, &normalize_nick("Kim")).is_some());
    }

    #[test]
    fn test_empty_target_never_matches() {
        let comments = vec![nick("", Some("1"))];
        assert!(find_match(&comments, "").is_none());
        assert!(find_match(&[], "kim").is_none());
    }

    #[tokio::test]
    async fn test_pick_highlight_found() {
        let transport = single_page(json!([
            {"user_nick": "bar", "p_comment_no": 1},
            {"user_nick": "Foo", "p_comment_no": 2}
        ]));
        let result = resolver(transport).pick_highlight(POST_URL, Some("FOO")).await.unwrap();

        assert!(result.found);
        assert_eq!(
            result.link,
            "https://www.sooplive.co.kr/station/st1/post/77#comment_noti2"
        );
        assert_eq!(result.comment.unwrap().user_nick, "Foo");
    }

    #[tokio::test]
    async fn test_pick_highlight_not_found_has_no_anchor() {
        let transport = single_page(json!([]));
        let result = resolver(transport).pick_highlight(POST_URL, Some("kim")).await.unwrap();

        assert!(!result.found);
        assert_eq!(result.link, "https://www.sooplive.co.kr/station/st1/post/77");
        assert!(!result.link.contains('#'));
    }

    #[tokio::test]
    async fn test_pick_highlight_match_without_id() {
        let transport = single_page(json!([{"user_nick": "kim", "comment": "hi"}]));
        let result = resolver(transport).pick_highlight(POST_URL, Some("kim")).await.unwrap();

        assert!(result.found);
        assert_eq!(result.link, "https://www.sooplive.co.kr/station/st1/post/77");
    }

    #[tokio::test]
    async fn test_blank_nick_uses_default() {
        let transport = single_page(json!([
            {"user_nick": "someone", "p_comment_no": 1},
            {"user_nick": "애교용", "p_comment_no": 9}
        ]));
        let resolver = resolver(transport);

        let result = resolver.pick_highlight(POST_URL, Some("   ")).await.unwrap();
        assert!(result.found);
        assert!(result.link.ends_with("#comment_noti9"));

        let result = resolver.pick_highlight(POST_URL, None).await.unwrap();
        assert!(result.found);
    }

    #[tokio::test]
    async fn test_unresolvable_url_is_error() {
        let err = resolver(StaticTransport::default())
            .pick_highlight("https://www.sooplive.co.kr/station/st1", Some("kim"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Parse(ParseError::PostIdNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_metadata_failure_surfaces_status() {
        let err = resolver(StaticTransport::default())
            .pick_highlight(POST_URL, Some("kim"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Fetch(FetchError::ServerError(404))
        ));
    }
}
