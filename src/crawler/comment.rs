//! SOOP station post comment API client
//!
//! This module fetches every comment of a post. Top-level comments are
//! paginated; the first page is requested once to learn `meta.last_page`, then
//! every page is requested concurrently. Comments that report replies have
//! their reply threads fetched afterwards, again concurrently.
//!
//! Only the first (metadata) request can fail the whole operation. A failed
//! page or reply thread is logged and contributes nothing.

use futures::future::join_all;
use serde_json::Value;
use std::collections::HashSet;

use crate::config::Config;
use crate::crawler::fetcher::{SoopFetcher, Transport};
use crate::models::CommentRecord;
use crate::parser::fields::{last_page, parse_comment_page, parse_reply_page};
use crate::utils::error::FetchError;
use crate::utils::trim_slashes;

/// Statistics about one comment fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentStats {
    /// `meta.last_page` reported by the first page, after clamping
    pub last_page: u32,

    /// Page requests issued
    pub pages_requested: u32,

    /// Page requests that failed and were treated as empty
    pub pages_failed: u32,

    /// Top-level comments collected
    pub top_level: usize,

    /// Reply threads requested
    pub reply_threads: usize,

    /// Reply thread requests that failed
    pub reply_threads_failed: usize,

    /// Replies collected
    pub replies: usize,
}

impl CommentStats {
    /// Total records returned
    pub fn total(&self) -> usize {
        self.top_level + self.replies
    }
}

/// Comment API client
pub struct CommentClient<T = SoopFetcher> {
    transport: T,
    api_base: String,
}

impl CommentClient<SoopFetcher> {
    /// Create a client from configuration, honouring the configured proxy
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = SoopFetcher::from_config(&config.crawler)?;
        Ok(Self::with_transport(fetcher, config.api.api_base_url.clone()))
    }
}

impl<T: Transport> CommentClient<T> {
    /// Create a client over any transport
    pub fn with_transport(transport: T, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            transport,
            api_base,
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `{api}/[{station_id}/]title/{title_no}`
    fn title_base(&self, station_id: &str, title_no: &str) -> String {
        let station_id = trim_slashes(station_id);
        if station_id.is_empty() {
            format!("{}/title/{title_no}", self.api_base)
        } else {
            format!("{}/{station_id}/title/{title_no}", self.api_base)
        }
    }

    /// Build comment page URL
    ///
    /// # Arguments
    /// * `station_id` - Station id, empty when unknown
    /// * `title_no` - Post number
    /// * `page` - Page number (1-based), `None` for the bare endpoint
    pub fn build_url(&self, station_id: &str, title_no: &str, page: Option<u32>) -> String {
        let base = format!("{}/comment", self.title_base(station_id, title_no));
        match page {
            Some(page) => format!("{base}?page={page}"),
            None => base,
        }
    }

    /// Build reply thread URL for a parent comment
    pub fn build_reply_url(&self, station_id: &str, title_no: &str, parent_no: &str) -> String {
        format!(
            "{}/comment/{parent_no}/reply",
            self.title_base(station_id, title_no)
        )
    }

    /// Fetch a single page payload
    pub async fn fetch_page(
        &self,
        station_id: &str,
        title_no: &str,
        page: Option<u32>,
    ) -> Result<Value, FetchError> {
        let url = self.build_url(station_id, title_no, page);
        tracing::debug!(url = %url, "Fetching comments");
        self.transport.get_json(&url).await
    }

    /// Fetch the replies of one parent comment
    pub async fn fetch_replies(
        &self,
        station_id: &str,
        title_no: &str,
        parent_no: &str,
    ) -> Result<Vec<CommentRecord>, FetchError> {
        let url = self.build_reply_url(station_id, title_no, parent_no);
        tracing::debug!(url = %url, parent_no, "Fetching replies");
        let payload = self.transport.get_json(&url).await?;
        Ok(parse_reply_page(&payload, parent_no))
    }

    /// Fetch all comments and replies of a post as a flat list
    ///
    /// # Arguments
    /// * `station_id` - Station id, empty when unknown
    /// * `title_no` - Post number
    /// * `max_pages` - Upper bound on pages requested
    ///
    /// # Errors
    ///
    /// Fails only if the first (metadata) request fails
    pub async fn fetch_all_comments(
        &self,
        station_id: &str,
        title_no: &str,
        max_pages: u32,
    ) -> Result<Vec<CommentRecord>, FetchError> {
        let (comments, _) = self
            .fetch_all_comments_with_stats(station_id, title_no, max_pages)
            .await?;
        Ok(comments)
    }

    /// Like [`fetch_all_comments`](Self::fetch_all_comments), also returning fetch statistics
    pub async fn fetch_all_comments_with_stats(
        &self,
        station_id: &str,
        title_no: &str,
        max_pages: u32,
    ) -> Result<(Vec<CommentRecord>, CommentStats), FetchError> {
        let mut stats = CommentStats::default();

        // Metadata request: the only one allowed to fail the whole fetch
        let first = self.fetch_page(station_id, title_no, None).await?;
        stats.last_page = last_page(&first).min(max_pages);

        let page_urls: Vec<String> = (1..=stats.last_page)
            .map(|page| self.build_url(station_id, title_no, Some(page)))
            .collect();
        stats.pages_requested = stats.last_page;

        let pages = join_all(page_urls.iter().map(|url| async move {
            match self.transport.get_json(url).await {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Comment page fetch failed");
                    None
                }
            }
        }))
        .await;

        let mut comments: Vec<CommentRecord> = Vec::new();
        for payload in pages {
            match payload {
                Some(payload) => comments.extend(parse_comment_page(&payload)),
                None => stats.pages_failed += 1,
            }
        }
        stats.top_level = comments.len();

        // Pages are fully processed before any reply thread is requested
        let parent_ids = reply_parents(&comments);
        stats.reply_threads = parent_ids.len();

        let reply_results = join_all(parent_ids.iter().map(|parent_no| async move {
            match self.fetch_replies(station_id, title_no, parent_no).await {
                Ok(replies) => Some(replies),
                Err(e) => {
                    tracing::warn!(parent_no = %parent_no, error = %e, "Reply fetch failed");
                    None
                }
            }
        }))
        .await;

        for replies in reply_results {
            match replies {
                Some(replies) => {
                    stats.replies += replies.len();
                    comments.extend(replies);
                }
                None => stats.reply_threads_failed += 1,
            }
        }

        tracing::info!(
            station_id = %station_id,
            title_no = %title_no,
            pages = stats.pages_requested,
            failed_pages = stats.pages_failed,
            reply_threads = stats.reply_threads,
            total = comments.len(),
            "Fetched all comments"
        );

        Ok((comments, stats))
    }
}

/// Distinct ids of comments with replies, in first-seen order
pub fn reply_parents(comments: &[CommentRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    comments
        .iter()
        .filter(|c| c.has_replies())
        .filter_map(|c| c.comment_no.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted transport: answers from a URL → payload table, fails otherwise
    #[derive(Default)]
    struct ScriptedTransport {
        responses: HashMap<String, Value>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn respond(mut self, url: &str, payload: Value) -> Self {
            self.responses.insert(url.to_string(), payload);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or(FetchError::ServerError(500))
        }
    }

    const API: &str = "https://api.test/api";

    fn client(transport: ScriptedTransport) -> CommentClient<ScriptedTransport> {
        CommentClient::with_transport(transport, format!("{API}/"))
    }

    #[test]
    fn test_build_url() {
        let client = client(ScriptedTransport::default());

        assert_eq!(
            client.build_url("st1", "77", None),
            "https://api.test/api/st1/title/77/comment"
        );
        assert_eq!(
            client.build_url("st1", "77", Some(3)),
            "https://api.test/api/st1/title/77/comment?page=3"
        );
        assert_eq!(
            client.build_url("", "77", Some(1)),
            "https://api.test/api/title/77/comment?page=1"
        );
    }

    #[test]
    fn test_build_reply_url() {
        let client = client(ScriptedTransport::default());

        assert_eq!(
            client.build_reply_url("st1", "77", "123"),
            "https://api.test/api/st1/title/77/comment/123/reply"
        );
        assert_eq!(
            client.build_reply_url("", "77", "123"),
            "https://api.test/api/title/77/comment/123/reply"
        );
    }

    #[test]
    fn test_reply_parents_dedup() {
        let comments = vec![
            CommentRecord {
                comment_no: Some("1".to_string()),
                reply_count: 2,
                ..Default::default()
            },
            CommentRecord {
                comment_no: Some("1".to_string()),
                reply_count: 1,
                ..Default::default()
            },
            CommentRecord {
                comment_no: None,
                reply_count: 4,
                ..Default::default()
            },
            CommentRecord {
                comment_no: Some("2".to_string()),
                reply_count: 0,
                ..Default::default()
            },
            CommentRecord {
                comment_no: Some("3".to_string()),
                reply_count: 1,
                ..Default::default()
            },
        ];

        assert_eq!(reply_parents(&comments), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_clamps_to_max_pages() {
        let transport = ScriptedTransport::default()
            .respond(&format!("{API}/s/title/1/comment"), json!({"meta": {"last_page": 3}}))
            .respond(
                &format!("{API}/s/title/1/comment?page=1"),
                json!({"data": [{"user_nick": "a", "p_comment_no": 1}]}),
            )
            .respond(
                &format!("{API}/s/title/1/comment?page=2"),
                json!({"data": [{"user_nick": "b", "p_comment_no": 2}]}),
            )
            .respond(
                &format!("{API}/s/title/1/comment?page=3"),
                json!({"data": [{"user_nick": "c", "p_comment_no": 3}]}),
            );
        let client = client(transport);

        let (comments, stats) = client
            .fetch_all_comments_with_stats("s", "1", 2)
            .await
            .unwrap();

        assert_eq!(stats.pages_requested, 2);
        assert_eq!(comments.len(), 2);

        let page_requests = client
            .transport()
            .requests()
            .into_iter()
            .filter(|u| u.contains("?page="))
            .count();
        assert_eq!(page_requests, 2);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let transport = ScriptedTransport::default()
            .respond(&format!("{API}/title/9/comment"), json!({"meta": {"last_page": 3}}))
            .respond(
                &format!("{API}/title/9/comment?page=1"),
                json!({"data": [{"user_nick": "a", "p_comment_no": 1}]}),
            )
            .respond(
                &format!("{API}/title/9/comment?page=3"),
                json!({"comments": [{"nickname": "c", "id": 3}]}),
            );
        let client = client(transport);

        let (comments, stats) = client
            .fetch_all_comments_with_stats("", "9", 50)
            .await
            .unwrap();

        assert_eq!(stats.pages_failed, 1);
        let nicks: Vec<&str> = comments.iter().map(|c| c.user_nick.as_str()).collect();
        assert_eq!(nicks, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_metadata_failure_is_fatal() {
        let client = client(ScriptedTransport::default());

        let err = client.fetch_all_comments("s", "1", 50).await.unwrap_err();
        assert!(matches!(err, FetchError::ServerError(500)));
    }

    #[tokio::test]
    async fn test_replies_fetched_once_per_parent() {
        let transport = ScriptedTransport::default()
            .respond(&format!("{API}/s/title/5/comment"), json!({}))
            .respond(
                &format!("{API}/s/title/5/comment?page=1"),
                json!({"data": [
                    {"user_nick": "p", "p_comment_no": 10, "c_comment_cnt": 2},
                    {"user_nick": "dup", "p_comment_no": 10, "c_comment_cnt": 2},
                    {"user_nick": "q", "p_comment_no": 11, "c_comment_cnt": 1}
                ]}),
            )
            .respond(
                &format!("{API}/s/title/5/comment/10/reply"),
                json!({"data": [
                    {"user_nick": "r1", "c_comment_no": 100, "comment": "x"},
                    {"user_nick": "r2", "c_comment_no": 101, "comment": "y"}
                ]}),
            );
        let client = client(transport);

        let (comments, stats) = client
            .fetch_all_comments_with_stats("s", "5", 50)
            .await
            .unwrap();

        // Thread 11 has no scripted response and fails softly
        assert_eq!(stats.reply_threads, 2);
        assert_eq!(stats.reply_threads_failed, 1);
        assert_eq!(stats.replies, 2);
        assert_eq!(comments.len(), 5);
        assert_eq!(comments[3].parent_no.as_deref(), Some("10"));

        let thread_10 = client
            .transport()
            .requests()
            .into_iter()
            .filter(|u| u.ends_with("/comment/10/reply"))
            .count();
        assert_eq!(thread_10, 1);
    }
}
