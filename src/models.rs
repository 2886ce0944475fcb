// Core data structures for the sooplink comment finder

use serde::{Deserialize, Serialize};

/// Identifiers of a station post, resolved from a post URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PostReference {
    pub station_id: Option<String>, // None when the URL carries no station segment
    pub title_no: String,           // Post number, always digits
    pub base_path: Option<String>,  // Path pair before `/post/`, e.g. "station/abc"
}

impl PostReference {
    /// Station id, or empty string when unknown
    pub fn station_id_str(&self) -> &str {
        self.station_id.as_deref().unwrap_or("")
    }
}

/// One comment or reply as returned by the comment API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CommentRecord {
    pub user_nick: String,
    pub comment_no: Option<String>, // None when the payload has no usable id
    pub comment: String,
    pub reply_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_no: Option<String>, // Set on records that came from a reply thread
}

impl CommentRecord {
    /// Whether this record came from a reply thread
    pub fn is_reply(&self) -> bool {
        self.parent_no.is_some()
    }

    /// Whether the reply thread of this comment must be fetched separately
    pub fn has_replies(&self) -> bool {
        self.reply_count > 0 && self.comment_no.is_some()
    }
}

/// Outcome of a highlight search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightResult {
    pub found: bool,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentRecord>,
}

impl HighlightResult {
    pub fn found(link: String, comment: CommentRecord) -> Self {
        Self {
            found: true,
            link,
            comment: Some(comment),
        }
    }

    pub fn not_found(link: String) -> Self {
        Self {
            found: false,
            link,
            comment: None,
        }
    }
}
