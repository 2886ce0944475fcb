//! Comment payload parsing and nickname normalization
//!
//! This module turns raw comment API payloads into [`CommentRecord`]s and
//! canonicalizes nicknames for comparison.
//!
//! [`CommentRecord`]: crate::models::CommentRecord

pub mod fields;
pub mod nick;

pub use fields::{last_page, parse_comment_page, parse_reply_page, FieldAliases};
pub use nick::{normalize_nick, normalize_nick_value};
