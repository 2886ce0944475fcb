//! Field-alias tables for comment API payloads
//!
//! The comment API is not consistent about key names: depending on the endpoint
//! and API revision the author may be `user_nick`, `nickname`, `writer` and so
//! on. Each record kind is described by an ordered list of candidate keys per
//! field; the first key holding a non-empty value wins.

use serde_json::{Map, Value};

use crate::models::CommentRecord;
use crate::parser::nick::value_text;

/// Ordered candidate keys for each field of a record kind
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub nick: &'static [&'static str],
    pub id: &'static [&'static str],
    pub text: &'static [&'static str],
    /// Key of the reply counter, `None` when this record kind has no nested replies
    pub reply_count: Option<&'static str>,
}

/// Top-level comments
pub const COMMENT_FIELDS: FieldAliases = FieldAliases {
    nick: &["user_nick", "user_name", "nick", "nickname", "name", "writer"],
    id: &["p_comment_no", "c_comment_no", "comment_no", "id", "no"],
    text: &["comment", "content", "body", "message", "text"],
    reply_count: Some("c_comment_cnt"),
};

/// Replies inside a reply thread; replies of replies are not expanded
pub const REPLY_FIELDS: FieldAliases = FieldAliases {
    nick: &["user_nick"],
    id: &["c_comment_no", "comment_no"],
    text: &["comment"],
    reply_count: None,
};

/// Keys that may hold the comment array of a top-level page
pub const PAGE_LIST_KEYS: &[&str] = &["data", "comments"];

/// Keys that may hold the comment array of a reply page
pub const REPLY_LIST_KEYS: &[&str] = &["data"];

/// Whether a JSON value counts as "present"
///
/// `null`, `false`, `0` and `""` are absent; everything else, including empty
/// arrays and objects, is present.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First present value among `keys`
pub fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| is_present(value))
}

/// Coerce a JSON value to a count, `0` for anything non-numeric or negative
pub fn value_count(value: &Value) -> u64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(true) => Some(1.0),
        _ => None,
    };

    match number {
        Some(f) if f.is_finite() && f >= 1.0 => f.floor() as u64,
        _ => 0,
    }
}

/// Comment array of a payload, looked up through `keys`
///
/// The first present key is used even if it does not hold an array; in that
/// case, and when no key is present, the page counts as empty.
pub fn comment_list<'a>(payload: &'a Value, keys: &[&str]) -> &'a [Value] {
    payload
        .as_object()
        .and_then(|obj| first_present(obj, keys))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Map one raw comment object to a [`CommentRecord`]
///
/// Returns `None` for array entries that are not objects.
pub fn to_record(raw: &Value, fields: &FieldAliases) -> Option<CommentRecord> {
    let obj = raw.as_object()?;

    let text_of = |keys: &[&str]| {
        first_present(obj, keys)
            .map(value_text)
            .unwrap_or_default()
    };

    let comment_no = first_present(obj, fields.id)
        .map(value_text)
        .filter(|id| !id.is_empty());

    let reply_count = fields
        .reply_count
        .and_then(|key| obj.get(key))
        .map(value_count)
        .unwrap_or(0);

    Some(CommentRecord {
        user_nick: text_of(fields.nick),
        comment_no,
        comment: text_of(fields.text),
        reply_count,
        parent_no: None,
    })
}

/// Parse every top-level comment of a page payload
pub fn parse_comment_page(payload: &Value) -> Vec<CommentRecord> {
    comment_list(payload, PAGE_LIST_KEYS)
        .iter()
        .filter_map(|raw| to_record(raw, &COMMENT_FIELDS))
        .collect()
}

/// Parse every reply of a reply-thread payload
pub fn parse_reply_page(payload: &Value, parent_no: &str) -> Vec<CommentRecord> {
    comment_list(payload, REPLY_LIST_KEYS)
        .iter()
        .filter_map(|raw| to_record(raw, &REPLY_FIELDS))
        .map(|mut record| {
            record.parent_no = Some(parent_no.to_string());
            record
        })
        .collect()
}

/// `meta.last_page` of the first page, defaulting to 1 when absent or invalid
pub fn last_page(payload: &Value) -> u32 {
    let pages = payload
        .pointer("/meta/last_page")
        .filter(|value| is_present(value))
        .map(value_count)
        .unwrap_or(1);

    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}
