//! Nickname normalization for author matching
//!
//! Nicknames are compared only after both sides went through [`normalize_nick`]:
//! NFKC compatibility normalization (folds full-width and half-width forms),
//! lowercasing, then trimming.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// Normalize a nickname string for comparison
///
/// # Examples
///
/// ```
/// use sooplink::parser::nick::normalize_nick;
///
/// assert_eq!(normalize_nick(" ÀBC "), "àbc");
/// assert_eq!(normalize_nick("ＫＩＭ"), "kim");
/// ```
pub fn normalize_nick(nick: &str) -> String {
    nick.nfkc().collect::<String>().to_lowercase().trim().to_string()
}

/// Normalize a raw JSON value that is supposed to hold a nickname
///
/// `null`, `false` and `""` become the empty string. Numbers (including zero)
/// normalize to their decimal text. Arrays and objects are not nicknames and
/// also become empty.
pub fn normalize_nick_value(value: &Value) -> String {
    normalize_nick(&value_text(value))
}

/// Text form of a scalar JSON value, empty for anything that is not a scalar
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
