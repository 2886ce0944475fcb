//! Internationalization (i18n) support for sooplink
//!
//! Status lines and error descriptions are available in Korean (ko) and
//! English (en).
//!
//! # Environment Variables
//!
//! - `SOOPLINK_LANG`: Set the preferred language (ko, en). Defaults to English.

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

/// Set the current locale for translations
///
/// # Arguments
///
/// * `locale` - Language code (ko, en, or a region form such as ko-KR)
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(normalize_locale(locale));
}

/// Initialize i18n from environment variables
///
/// Reads `SOOPLINK_LANG` environment variable to set the locale.
/// Falls back to English if not set or invalid.
pub fn init_from_env() {
    let locale = std::env::var("SOOPLINK_LANG").unwrap_or_else(|_| "en".to_string());
    set_locale(&locale);
}

/// Normalize locale code to supported format
///
/// - ko-KR, ko_KR, korean -> ko
/// - anything else -> en
fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("ko") || lower == "korean" {
        "ko"
    } else {
        "en"
    }
}

/// Localized status line for a finished search
pub fn search_status(found: bool) -> String {
    if found {
        t!("status.found").to_string()
    } else {
        t!("status.not_found").to_string()
    }
}

/// Localized status line after the link was copied
pub fn copied_status(found: bool) -> String {
    if found {
        t!("status.copied_highlight").to_string()
    } else {
        t!("status.copied_post").to_string()
    }
}

/// Localized status line for a failed clipboard write
pub fn copy_failed_status(reason: &str) -> String {
    t!("status.copy_failed", reason = reason).to_string()
}

/// Localized warning for an empty URL
pub fn empty_url_status() -> String {
    t!("status.empty_url").to_string()
}

/// Localized status line while the post URL is being parsed
pub fn parsing_status() -> String {
    t!("status.parsing").to_string()
}

/// Localized status line while a search is running
pub fn searching_status() -> String {
    t!("status.searching").to_string()
}

/// Localized status line describing the request mode
pub fn proxy_status(proxy_url: Option<&str>) -> String {
    match proxy_url {
        Some(proxy) => t!("status.proxy", proxy = proxy).to_string(),
        None => t!("status.direct").to_string(),
    }
}

/// Translate a key with optional parameters
///
/// This is a re-export of rust_i18n::t! for convenience.
#[doc(inline)]
pub use rust_i18n::t;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("ko"), "ko");
        assert_eq!(normalize_locale("ko-KR"), "ko");
        assert_eq!(normalize_locale("ko_KR"), "ko");
        assert_eq!(normalize_locale("korean"), "ko");

        assert_eq!(normalize_locale("en"), "en");
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("zh-CN"), "en");
        assert_eq!(normalize_locale(""), "en");
    }

    #[test]
    fn test_translations_exist_in_both_locales() {
        for locale in ["en", "ko"] {
            let found = t!("status.found", locale = locale);
            assert!(!found.is_empty());
            assert_ne!(found, "status.found", "missing key in {locale}");

            let hint = t!("status.network_failure", locale = locale);
            assert_ne!(hint, "status.network_failure", "missing key in {locale}");

            let parsing = t!("status.parsing", locale = locale);
            assert_ne!(parsing, "status.parsing", "missing key in {locale}");
        }
    }

    #[test]
    fn test_interpolation() {
        let msg = t!("status.copy_failed", locale = "en", reason = "no display");
        assert!(msg.contains("no display"));
    }
}
