//! System clipboard access for copying result links
//!
//! Copying is best-effort: a missing display server or clipboard daemon is
//! logged and never fails the search that produced the link.

use crate::error::{Error, Result};

/// Write `link` to the system clipboard
///
/// # Errors
///
/// Returns an error if no clipboard is available or the write is rejected
pub fn copy_link(link: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
    clipboard.set_text(link).map_err(clipboard_error)?;
    tracing::debug!(link = %link, "Copied link to clipboard");
    Ok(())
}

/// Copy `link`, logging instead of returning a failure
///
/// Returns the failure reason so callers can show it, `None` on success.
pub fn try_copy_link(link: &str) -> Option<String> {
    match copy_link(link) {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Clipboard write failed");
            Some(e.to_string())
        }
    }
}

fn clipboard_error(err: arboard::Error) -> Error {
    Error::Other {
        context: format!("clipboard unavailable: {err}"),
        source: Some(Box::new(err)),
    }
}
