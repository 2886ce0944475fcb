//! Post link construction
//!
//! Links have the form `{site}/{base_path or station_id}/post/{title_no}`, with
//! `#comment_noti{comment_no}` appended when a comment id is known.

use crate::models::PostReference;
use crate::utils::trim_slashes;

/// Anchor prefix the site uses for comment deep links
pub const COMMENT_ANCHOR_PREFIX: &str = "comment_noti";

/// Build a post link, optionally anchored to a comment
///
/// # Example
/// ```
/// use sooplink::highlight::link::build_post_link;
///
/// let link = build_post_link("https://www.sooplive.co.kr", Some("a/b/"), None, "123", Some("45"));
/// assert_eq!(link, "https://www.sooplive.co.kr/a/b/post/123#comment_noti45");
/// ```
pub fn build_post_link(
    site_base: &str,
    base_path: Option<&str>,
    station_id: Option<&str>,
    title_no: &str,
    comment_no: Option<&str>,
) -> String {
    let site = site_base.trim_end_matches('/');

    let prefix = [base_path, station_id]
        .into_iter()
        .flatten()
        .map(trim_slashes)
        .find(|segment| !segment.is_empty());

    let mut link = match prefix {
        Some(prefix) => format!("{site}/{prefix}/post/{title_no}"),
        None => format!("{site}/post/{title_no}"),
    };

    if let Some(comment_no) = comment_no.filter(|c| !c.is_empty()) {
        link.push('#');
        link.push_str(COMMENT_ANCHOR_PREFIX);
        link.push_str(comment_no);
    }

    link
}

/// Link to a resolved post, optionally anchored to a comment
pub fn post_link(site_base: &str, post: &PostReference, comment_no: Option<&str>) -> String {
    build_post_link(
        site_base,
        post.base_path.as_deref(),
        post.station_id.as_deref(),
        &post.title_no,
        comment_no,
    )
}
