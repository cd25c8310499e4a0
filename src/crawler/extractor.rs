//! Link extraction from raw page text
//!
//! Links are found by pattern matching on the text rather than by parsing
//! HTML, so links inside scripts, comments and plain text are found too.
//! Only absolute `http://` URLs are recognized.

use regex::Regex;
use std::sync::LazyLock;

/// `http://`, dot-separated host labels, an optional port, then an optional
/// path made of word characters, `-`, space, `.`, `/`, `?`, `%`, `&`, `=`
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http://(?:[\w-]+\.)+[\w-]+(?::\d+)?(?:/[\w\- ./?%&=]*)?")
        .expect("link pattern is a valid regex")
});

/// Extracts every absolute HTTP URL from the page text
///
/// Matches are returned in order of appearance. Duplicates are kept; dedup
/// and cleanup (such as truncating trailing text after a space) are the
/// frontier's job.
///
/// # Example
///
/// ```
/// use page_spider::crawler::extract_links;
///
/// let html = r#"<a href="http://example.com/a">A</a> <img src="http://example.com/b.png">"#;
/// assert_eq!(
///     extract_links(html),
///     vec!["http://example.com/a", "http://example.com/b.png"]
/// );
/// ```
pub fn extract_links(text: &str) -> Vec<String> {
    LINK_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
