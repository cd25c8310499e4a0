use crate::UrlError;
use url::Url;

/// Normalizes the user-supplied root URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Prepend `http://` when no scheme is given
/// 3. Reject schemes other than HTTP and HTTPS
/// 4. Parse the URL; reject if malformed or hostless
/// 5. Remove trailing slashes so the root keys the frontier the same way
///    discovered links do
///
/// The returned string keeps the caller's spelling (no lowercasing, no
/// re-serialization) because frontier dedup compares raw link text.
///
/// # Examples
///
/// ```
/// use page_spider::url::normalize_root_url;
///
/// assert_eq!(normalize_root_url("news.example.com").unwrap(), "http://news.example.com");
/// assert_eq!(normalize_root_url("http://example.com/").unwrap(), "http://example.com");
/// ```
pub fn normalize_root_url(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            scheme
        )));
    } else {
        format!("http://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::Parse(format!("Missing host in '{}'", with_scheme)));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

/// Cleans a raw link candidate before any eligibility check
///
/// Surrounding whitespace is trimmed, an embedded space truncates the link at
/// that point (the link pattern admits spaces, so attribute noise can trail a
/// match) and trailing slashes are removed.
///
/// # Examples
///
/// ```
/// use page_spider::url::clean_candidate;
///
/// assert_eq!(clean_candidate("  http://x.com/page extra-junk "), "http://x.com/page");
/// assert_eq!(clean_candidate("http://x.com/dir/"), "http://x.com/dir");
/// ```
pub fn clean_candidate(raw: &str) -> String {
    let trimmed = raw.trim();
    let truncated = match trimmed.find(' ') {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    truncated.trim_end_matches('/').to_string()
}
