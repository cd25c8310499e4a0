/// Derives the base domain used for in-domain filtering
///
/// The scheme and a leading `www.` are removed, as are trailing slashes. Any
/// path on the root is kept, so a root of `http://example.com/news` scopes the
/// crawl to links containing `example.com/news`.
///
/// # Examples
///
/// ```
/// use page_spider::url::base_domain;
///
/// assert_eq!(base_domain("http://www.example.com/"), "example.com");
/// assert_eq!(base_domain("https://blog.example.com"), "blog.example.com");
/// ```
pub fn base_domain(root_url: &str) -> String {
    let trimmed = root_url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = if lower.starts_with("http://") {
        &trimmed["http://".len()..]
    } else if lower.starts_with("https://") {
        &trimmed["https://".len()..]
    } else {
        trimmed
    };

    let without_www = if without_scheme.to_ascii_lowercase().starts_with("www.") {
        &without_scheme["www.".len()..]
    } else {
        without_scheme
    };

    without_www.trim_end_matches('/').to_string()
}

/// Returns true if the candidate contains the base domain
///
/// This is a substring test, not a host comparison: subdomains
/// (`news.example.com`) and links that merely mention the domain in their
/// path both pass.
pub fn in_domain(candidate: &str, base_domain: &str) -> bool {
    !base_domain.is_empty() && candidate.contains(base_domain)
}
