use crate::state::Frontier;
use crate::url::domain::in_domain;
use std::fmt;

/// Link suffixes that are never fetched (images, stylesheets, scripts)
pub const DISALLOWED_SUFFIXES: &[&str] = &[".jpg", ".gif", ".png", ".css", ".js"];

/// Outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eligibility {
    /// The link may be enqueued
    Eligible,
    /// Nothing left after cleaning
    Empty,
    /// The link's depth would reach the depth bound
    TooDeep,
    /// Already pending or visited
    Known,
    /// Ends with an image/style/script extension
    DisallowedSuffix,
    /// Does not contain the base domain
    OffDomain,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Eligible => "eligible",
            Self::Empty => "empty",
            Self::TooDeep => "too_deep",
            Self::Known => "known",
            Self::DisallowedSuffix => "disallowed_suffix",
            Self::OffDomain => "off_domain",
        };
        write!(f, "{}", label)
    }
}

/// Decides whether a cleaned link candidate may enter the frontier
///
/// Checks run in a fixed order: dedup against the frontier, then the
/// disallowed suffix list, then the base-domain substring test. The root
/// URL bypasses this filter entirely (see [`Frontier::seed`]).
#[derive(Debug, Clone)]
pub struct UrlFilter {
    base_domain: String,
}

impl UrlFilter {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
        }
    }

    /// Classifies an already-cleaned candidate
    pub fn check(&self, candidate: &str, frontier: &Frontier) -> Eligibility {
        if candidate.is_empty() {
            return Eligibility::Empty;
        }

        if frontier.contains(candidate) {
            return Eligibility::Known;
        }

        if has_disallowed_suffix(candidate) {
            return Eligibility::DisallowedSuffix;
        }

        if !in_domain(candidate, &self.base_domain) {
            return Eligibility::OffDomain;
        }

        Eligibility::Eligible
    }

    pub fn is_eligible(&self, candidate: &str, frontier: &Frontier) -> bool {
        self.check(candidate, frontier).is_eligible()
    }
}

/// Returns true if the URL ends with an image, stylesheet or script extension
///
/// The comparison ignores ASCII case so `LOGO.PNG` is rejected as well.
pub fn has_disallowed_suffix(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    DISALLOWED_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier() -> Frontier {
        Frontier::new(3, UrlFilter::new("example.com"))
    }

    #[test]
    fn test_eligible_in_domain_link() {
        let frontier = frontier();
        let filter = UrlFilter::new("example.com");
        assert_eq!(
            filter.check("http://example.com/a", &frontier),
            Eligibility::Eligible
        );
        assert!(filter.is_eligible("http://news.example.com/a", &frontier));
    }

    #[test]
    fn test_rejects_off_domain() {
        let frontier = frontier();
        let filter = UrlFilter::new("example.com");
        assert_eq!(
            filter.check("http://other.com/b", &frontier),
            Eligibility::OffDomain
        );
    }

    #[test]
    fn test_rejects_disallowed_suffixes() {
        let frontier = frontier();
        let filter = UrlFilter::new("example.com");
        for url in [
            "http://example.com/a.jpg",
            "http://example.com/a.gif",
            "http://example.com/a.png",
            "http://example.com/style.css",
            "http://example.com/app.js",
            "http://example.com/LOGO.PNG",
        ] {
            assert_eq!(
                filter.check(url, &frontier),
                Eligibility::DisallowedSuffix,
                "{} should be rejected",
                url
            );
        }
    }

    #[test]
    fn test_suffix_must_be_at_end() {
        let frontier = frontier();
        let filter = UrlFilter::new("example.com");
        assert!(filter.is_eligible("http://example.com/a.jsp", &frontier));
        assert!(filter.is_eligible("http://example.com/css.html", &frontier));
    }

    #[test]
    fn test_rejects_known_urls() {
        let mut frontier = frontier();
        frontier.seed("http://example.com");
        assert!(frontier.enqueue("http://example.com/a", 1).is_eligible());

        let filter = UrlFilter::new("example.com");
        // pending
        assert_eq!(
            filter.check("http://example.com/a", &frontier),
            Eligibility::Known
        );

        // visited
        frontier.claim_next();
        assert_eq!(
            filter.check("http://example.com", &frontier),
            Eligibility::Known
        );
    }

    #[test]
    fn test_rejects_empty() {
        let frontier = frontier();
        let filter = UrlFilter::new("example.com");
        assert_eq!(filter.check("", &frontier), Eligibility::Empty);
    }

    #[test]
    fn test_eligibility_display() {
        assert_eq!(Eligibility::OffDomain.to_string(), "off_domain");
        assert_eq!(Eligibility::Eligible.to_string(), "eligible");
    }
}
