//! URL handling module for Page-Spider
//!
//! This module provides root URL normalization, base-domain derivation,
//! link candidate cleaning and the eligibility filter that decides which
//! discovered links may enter the frontier.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{base_domain, in_domain};
pub use filter::{has_disallowed_suffix, Eligibility, UrlFilter, DISALLOWED_SUFFIXES};
pub use normalize::{clean_candidate, normalize_root_url};
