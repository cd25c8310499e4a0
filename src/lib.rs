//! Page-Spider: a bounded-concurrency, domain-scoped page downloader
//!
//! This crate crawls outward from a single root URL, keeping a fixed number of
//! requests in flight, saving every fetched page to a numbered text file and
//! following the absolute `http://` links it finds inside the root's domain.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Page-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to save page to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid fetch state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::FetchState,
        to: state::FetchState,
    },

    #[error("A crawl is already in progress")]
    AlreadyRunning,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Page-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlConfig, PageEncoding};
pub use crawler::Spider;
pub use output::{CrawlListener, CrawlSummary};
pub use state::{FetchState, Frontier};
pub use crate::url::{base_domain, clean_candidate, normalize_root_url, UrlFilter};
