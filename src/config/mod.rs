//! Configuration module for Page-Spider
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning them into the immutable [`CrawlConfig`] the engine runs with.
//!
//! # Example
//!
//! ```no_run
//! use page_spider::config::{load_config, CrawlConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spider.toml")).unwrap();
//! let crawl = CrawlConfig::from_config(&config).unwrap();
//! println!("Crawling {} down to depth {}", crawl.root_url, crawl.max_depth);
//! ```

mod crawl_config;
mod parser;
mod types;
mod validation;

// Re-export types
pub use crawl_config::CrawlConfig;
pub use types::{
    Config, CrawlerConfig, OutputConfig, PageEncoding, RequestConfig, DEFAULT_ACCEPT,
    DEFAULT_MAX_CONNECTION, DEFAULT_MAX_DEPTH, DEFAULT_METHOD, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, read_config, read_config_with_hash,
};
pub use validation::validate;
