use crate::config::types::{
    Config, PageEncoding, DEFAULT_ACCEPT, DEFAULT_MAX_CONNECTION, DEFAULT_MAX_DEPTH,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use crate::config::validation::parse_method;
use crate::url::{base_domain, normalize_root_url};
use crate::ConfigError;
use reqwest::Method;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable settings for one crawl run
///
/// `root_url` is stored normalized (scheme added, trailing `/` removed) and
/// `base_domain` is derived from it. An empty root is representable: the engine
/// treats it as a no-op start rather than an error.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub root_url: String,
    pub base_domain: String,
    pub save_dir: PathBuf,
    pub max_depth: u32,
    pub max_connection: usize,
    pub page_encoding: PageEncoding,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub method: Method,
}

impl CrawlConfig {
    /// Creates a configuration with default limits and headers
    ///
    /// A root that cannot be normalized is kept as-is with an empty base domain;
    /// use [`CrawlConfig::from_config`] for validated input.
    pub fn new(root_url: &str, save_dir: impl Into<PathBuf>) -> Self {
        let (root_url, base_domain) = match normalize_root_url(root_url) {
            Ok(root) => {
                let domain = base_domain(&root);
                (root, domain)
            }
            Err(_) => (root_url.trim().to_string(), String::new()),
        };

        Self {
            root_url,
            base_domain,
            save_dir: save_dir.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_connection: DEFAULT_MAX_CONNECTION,
            page_encoding: PageEncoding::default(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            method: Method::GET,
        }
    }

    /// Builds the runtime configuration from a validated file configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let root_url = normalize_root_url(&config.crawler.root_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;
        let method = parse_method(&config.request.method)?;

        Ok(Self {
            base_domain: base_domain(&root_url),
            root_url,
            save_dir: PathBuf::from(&config.output.save_path),
            max_depth: config.crawler.max_depth.max(1),
            max_connection: config.crawler.max_connection.max(1),
            page_encoding: config.crawler.page_encoding,
            request_timeout: Duration::from_millis(config.crawler.request_timeout_ms),
            user_agent: config.request.user_agent.clone(),
            accept: config.request.accept.clone(),
            method,
        })
    }

    /// Sets the depth bound; values below 1 are raised to 1
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Sets the concurrency bound; values below 1 are raised to 1
    pub fn with_max_connection(mut self, max_connection: usize) -> Self {
        self.max_connection = max_connection.max(1);
        self
    }

    pub fn with_page_encoding(mut self, encoding: PageEncoding) -> Self {
        self.page_encoding = encoding;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns true when there is nothing to crawl
    pub fn is_empty(&self) -> bool {
        self.root_url.is_empty()
    }
}
