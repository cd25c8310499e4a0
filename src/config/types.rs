use serde::Deserialize;
use std::fmt;

/// User agent sent when the configuration does not name one
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0)";

/// Accept header sent when the configuration does not name one
pub const DEFAULT_ACCEPT: &str = "text/html";

/// HTTP method used when the configuration does not name one
pub const DEFAULT_METHOD: &str = "GET";

/// Default traversal depth bound (root is depth 0)
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Default number of concurrently outstanding requests
pub const DEFAULT_MAX_CONNECTION: usize = 4;

/// Default per-request deadline: two minutes
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2 * 60 * 1000;

/// Main configuration structure for Page-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL; `http://` is added when no scheme is given
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Maximum link depth to follow from the root
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of requests in flight at once
    #[serde(rename = "max-connection", default = "default_max_connection")]
    pub max_connection: usize,

    /// Charset used to decode page bodies
    #[serde(rename = "page-encoding", default)]
    pub page_encoding: PageEncoding,

    /// Per-request deadline (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Fixed request headers
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,

    #[serde(default = "default_method")]
    pub method: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            method: default_method(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives the numbered page files
    #[serde(rename = "save-path")]
    pub save_path: String,
}

/// Text encoding applied to downloaded page bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum PageEncoding {
    #[default]
    #[serde(rename = "utf8", alias = "utf-8", alias = "UTF8", alias = "UTF-8")]
    Utf8,

    /// Legacy Chinese multi-byte encoding (superset of GBK/GB2312)
    #[serde(rename = "gb18030", alias = "gb", alias = "GB", alias = "GB18030")]
    Gb18030,
}

impl PageEncoding {
    /// Returns the `encoding_rs` codec for this setting
    pub fn codec(&self) -> &'static encoding_rs::Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gb18030 => encoding_rs::GB18030,
        }
    }

    /// Parses a user-supplied encoding name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Some(Self::Utf8),
            "gb" | "gb18030" | "gbk" | "gb2312" => Some(Self::Gb18030),
            _ => None,
        }
    }
}

impl fmt::Display for PageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf8"),
            Self::Gb18030 => write!(f, "gb18030"),
        }
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_connection() -> usize {
    DEFAULT_MAX_CONNECTION
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept() -> String {
    DEFAULT_ACCEPT.to_string()
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_name() {
        assert_eq!(PageEncoding::from_name("utf8"), Some(PageEncoding::Utf8));
        assert_eq!(PageEncoding::from_name("UTF-8"), Some(PageEncoding::Utf8));
        assert_eq!(PageEncoding::from_name("gb"), Some(PageEncoding::Gb18030));
        assert_eq!(PageEncoding::from_name(" GBK "), Some(PageEncoding::Gb18030));
        assert_eq!(PageEncoding::from_name("latin1"), None);
    }

    #[test]
    fn test_encoding_codec() {
        assert_eq!(PageEncoding::Utf8.codec(), encoding_rs::UTF_8);
        assert_eq!(PageEncoding::Gb18030.codec(), encoding_rs::GB18030);
    }

    #[test]
    fn test_request_defaults() {
        let request = RequestConfig::default();
        assert_eq!(request.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(request.accept, "text/html");
        assert_eq!(request.method, "GET");
    }

    #[test]
    fn test_defaults_applied_when_omitted() {
        let config: Config = toml::from_str(
            r#"
[crawler]
root-url = "example.com"

[output]
save-path = "./pages"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.crawler.max_connection, DEFAULT_MAX_CONNECTION);
        assert_eq!(config.crawler.page_encoding, PageEncoding::Utf8);
        assert_eq!(config.crawler.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.request.method, "GET");
    }

    #[test]
    fn test_gb_alias_deserializes() {
        let config: Config = toml::from_str(
            r#"
[crawler]
root-url = "example.com"
page-encoding = "gb"

[output]
save-path = "./pages"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.page_encoding, PageEncoding::Gb18030);
    }
}
