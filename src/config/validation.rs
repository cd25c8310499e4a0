use crate::config::types::{Config, CrawlerConfig, OutputConfig, RequestConfig};
use crate::url::normalize_root_url;
use crate::ConfigError;
use reqwest::Method;

/// Upper bound on concurrently outstanding requests
const MAX_CONNECTION_LIMIT: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_request_config(&config.request)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.root_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root_url cannot be empty".to_string(),
        ));
    }

    normalize_root_url(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.max_connection < 1 || config.max_connection > MAX_CONNECTION_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_connection must be between 1 and {}, got {}",
            MAX_CONNECTION_LIMIT, config.max_connection
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the fixed request headers
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.accept.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept cannot be empty".to_string(),
        ));
    }

    parse_method(&config.method)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.save_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "save_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parses an HTTP method token such as `GET`
pub(crate) fn parse_method(method: &str) -> Result<Method, ConfigError> {
    let method = method.trim();
    if method.is_empty() {
        return Err(ConfigError::Validation("method cannot be empty".to_string()));
    }

    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| ConfigError::Validation(format!("Invalid HTTP method: '{}'", method)))
}
