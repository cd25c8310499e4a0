use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads and parses a TOML file without validating it
///
/// Callers that merge other settings on top (command-line flags) validate the
/// merged result themselves.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Reads, parses and validates a TOML file
///
/// ```no_run
/// use page_spider::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("spider.toml")).unwrap();
/// println!("{} to depth {}", config.crawler.root_url, config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Hex SHA-256 of the file, logged so a run can be tied to its settings
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// [`read_config`] plus the hash of the exact bytes that were parsed
pub fn read_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok((config, hash_content(&content)))
}

/// [`load_config`] plus the file hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let (config, hash) = read_config_with_hash(path)?;
    validate(&config)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageEncoding;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const ZERO_CONNECTIONS: &str = r#"
[crawler]
root-url = "example.com"
max-connection = 0

[output]
save-path = "./pages"
"#;

    #[test]
    fn test_load_full_file() {
        let file = write_toml(
            r#"
[crawler]
root-url = "news.example.com"
max-depth = 3
max-connection = 8
page-encoding = "gb18030"
request-timeout-ms = 5000

[request]
user-agent = "TestSpider/1.0"
accept = "text/html"
method = "GET"

[output]
save-path = "./pages"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.root_url, "news.example.com");
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.max_connection, 8);
        assert_eq!(config.crawler.page_encoding, PageEncoding::Gb18030);
        assert_eq!(config.crawler.request_timeout_ms, 5000);
        assert_eq!(config.request.user_agent, "TestSpider/1.0");
        assert_eq!(config.output.save_path, "./pages");
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/spider.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_toml("[crawler\nroot-url = ");
        assert!(matches!(read_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = write_toml(ZERO_CONNECTIONS);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_read_leaves_validation_to_caller() {
        let file = write_toml(ZERO_CONNECTIONS);
        let (mut config, hash) = read_config_with_hash(file.path()).unwrap();
        assert_eq!(config.crawler.max_connection, 0);
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());

        config.crawler.max_connection = 4;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = write_toml("content 1");
        let b = write_toml("content 2");

        let hash_a = compute_config_hash(a.path()).unwrap();
        assert_eq!(hash_a.len(), 64);
        assert_eq!(hash_a, compute_config_hash(a.path()).unwrap());
        assert_ne!(hash_a, compute_config_hash(b.path()).unwrap());
    }
}
