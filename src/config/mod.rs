//! Configuration management.
//!
//! Settings are layered: serde defaults, then an optional TOML file, then
//! environment variables prefixed with `LITSEARCH_` (nested keys joined by
//! `__`, e.g. `LITSEARCH_CACHE__PATH=/tmp/cache.json`).

mod file_config;

pub use file_config::{find_config_file, ConfigFileError, CONFIG_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::DEFAULT_KEYWORDS;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "LITSEARCH";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Query cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether results are read from and written to the cache file
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache file location; `None` means the platform cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    /// The cache file to use, falling back to [`default_cache_path`]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_cache_path)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// TCP connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// User-Agent sent to every source
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Search defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Limit used when none is given on the command line
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Vocabulary scanned when no keyword is given
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            keywords: default_keywords(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("litsearch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_limit() -> usize {
    10
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default cache file: `<cache dir>/litsearch/query_cache.json`
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("litsearch")
        .join("query_cache.json")
}

/// Load configuration from an optional file plus the process environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    build_config(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(environment)
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> config::Environment {
        let vars: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(vars))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.search.default_limit, 10);
        assert!(config.search.keywords.iter().any(|k| k == "black hole"));
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config
            .cache
            .resolved_path()
            .ends_with("litsearch/query_cache.json"));
    }

    #[test]
    fn test_no_file_no_env_is_default() {
        let config = build_config(None, env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("litsearch.toml");
        std::fs::write(
            &path,
            r#"
[cache]
enabled = false
path = "/tmp/litsearch-cache.json"

[http]
timeout_seconds = 5

[search]
default_limit = 3
keywords = ["pulsar"]

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = build_config(Some(&path), env_from(&[])).unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(
            config.cache.resolved_path(),
            PathBuf::from("/tmp/litsearch-cache.json")
        );
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.connect_timeout_seconds, 10);
        assert_eq!(config.search.default_limit, 3);
        assert_eq!(config.search.keywords, vec!["pulsar"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("litsearch.toml");
        std::fs::write(&path, "[search]\ndefault_limit = 3\n").unwrap();

        let config = build_config(
            Some(&path),
            env_from(&[
                ("LITSEARCH_SEARCH__DEFAULT_LIMIT", "25"),
                ("LITSEARCH_CACHE__ENABLED", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.search.default_limit, 25);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = build_config(
            Some(Path::new("/nonexistent/litsearch.toml")),
            env_from(&[]),
        );
        assert!(result.is_err());
    }
}
