//! Configuration file discovery and writing.
//!
//! # Configuration File Format
//!
//! ```toml
//! [cache]
//! enabled = true
//! path = "~/.cache/litsearch/query_cache.json"
//!
//! [http]
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//! user_agent = "litsearch/0.1.0"
//!
//! [search]
//! default_limit = 10
//! keywords = ["gravity", "black hole"]
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "litsearch.toml";

/// Find the configuration file to load
///
/// `./litsearch.toml` wins over `<config dir>/litsearch/config.toml`.
/// Returns `None` when neither exists.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("litsearch").join("config.toml"))
        .filter(|path| path.is_file())
}

impl Config {
    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }

    /// Read a TOML file without environment overrides
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
