//! Configuration loading and management for llamasearch.
//!
//! Loads settings from `llamasearch.toml` with the `BACKEND_URL` environment
//! variable overriding the backend location.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the backend base URL
pub const BACKEND_URL_VAR: &str = "BACKEND_URL";

const CONFIG_FILE: &str = "llamasearch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("no backend URL configured; set BACKEND_URL or [backend] url")]
    MissingBackendUrl,
    #[error("invalid backend URL {url}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },
}

/// Search backend location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    /// Base URL; requests go to `{url}/api/search`
    #[serde(default)]
    pub url: Option<String>,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    /// Log file used while the TUI owns the terminal
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location, or defaults if there is none
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_VAR) {
            self.backend.url = Some(url);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("llamasearch")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// The validated backend base URL
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .backend
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBackendUrl)?;

        Url::parse(raw).map_err(|e| ConfigError::InvalidBackendUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_all_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[backend]
url = "http://localhost:8000"

[logging]
level = "debug"
file = "/tmp/llamasearch.log"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.backend.url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/llamasearch.log")));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert!(config.backend.url.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nurl = ").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn missing_url_is_reported() {
        let config = Config::default();
        assert!(matches!(config.backend_url(), Err(ConfigError::MissingBackendUrl)));

        let blank = Config {
            backend: BackendConfig {
                url: Some("   ".to_string()),
            },
            ..Config::default()
        };
        assert!(matches!(blank.backend_url(), Err(ConfigError::MissingBackendUrl)));
    }

    #[test]
    fn invalid_url_is_reported() {
        let config = Config {
            backend: BackendConfig {
                url: Some("not a url".to_string()),
            },
            ..Config::default()
        };
        assert!(matches!(
            config.backend_url(),
            Err(ConfigError::InvalidBackendUrl { .. })
        ));
    }

    #[test]
    fn valid_url_parses() {
        let config = Config {
            backend: BackendConfig {
                url: Some("https://search.example.com".to_string()),
            },
            ..Config::default()
        };
        assert_eq!(config.backend_url().unwrap().host_str(), Some("search.example.com"));
    }
}
