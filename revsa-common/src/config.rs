//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Binaries handle 1 and 2 through clap's `env` support and fall back to the
//! values loaded here for 3 and 4.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::validate::ValidationMode;
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "REVSA_CONFIG";

/// Classifier endpoint used by the UI when nothing else is configured
pub const DEFAULT_CLASSIFIER_ENDPOINT: &str = "http://127.0.0.1:5001/predict";

/// Classifier endpoint used by the proxy when nothing else is configured
pub const DEFAULT_PROXY_CLASSIFIER_ENDPOINT: &str = "http://localhost:5001/predict";

/// Proxy listen address when nothing else is configured
pub const DEFAULT_PROXY_BIND_ADDR: &str = "127.0.0.1:5000";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Classifier used by the UI for URL analysis
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub validation: ValidationMode,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_classifier_endpoint(),
            timeout_secs: default_timeout_secs(),
            validation: ValidationMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_bind_addr")]
    pub bind_addr: String,

    /// SQLite database file; defaults to [`default_database_path`]
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_proxy_classifier_endpoint")]
    pub classifier_endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_proxy_bind_addr(),
            database_path: None,
            classifier_endpoint: default_proxy_classifier_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_classifier_endpoint() -> String {
    DEFAULT_CLASSIFIER_ENDPOINT.to_string()
}

fn default_proxy_classifier_endpoint() -> String {
    DEFAULT_PROXY_CLASSIFIER_ENDPOINT.to_string()
}

fn default_proxy_bind_addr() -> String {
    DEFAULT_PROXY_BIND_ADDR.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Load configuration
///
/// An explicit path (CLI or `REVSA_CONFIG`) must exist and parse. When no
/// path is given the platform locations are tried; if none exists the
/// compiled defaults are used with a warning.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = cli_path {
        return load_config_from(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_from(Path::new(&path));
    }

    match default_config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Parse a specific config file
pub fn load_config_from(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// First existing config file among the platform locations
///
/// Linux: `~/.config/revsa/config.toml`, then `/etc/revsa/config.toml`.
/// Elsewhere: the platform config dir only.
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("revsa").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/revsa/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default location of the proxy database
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("revsa"))
        .unwrap_or_else(|| PathBuf::from("./revsa_data"))
        .join("revsa.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.classifier.endpoint, "http://127.0.0.1:5001/predict");
        assert_eq!(config.classifier.validation, ValidationMode::Strict);
        assert_eq!(config.proxy.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.proxy.classifier_endpoint, "http://localhost:5001/predict");
    }

    #[test]
    fn test_default_database_path_file_name() {
        assert!(default_database_path().ends_with("revsa/revsa.db"));
    }
}
