//! Configuration module for the socket protection hook
//!
//! This module provides TOML-based configuration parsing and validation
//! for the static library.

use crate::error::{Result, VpnError};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Socket protection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectConfig {
    /// Hand new sockets to the registered protect function
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ProtectConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
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

impl LoggingConfig {
    /// Parsed log level
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| VpnError::Config(format!("Unknown log level: {}", self.level)))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Socket protection configuration
    #[serde(default)]
    pub protect: ProtectConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;

        <Self as FromStr>::from_str(&contents)
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| VpnError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.logging.level_filter()?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = VpnError;

    fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VpnError::Config(format!("Failed to parse TOML: {e}")))
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_parsing() {
        let toml_content = r#"
[protect]
enabled = false

[logging]
level = "debug"
"#;

        let config = toml_content
            .parse::<Config>()
            .expect("Failed to parse config");
        assert!(!config.protect.enabled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = "".parse::<Config>().expect("Failed to parse config");
        assert_eq!(config, Config::default());
        assert!(config.protect.enabled);
        assert_eq!(config.logging.level, "info");

        let config = "[protect]\n".parse::<Config>().unwrap();
        assert!(config.protect.enabled);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.logging.level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, VpnError::Config(_)));
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = "[protect\nenabled = true".parse::<Config>().unwrap_err();
        assert!(matches!(err, VpnError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip_and_file_loading() {
        let config = Config {
            protect: ProtectConfig { enabled: false },
            logging: LoggingConfig {
                level: "trace".to_string(),
            },
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml().unwrap().as_bytes()).unwrap();

        let loaded = Config::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("missing.toml")).unwrap_err();
        match err {
            VpnError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
