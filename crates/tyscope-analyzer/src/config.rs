//! Analyzer configuration (tyscope.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "tyscope.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Run the verification pass over collected selectors
    pub check_collected_selectors: bool,

    /// Treat type registration during implementation search as a bug
    pub forbid_registration_during_search: bool,

    /// Import path scanned for runtime helper functions
    pub runtime_package: String,

    /// Maximum number of items kept per top list
    pub top_list_size: usize,

    /// Record implementations on unnamed interfaces that no named interface shares
    pub record_unnamed_interface_implementations: bool,
}

fn default_runtime_package() -> String {
    "runtime".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            check_collected_selectors: true,
            forbid_registration_during_search: true,
            runtime_package: default_runtime_package(),
            top_list_size: 8,
            record_unnamed_interface_implementations: true,
        }
    }
}

impl AnalyzerConfig {
    /// Load a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `tyscope.toml` from `dir`, falling back to defaults when absent.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Parse a config from a string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_list_size == 0 {
            return Err(ConfigError::ValidationError(
                "top_list_size must be at least 1".to_string(),
            ));
        }
        if self.runtime_package.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "runtime_package cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
