//! TOML-based configuration.
//!
//! Example configuration:
//! ```toml
//! [limits]
//! max_result_rows = 10000
//! default_page_size = 100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Query result limits.
    pub limits: LimitSettings,
}

/// Result-size limits applied by the execution orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Row cap forced onto every compiled request.
    pub max_result_rows: u32,

    /// Page size used when a request carries no explicit pagination.
    pub default_page_size: u32,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_result_rows: 10_000,
            default_page_size: 100,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
