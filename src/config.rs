//! TOML configuration for the service process.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded from a `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub name: Option<String>,
    pub store: StoreConfig,
}

/// Which document store backend to run against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `"memory"` or `"file"`.
    pub backend: String,
    /// Directory for the file backend; required when `backend = "file"`.
    #[serde(default)]
    pub data_dir: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing,
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing => write!(f, "config.toml file not found"),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path).map_err(|_| ConfigError::Missing)?;
    let cfg: Config = toml::from_str(&data).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    match cfg.store.backend.as_str() {
        "memory" => {}
        "file" => {
            if cfg
                .store
                .data_dir
                .as_deref()
                .is_none_or(|d| d.trim().is_empty())
            {
                return Err(ConfigError::Invalid(
                    "store.data_dir is required for the file backend".to_string(),
                ));
            }
        }
        other => {
            return Err(ConfigError::Invalid(format!(
                "unknown store backend {other:?}"
            )));
        }
    }
    Ok(cfg)
}
