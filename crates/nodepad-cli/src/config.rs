//! Persistent CLI configuration and API endpoint resolution.

use std::path::{Path, PathBuf};

use nodepad_core::config::{normalize_text_option, API_BASE_URL_ENV, API_TIMEOUT_ENV};
use nodepad_core::ApiConfig;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("nodepad").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

impl CliConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn normalize(&mut self) {
        self.version = default_config_version();
        self.api_base_url = normalize_text_option(self.api_base_url.take());
    }
}

/// Raw inputs the API location can come from, highest priority first.
#[derive(Debug, Default)]
pub struct ApiSources {
    pub flag: Option<String>,
    pub env_url: Option<String>,
    pub env_timeout: Option<String>,
    pub file: CliConfig,
}

impl ApiSources {
    pub fn gather(flag: Option<String>) -> Result<Self, CliError> {
        Ok(Self {
            flag,
            env_url: std::env::var(API_BASE_URL_ENV).ok(),
            env_timeout: std::env::var(API_TIMEOUT_ENV).ok(),
            file: CliConfig::load()?,
        })
    }

    /// `--api-url`, then environment, then the config file.
    pub fn resolve(self) -> Result<ApiConfig, CliError> {
        let url = normalize_text_option(self.flag)
            .or_else(|| normalize_text_option(self.env_url))
            .or(self.file.api_base_url)
            .ok_or(CliError::ApiNotConfigured)?;

        let timeout = normalize_text_option(self.env_timeout)
            .or_else(|| self.file.timeout_secs.map(|secs| secs.to_string()));

        ApiConfig::from_values(Some(url), timeout)?.ok_or(CliError::ApiNotConfigured)
    }
}
