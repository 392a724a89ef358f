//! API endpoint configuration for client apps.
//!
//! The configured base URL is the full API root, including any `/api`
//! prefix the deployment uses. Every request path (`/auth/me`, `/notes`, ...)
//! is appended to it unchanged.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const API_BASE_URL_ENV: &str = "NODEPAD_API_BASE_URL";
pub const API_TIMEOUT_ENV: &str = "NODEPAD_API_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the notes API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_api_base_url(base_url.as_ref())?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build a config from `NODEPAD_API_BASE_URL` / `NODEPAD_API_TIMEOUT_SECS`.
    ///
    /// Returns `Ok(None)` when the base URL variable is unset or blank.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_values(
            std::env::var(API_BASE_URL_ENV).ok(),
            std::env::var(API_TIMEOUT_ENV).ok(),
        )
    }

    /// Same as [`ApiConfig::from_env`] with the raw values passed in.
    pub fn from_values(base_url: Option<String>, timeout: Option<String>) -> Result<Option<Self>> {
        let Some(base_url) = normalize_text_option(base_url) else {
            return Ok(None);
        };
        let mut config = Self::new(base_url)?;
        if let Some(raw) = normalize_text_option(timeout) {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::Validation(format!("{API_TIMEOUT_ENV} must be a whole number of seconds"))
            })?;
            if secs == 0 {
                return Err(Error::Validation(format!(
                    "{API_TIMEOUT_ENV} must be greater than zero"
                )));
            }
            config.timeout_secs = secs;
        }
        Ok(Some(config))
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a request path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub fn normalize_api_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Validation(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Validation(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalize optional text by trimming whitespace and removing empties.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
