//! SDK settings loaded from the environment or a TOML file.
//!
//! # Environment Variables
//!
//! - `PAYGATE_BASE_URL` - Gateway base URL (required)
//! - `PAYGATE_API_KEY` - API key sent as a bearer token
//! - `PAYGATE_TIMEOUT_MS` - Per-attempt timeout (default 30000)
//! - `PAYGATE_MAX_RETRIES` - Retries after the first attempt (default 3)
//! - `PAYGATE_WEBHOOK_SECRET` - Shared webhook signing secret
//! - `PAYGATE_WEBHOOK_TOLERANCE_SECS` - Webhook freshness window (default 300)

use paygate_http_client::{ClientConfig, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
use paygate_webhooks::{DEFAULT_TOLERANCE_SECS, WebhookVerifier};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Prefix shared by every settings variable
pub const ENV_PREFIX: &str = "PAYGATE";

/// Errors raised while loading or validating settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Settings for the gateway client and webhook verifier
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawSettings")]
pub struct SdkSettings {
    /// Gateway base URL
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: Option<SecretString>,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Shared webhook signing secret
    pub webhook_secret: Option<SecretString>,
    /// Webhook freshness window in seconds
    pub webhook_tolerance_secs: u64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    #[serde(default)]
    webhook_secret: Option<String>,
    #[serde(default = "default_tolerance_secs")]
    webhook_tolerance_secs: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_tolerance_secs() -> u64 {
    DEFAULT_TOLERANCE_SECS
}

impl From<RawSettings> for SdkSettings {
    fn from(raw: RawSettings) -> Self {
        Self {
            base_url: raw.base_url,
            api_key: secret(raw.api_key),
            timeout_ms: raw.timeout_ms,
            max_retries: raw.max_retries,
            webhook_secret: secret(raw.webhook_secret),
            webhook_tolerance_secs: raw.webhook_tolerance_secs,
        }
    }
}

fn secret(value: Option<String>) -> Option<SecretString> {
    value.filter(|v| !v.is_empty()).map(SecretString::from)
}

impl SdkSettings {
    /// Settings with defaults for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            webhook_secret: None,
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Load settings from `PAYGATE_*` variables, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is not an error.
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`, which receives full variable names
    /// such as `PAYGATE_BASE_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(&format!("{ENV_PREFIX}_{key}"));

        let base_url = get("BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::KeyNotFound(format!("{ENV_PREFIX}_BASE_URL")))?;

        let settings = Self {
            base_url,
            api_key: secret(get("API_KEY")),
            timeout_ms: parse_or(get("TIMEOUT_MS"), "TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_retries: parse_or(get("MAX_RETRIES"), "MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            webhook_secret: secret(get("WEBHOOK_SECRET")),
            webhook_tolerance_secs: parse_or(
                get("WEBHOOK_TOLERANCE_SECS"),
                "WEBHOOK_TOLERANCE_SECS",
                DEFAULT_TOLERANCE_SECS,
            )?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Check the settings without building anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("base_url is required".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        self.client_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Gateway client configuration derived from these settings
    pub fn client_config(&self) -> ClientConfig {
        let mut builder = ClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout_ms(self.timeout_ms)
            .max_retries(self.max_retries);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.expose_secret());
        }
        builder.build()
    }

    /// Webhook verifier for the configured secret and tolerance
    pub fn verifier(&self) -> Result<WebhookVerifier, ConfigError> {
        let secret = self
            .webhook_secret
            .as_ref()
            .ok_or_else(|| ConfigError::KeyNotFound(format!("{ENV_PREFIX}_WEBHOOK_SECRET")))?;
        Ok(WebhookVerifier::new(secret.expose_secret()).with_tolerance(self.webhook_tolerance_secs))
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            ConfigError::ParseError(format!("{ENV_PREFIX}_{key}={raw:?}: {e}"))
        }),
    }
}
