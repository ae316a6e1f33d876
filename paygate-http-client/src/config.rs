//! Gateway client configuration.

use crate::retry::RetryPolicy;
use crate::{ClientError, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Default per-attempt timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL; trailing slashes are ignored
    pub base_url: String,
    /// Deadline for each individual attempt
    pub timeout: Duration,
    /// Connection timeout for the default transport
    pub connect_timeout: Duration,
    /// Retry and backoff policy
    pub retry: RetryPolicy,
    /// API key sent as a bearer token
    pub api_key: Option<SecretString>,
    /// Default headers for all requests
    pub default_headers: Vec<(String, String)>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::new(DEFAULT_MAX_RETRIES),
            api_key: None,
            default_headers: Vec::new(),
            user_agent: format!("paygate-http-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Configuration with defaults for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Per-attempt timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the configuration before any request is made
    pub fn validate(&self) -> Result<()> {
        let base = self.normalized_base_url();
        if base.is_empty() {
            return Err(ClientError::configuration("base_url is required"));
        }

        let url = url::Url::parse(base)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::configuration(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(ClientError::configuration("timeout must be greater than zero"));
        }

        Ok(())
    }
}

/// Builder for gateway client configuration
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL for all requests
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the per-attempt timeout in milliseconds
    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the number of retries, keeping the backoff delays
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_retries = retries;
        self
    }

    /// Replace the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set the API key sent as a bearer token
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Add a default header for all requests
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
