//! Logging bootstrap for applications embedding the SDK.
//!
//! The SDK crates only emit `tracing` events; nothing is printed until a
//! subscriber is installed. [`init`] installs one configured from the
//! environment:
//!
//! - `PAYGATE_LOG_LEVEL=trace|debug|info|warn|error|off` - Minimum level, or any
//!   `EnvFilter` directive such as `paygate_http_client=debug`
//! - `PAYGATE_LOG_FORMAT=json|pretty|compact` - Output format
//!
//! ```rust,no_run
//! use paygate::logging::{self, LogConfig};
//!
//! logging::init(&LogConfig::from_env()).expect("logging already initialized");
//! ```

use crate::Error;
use std::env;
use tracing_subscriber::EnvFilter;

/// Variable holding the level or filter directive
pub const LOG_LEVEL_ENV: &str = "PAYGATE_LOG_LEVEL";

/// Variable holding the output format
pub const LOG_FORMAT_ENV: &str = "PAYGATE_LOG_FORMAT";

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output
    Compact,
    /// Newline-delimited JSON
    #[default]
    Json,
}

impl Format {
    /// Get format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `paygate_http_client=debug`
    pub filter: String,
    /// Output format
    pub format: Format,
    /// Include the event target (module path)
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: Format::Json,
            target: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config through `lookup`; unknown formats fall back to JSON
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let filter = lookup(LOG_LEVEL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.filter);

        let format = lookup(LOG_FORMAT_ENV)
            .and_then(|v| Format::parse(&v))
            .unwrap_or(defaults.format);

        Self {
            filter,
            format,
            target: defaults.target,
        }
    }

    /// Set the filter directive
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, Error> {
        EnvFilter::try_new(&self.filter)
            .map_err(|e| Error::Logging(format!("invalid filter {:?}: {e}", self.filter)))
    }
}

/// Install the global subscriber
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init(config: &LogConfig) -> Result<(), Error> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.target);

    let result = match config.format {
        Format::Json => builder.json().try_init(),
        Format::Pretty => builder.pretty().try_init(),
        Format::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse(" Pretty "), Some(Format::Pretty));
        assert_eq!(Format::parse("COMPACT"), Some(Format::Compact));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_from_lookup() {
        let config = LogConfig::from_lookup(|key| match key {
            LOG_LEVEL_ENV => Some("paygate_http_client=debug".into()),
            LOG_FORMAT_ENV => Some("compact".into()),
            _ => None,
        });
        assert_eq!(config.filter, "paygate_http_client=debug");
        assert_eq!(config.format, Format::Compact);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = LogConfig::from_lookup(|key| match key {
            LOG_FORMAT_ENV => Some("yaml".into()),
            _ => None,
        });
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LogConfig::default().with_filter("paygate=loud");
        assert!(matches!(init(&config), Err(Error::Logging(_))));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default()
            .with_filter("off")
            .with_format(Format::Compact);
        let _ = init(&config);
        assert!(matches!(init(&config), Err(Error::Logging(_))));
    }
}
