//! Top-level error type for the Paygate SDK.

use thiserror::Error;

pub use crate::config::ConfigError;
pub use paygate_http_client::{ApiError, ClientError};
pub use paygate_webhooks::{InvalidReason, WebhookError};

/// Any error produced by the SDK
#[derive(Debug, Error)]
pub enum Error {
    /// Webhook verification or payload handling failed
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// A gateway request failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Settings could not be loaded or are invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The global log subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

impl Error {
    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_retryable())
    }

    /// Gateway status code, when the error came from a gateway response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Client(e) => e.status_code(),
            _ => None,
        }
    }

    /// Webhook rejection reason, when a signature check failed
    pub fn webhook_reason(&self) -> Option<InvalidReason> {
        match self {
            Self::Webhook(e) => e.reason(),
            _ => None,
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, Error>;
