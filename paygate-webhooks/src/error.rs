//! Error types for webhook operations

use std::fmt;
use thiserror::Error;

/// Why a webhook failed verification
///
/// Exactly one reason is reported per rejected webhook: the first check that
/// fails wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// The payload, signature header or secret was empty
    MissingParameter,
    /// The signature header could not be parsed
    MalformedHeader,
    /// The signed timestamp is outside the tolerance window (past or future)
    ExpiredTimestamp,
    /// The recomputed signature does not match the provided one
    SignatureMismatch,
}

impl InvalidReason {
    /// Stable machine-readable code for logs and API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingParameter => "missing_parameter",
            Self::MalformedHeader => "malformed_header",
            Self::ExpiredTimestamp => "expired_timestamp",
            Self::SignatureMismatch => "signature_mismatch",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during webhook operations
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Signature verification failed
    #[error("Webhook signature verification failed: {0}")]
    Signature(InvalidReason),

    /// Payload serialization/deserialization failed
    #[error("Payload error: {0}")]
    Payload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl WebhookError {
    /// The verification failure reason, if this is a signature error
    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            Self::Signature(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Whether the signed timestamp fell outside the tolerance window
    pub fn is_expired(&self) -> bool {
        self.reason() == Some(InvalidReason::ExpiredTimestamp)
    }

    /// Whether the signature itself did not match (forged or tampered)
    pub fn is_forged(&self) -> bool {
        self.reason() == Some(InvalidReason::SignatureMismatch)
    }
}

impl From<InvalidReason> for WebhookError {
    fn from(reason: InvalidReason) -> Self {
        WebhookError::Signature(reason)
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::Payload(err.to_string())
    }
}
