//! Gateway client error types.

use std::fmt;
use thiserror::Error;

/// Result type for gateway client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Fallback error code when the gateway response carries none
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// A non-2xx response from the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Human-readable message (`detail`, then `message`, then `HTTP <status>`)
    pub message: String,
    /// HTTP status code
    pub status_code: u16,
    /// Machine-readable error code, `UNKNOWN_ERROR` when absent
    pub code: String,
    /// Structured details from the response body, if any
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create an API error
    pub fn new(message: impl Into<String>, status_code: u16, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            code: code.into(),
            details: None,
        }
    }

    /// Attach structured details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// 400 Bad Request
    pub fn is_validation_error(&self) -> bool {
        self.status_code == 400
    }

    /// 401 Unauthorized
    pub fn is_authentication_error(&self) -> bool {
        self.status_code == 401
    }

    /// 403 Forbidden
    pub fn is_permission_error(&self) -> bool {
        self.status_code == 403
    }

    /// 404 Not Found
    pub fn is_not_found_error(&self) -> bool {
        self.status_code == 404
    }

    /// 429 Too Many Requests
    pub fn is_rate_limit_error(&self) -> bool {
        self.status_code == 429
    }

    /// Any 5xx status
    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status_code)
    }

    /// Only server errors and rate limiting are worth retrying
    pub fn is_retryable(&self) -> bool {
        self.is_server_error() || self.is_rate_limit_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.status_code, self.message, self.code)
    }
}

impl std::error::Error for ApiError {}

/// Gateway client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid client configuration or call arguments. Never retried
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single attempt exceeded its deadline
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured per-attempt timeout in milliseconds
        timeout_ms: u64,
    },

    /// The gateway answered with a non-2xx status
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The transport failed before any HTTP response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// A successful response body did not match the expected type
    #[error("JSON error: {0}")]
    Json(String),
}

impl ClientError {
    /// Build a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network(_) => true,
            Self::Api(e) => e.is_retryable(),
            Self::Configuration(_) | Self::Cancelled | Self::Json(_) => false,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// The underlying API error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Get the HTTP status code if this is an API error
    pub fn status_code(&self) -> Option<u16> {
        self.api_error().map(|e| e.status_code)
    }

    /// See [`ApiError::is_validation_error`]
    pub fn is_validation_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_validation_error)
    }

    /// See [`ApiError::is_authentication_error`]
    pub fn is_authentication_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_authentication_error)
    }

    /// See [`ApiError::is_permission_error`]
    pub fn is_permission_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_permission_error)
    }

    /// See [`ApiError::is_not_found_error`]
    pub fn is_not_found_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found_error)
    }

    /// See [`ApiError::is_rate_limit_error`]
    pub fn is_rate_limit_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_rate_limit_error)
    }

    /// See [`ApiError::is_server_error`]
    pub fn is_server_error(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_server_error)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Configuration(format!("invalid URL: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicates(status: u16) -> [bool; 6] {
        let e = ApiError::new("x", status, UNKNOWN_ERROR_CODE);
        [
            e.is_validation_error(),
            e.is_authentication_error(),
            e.is_permission_error(),
            e.is_not_found_error(),
            e.is_rate_limit_error(),
            e.is_server_error(),
        ]
    }

    #[test]
    fn test_status_predicates_are_exclusive() {
        for status in 100..=599u16 {
            let count = predicates(status).iter().filter(|p| **p).count();
            assert!(count <= 1, "status {status} matched {count} predicates");
        }

        assert_eq!(predicates(400), [true, false, false, false, false, false]);
        assert_eq!(predicates(401), [false, true, false, false, false, false]);
        assert_eq!(predicates(403), [false, false, true, false, false, false]);
        assert_eq!(predicates(404), [false, false, false, true, false, false]);
        assert_eq!(predicates(429), [false, false, false, false, true, false]);
        assert_eq!(predicates(503), [false, false, false, false, false, true]);
        assert_eq!(predicates(402), [false; 6]);
        assert_eq!(predicates(418), [false; 6]);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Timeout { timeout_ms: 100 }.is_retryable());
        assert!(ClientError::Network("reset".into()).is_retryable());
        assert!(ClientError::from(ApiError::new("x", 500, "E")).is_retryable());
        assert!(ClientError::from(ApiError::new("x", 599, "E")).is_retryable());
        assert!(ClientError::from(ApiError::new("x", 429, "E")).is_retryable());

        assert!(!ClientError::from(ApiError::new("x", 400, "E")).is_retryable());
        assert!(!ClientError::from(ApiError::new("x", 404, "E")).is_retryable());
        assert!(!ClientError::from(ApiError::new("x", 408, "E")).is_retryable());
        assert!(!ClientError::configuration("bad").is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
    }

    #[test]
    fn test_client_error_forwards_predicates() {
        let err = ClientError::from(ApiError::new("bad amount", 400, "INVALID_AMOUNT"));
        assert!(err.is_validation_error());
        assert_eq!(err.status_code(), Some(400));

        let timeout = ClientError::Timeout { timeout_ms: 30_000 };
        assert!(timeout.is_timeout());
        assert!(!timeout.is_server_error());
        assert_eq!(timeout.status_code(), None);
    }

    #[test]
    fn test_display() {
        let err = ClientError::from(ApiError::new("Not found", 404, "NOT_FOUND"));
        assert_eq!(err.to_string(), "API error: 404 - Not found (NOT_FOUND)");
        assert_eq!(
            ClientError::Timeout { timeout_ms: 100 }.to_string(),
            "Request timed out after 100ms"
        );
    }
}
