//! # Paygate HTTP Client
//!
//! A resilient client for the Paygate gateway with per-attempt timeouts,
//! bounded exponential backoff and a typed error taxonomy.
//!
//! ## Features
//!
//! - **Bounded retries**: `max_retries + 1` attempts, backoff `min(1000 * 2^n, 10000)` ms
//! - **Per-attempt timeouts**: every attempt gets a fresh deadline
//! - **Selective retry**: only timeouts, network failures, 5xx and 429 are retried
//! - **Cancellation**: in-flight attempts and backoff sleeps stop on request
//! - **Pluggable transport**: [`Transport`] defaults to `reqwest`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paygate_http_client::{ApiRequest, ClientConfig, ResilientClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ResilientClient::new(
//!         ClientConfig::builder()
//!             .base_url("https://api.paygate.example/v1")
//!             .api_key("sk_test_123")
//!             .build(),
//!     )?;
//!
//!     let response = client
//!         .execute(ApiRequest::get("/payment-sessions").query("limit", 10))
//!         .await?;
//!
//!     println!("Sessions: {}", response.data());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use paygate_http_client::{ApiRequest, ClientConfig, ClientError, ResilientClient};
//!
//! # async fn run(client: ResilientClient) {
//! match client.execute(ApiRequest::get("/refunds/re_1")).await {
//!     Ok(response) => println!("{}", response.data()),
//!     Err(e) if e.is_not_found_error() => println!("no such refund"),
//!     Err(ClientError::Timeout { timeout_ms }) => println!("gave up after {timeout_ms}ms"),
//!     Err(e) => println!("request failed: {e}"),
//! }
//! # }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
mod transport;

pub use client::ResilientClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
pub use error::{ApiError, ClientError, Result, UNKNOWN_ERROR_CODE};
pub use request::{ApiRequest, IDEMPOTENCY_KEY_HEADER, MAX_IDEMPOTENCY_KEY_LEN, require_id};
pub use response::{ApiResponse, api_error};
pub use retry::{RetryPolicy, RetryState};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use tokio_util::sync::CancellationToken;
pub use url::Url;

/// Prelude for common imports
///
/// ```
/// use paygate_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::ResilientClient;
    pub use crate::config::{ClientConfig, ClientConfigBuilder};
    pub use crate::error::{ApiError, ClientError, Result};
    pub use crate::request::ApiRequest;
    pub use crate::response::ApiResponse;
    pub use crate::retry::RetryPolicy;
    pub use tokio_util::sync::CancellationToken;
}
