//! # Paygate
//!
//! Core of the Paygate payments SDK: webhook authenticity and a resilient
//! gateway client.
//!
//! - [`webhooks`]: HMAC-SHA256 signing and replay-resistant verification
//! - [`http_client`]: bounded retries, per-attempt timeouts, typed errors
//! - [`config`]: settings from `PAYGATE_*` variables or a TOML file
//! - [`logging`]: optional `tracing` subscriber bootstrap
//!
//! ```rust,no_run
//! use paygate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> paygate::Result<()> {
//!     let settings = SdkSettings::from_env()?;
//!     let client = ResilientClient::new(settings.client_config())?;
//!     let verifier = settings.verifier()?;
//!
//!     let session = client
//!         .execute(ApiRequest::get("/payment-sessions/ps_123"))
//!         .await?;
//!     println!("{}", session.data());
//!
//!     let outcome = verifier.verify(b"{}", "t=1700000000,v1=00");
//!     println!("valid: {}", outcome.is_valid());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigError, SdkSettings};
pub use error::{Error, Result};

pub use paygate_http_client as http_client;
pub use paygate_webhooks as webhooks;

// Prelude for common imports
pub mod prelude {
    pub use crate::config::{ConfigError, SdkSettings};
    pub use crate::error::{Error, Result};
    pub use paygate_http_client::{
        ApiError, ApiRequest, ApiResponse, CancellationToken, ClientConfig, ClientError,
        ResilientClient, RetryPolicy,
    };
    pub use paygate_webhooks::{
        InvalidReason, VerificationOutcome, WebhookError, WebhookSignature, WebhookSigner,
        WebhookVerifier,
    };
}
