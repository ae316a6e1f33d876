//! Webhook authenticity for Paygate
//!
//! Senders stamp each payload with a timestamp and an HMAC-SHA256 signature;
//! receivers verify it with the shared secret inside a freshness window.
//!
//! # Features
//!
//! - **Signature codec**: `t=<timestamp>,v1=<hex>` headers over `"{t}.{payload}"`
//! - **Replay resistance**: symmetric timestamp tolerance (300 seconds by default)
//! - **Timing safety**: constant-time signature comparison
//! - **Typed outcomes**: one [`InvalidReason`] per rejected webhook
//!
//! # Example: Signing
//!
//! ```rust
//! use paygate_webhooks::WebhookSigner;
//!
//! let signer = WebhookSigner::new("whsec_abc");
//! let body = br#"{"id":"evt_1"}"#;
//! let signed = signer.sign_payload(body);
//!
//! // send `body` unchanged with header X-Paygate-Signature: signed.header()
//! assert!(signed.header().starts_with("t="));
//! ```
//!
//! # Example: Verifying
//!
//! ```rust
//! use paygate_webhooks::{InvalidReason, WebhookSignature, WebhookVerifier};
//!
//! let verifier = WebhookVerifier::new("whsec_abc");
//! let header = WebhookSignature::new("whsec_abc").sign(b"payload");
//!
//! assert!(verifier.verify(b"payload", &header).is_valid());
//! assert_eq!(
//!     verifier.verify(b"tampered", &header).reason(),
//!     Some(InvalidReason::SignatureMismatch)
//! );
//! ```

mod error;
mod payload;
mod receiver;
pub mod signature;

pub use error::{InvalidReason, WebhookError};
pub use payload::{
    SIGNATURE_FIELD, SignedEvent, SignedPayload, TIMESTAMP_FIELD, WebhookSigner,
    create_signed_payload,
};
pub use receiver::{DEFAULT_TOLERANCE_SECS, VerificationOutcome, WebhookVerifier, verify, verify_at};
pub use signature::{
    HeaderParseError, SignatureHeader, WebhookSignature, format_header, parse_header, sign,
};

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;
