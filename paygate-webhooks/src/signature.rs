//! Webhook signature generation and verification
//!
//! The signing input is the ASCII decimal timestamp, a literal `.`, then the
//! payload bytes exactly as transmitted. The MAC is fed those bytes directly;
//! the payload is never re-serialized.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header key carrying the signed timestamp
pub const TIMESTAMP_KEY: &str = "t";

/// Header key for the HMAC-SHA256 signature scheme
pub const SCHEME_V1: &str = "v1";

/// Compute the lowercase hex HMAC-SHA256 of `"{timestamp}.{payload}"`
pub fn sign(timestamp: i64, payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take any size key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Format the wire header value: `t=<timestamp>,v1=<signature>`
pub fn format_header(timestamp: i64, signature: &str) -> String {
    format!("{TIMESTAMP_KEY}={timestamp},{SCHEME_V1}={signature}")
}

/// Parsed `t=...,v1=...` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Signed Unix timestamp in seconds
    pub timestamp: i64,
    /// Hex signature for the `v1` scheme
    pub signature: String,
}

/// Reasons a signature header cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderParseError {
    /// No `t=` segment
    #[error("signature header has no timestamp")]
    MissingTimestamp,

    /// No non-empty `v1=` segment
    #[error("signature header has no v1 signature")]
    MissingSignature,

    /// `t=` is not a non-negative decimal integer
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Parse a signature header
///
/// Segments are split on `,` and then on the first `=`. Keys other than `t`
/// and `v1` are ignored so newer schemes can be appended to the same header.
/// A repeated key keeps its last value.
pub fn parse_header(header: &str) -> Result<SignatureHeader, HeaderParseError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.split_once('=') {
            Some((TIMESTAMP_KEY, t)) => timestamp = Some(t),
            Some((SCHEME_V1, v)) => signature = Some(v),
            _ => {}
        }
    }

    let raw_timestamp = timestamp.ok_or(HeaderParseError::MissingTimestamp)?;
    let signature = signature
        .filter(|s| !s.is_empty())
        .ok_or(HeaderParseError::MissingSignature)?;

    Ok(SignatureHeader {
        timestamp: parse_timestamp(raw_timestamp)?,
        signature: signature.to_string(),
    })
}

/// Only plain ASCII digits are accepted; `str::parse` alone would allow `+`
fn parse_timestamp(raw: &str) -> Result<i64, HeaderParseError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HeaderParseError::InvalidTimestamp(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| HeaderParseError::InvalidTimestamp(raw.to_string()))
}

/// Compare two signatures without short-circuiting on the first differing byte
///
/// Signature length is public, so a length mismatch is rejected up front.
pub fn signatures_match(expected: &str, provided: &str) -> bool {
    if expected.len() != provided.len() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Webhook signature utilities bound to one secret
#[derive(Debug, Clone)]
pub struct WebhookSignature {
    secret: SecretString,
}

impl WebhookSignature {
    /// Create a new signature utility with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
        }
    }

    /// Sign `payload` at the current time and return the header value
    pub fn sign(&self, payload: &[u8]) -> String {
        self.sign_with_timestamp(payload, chrono::Utc::now().timestamp())
    }

    /// Sign `payload` at `timestamp` and return the header value
    pub fn sign_with_timestamp(&self, payload: &[u8], timestamp: i64) -> String {
        format_header(timestamp, &self.digest(payload, timestamp))
    }

    /// Raw hex digest for `payload` at `timestamp`
    pub fn digest(&self, payload: &[u8], timestamp: i64) -> String {
        sign(timestamp, payload, self.secret.expose_secret().as_bytes())
    }

    pub(crate) fn secret(&self) -> &SecretString {
        &self.secret
    }
}

/// Header names for webhook signatures
pub mod headers {
    /// The signature header sent by Paygate
    pub const SIGNATURE: &str = "X-Paygate-Signature";

    /// Generic signature header also accepted by receivers
    pub const SIGNATURE_ALT: &str = "X-Webhook-Signature";

    /// Event type header
    pub const EVENT_TYPE: &str = "X-Paygate-Event";
}
