//! Webhook receiver for verifying incoming webhooks

use crate::signature::{self, WebhookSignature, headers};
use crate::{InvalidReason, Result, WebhookError};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Default freshness window for signed timestamps, in seconds
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Result of verifying one webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Signature is authentic and fresh
    Valid,
    /// Verification failed for the given reason
    Invalid(InvalidReason),
}

impl VerificationOutcome {
    /// Whether the webhook was accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The rejection reason, if any
    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(*reason),
        }
    }

    /// Convert into a `Result` for `?` propagation
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(reason) => Err(WebhookError::Signature(reason)),
        }
    }
}

/// Verify a webhook against the current wall clock
pub fn verify(
    payload: &[u8],
    header_value: &str,
    secret: &[u8],
    tolerance_secs: u64,
) -> VerificationOutcome {
    verify_at(
        payload,
        header_value,
        secret,
        tolerance_secs,
        chrono::Utc::now().timestamp(),
    )
}

/// Verify a webhook as of `now` (Unix seconds)
///
/// Checks run in a fixed order and the first failure is reported: missing
/// input, malformed header, stale or future timestamp, then the constant-time
/// signature comparison.
pub fn verify_at(
    payload: &[u8],
    header_value: &str,
    secret: &[u8],
    tolerance_secs: u64,
    now: i64,
) -> VerificationOutcome {
    if payload.is_empty() || header_value.is_empty() || secret.is_empty() {
        return VerificationOutcome::Invalid(InvalidReason::MissingParameter);
    }

    let parsed = match signature::parse_header(header_value) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "Rejecting webhook with malformed signature header");
            return VerificationOutcome::Invalid(InvalidReason::MalformedHeader);
        }
    };

    if now.abs_diff(parsed.timestamp) > tolerance_secs {
        return VerificationOutcome::Invalid(InvalidReason::ExpiredTimestamp);
    }

    let expected = signature::sign(parsed.timestamp, payload, secret);
    if signature::signatures_match(&expected, &parsed.signature) {
        VerificationOutcome::Valid
    } else {
        VerificationOutcome::Invalid(InvalidReason::SignatureMismatch)
    }
}

/// Verifier for incoming webhooks bound to one shared secret
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    signature: WebhookSignature,
    tolerance_secs: u64,
}

impl WebhookVerifier {
    /// Create a new verifier with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            signature: WebhookSignature::new(secret),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Set the timestamp tolerance in seconds
    pub fn with_tolerance(mut self, seconds: u64) -> Self {
        self.tolerance_secs = seconds;
        self
    }

    /// Timestamp tolerance in seconds
    pub fn tolerance(&self) -> u64 {
        self.tolerance_secs
    }

    /// Verify an incoming webhook signature
    pub fn verify(&self, payload: &[u8], header_value: &str) -> VerificationOutcome {
        self.verify_at(payload, header_value, chrono::Utc::now().timestamp())
    }

    /// Verify an incoming webhook signature as of `now`
    pub fn verify_at(&self, payload: &[u8], header_value: &str, now: i64) -> VerificationOutcome {
        let outcome = verify_at(
            payload,
            header_value,
            self.signature.secret().expose_secret().as_bytes(),
            self.tolerance_secs,
            now,
        );

        if let VerificationOutcome::Invalid(reason) = outcome {
            warn!(reason = %reason, payload_len = payload.len(), "Webhook rejected");
        }

        outcome
    }

    /// Verify using the signature header found in `headers`
    ///
    /// Header names are matched case-insensitively. A missing header is
    /// reported as [`InvalidReason::MissingParameter`].
    pub fn verify_from_headers(
        &self,
        payload: &[u8],
        headers: &HashMap<String, String>,
    ) -> VerificationOutcome {
        let header_value = find_header(headers, headers::SIGNATURE)
            .or_else(|| find_header(headers, headers::SIGNATURE_ALT))
            .unwrap_or_default();

        self.verify(payload, header_value)
    }

    /// Verify and parse an incoming webhook
    ///
    /// The exact verified bytes are deserialized; nothing is re-encoded.
    pub fn receive<T: DeserializeOwned>(&self, payload: &[u8], header_value: &str) -> Result<T> {
        self.verify(payload, header_value).into_result()?;
        Ok(serde_json::from_slice(payload)?)
    }

    /// Verify and parse a webhook using the signature header in `headers`
    pub fn receive_from_headers<T: DeserializeOwned>(
        &self,
        payload: &[u8],
        headers: &HashMap<String, String>,
    ) -> Result<T> {
        self.verify_from_headers(payload, headers).into_result()?;
        Ok(serde_json::from_slice(payload)?)
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
