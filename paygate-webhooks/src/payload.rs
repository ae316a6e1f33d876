//! Sender-side helpers that stamp and sign outgoing webhook payloads

use crate::signature::{self, WebhookSignature};
use crate::{Result, WebhookError};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field added to signed events carrying the signing timestamp
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Field added to signed events carrying the hex signature
pub const SIGNATURE_FIELD: &str = "signature";

/// A signature computed over bytes the caller will transmit unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// Signing timestamp (Unix seconds)
    pub timestamp: i64,
    /// Lowercase hex HMAC-SHA256 signature
    pub signature: String,
}

impl SignedPayload {
    /// Header value to send alongside the payload
    pub fn header(&self) -> String {
        signature::format_header(self.timestamp, &self.signature)
    }
}

/// An event object stamped with `timestamp` and `signature`
#[derive(Debug, Clone)]
pub struct SignedEvent {
    fields: Map<String, Value>,
    payload: Vec<u8>,
    signed: SignedPayload,
}

impl SignedEvent {
    /// The exact bytes that were signed: the event plus `timestamp`
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Signing timestamp (Unix seconds)
    pub fn timestamp(&self) -> i64 {
        self.signed.timestamp
    }

    /// Hex signature over [`payload`](Self::payload)
    pub fn signature(&self) -> &str {
        &self.signed.signature
    }

    /// Header value for transmitting [`payload`](Self::payload) as the body
    pub fn header(&self) -> String {
        self.signed.header()
    }

    /// Original fields plus `timestamp` and `signature`
    pub fn into_value(self) -> Value {
        let mut fields = self.fields;
        fields.insert(
            SIGNATURE_FIELD.to_string(),
            Value::String(self.signed.signature),
        );
        Value::Object(fields)
    }
}

/// Signs outgoing webhook payloads with a shared secret
#[derive(Debug, Clone)]
pub struct WebhookSigner {
    signature: WebhookSignature,
}

impl WebhookSigner {
    /// Create a signer for the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            signature: WebhookSignature::new(secret),
        }
    }

    /// Sign raw payload bytes at the current time
    pub fn sign_payload(&self, payload: &[u8]) -> SignedPayload {
        self.sign_payload_at(payload, Utc::now().timestamp())
    }

    /// Sign raw payload bytes at `timestamp`
    pub fn sign_payload_at(&self, payload: &[u8], timestamp: i64) -> SignedPayload {
        SignedPayload {
            timestamp,
            signature: self.signature.digest(payload, timestamp),
        }
    }

    /// Stamp and sign an event object at the current time
    pub fn sign_event<T: Serialize>(&self, event: &T) -> Result<SignedEvent> {
        self.sign_event_at(event, Utc::now().timestamp())
    }

    /// Stamp and sign an event object at `timestamp`
    ///
    /// The event is serialized exactly once, after `timestamp` is inserted and
    /// before `signature` exists, so the signature never covers itself.
    pub fn sign_event_at<T: Serialize>(&self, event: &T, timestamp: i64) -> Result<SignedEvent> {
        let mut fields = match serde_json::to_value(event)? {
            Value::Object(fields) => fields,
            other => {
                return Err(WebhookError::Payload(format!(
                    "webhook event must serialize to a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        fields.remove(SIGNATURE_FIELD);
        fields.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));

        let payload = serde_json::to_vec(&fields)?;
        let signed = self.sign_payload_at(&payload, timestamp);

        Ok(SignedEvent {
            fields,
            payload,
            signed,
        })
    }
}

/// Stamp `event` with the current time and sign it with `secret`
pub fn create_signed_payload<T: Serialize>(event: &T, secret: &str) -> Result<SignedEvent> {
    WebhookSigner::new(secret).sign_event(event)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
