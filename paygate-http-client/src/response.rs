//! Gateway response handling.

use crate::error::{ApiError, UNKNOWN_ERROR_CODE};
use crate::transport::TransportResponse;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A successful (2xx) gateway response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    data: Value,
}

impl ApiResponse {
    /// Classify a raw transport response
    ///
    /// The outcome depends only on the status code; an unparseable body becomes
    /// `Value::Null` rather than an error.
    pub fn from_transport(response: TransportResponse) -> Result<Self, ApiError> {
        let data = parse_body(&response.body);

        if !response.status.is_success() {
            return Err(api_error(response.status, &data));
        }

        Ok(Self {
            status: response.status,
            headers: response.headers,
            data,
        })
    }

    /// Get the status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Parsed JSON body (`Null` when empty or not JSON)
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consume the response and return the parsed body
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Deserialize the body into a domain type
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, body_len = body.len(), "Response body is not JSON");
            Value::Null
        }
    }
}

/// Build the error for a non-2xx response from its (possibly `Null`) body
pub fn api_error(status: StatusCode, data: &Value) -> ApiError {
    let message = text_field(data, "detail")
        .or_else(|| text_field(data, "message"))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let code = text_field(data, "code").unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());

    ApiError {
        message,
        status_code: status.as_u16(),
        code,
        details: data.get("details").filter(|d| !d.is_null()).cloned(),
    }
}

/// A present, non-empty field rendered as text; non-string values are
/// rendered as compact JSON.
fn text_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
