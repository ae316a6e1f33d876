//! Gateway request description.

use crate::{ClientError, Result};
use bytes::Bytes;
use http::Method;
use serde::Serialize;
use url::Url;

/// Header used by the gateway to deduplicate retried mutations
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Longest idempotency key the gateway accepts
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 64;

/// A logical request against the gateway, independent of any attempt
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    content_type: Option<&'static str>,
    idempotency_key: Option<String>,
    body_error: Option<String>,
}

impl ApiRequest {
    /// Create a request for `path` relative to the client base URL
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            content_type: None,
            idempotency_key: None,
            body_error: None,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// PATCH request
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), Some(value.to_string())));
        self
    }

    /// Add a query parameter that is only sent when `value` is `Some`
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Add a header to the request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body as JSON
    ///
    /// A serialization failure is reported as a configuration error when the
    /// request is executed.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.body = Some(Bytes::from(bytes));
                self.content_type = Some("application/json");
                self.body_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON body");
                self.body_error = Some(e.to_string());
            }
        }
        self
    }

    /// Set the request body as raw JSON bytes, sent unchanged
    pub fn json_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some("application/json");
        self.body_error = None;
        self
    }

    /// Attach an `Idempotency-Key` header
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request body, if any
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Content type implied by the body
    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    /// Idempotency key, if any
    pub fn idempotency_key_value(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    /// Extra request headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Reject caller mistakes before any network activity
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(ClientError::configuration("request path is required"));
        }

        if let Some(err) = &self.body_error {
            return Err(ClientError::configuration(format!(
                "request body could not be serialized: {err}"
            )));
        }

        if let Some(key) = &self.idempotency_key {
            if key.is_empty() {
                return Err(ClientError::configuration("idempotency key must not be empty"));
            }
            if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
                return Err(ClientError::configuration(format!(
                    "idempotency key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters, got {}",
                    key.len()
                )));
            }
        }

        Ok(())
    }

    /// Build `base + path + ?query`, skipping query keys without a value
    pub fn build_url(&self, base_url: &str) -> Result<Url> {
        let base = base_url.trim_end_matches('/');
        let mut url = if self.path.starts_with('/') {
            Url::parse(&format!("{base}{}", self.path))?
        } else {
            Url::parse(&format!("{base}/{}", self.path))?
        };

        let mut defined = self
            .query
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
            .peekable();

        if defined.peek().is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in defined {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// Validate a required resource identifier before it is placed in a path
pub fn require_id<'a>(field: &str, id: &'a str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(ClientError::configuration(format!("{field} is required")));
    }
    if id.contains(['/', '?', '#']) {
        return Err(ClientError::configuration(format!(
            "{field} contains reserved characters"
        )));
    }
    Ok(id)
}
