//! Resilient gateway client implementation.

use crate::request::IDEMPOTENCY_KEY_HEADER;
use crate::{
    ApiRequest, ApiResponse, ClientConfig, ClientError, ReqwestTransport, Result, RetryState,
    Transport, TransportRequest,
};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Gateway client with per-attempt timeouts and bounded retries
///
/// Cloning is cheap; clones share the configuration and transport. Each call
/// keeps its own attempt counter, so concurrent calls never interfere.
#[derive(Clone)]
pub struct ResilientClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl ResilientClient {
    /// Create a client using the default `reqwest` transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a client with a custom transport
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.config.normalized_base_url()
    }

    /// Execute a request with timeout and retry handling
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.execute_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Execute a request and deserialize the response body into `T`
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(response.json()?)
    }

    /// Execute a request that the caller can abandon through `cancel`
    ///
    /// Cancellation is observed while an attempt is in flight and while
    /// backing off, and yields [`ClientError::Cancelled`].
    pub async fn execute_with_cancel(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        request.validate()?;
        let prepared = self.prepare(&request)?;
        let policy = &self.config.retry;

        let mut state = RetryState::start();
        let mut last: Option<Result<ApiResponse>> = None;

        loop {
            state = match state {
                RetryState::Attempting(attempt) => {
                    let result = self.attempt(prepared.clone(), attempt, cancel).await;
                    let next = match &result {
                        Ok(_) => state.on_success(),
                        Err(e) => state.on_failure(policy, e),
                    };
                    last = Some(result);
                    next
                }
                RetryState::BackingOff(attempt) => {
                    let delay = policy.delay_for_attempt(attempt);
                    if let Some(Err(e)) = &last {
                        warn!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying gateway request"
                        );
                    }

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    state.on_backoff_elapsed()
                }
                RetryState::Succeeded | RetryState::Exhausted => break,
            };
        }

        match last {
            Some(Err(e)) => {
                debug!(method = %prepared.method, url = %prepared.url, error = %e, "Gateway request failed");
                Err(e)
            }
            Some(Ok(response)) => Ok(response),
            None => Err(ClientError::configuration("request was never attempted")),
        }
    }

    /// One attempt under a fresh deadline
    async fn attempt(
        &self,
        request: TransportRequest,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        debug!(
            attempt = attempt + 1,
            method = %request.method,
            url = %request.url,
            "Sending gateway request"
        );

        let timeout = self.config.timeout;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = tokio::time::timeout(timeout, self.transport.send(request)) => match result {
                Ok(response) => response?,
                Err(_) => {
                    return Err(ClientError::Timeout {
                        timeout_ms: self.config.timeout_ms(),
                    });
                }
            },
        };

        Ok(ApiResponse::from_transport(response)?)
    }

    /// Resolve the URL and headers once; every attempt reuses them
    fn prepare(&self, request: &ApiRequest) -> Result<TransportRequest> {
        let url = request.build_url(self.base_url())?;
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in &self.config.default_headers {
            insert_header(&mut headers, name, value)?;
        }

        if let Some(key) = &self.config.api_key {
            let mut value = HeaderValue::try_from(format!("Bearer {}", key.expose_secret()))
                .map_err(|_| ClientError::configuration("API key is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        if let Some(content_type) = request.content_type() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        if let Some(key) = request.idempotency_key_value() {
            insert_header(&mut headers, IDEMPOTENCY_KEY_HEADER, key)?;
        }

        for (name, value) in request.headers() {
            insert_header(&mut headers, name, value)?;
        }

        Ok(TransportRequest {
            method: request.method().clone(),
            url,
            headers,
            body: request.body().cloned(),
        })
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::try_from(name)
        .map_err(|_| ClientError::configuration(format!("invalid header name: {name}")))?;
    let value = HeaderValue::try_from(value)
        .map_err(|_| ClientError::configuration(format!("invalid value for header {name}")))?;
    headers.insert(name, value);
    Ok(())
}

impl fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
