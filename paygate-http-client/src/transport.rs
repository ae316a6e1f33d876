//! Transport seam between the retry loop and the network.

use crate::{ClientConfig, ClientError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// One fully-built HTTP attempt
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including query string
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
}

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
}

/// Executes a single HTTP attempt
///
/// Implementations return `Ok` for any completed response, including 4xx and
/// 5xx, and [`ClientError::Network`] when no response was received. Timeouts
/// and retries are applied by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and read the full response body
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ClientError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { inner })
    }

    /// Wrap an existing `reqwest` client
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(network_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn network_error(err: reqwest::Error) -> ClientError {
    ClientError::Network(err.to_string())
}
