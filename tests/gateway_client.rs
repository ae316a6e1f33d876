//! Integration tests for the gateway client over real HTTP.
//!
//! Backoff delays are shortened so the retry paths run quickly.

use paygate::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries)
        .with_base_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(40))
}

fn client_for(server: &MockServer, max_retries: u32) -> ResilientClient {
    let config = ClientConfig::builder()
        .base_url(format!("{}/v1/", server.uri()))
        .api_key("sk_test_123")
        .timeout(Duration::from_secs(5))
        .retry(fast_retry(max_retries))
        .build();
    ResilientClient::new(config).unwrap()
}

// =============================================================================
// Success Paths
// =============================================================================

#[tokio::test]
async fn test_get_with_auth_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment-sessions"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "ps_1"}],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let response = client
        .execute(
            ApiRequest::get("/payment-sessions")
                .query("limit", 10)
                .query_opt("cursor", None::<String>),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.data()["data"][0]["id"], "ps_1");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("limit=10"));
}

#[tokio::test]
async fn test_post_json_with_idempotency_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/refunds"))
        .and(header("idempotency-key", "refund-ps_1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"payment_session_id": "ps_1", "amount": 500})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "re_1"})))
        .expect(1)
        .mount(&server)
        .await;

    #[derive(serde::Deserialize)]
    struct Refund {
        id: String,
    }

    let client = client_for(&server, 0);
    let refund: Refund = client
        .execute(
            ApiRequest::post("refunds")
                .idempotency_key("refund-ps_1")
                .json(&json!({"payment_session_id": "ps_1", "amount": 500})),
        )
        .await
        .unwrap()
        .json()
        .unwrap();

    assert_eq!(refund.id, "re_1");
}

#[tokio::test]
async fn test_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/webhook-endpoints/we_1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let response = client
        .execute(ApiRequest::delete("/webhook-endpoints/we_1"))
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    assert!(response.data().is_null());
}

// =============================================================================
// Retry Behavior
// =============================================================================

#[tokio::test]
async fn test_server_errors_retried_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment-sessions/ps_1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/payment-sessions/ps_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ps_1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let response = client
        .execute(ApiRequest::get("/payment-sessions/ps_1"))
        .await
        .unwrap();

    assert_eq!(response.data()["id"], "ps_1");
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "detail": "Gateway under maintenance",
            "code": "MAINTENANCE"
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let err = client.execute(ApiRequest::get("/balance")).await.unwrap_err();

    assert!(err.is_server_error());
    let api = err.api_error().unwrap();
    assert_eq!(api.status_code, 503);
    assert_eq!(api.message, "Gateway under maintenance");
    assert_eq!(api.code, "MAINTENANCE");
}

#[tokio::test]
async fn test_rate_limit_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let response = client.execute(ApiRequest::get("/x")).await.unwrap();

    assert_eq!(response.data()["ok"], true);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_errors_fail_fast() {
    let cases: [(u16, &str); 4] = [
        (400, "is_validation_error"),
        (401, "is_authentication_error"),
        (403, "is_permission_error"),
        (404, "is_not_found_error"),
    ];

    for (status, predicate) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"message": "nope"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 3);
        let err = client.execute(ApiRequest::get("/x")).await.unwrap_err();

        let matched = match predicate {
            "is_validation_error" => err.is_validation_error(),
            "is_authentication_error" => err.is_authentication_error(),
            "is_permission_error" => err.is_permission_error(),
            _ => err.is_not_found_error(),
        };
        assert!(matched, "{status} should satisfy {predicate}");
        assert_eq!(err.api_error().unwrap().message, "nope");
        assert_eq!(err.api_error().unwrap().code, "UNKNOWN_ERROR");
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.execute(ApiRequest::get("/x")).await.unwrap_err();

    let api = err.api_error().unwrap();
    assert_eq!(api.message, "HTTP 502");
    assert_eq!(api.code, "UNKNOWN_ERROR");
    assert!(api.details.is_none());
}

// =============================================================================
// Timeouts and Network Failures
// =============================================================================

#[tokio::test]
async fn test_slow_responses_time_out_per_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .timeout_ms(50)
        .retry(fast_retry(1))
        .build();
    let client = ResilientClient::new(config).unwrap();

    let start = Instant::now();
    let err = client.execute(ApiRequest::get("/slow")).await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout { timeout_ms: 50 }));
    assert_eq!(err.to_string(), "Request timed out after 50ms");
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = ClientConfig::builder()
        .base_url(format!("http://127.0.0.1:{port}"))
        .retry(fast_retry(1))
        .build();
    let client = ResilientClient::new(config).unwrap();

    let err = client.execute(ApiRequest::get("/x")).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_cancellation_stops_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .retry(RetryPolicy::new(3).with_base_delay(Duration::from_secs(30)))
        .build();
    let client = ResilientClient::new(config).unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = client
        .execute_with_cancel(ApiRequest::get("/x"), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_client_from_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer sk_env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let settings = SdkSettings::from_lookup(|key| match key {
        "PAYGATE_BASE_URL" => Some(uri.clone()),
        "PAYGATE_API_KEY" => Some("sk_env".into()),
        "PAYGATE_MAX_RETRIES" => Some("0".into()),
        _ => None,
    })
    .unwrap();

    let client = ResilientClient::new(settings.client_config()).unwrap();
    let response = client.execute(ApiRequest::get("/health")).await.unwrap();
    assert_eq!(response.data()["status"], "ok");
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client.execute(ApiRequest::get("")).await.unwrap_err();
    assert!(err.is_configuration());
    assert!(!err.is_retryable());
}
