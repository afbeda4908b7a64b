#![allow(clippy::unwrap_used)]
// Integration tests for the shared dispatcher using wiremock.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rainmachine_api::{Error, ErrorKind, HttpSession, PendingRequest, Transport, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Transport) {
    let server = MockServer::start().await;
    (server, Transport::default())
}

fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}/api/4/{path}", server.uri())).unwrap()
}

async fn mount_body(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_and_json_headers_are_attached() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/4/zone/3/start"))
        .and(query_param("access_token", "abc123"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "time": 60 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "statusCode": 0, "message": "OK" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = PendingRequest::post(url(&server, "zone/3/start"))
        .access_token(SecretString::from("abc123"), None)
        .json(json!({ "time": 60 }));
    let body = transport.dispatch_raw(request).await.unwrap();

    assert_eq!(body["message"], "OK");
}

#[tokio::test]
async fn test_extra_query_params_are_kept_alongside_token() {
    let (server, transport) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/4/program"))
        .and(query_param("access_token", "t"))
        .and(query_param("verbose", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "programs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let request = PendingRequest::get(url(&server, "program"))
        .access_token(SecretString::from("t"), None)
        .query("verbose", "1");
    transport.dispatch_raw(request).await.unwrap();
}

#[tokio::test]
async fn test_status_code_200_is_success() {
    let (server, transport) = setup().await;
    mount_body(&server, 200, json!({ "statusCode": 200, "message": "OK" })).await;

    let result = transport.dispatch_raw(PendingRequest::get(url(&server, "diag"))).await;
    assert!(result.is_ok());
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_not_authenticated_code_maps_to_token_expired() {
    let (server, transport) = setup().await;
    mount_body(
        &server,
        200,
        json!({ "statusCode": 2, "message": "Not Authenticated !" }),
    )
    .await;

    let err = transport
        .dispatch_raw(PendingRequest::get(url(&server, "zone")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TokenExpired);
    assert!(err.url().unwrap().ends_with("/api/4/zone"));
    assert!(err.to_string().contains("Not Authenticated"));
}

#[tokio::test]
async fn test_not_implemented_code_maps_to_unsupported() {
    let (server, transport) = setup().await;
    mount_body(&server, 200, json!({ "statusCode": 4, "message": "Not Implemented" })).await;

    let err = transport
        .dispatch_raw(PendingRequest::get(url(&server, "restrictions/hourly")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedCall { .. }));
}

#[tokio::test]
async fn test_body_signal_takes_priority_over_http_status() {
    let (server, transport) = setup().await;
    mount_body(&server, 400, json!({ "errorType": 1 })).await;

    let err = transport
        .dispatch_raw(PendingRequest::post(url(&server, "login/auth")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnvalidatedEmail);
}

#[tokio::test]
async fn test_unmapped_code_keeps_code_and_message() {
    let (server, transport) = setup().await;
    mount_body(
        &server,
        200,
        json!({ "statusCode": 7, "message": "Cannot set provision" }),
    )
    .await;

    let err = transport
        .dispatch_raw(PendingRequest::post(url(&server, "provision/name")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(err.api_error_code(), Some(7));
    assert!(matches!(err, Error::Api { ref message, .. } if message == "Cannot set provision"));
}

#[tokio::test]
async fn test_unauthorized_without_body_is_token_expired() {
    let (server, transport) = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = transport
        .dispatch_raw(PendingRequest::get(url(&server, "zone")))
        .await
        .unwrap_err();

    assert!(err.is_token_expired());
}

#[tokio::test]
async fn test_server_error_without_json_is_request_error() {
    let (server, transport) = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = transport
        .dispatch_raw(PendingRequest::get(url(&server, "zone")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request { ref message, .. } if message.contains("502")));
}

#[tokio::test]
async fn test_decode_failure_carries_body() {
    let (server, transport) = setup().await;
    mount_body(&server, 200, json!({ "apiVer": "4.5.0" })).await;

    let err = transport
        .dispatch::<rainmachine_api::models::ApiVersions>(PendingRequest::get(url(
            &server, "apiVer",
        )))
        .await
        .unwrap_err();

    let Error::Deserialization { body, .. } = err else {
        panic!("expected Deserialization, got {err:?}");
    };
    assert!(body.contains("4.5.0"));
}

#[tokio::test]
async fn test_decode_failure_body_hides_token() {
    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Login {
        access_token: String,
        expires_in: i64,
    }

    let (server, transport) = setup().await;
    mount_body(
        &server,
        200,
        json!({ "statusCode": 0, "access_token": "SUPERSECRET123", "expires_in": "soon" }),
    )
    .await;

    let err = transport
        .dispatch::<Login>(PendingRequest::post(url(&server, "auth/login")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert!(!format!("{err:?}").contains("SUPERSECRET123"));
    assert!(!err.to_string().contains("SUPERSECRET123"));
}

// ── Network failures ────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_failure_hides_token() {
    let transport = Transport::default();
    let request = PendingRequest::get(Url::parse("http://127.0.0.1:1/api/4/zone").unwrap())
        .access_token(SecretString::from("SUPERSECRET123"), None);

    let err = transport.dispatch_raw(request).await.unwrap_err();

    assert!(matches!(err, Error::Transport { .. }), "got {err:?}");
    assert_eq!(err.url(), Some("http://127.0.0.1:1/api/4/zone"));
    assert!(!err.to_string().contains("SUPERSECRET123"));
    assert!(!format!("{err:?}").contains("SUPERSECRET123"));

    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        assert!(!cause.to_string().contains("SUPERSECRET123"));
        source = cause.source();
    }
}

// ── Expiry / timeout ────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_token_fails_without_network_io() {
    let (server, transport) = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let past = Utc::now() - TimeDelta::seconds(1);
    let request = PendingRequest::get(url(&server, "zone"))
        .access_token(SecretString::from("stale"), Some(past));
    let err = transport.dispatch_raw(request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TokenExpired);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    let transport = Transport::new(TransportConfig {
        timeout: Duration::from_millis(200),
        ..TransportConfig::default()
    });
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = transport
        .dispatch_raw(PendingRequest::get(url(&server, "diag")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout, .. } if timeout == Duration::from_millis(200)));
}

#[tokio::test]
async fn test_per_request_timeout_overrides_config() {
    let (server, transport) = setup().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let request = PendingRequest::get(url(&server, "diag")).timeout(Duration::from_millis(100));
    let err = transport.dispatch_raw(request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

// ── Session reuse ───────────────────────────────────────────────────

#[tokio::test]
async fn test_shared_and_closed_sessions_both_serve_calls() {
    let server = MockServer::start().await;
    mount_body(&server, 200, json!({ "statusCode": 0, "message": "OK" })).await;

    let config = TransportConfig::default();
    let session = HttpSession::new(&config).unwrap();
    let transport = Transport::with_session(config, session.clone());

    transport
        .dispatch_raw(PendingRequest::post(url(&server, "watering/stopall")))
        .await
        .unwrap();

    session.close();
    assert!(transport.session().unwrap().is_closed());

    transport
        .dispatch_raw(PendingRequest::post(url(&server, "watering/stopall")))
        .await
        .unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
