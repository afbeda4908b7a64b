// Shared transport: HTTP client construction and the single-call dispatcher.
//
// Every API call in the crate funnels through `Transport::dispatch`, which
// owns header setup, token injection, the per-call timeout, and mapping of
// embedded device/relay error codes onto `Error`. Endpoint modules only see
// decoded payloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{CONNECTION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, LOCAL_SUCCESS_CODES};

/// Default per-call timeout budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BODY_PREVIEW_LEN: usize = 200;

// ── Configuration ───────────────────────────────────────────────────

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Overall budget for one call: connect, send and body read.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("rainmachine-api/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// `tls_verify = false` accepts self-signed certificates, which is what
    /// controllers on the LAN present.
    pub fn build_client(&self, tls_verify: bool) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        if !tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

// ── Long-lived session ──────────────────────────────────────────────

/// A caller-owned, long-lived connection pool shared across calls.
///
/// Holds one verifying and one non-verifying client so a single session can
/// serve both cloud (verified) and LAN (self-signed) controllers. Cheaply
/// cloneable; the dispatcher never closes it.
#[derive(Debug, Clone)]
pub struct HttpSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    verified: reqwest::Client,
    insecure: reqwest::Client,
    closed: AtomicBool,
}

impl HttpSession {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            inner: Arc::new(SessionInner {
                verified: config.build_client(true)?,
                insecure: config.build_client(false)?,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Mark the session closed. Later calls fall back to call-scoped clients.
    pub fn close(&self) {
        debug!("closing shared HTTP session");
        self.inner.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn client(&self, tls_verify: bool) -> &reqwest::Client {
        if tls_verify {
            &self.inner.verified
        } else {
            &self.inner.insecure
        }
    }
}

// ── Pending request ─────────────────────────────────────────────────

/// Everything needed to perform one call. Built, dispatched, dropped.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub url: Url,
    pub access_token: Option<SecretString>,
    /// When set and already in the past, the call fails without touching the network.
    pub access_token_expiration: Option<DateTime<Utc>>,
    pub tls_verify: bool,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
    /// Overrides [`TransportConfig::timeout`] for this call only.
    pub timeout: Option<Duration>,
}

impl PendingRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            access_token: None,
            access_token_expiration: None,
            tls_verify: true,
            query: Vec::new(),
            json: None,
            timeout: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn access_token(mut self, token: SecretString, expires_at: Option<DateTime<Utc>>) -> Self {
        self.access_token = Some(token);
        self.access_token_expiration = expires_at;
        self
    }

    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────

/// Performs exactly one HTTP call per [`dispatch`](Self::dispatch).
///
/// If a live [`HttpSession`] is attached it is reused; otherwise a client is
/// built for the call and dropped (closing its connections) on every exit path.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    config: TransportConfig,
    session: Option<HttpSession>,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn with_session(config: TransportConfig, session: HttpSession) -> Self {
        Self {
            config,
            session: Some(session),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&HttpSession> {
        self.session.as_ref()
    }

    /// Dispatch a request and decode the JSON body into `T`.
    pub async fn dispatch<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, Error> {
        let url = request.url.to_string();
        let value = self.dispatch_raw(request).await?;
        T::deserialize(&value).map_err(|e| Error::Deserialization {
            url,
            message: e.to_string(),
            body: redact_tokens(value).to_string(),
        })
    }

    /// Dispatch a request and return the parsed JSON body untouched.
    pub async fn dispatch_raw(&self, request: PendingRequest) -> Result<Value, Error> {
        let PendingRequest {
            method,
            url,
            access_token,
            access_token_expiration,
            tls_verify,
            mut query,
            json,
            timeout,
        } = request;
        let url_str = url.to_string();

        if let Some(expires_at) = access_token_expiration {
            if Utc::now() >= expires_at {
                return Err(Error::TokenExpired {
                    url: url_str,
                    message: "long-lived access token has expired".into(),
                });
            }
        }

        let scoped;
        let client = match &self.session {
            Some(session) if !session.is_closed() => session.client(tls_verify),
            _ => {
                scoped = self.config.build_client(tls_verify)?;
                &scoped
            }
        };

        if let Some(token) = &access_token {
            query.push(("access_token".into(), token.expose_secret().to_owned()));
        }

        debug!(%method, url = %url_str, "dispatching request");

        let mut builder = client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONNECTION, "close");
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &json {
            builder = builder.json(body);
        }

        let budget = timeout.unwrap_or(self.config.timeout);
        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(budget, exchange).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) if e.is_timeout() => {
                return Err(Error::Timeout {
                    url: url_str,
                    timeout: budget,
                });
            }
            Ok(Err(source)) => {
                // reqwest keeps the full URL, query string and token included.
                return Err(Error::Transport {
                    url: url_str,
                    source: source.without_url(),
                });
            }
            Err(_) => {
                return Err(Error::Timeout {
                    url: url_str,
                    timeout: budget,
                });
            }
        };

        trace!(%status, bytes = body.len(), "response received");
        interpret_response(&url_str, status, &body)
    }
}

// ── Response interpretation ─────────────────────────────────────────

/// Keys whose values are credentials and must not survive into error text.
const SECRET_KEYS: &[&str] = &["access_token", "password", "pwd"];

/// Replace credential values anywhere in `value` with a placeholder.
fn redact_tokens(mut value: Value) -> Value {
    fn walk(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, field) in map {
                    if SECRET_KEYS.contains(&key.as_str()) {
                        *field = Value::String("<redacted>".into());
                    } else {
                        walk(field);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(walk),
            _ => {}
        }
    }
    walk(&mut value);
    value
}

fn interpret_response(url: &str, status: StatusCode, body: &str) -> Result<Value, Error> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Err(unparseable(url, status, body));
    };

    check_error_signals(url, &value)?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::TokenExpired {
            url: url.into(),
            message: "unauthorized (HTTP 401)".into(),
        });
    }
    if !status.is_success() {
        return Err(Error::Request {
            url: url.into(),
            message: format!("HTTP {status}"),
        });
    }
    Ok(value)
}

fn unparseable(url: &str, status: StatusCode, body: &str) -> Error {
    let preview = preview(body);
    if status == StatusCode::UNAUTHORIZED {
        Error::TokenExpired {
            url: url.into(),
            message: "unauthorized (HTTP 401)".into(),
        }
    } else if status.is_success() {
        Error::Deserialization {
            url: url.into(),
            message: format!("response is not JSON (body preview: {preview:?})"),
            body: body.into(),
        }
    } else {
        Error::Request {
            url: url.into(),
            message: format!("HTTP {status}: {preview}"),
        }
    }
}

/// Raise the relay (`errorType`) or device (`statusCode`) error embedded in a body.
pub(crate) fn check_error_signals(url: &str, value: &Value) -> Result<(), Error> {
    if !value.is_object() {
        return Ok(());
    }

    if let Some(code) = signal_code(value, "errorType").filter(|code| *code > 0) {
        return Err(Error::from_remote_code(url, code));
    }
    if let Some(code) =
        signal_code(value, "statusCode").filter(|code| !LOCAL_SUCCESS_CODES.contains(code))
    {
        let message = match value.get("message") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        return Err(Error::from_local_code(url, code, message));
    }
    Ok(())
}

/// Read one numeric signal field; numeric strings count too.
fn signal_code(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    const URL: &str = "https://192.168.1.100:8080/api/4/zone";

    #[test]
    fn success_body_passes_through() {
        let value = interpret_response(URL, StatusCode::OK, r#"{"statusCode":0,"message":"OK"}"#)
            .unwrap();
        assert_eq!(value["message"], "OK");
    }

    #[test]
    fn status_code_200_is_success() {
        assert!(check_error_signals(URL, &json!({"statusCode": 200, "message": "OK"})).is_ok());
    }

    #[test]
    fn relay_signal_wins_over_device_signal() {
        let err = check_error_signals(URL, &json!({"errorType": 1, "statusCode": 2})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnvalidatedEmail);
    }

    #[test]
    fn zero_error_type_is_ignored() {
        assert!(check_error_signals(URL, &json!({"errorType": 0, "access_token": "x"})).is_ok());
    }

    #[test]
    fn body_signal_takes_priority_over_http_status() {
        let err = interpret_response(
            URL,
            StatusCode::BAD_REQUEST,
            r#"{"statusCode":4,"message":"Not Implemented"}"#,
        )
        .unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn unparseable_error_body_carries_url() {
        let err = interpret_response(URL, StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.url(), Some(URL));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn unauthorized_without_signal_is_token_expired() {
        let err = interpret_response(URL, StatusCode::UNAUTHORIZED, "").unwrap_err();
        assert!(err.is_token_expired());
    }

    #[test]
    fn status_code_survives_non_string_message() {
        let err = check_error_signals(URL, &json!({"statusCode": 4, "message": 5})).unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn numeric_string_codes_are_signals() {
        let err = check_error_signals(URL, &json!({"statusCode": "2"})).unwrap_err();
        assert!(err.is_token_expired());

        let err = check_error_signals(URL, &json!({"errorType": "1", "message": null})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnvalidatedEmail);
    }

    #[test]
    fn malformed_code_fields_are_ignored() {
        assert!(check_error_signals(URL, &json!({"statusCode": {"x": 1}, "errorType": true})).is_ok());
    }

    #[test]
    fn redaction_reaches_nested_credentials() {
        let value = redact_tokens(json!({
            "access_token": "SUPERSECRET123",
            "checksum": "abc",
            "nested": [{"pwd": "hunter2"}]
        }));
        let text = value.to_string();
        assert!(!text.contains("SUPERSECRET123"));
        assert!(!text.contains("hunter2"));
        assert_eq!(value["checksum"], "abc");
    }

    #[test]
    fn non_object_bodies_have_no_signals() {
        assert!(check_error_signals(URL, &json!([1, 2, 3])).is_ok());
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_LEN);
    }
}
