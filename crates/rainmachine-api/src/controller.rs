// Controller session
//
// Binds the transport to one device: base URL resolution, the current
// access token, and the identity/capability data probed after login.
// Per-domain accessors (programs, zones, ...) live in `endpoints/` and are
// reached through borrowed handles such as `controller.zones()`.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::auth::{Backend, CloudEndpoints, LocalTarget};
use crate::error::Error;
use crate::models::{ApiVersions, LocalLoginResponse, TokenResponse};
use crate::transport::{PendingRequest, Transport};

/// Hardware version string of first-generation controllers.
pub const GENERATION_ONE_HARDWARE: &str = "1";

/// Seconds shaved off the advertised token lifetime to absorb clock skew.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 10;

#[derive(Debug, Clone)]
struct AccessToken {
    value: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

/// Extra request material beyond method and path.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl RequestOptions {
    pub fn json(body: Value) -> Self {
        Self {
            query: Vec::new(),
            json: Some(body),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// One irrigation controller's authenticated session and metadata.
///
/// Created unauthenticated, then [`login_local`](Self::login_local) or
/// [`login_remote`](Self::login_remote) installs the access token. Identity
/// and version fields are filled in by the registry before it hands the
/// controller out.
#[derive(Debug)]
pub struct Controller {
    transport: Transport,
    backend: Backend,
    base_url: String,
    /// Replaced wholesale on every login; never merged.
    token: RwLock<Option<AccessToken>>,
    mac: String,
    name: String,
    versions: Option<ApiVersions>,
}

impl Controller {
    /// A controller reached directly on the LAN.
    pub fn local(transport: Transport, target: LocalTarget) -> Self {
        Self::with_backend(transport, Backend::Local(target))
    }

    /// A controller reached through the cloud relay.
    pub fn remote(
        transport: Transport,
        cloud: CloudEndpoints,
        sprinkler_id: impl Into<String>,
    ) -> Self {
        Self::with_backend(
            transport,
            Backend::Remote {
                sprinkler_id: sprinkler_id.into(),
                cloud,
            },
        )
    }

    fn with_backend(transport: Transport, backend: Backend) -> Self {
        let base_url = backend.base_url();
        Self {
            transport,
            backend,
            base_url,
            token: RwLock::new(None),
            mac: String::new(),
            name: String::new(),
            versions: None,
        }
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_remote(&self) -> bool {
        self.backend.is_remote()
    }

    pub fn versions(&self) -> Option<&ApiVersions> {
        self.versions.as_ref()
    }

    pub fn api_version(&self) -> Option<&str> {
        self.versions.as_ref().map(|v| v.api_version.as_str())
    }

    pub fn hardware_version(&self) -> Option<&str> {
        self.versions.as_ref().map(|v| v.hardware_version.as_str())
    }

    pub fn software_version(&self) -> Option<&str> {
        self.versions.as_ref().map(|v| v.software_version.as_str())
    }

    pub fn set_identity(&mut self, mac: impl Into<String>, name: impl Into<String>) {
        self.mac = mac.into();
        self.name = name.into();
    }

    pub fn set_versions(&mut self, versions: ApiVersions) {
        self.versions = Some(versions);
    }

    // ── Capabilities ─────────────────────────────────────────────────

    /// First-generation hardware lacks several newer endpoints.
    pub fn is_generation_one(&self) -> bool {
        self.hardware_version() == Some(GENERATION_ONE_HARDWARE)
    }

    /// Refuse `operation` up front on generation-1 hardware.
    ///
    /// Call at the top of every accessor the first hardware revision cannot
    /// serve; no request is issued when this fails.
    pub fn ensure_supported(&self, operation: &str) -> Result<(), Error> {
        if self.is_generation_one() {
            return Err(Error::UnsupportedCall {
                url: format!("{}/{operation}", self.base_url),
                message: "not available on generation-1 hardware".into(),
            });
        }
        Ok(())
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Install an access token, replacing any previous one.
    pub fn set_access_token(&self, token: SecretString, expires_at: Option<DateTime<Utc>>) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(AccessToken {
            value: token,
            expires_at,
        });
    }

    pub fn has_access_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn access_token_expiration(&self) -> Option<DateTime<Utc>> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|t| t.expires_at)
    }

    fn current_token(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Log in to a LAN controller with its password.
    ///
    /// `POST auth/login` with `{"pwd", "remember": 1}`; TLS verification is
    /// off because LAN devices present self-signed certificates.
    pub async fn login_local(&self, password: &SecretString) -> Result<(), Error> {
        if self.is_remote() {
            return Err(Error::Request {
                url: self.base_url.clone(),
                message: "password login is only available on local controllers".into(),
            });
        }

        let url = self.url("auth/login")?;
        debug!("logging in at {}", url);

        let request = PendingRequest::post(url)
            .tls_verify(false)
            .json(json!({ "pwd": password.expose_secret(), "remember": 1 }));
        let resp: LocalLoginResponse = self.transport.dispatch(request).await?;

        let expires_at = resp.expires_in.map(|secs| {
            Utc::now() + TimeDelta::seconds(secs.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS))
        });
        self.set_access_token(SecretString::from(resp.access_token), expires_at);

        debug!("local login successful");
        Ok(())
    }

    /// Second stage of the cloud handshake: trade the account token and the
    /// device password for a device-scoped token.
    ///
    /// `POST {account}/devices/login-sprinkler` with `{"sprinklerId", "pwd"}`.
    pub async fn login_remote(
        &self,
        account_token: &SecretString,
        password: &SecretString,
    ) -> Result<(), Error> {
        let Backend::Remote {
            sprinkler_id,
            cloud,
        } = &self.backend
        else {
            return Err(Error::Request {
                url: self.base_url.clone(),
                message: "device login is only available through the cloud relay".into(),
            });
        };

        let url = cloud.account("devices/login-sprinkler")?;
        debug!(%sprinkler_id, "logging in to device at {}", url);

        let request = PendingRequest::post(url)
            .access_token(account_token.clone(), None)
            .json(json!({ "sprinklerId": sprinkler_id, "pwd": password.expose_secret() }));
        let resp: TokenResponse = self.transport.dispatch(request).await?;
        self.set_access_token(SecretString::from(resp.access_token), None);

        debug!("remote device login successful");
        Ok(())
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Resolve a relative API path against this controller's base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{path}", self.base_url))?)
    }

    /// Issue one call to this controller and decode the body into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, Error> {
        let mut request =
            PendingRequest::new(method, self.url(path)?).tls_verify(self.backend.tls_verify());
        if let Some(token) = self.current_token() {
            request = request.access_token(token.value, token.expires_at);
        }
        request.query = options.query;
        request.json = options.json;
        self.transport.dispatch(request).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, RequestOptions::default())
            .await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, Error> {
        self.request(Method::POST, path, RequestOptions::json(body))
            .await
    }
}
