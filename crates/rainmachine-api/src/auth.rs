use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// API path prefix shared by local devices and the cloud relay.
pub const API_PATH: &str = "api/4";

/// Default HTTPS port of a controller on the LAN.
pub const DEFAULT_LOCAL_PORT: u16 = 8080;

/// Default cloud account service (login, device listing, device login).
pub const DEFAULT_ACCOUNT_URL: &str = "https://my.rainmachine.com";

/// Default cloud relay that proxies API calls to a linked device.
pub const DEFAULT_RELAY_URL: &str = "https://api.rainmachine.com";

/// Where to reach a controller directly on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTarget {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
}

impl LocalTarget {
    /// HTTPS on [`DEFAULT_LOCAL_PORT`].
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_LOCAL_PORT,
            use_ssl: true,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn use_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// `{scheme}://{host}:{port}/api/4`
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}/{API_PATH}", self.host, self.port)
    }
}

/// Cloud service roots. Overridable for tests and self-hosted relays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudEndpoints {
    pub account_url: String,
    pub relay_url: String,
}

impl Default for CloudEndpoints {
    fn default() -> Self {
        Self {
            account_url: DEFAULT_ACCOUNT_URL.into(),
            relay_url: DEFAULT_RELAY_URL.into(),
        }
    }
}

impl CloudEndpoints {
    /// Build an account-service URL: `{account_url}/{path}`.
    pub fn account(&self, path: &str) -> Result<Url, Error> {
        let base = self.account_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Relay base for one device: `{relay_url}/{sprinkler_id}/api/4`.
    pub fn relay_base(&self, sprinkler_id: &str) -> String {
        let base = self.relay_url.trim_end_matches('/');
        format!("{base}/{sprinkler_id}/{API_PATH}")
    }
}

/// How a controller is reached. Local and remote controllers share the
/// whole accessor surface; only URL resolution, TLS policy and the
/// login handshake differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Direct HTTPS to the device on the LAN (self-signed certificate).
    Local(LocalTarget),
    /// Relayed through the cloud service.
    Remote {
        sprinkler_id: String,
        cloud: CloudEndpoints,
    },
}

impl Backend {
    /// Base URL every relative API path is resolved against.
    pub fn base_url(&self) -> String {
        match self {
            Self::Local(target) => target.base_url(),
            Self::Remote {
                sprinkler_id,
                cloud,
            } => cloud.relay_base(sprinkler_id),
        }
    }

    /// LAN devices present self-signed certificates; the relay does not.
    pub fn tls_verify(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_base_url_follows_scheme_flag() {
        let target = LocalTarget::new("192.168.1.100");
        assert_eq!(target.base_url(), "https://192.168.1.100:8080/api/4");

        let plain = LocalTarget::new("10.0.0.2").port(8081).use_ssl(false);
        assert_eq!(plain.base_url(), "http://10.0.0.2:8081/api/4");
    }

    #[test]
    fn relay_base_embeds_sprinkler_id() {
        let cloud = CloudEndpoints {
            account_url: "http://127.0.0.1:9000/".into(),
            relay_url: "http://127.0.0.1:9001/".into(),
        };
        assert_eq!(cloud.relay_base("abc123"), "http://127.0.0.1:9001/abc123/api/4");
        assert_eq!(
            cloud.account("login/auth").unwrap().as_str(),
            "http://127.0.0.1:9000/login/auth"
        );
    }

    #[test]
    fn tls_policy_per_backend() {
        assert!(!Backend::Local(LocalTarget::new("h")).tls_verify());
        let remote = Backend::Remote {
            sprinkler_id: "x".into(),
            cloud: CloudEndpoints::default(),
        };
        assert!(remote.tls_verify());
        assert!(remote.is_remote());
    }
}
