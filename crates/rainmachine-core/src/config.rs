// ── Runtime client configuration ──
//
// These types describe how to reach controllers. They carry credential
// data and connection tuning but never touch disk; the CLI resolves a
// profile into a `ConnectTarget` and hands it in.

use rainmachine_api::{CloudEndpoints, LocalTarget, TransportConfig};
use secrecy::SecretString;
use strum::IntoStaticStr;

/// Settings shared by every controller a [`Client`](crate::Client) loads.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    /// Share one connection pool across all controllers instead of
    /// opening a fresh client per call.
    pub reuse_session: bool,
    pub cloud: CloudEndpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            reuse_session: true,
            cloud: CloudEndpoints::default(),
        }
    }
}

/// One set of credentials to log in with.
#[derive(Debug, Clone, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectTarget {
    /// A single controller on the LAN.
    Local {
        target: LocalTarget,
        password: SecretString,
    },
    /// Every controller linked to a cloud account.
    Remote {
        email: String,
        password: SecretString,
    },
}

impl ConnectTarget {
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}
