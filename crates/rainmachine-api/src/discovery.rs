// LAN discovery
//
// Broadcasts the discovery magic over UDP and waits for the first reply.
// A reply is `{kind}|{mac}|{name}|{url}|{reserved}`; empty tokens are
// dropped before the positional fields are read. Discovery yields
// connection parameters only; logging in is a separate step.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use serde::Serialize;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{DEFAULT_LOCAL_PORT, LocalTarget};
use crate::error::{DiscoveryFailure, Error};

/// Payload of the discovery probe.
pub const DISCOVERY_MAGIC: &str = "RainMachine Discovery";

/// Reply kind tag of an irrigation controller.
pub const SPRINKLER_KIND: &str = "SPRINKLER";

/// Port replies arrive on.
pub const DEFAULT_LISTEN_PORT: u16 = 15900;

/// Port controllers listen for probes on.
pub const DEFAULT_BROADCAST_PORT: u16 = 15800;

pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_DATAGRAM: usize = 1500;

/// Where to listen, where to probe, and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub listen_addr: SocketAddr,
    pub target: SocketAddr,
    pub timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_LISTEN_PORT).into(),
            target: SocketAddrV4::new(Ipv4Addr::BROADCAST, DEFAULT_BROADCAST_PORT).into(),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

/// A controller that answered the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredController {
    pub mac: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
}

impl From<DiscoveredController> for LocalTarget {
    fn from(found: DiscoveredController) -> Self {
        LocalTarget::new(found.host)
            .port(found.port)
            .use_ssl(found.use_ssl)
    }
}

/// Parse one discovery reply.
pub fn parse_reply(reply: &str) -> Result<DiscoveredController, DiscoveryFailure> {
    let tokens: Vec<&str> = reply
        .trim()
        .split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let Some((&kind, rest)) = tokens.split_first() else {
        return Err(DiscoveryFailure::Malformed("empty reply".into()));
    };
    if kind != SPRINKLER_KIND {
        return Err(DiscoveryFailure::UnexpectedKind(kind.to_owned()));
    }

    let [mac, name, url, ..] = rest else {
        return Err(DiscoveryFailure::Malformed(format!(
            "expected mac, name and url after kind, got {} field(s)",
            rest.len()
        )));
    };

    let url = Url::parse(url)
        .map_err(|e| DiscoveryFailure::Malformed(format!("bad url {url:?}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| DiscoveryFailure::Malformed(format!("url {url} has no host")))?;

    Ok(DiscoveredController {
        mac: (*mac).to_owned(),
        name: (*name).to_owned(),
        host: host.to_owned(),
        port: url.port().unwrap_or(DEFAULT_LOCAL_PORT),
        use_ssl: url.scheme() == "https",
    })
}

fn open_socket(listen_addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let domain = if listen_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_broadcast(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&SockAddr::from(listen_addr))?;
    UdpSocket::from_std(socket.into())
}

/// Probe the local network and return the first controller that answers.
///
/// No retries: a missing or foreign reply fails with
/// [`Error::DiscoveryFailed`] and the caller decides whether to probe again.
pub async fn discover(config: &DiscoveryConfig) -> Result<DiscoveredController, Error> {
    let socket = open_socket(config.listen_addr).map_err(DiscoveryFailure::from)?;

    socket
        .send_to(DISCOVERY_MAGIC.as_bytes(), config.target)
        .await
        .map_err(DiscoveryFailure::from)?;
    debug!(target_addr = %config.target, "discovery probe sent");

    let mut buf = [0u8; MAX_DATAGRAM];
    let (len, from) = tokio::time::timeout(config.timeout, socket.recv_from(&mut buf))
        .await
        .map_err(|_| DiscoveryFailure::NoReply {
            timeout: config.timeout,
        })?
        .map_err(DiscoveryFailure::from)?;

    let reply = String::from_utf8_lossy(buf.get(..len).unwrap_or_default());
    trace!(%from, len, "discovery reply received");

    let found = parse_reply(&reply)?;
    debug!(mac = %found.mac, host = %found.host, "controller discovered");
    Ok(found)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_sprinkler_reply() {
        let found =
            parse_reply("SPRINKLER|c8:3a:35:aa:bb:cc|Backyard|https://192.168.1.101:8080/|1|")
                .unwrap();
        assert_eq!(
            found,
            DiscoveredController {
                mac: "c8:3a:35:aa:bb:cc".into(),
                name: "Backyard".into(),
                host: "192.168.1.101".into(),
                port: 8080,
                use_ssl: true,
            }
        );

        let target: LocalTarget = found.into();
        assert_eq!(target.base_url(), "https://192.168.1.101:8080/api/4");
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let found = parse_reply("||SPRINKLER||aa:bb|Front||http://10.0.0.4:18080||").unwrap();
        assert_eq!(found.name, "Front");
        assert_eq!(found.port, 18080);
        assert!(!found.use_ssl);
    }

    #[test]
    fn foreign_kind_is_rejected() {
        let err = parse_reply("PRINTER|aa:bb|Office|http://10.0.0.8/").unwrap_err();
        assert!(matches!(err, DiscoveryFailure::UnexpectedKind(ref k) if k == "PRINTER"));
    }

    #[test]
    fn short_reply_is_malformed() {
        assert!(matches!(
            parse_reply("SPRINKLER|aa:bb"),
            Err(DiscoveryFailure::Malformed(_))
        ));
        assert!(matches!(parse_reply(""), Err(DiscoveryFailure::Malformed(_))));
    }

    #[test]
    fn missing_port_falls_back_to_default() {
        let found = parse_reply("SPRINKLER|aa:bb|Side|https://rainmachine.local/").unwrap();
        assert_eq!(found.port, DEFAULT_LOCAL_PORT);
    }
}
