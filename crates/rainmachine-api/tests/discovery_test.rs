#![allow(clippy::unwrap_used)]
// Discovery over loopback UDP: a fake controller answers the probe.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::UdpSocket;

use rainmachine_api::discovery::DISCOVERY_MAGIC;
use rainmachine_api::{DiscoveryConfig, DiscoveryFailure, Error, ErrorKind, discover};

/// Bind a responder that answers the first probe with `reply`.
async fn responder(reply: Option<&'static str>) -> SocketAddr {
    let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; 256];
        let (len, from) = socket.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], DISCOVERY_MAGIC.as_bytes());
        if let Some(reply) = reply {
            socket.send_to(reply.as_bytes(), from).await.unwrap();
        }
    });

    addr
}

fn config(target: SocketAddr, timeout: Duration) -> DiscoveryConfig {
    DiscoveryConfig {
        listen_addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0).into(),
        target,
        timeout,
    }
}

#[tokio::test]
async fn test_discovers_sprinkler() {
    let target =
        responder(Some("SPRINKLER|aa:bb:cc:dd:ee:ff|Backyard|https://127.0.0.1:8080/|")).await;

    let found = discover(&config(target, Duration::from_secs(2)))
        .await
        .unwrap();

    assert_eq!(found.mac, "aa:bb:cc:dd:ee:ff");
    assert_eq!(found.name, "Backyard");
    assert_eq!(found.host, "127.0.0.1");
    assert_eq!(found.port, 8080);
    assert!(found.use_ssl);
}

#[tokio::test]
async fn test_foreign_device_kind_fails() {
    let target = responder(Some("CHROMECAST|aa:bb|Living Room|http://127.0.0.1/")).await;

    let err = discover(&config(target, Duration::from_secs(2)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DiscoveryFailed);
    assert!(matches!(
        err,
        Error::DiscoveryFailed(DiscoveryFailure::UnexpectedKind(_))
    ));
}

#[tokio::test]
async fn test_silence_times_out_with_same_kind() {
    let target = responder(None).await;

    let err = discover(&config(target, Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DiscoveryFailed);
    assert!(matches!(
        err,
        Error::DiscoveryFailed(DiscoveryFailure::NoReply { .. })
    ));
}
