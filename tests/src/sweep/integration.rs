use std::sync::Arc;

use ntl_common::error::AuditError;
use ntl_common::network::host::OsGuess;
use ntl_core::scanner::{self, TcpProber};

use crate::utils::{closed_port, loopback_config, LoopbackService, LOCALHOST};

/// Sweeps 127.0.0.0/30 with only the listener's port in the probe set.
#[tokio::test]
async fn sweep_finds_the_loopback_listener() {
    let service = LoopbackService::start().await;
    let cfg = loopback_config(vec![service.port]);
    let prober = Arc::new(TcpProber::new(&cfg));

    let result = scanner::sweep("127.0.0.0/30", prober, &cfg, None)
        .await
        .expect("sweep of a valid block");

    assert_eq!(result.scanned_count, 2);
    assert_eq!(result.found_count, 1);

    let host = &result.hosts[0];
    assert_eq!(host.address, LOCALHOST);
    assert!(host.reachable);
    assert!(host.open_ports.contains(&service.port));
    assert_eq!(host.os_guess, Some(OsGuess::Unknown));
    assert!(host.hostname.is_none());
}

#[tokio::test]
async fn refused_ports_do_not_make_a_host_alive() {
    let port = closed_port().await;
    let cfg = loopback_config(vec![port]);

    let result = scanner::sweep("127.0.0.1/32", Arc::new(TcpProber::new(&cfg)), &cfg, None)
        .await
        .expect("sweep of a valid block");

    assert_eq!(result.scanned_count, 1);
    assert_eq!(result.found_count, 0);
    assert!(result.hosts.is_empty());
}

#[tokio::test]
async fn only_open_ports_are_reported() {
    let service = LoopbackService::start().await;
    let closed = closed_port().await;
    let cfg = loopback_config(vec![closed, service.port]);

    let result = scanner::sweep("127.0.0.1/32", Arc::new(TcpProber::new(&cfg)), &cfg, None)
        .await
        .expect("sweep of a valid block");

    let ports: Vec<u16> = result.hosts[0].open_ports.iter().copied().collect();
    assert_eq!(ports, vec![service.port]);
}

#[tokio::test]
async fn malformed_network_is_rejected() {
    let cfg = loopback_config(vec![22]);
    let result = scanner::sweep("127.0.0.0/33", Arc::new(TcpProber::new(&cfg)), &cfg, None).await;

    assert!(matches!(result, Err(AuditError::InvalidNetworkSpec(_))));
}
