use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ntl_common::error::{AuditError, Result};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Attempts one TCP handshake. Only a completed connection counts as open.
pub async fn connect_probe(addr: IpAddr, port: u16, probe_timeout: Duration) -> Result<()> {
    let socket_addr: SocketAddr = SocketAddr::new(addr, port);

    match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(_refused)) => Err(AuditError::ProbeUnreachable(addr)),
        Err(_elapsed) => Err(AuditError::ProbeTimeout(addr)),
    }
}

/// Tries every port in turn and collects those that accepted a connection.
///
/// Worst case is `ports.len() * probe_timeout`.
pub async fn open_ports(addr: IpAddr, ports: &[u16], probe_timeout: Duration) -> BTreeSet<u16> {
    let mut open: BTreeSet<u16> = BTreeSet::new();
    for &port in ports {
        match connect_probe(addr, port, probe_timeout).await {
            Ok(()) => {
                open.insert(port);
            }
            Err(e) => trace!("{addr}:{port} closed ({e})"),
        }
    }
    open
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn listening_port_is_reported_open() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = connect_probe(LOCALHOST, port, Duration::from_millis(500)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn refused_port_is_unreachable() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = connect_probe(LOCALHOST, port, Duration::from_millis(500)).await;
        assert!(matches!(result, Err(AuditError::ProbeUnreachable(_))));
    }

    #[tokio::test]
    async fn open_ports_keeps_only_accepting_ports() {
        let open = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let closed = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let open_port = open.local_addr().unwrap().port();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let found = open_ports(LOCALHOST, &[closed_port, open_port], Duration::from_millis(500)).await;
        assert_eq!(found, BTreeSet::from([open_port]));
    }

    #[tokio::test]
    #[ignore]
    async fn unroutable_address_times_out() {
        let ip: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 1));
        let result = connect_probe(ip, 443, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(AuditError::ProbeTimeout(_))));
    }
}
