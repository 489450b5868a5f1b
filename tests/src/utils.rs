use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use ntl_common::config::Config;
use tokio::net::TcpListener;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// A listener on 127.0.0.1 that accepts and drops connections until the test ends.
pub struct LoopbackService {
    pub port: u16,
    _task: tokio::task::JoinHandle<()>,
}

impl LoopbackService {
    pub async fn start() -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind loopback listener");
        let port = listener.local_addr().expect("listener address").port();

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        Self { port, _task: task }
    }
}

impl Drop for LoopbackService {
    fn drop(&mut self) {
        self._task.abort();
    }
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind loopback listener");
    listener.local_addr().expect("listener address").port()
}

pub fn loopback_config(ports: Vec<u16>) -> Config {
    Config {
        probe_ports: ports,
        probe_timeout: Duration::from_millis(200),
        workers: 4,
        no_dns: true,
        ..Config::default()
    }
}
