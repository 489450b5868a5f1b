//! The host prober and network sweeper.
//!
//! [`Prober`] is the seam between the sweep loop and whatever actually touches the
//! network. [`TcpProber`] is the production implementation; tests plug in their own.
//!
//! A sweep enumerates the usable addresses of a CIDR block, probes them through a
//! bounded pool, and merges the results back in ascending address order, so the output
//! is identical to a sequential sweep.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ntl_common::config::Config;
use ntl_common::error::Result;
use ntl_common::models::report::SweepResult;
use ntl_common::network::host::HostProbe;
use ntl_common::network::range::CidrBlock;
use ntl_common::success;
use tracing::{debug, info, warn};

use crate::network::tcp;

pub mod resolver;

/// Probes a single address for liveness.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns the probe outcome. An `Err` is treated by the sweeper as "not reachable".
    async fn probe(&self, address: IpAddr) -> Result<HostProbe>;
}

/// TCP connect prober over a fixed port set.
#[derive(Debug, Clone)]
pub struct TcpProber {
    ports: Vec<u16>,
    probe_timeout: Duration,
    resolve_hostnames: bool,
}

impl TcpProber {
    pub fn new(cfg: &Config) -> Self {
        Self {
            ports: cfg.probe_ports.clone(),
            probe_timeout: cfg.probe_timeout,
            resolve_hostnames: !cfg.no_dns,
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: IpAddr) -> Result<HostProbe> {
        let open_ports = tcp::open_ports(address, &self.ports, self.probe_timeout).await;
        let mut probe = HostProbe::from_open_ports(address, open_ports);

        if probe.reachable && self.resolve_hostnames {
            probe.hostname = resolver::reverse_lookup(address).await;
        }
        Ok(probe)
    }
}

/// Snapshot handed to the progress hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepProgress {
    pub scanned: u64,
    pub total: u64,
    pub found: usize,
}

pub type ProgressHook<'a> = &'a (dyn Fn(SweepProgress) + Send + Sync);

/// Sweeps every usable address of `cidr`.
///
/// Fails with `InvalidNetworkSpec` before any probe is sent if `cidr` does not parse.
/// A probe that errors or panics only affects its own address, which is counted as
/// scanned and not reachable.
pub async fn sweep<P>(
    cidr: &str,
    prober: Arc<P>,
    cfg: &Config,
    on_progress: Option<ProgressHook<'_>>,
) -> Result<SweepResult>
where
    P: Prober + ?Sized + 'static,
{
    let network: CidrBlock = cidr.parse()?;
    let targets = network.hosts();
    let total: u64 = targets.len();
    let workers: usize = cfg.workers.max(1);
    let batch: u64 = cfg.progress_batch as u64;

    info!("Sweeping {network} ({total} addresses, {workers} workers)");

    let mut probes = stream::iter(targets.to_iter())
        .map(|address| {
            let prober = Arc::clone(&prober);
            async move {
                let outcome = tokio::spawn(async move { prober.probe(address).await }).await;
                (address, outcome)
            }
        })
        .buffered(workers);

    let mut scanned: u64 = 0;
    let mut hosts: Vec<HostProbe> = Vec::new();

    while let Some((address, outcome)) = probes.next().await {
        scanned += 1;

        let probe: HostProbe = match outcome {
            Ok(Ok(probe)) if probe.reachable => probe,
            Ok(Ok(_)) => HostProbe::unreachable(address),
            Ok(Err(e)) => {
                debug!("Probe of {address} failed: {e}");
                HostProbe::unreachable(address)
            }
            Err(e) => {
                warn!("Probe task for {address} aborted: {e}");
                HostProbe::unreachable(address)
            }
        };

        if probe.reachable {
            let os = probe.os_guess.map(|g| g.as_str()).unwrap_or("Unknown");
            info!("Host found: {address} - {os}");
            hosts.push(probe);
        }

        if batch > 0 && scanned % batch == 0 {
            notify(on_progress, scanned, total, hosts.len());
        }
    }

    if batch == 0 || scanned % batch != 0 {
        notify(on_progress, scanned, total, hosts.len());
    }

    let found_count = hosts.len();
    success!("Sweep of {network} done: {found_count} active hosts out of {scanned} scanned");

    Ok(SweepResult {
        network,
        scanned_count: scanned,
        found_count,
        hosts,
    })
}

fn notify(hook: Option<ProgressHook<'_>>, scanned: u64, total: u64, found: usize) {
    if let Some(hook) = hook {
        hook(SweepProgress {
            scanned,
            total,
            found,
        });
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
