//! One pass over the critical servers listed in the configuration.
//!
//! Each server gets the check matching its role, then every server is pinged. The result
//! counts how many of those checks came back OK.

use futures::future::join_all;
use ntl_common::config::{Config, ServerRole, ServerSpec};
use serde::Serialize;
use tracing::info;

use super::{
    AdDnsReport, CheckResult, CheckStatus, PING_TIMEOUT, PORT_TIMEOUT, PingReport, SSH_PORT,
    check_ad_dns, check_port, ping, ping_report,
};
use crate::database::{MySqlReport, MySqlTarget, check_mysql};

/// Reachability of a single service port.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub server: String,
    pub tests: Vec<CheckResult>,
    pub global_status: CheckStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerCheck {
    AdDns(AdDnsReport),
    MySql(MySqlReport),
    Service(ServiceReport),
    Ping(PingReport),
}

impl ServerCheck {
    pub fn global_status(&self) -> CheckStatus {
        match self {
            ServerCheck::AdDns(report) => report.global_status,
            ServerCheck::MySql(report) => report.global_status,
            ServerCheck::Service(report) => report.global_status,
            ServerCheck::Ping(report) => report.global_status,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerCheck::AdDns(_) => "ad_dns",
            ServerCheck::MySql(_) => "mysql",
            ServerCheck::Service(_) => "ssh",
            ServerCheck::Ping(_) => "ping",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerDiagnostic {
    pub name: String,
    pub address: String,
    pub check_type: &'static str,
    pub result: ServerCheck,
}

impl ServerDiagnostic {
    fn new(server: &ServerSpec, result: ServerCheck) -> Self {
        Self {
            name: server.name.clone(),
            address: server.address.clone(),
            check_type: result.kind(),
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FullDiagnostic {
    pub results: Vec<ServerDiagnostic>,
    pub total: usize,
    pub ok_count: usize,
    pub alert_count: usize,
}

impl FullDiagnostic {
    pub fn tally(results: Vec<ServerDiagnostic>) -> Self {
        let ok_count = results
            .iter()
            .filter(|r| r.result.global_status() == CheckStatus::Ok)
            .count();
        Self {
            total: results.len(),
            alert_count: results.len() - ok_count,
            ok_count,
            results,
        }
    }
}

/// Application servers are only checked for a reachable SSH service, after a ping.
async fn check_application(address: &str) -> ServiceReport {
    let connectivity = ping(address, PING_TIMEOUT).await;
    let mut tests = vec![connectivity];
    if tests[0].is_ok() {
        tests.push(check_port(address, SSH_PORT, "SSH", PORT_TIMEOUT).await);
    }

    let global_status = if tests.iter().all(CheckResult::is_ok) {
        CheckStatus::Ok
    } else {
        CheckStatus::Error
    };
    ServiceReport {
        server: address.to_string(),
        tests,
        global_status,
    }
}

async fn check_role(server: &ServerSpec, cfg: &Config) -> ServerDiagnostic {
    info!("Diagnosing {} ({})", server.name, server.address);
    let result = match server.role {
        ServerRole::DomainController => ServerCheck::AdDns(check_ad_dns(&server.address).await),
        ServerRole::Database => {
            let target = MySqlTarget::new(&server.address, &cfg.database);
            ServerCheck::MySql(check_mysql(&target).await)
        }
        ServerRole::Application => ServerCheck::Service(check_application(&server.address).await),
    };
    ServerDiagnostic::new(server, result)
}

/// Role checks for every configured server, followed by a ping of each.
pub async fn run_full_diagnostic(cfg: &Config) -> FullDiagnostic {
    let mut results = join_all(cfg.servers.iter().map(|server| check_role(server, cfg))).await;

    let pings = join_all(cfg.servers.iter().map(|server| async move {
        ServerDiagnostic::new(server, ServerCheck::Ping(ping_report(&server.address).await))
    }))
    .await;
    results.extend(pings);

    FullDiagnostic::tally(results)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
