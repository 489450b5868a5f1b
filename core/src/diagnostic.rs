//! # Service Diagnostics
//!
//! Reachability checks against individual servers: ICMP through the system `ping`
//! binary, TCP connects to well-known service ports, and name resolution.
//!
//! Every check is run once and reported; nothing is retried.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

pub mod full;
pub mod remote;

pub const SSH_PORT: u16 = 22;
const DNS_PORT: u16 = 53;
const LDAP_PORT: u16 = 389;
const KERBEROS_PORT: u16 = 88;

/// Name resolved to confirm the local resolver works.
const RESOLUTION_PROBE: &str = "www.google.com";

pub const PING_TIMEOUT: Duration = Duration::from_secs(3);
pub const PORT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub message: String,
}

impl CheckResult {
    pub(crate) fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            port: None,
            message: message.into(),
        }
    }

    pub(crate) fn on_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub host: String,
    pub test_result: CheckResult,
    pub global_status: CheckStatus,
}

/// Result of checking a domain controller.
#[derive(Debug, Clone, Serialize)]
pub struct AdDnsReport {
    pub server: String,
    pub tests: BTreeMap<&'static str, CheckResult>,
    pub global_status: CheckStatus,
}

/// Builds the platform's single-echo `ping` invocation.
fn ping_command(host: &str, wait: Duration) -> Command {
    let mut cmd = Command::new("ping");
    if cfg!(windows) {
        let wait_ms = wait.as_millis().to_string();
        cmd.args(["-n", "1", "-w", wait_ms.as_str(), host]);
    } else {
        let wait_secs = wait.as_secs().max(1).to_string();
        cmd.args(["-c", "1", "-W", wait_secs.as_str(), host]);
    }
    cmd.stdout(Stdio::null()).stderr(Stdio::null()).kill_on_drop(true);
    cmd
}

/// Sends one ICMP echo through the system `ping` binary.
pub async fn ping(host: &str, wait: Duration) -> CheckResult {
    let mut cmd = ping_command(host, wait);

    // Allow the process a second beyond its own timeout before giving up on it.
    match timeout(wait + Duration::from_secs(1), cmd.status()).await {
        Ok(Ok(status)) if status.success() => CheckResult::new(CheckStatus::Ok, "Host reachable"),
        Ok(Ok(_)) => CheckResult::new(CheckStatus::Error, "Host unreachable"),
        Ok(Err(e)) => CheckResult::new(CheckStatus::Error, format!("Could not run ping: {e}")),
        Err(_elapsed) => CheckResult::new(CheckStatus::Error, "Timeout - host unreachable"),
    }
}

pub async fn ping_report(host: &str) -> PingReport {
    info!("Pinging {host}");
    let test_result = ping(host, PING_TIMEOUT).await;
    let global_status = test_result.status;
    PingReport {
        host: host.to_string(),
        test_result,
        global_status,
    }
}

/// TCP connect test against `host:port`.
pub async fn check_port(host: &str, port: u16, service: &str, wait: Duration) -> CheckResult {
    let result = match timeout(wait, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => CheckResult::new(CheckStatus::Ok, format!("Service {service} reachable")),
        Ok(Err(e)) => {
            debug!("{host}:{port} refused: {e}");
            CheckResult::new(CheckStatus::Error, format!("Service {service} unreachable"))
        }
        Err(_elapsed) => {
            CheckResult::new(CheckStatus::Error, format!("Service {service} timed out"))
        }
    };
    result.on_port(port)
}

/// Confirms the local resolver can resolve a public name.
pub async fn check_name_resolution() -> CheckResult {
    let resolved = match timeout(PORT_TIMEOUT, tokio::net::lookup_host((RESOLUTION_PROBE, 80))).await {
        Ok(Ok(addrs)) => addrs.count() > 0,
        _ => false,
    };

    if resolved {
        CheckResult::new(CheckStatus::Ok, "DNS resolution working")
    } else {
        CheckResult::new(CheckStatus::Warning, "DNS resolution could not be verified")
    }
}

/// OK only when every test is OK.
pub fn overall_status<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> CheckStatus {
    if results.into_iter().all(CheckResult::is_ok) {
        CheckStatus::Ok
    } else {
        CheckStatus::Warning
    }
}

/// Checks the DNS, LDAP and Kerberos services of a domain controller.
///
/// Service ports are only tested once the server answers a ping.
pub async fn check_ad_dns(server: &str) -> AdDnsReport {
    info!("Checking AD/DNS services on {server}");
    let mut tests: BTreeMap<&'static str, CheckResult> = BTreeMap::new();

    let connectivity = ping(server, PING_TIMEOUT).await;
    let reachable = connectivity.is_ok();
    tests.insert("connectivity", connectivity);

    if reachable {
        tests.insert("dns_service", check_port(server, DNS_PORT, "DNS", PORT_TIMEOUT).await);
        tests.insert("ldap_service", check_port(server, LDAP_PORT, "LDAP/AD", PORT_TIMEOUT).await);
        tests.insert(
            "kerberos_service",
            check_port(server, KERBEROS_PORT, "Kerberos", PORT_TIMEOUT).await,
        );
        tests.insert("dns_resolution", check_name_resolution().await);
    }

    let global_status = overall_status(tests.values());
    AdDnsReport {
        server: server.to_string(),
        tests,
        global_status,
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

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn open_port_is_ok() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = check_port("127.0.0.1", port, "LDAP/AD", Duration::from_millis(500)).await;

        assert_eq!(result.status, CheckStatus::Ok);
        assert_eq!(result.port, Some(port));
        assert_eq!(result.message, "Service LDAP/AD reachable");
    }

    #[tokio::test]
    async fn closed_port_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = check_port("127.0.0.1", port, "DNS", Duration::from_millis(500)).await;
        assert_eq!(result.status, CheckStatus::Error);
    }

    #[test]
    fn any_non_ok_result_downgrades_to_warning() {
        let ok = CheckResult::new(CheckStatus::Ok, "fine");
        let warn = CheckResult::new(CheckStatus::Warning, "meh");
        let err = CheckResult::new(CheckStatus::Error, "down");

        assert_eq!(overall_status([&ok, &ok]), CheckStatus::Ok);
        assert_eq!(overall_status([&ok, &warn]), CheckStatus::Warning);
        assert_eq!(overall_status([&err]), CheckStatus::Warning);
    }

    #[test]
    fn ping_arguments_ask_for_a_single_echo() {
        let cmd = ping_command("10.0.0.1", Duration::from_secs(3));
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args.last().map(String::as_str), Some("10.0.0.1"));
        assert!(args.contains(&"1".to_string()));
    }

    #[test]
    fn check_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&CheckStatus::Warning).unwrap(), "\"WARNING\"");
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_answers_ping() {
        let result = ping("127.0.0.1", Duration::from_secs(1)).await;
        assert!(result.is_ok());
    }
}
