//! Remote command execution behind a capability check.
//!
//! A [`RemoteChannel`] first reports whether it can be used at all on this machine;
//! callers go through [`run_remote`], which refuses to execute on an unavailable channel
//! and surfaces `RemoteUnavailable` instead.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use ntl_common::error::{AuditError, Result};
use serde::Serialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use super::{CheckStatus, SSH_PORT};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether a channel can be used from this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable(String),
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_status == Some(0)
    }
}

#[async_trait]
pub trait RemoteChannel: Send + Sync {
    fn name(&self) -> &'static str;
    fn host(&self) -> &str;
    async fn capability(&self) -> Capability;
    async fn execute(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through the system OpenSSH client in batch mode.
///
/// Authentication must be non-interactive (agent or identity file); a password prompt
/// fails the command instead of blocking.
#[derive(Debug, Clone)]
pub struct SshChannel {
    host: String,
    user: String,
    port: u16,
    identity: Option<PathBuf>,
    connect_timeout: Duration,
}

impl SshChannel {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            port: SSH_PORT,
            identity: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<PathBuf>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    fn arguments(&self, command: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-o".into(),
            "BatchMode=yes".into(),
            "-o".into(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            "-p".into(),
            self.port.to_string(),
        ];
        if let Some(identity) = &self.identity {
            args.push("-i".into());
            args.push(identity.display().to_string());
        }
        args.push(format!("{}@{}", self.user, self.host));
        args.push("--".into());
        args.push(command.into());
        args
    }
}

#[async_trait]
impl RemoteChannel for SshChannel {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn host(&self) -> &str {
        &self.host
    }

    async fn capability(&self) -> Capability {
        let probe = Command::new("ssh")
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match probe {
            Ok(_) => Capability::Available,
            Err(e) => Capability::Unavailable(format!("ssh client not found: {e}")),
        }
    }

    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        debug!("ssh {}@{}:{} `{command}`", self.user, self.host, self.port);

        let mut cmd = Command::new("ssh");
        cmd.args(self.arguments(command));

        // The connect timeout only bounds the handshake; give the command itself room too.
        captured(cmd, &self.host, self.connect_timeout * 6).await
    }
}

/// Runs `cmd` to completion with stdin closed, killing it once `budget` is spent.
async fn captured(mut cmd: Command, host: &str, budget: Duration) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null()).kill_on_drop(true);

    let output = match timeout(budget, cmd.output()).await {
        Ok(output) => output?,
        Err(_elapsed) => {
            return Err(AuditError::RemoteUnavailable(format!(
                "{host} did not finish within {}s",
                budget.as_secs()
            )));
        }
    };

    Ok(CommandOutput {
        exit_status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// PowerShell binaries tried in order: PowerShell 7, then Windows PowerShell.
const POWERSHELL_BINARIES: [&str; 2] = ["pwsh", "powershell"];

/// First PowerShell binary on `PATH` that starts.
async fn find_powershell() -> Option<&'static str> {
    for binary in POWERSHELL_BINARIES {
        let started = Command::new(binary)
            .args(["-NoProfile", "-NonInteractive", "-Command", "exit 0"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;
        if started.is_ok() {
            return Some(binary);
        }
    }
    None
}

/// Runs commands on a Windows host through `Invoke-Command` (PowerShell remoting over WinRM).
///
/// The local PowerShell session authenticates as the current user, so the host must
/// trust this machine (domain membership or `TrustedHosts`).
#[derive(Debug, Clone)]
pub struct WinRmChannel {
    host: String,
    port: Option<u16>,
    timeout: Duration,
}

impl WinRmChannel {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            timeout: DEFAULT_CONNECT_TIMEOUT * 6,
        }
    }

    /// Overrides the WinRM listener port (5985 over HTTP by default).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    fn arguments(&self, command: &str) -> Vec<String> {
        let port = self.port.map(|p| format!(" -Port {p}")).unwrap_or_default();
        vec![
            "-NoProfile".into(),
            "-NonInteractive".into(),
            "-Command".into(),
            format!(
                "Invoke-Command -ComputerName {}{port} -ErrorAction Stop -ScriptBlock {{ {command} }}",
                ps_quote(&self.host)
            ),
        ]
    }
}

/// Single-quoted PowerShell literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl RemoteChannel for WinRmChannel {
    fn name(&self) -> &'static str {
        "winrm"
    }

    fn host(&self) -> &str {
        &self.host
    }

    async fn capability(&self) -> Capability {
        match find_powershell().await {
            Some(_) => Capability::Available,
            None => Capability::Unavailable("neither pwsh nor powershell was found".into()),
        }
    }

    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        let binary = find_powershell().await.ok_or_else(|| {
            AuditError::RemoteUnavailable(format!("no PowerShell to reach {}", self.host))
        })?;
        debug!("{binary} Invoke-Command {} `{command}`", self.host);

        let mut cmd = Command::new(binary);
        cmd.args(self.arguments(command));
        captured(cmd, &self.host, self.timeout).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteExecution {
    pub host: String,
    pub channel: &'static str,
    pub command: String,
    pub output: CommandOutput,
    pub global_status: CheckStatus,
}

/// Checks the channel's capability, then runs `command` once.
pub async fn run_remote<C>(channel: &C, command: &str) -> Result<RemoteExecution>
where
    C: RemoteChannel + ?Sized,
{
    if let Capability::Unavailable(reason) = channel.capability().await {
        return Err(AuditError::RemoteUnavailable(format!(
            "{} channel to {}: {reason}",
            channel.name(),
            channel.host()
        )));
    }

    info!("Running `{command}` on {} over {}", channel.host(), channel.name());
    let output = channel.execute(command).await?;
    let global_status = if output.succeeded() {
        CheckStatus::Ok
    } else {
        CheckStatus::Error
    };

    Ok(RemoteExecution {
        host: channel.host().to_string(),
        channel: channel.name(),
        command: command.to_string(),
        output,
        global_status,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
