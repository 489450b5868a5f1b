use std::path::PathBuf;

use colored::*;
use ntl_common::config::Config;
use ntl_core::diagnostic::remote::{self, RemoteChannel, SshChannel, WinRmChannel};
use ntl_core::output::ReportWriter;

use crate::commands::{Channel, persist};
use crate::terminal::{colors, format, print};

pub struct RemoteTarget {
    pub host: String,
    pub user: String,
    pub port: Option<u16>,
    pub identity: Option<PathBuf>,
    pub channel: Channel,
}

impl RemoteTarget {
    fn channel(self) -> Box<dyn RemoteChannel> {
        match self.channel {
            Channel::Ssh => {
                let mut ssh = SshChannel::new(self.host, self.user);
                if let Some(port) = self.port {
                    ssh = ssh.with_port(port);
                }
                if let Some(identity) = self.identity {
                    ssh = ssh.with_identity(identity);
                }
                Box::new(ssh)
            }
            Channel::Winrm => {
                let mut winrm = WinRmChannel::new(self.host);
                if let Some(port) = self.port {
                    winrm = winrm.with_port(port);
                }
                Box::new(winrm)
            }
        }
    }
}

pub async fn remote(
    target: RemoteTarget,
    command: &str,
    cfg: &Config,
    writer: Option<&ReportWriter>,
) -> anyhow::Result<()> {
    let channel = target.channel();
    let execution = remote::run_remote(channel.as_ref(), command).await?;

    print::section(&format!("remote exec - {}", execution.host), cfg.quiet);
    print::fields(&[
        ("Channel", execution.channel.normal()),
        ("Command", command.normal()),
        ("Status", format::check_status(execution.global_status)),
    ]);
    if cfg.quiet < 2 {
        print::blank();
        for line in execution.output.stdout.lines() {
            print::line(line);
        }
        for line in execution.output.stderr.lines() {
            print::note(line.color(colors::STATUS_WARN));
        }
    }

    persist(writer, &execution, &format!("remote_exec_{}", execution.host))
}
