pub mod backup;
pub mod diagnostic;
pub mod eol;
pub mod inventory;
pub mod remote;
pub mod report;
pub mod sweep;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use ntl_common::config::{Config, DatabaseSettings};
use ntl_common::success;
use ntl_core::output::ReportWriter;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ntl-toolbox", version)]
#[command(about = "Infrastructure audit toolbox: network sweeps, EOL checks and diagnostics.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Comma-separated ports probed on every address
    #[arg(long, global = true, value_delimiter = ',')]
    pub ports: Option<Vec<u16>>,

    /// Connect timeout per port, in milliseconds (1-999)
    #[arg(long = "timeout-ms", global = true, value_parser = clap::value_parser!(u64).range(1..1000))]
    pub timeout_ms: Option<u64>,

    /// Addresses probed at the same time
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Skip reverse DNS lookups of found hosts
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// EOL catalog file overriding the built-in table
    #[arg(long, global = true)]
    pub eol_file: Option<PathBuf>,

    /// Directory receiving the JSON results
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Directory receiving SQL dumps and CSV exports
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// MySQL port
    #[arg(long, global = true)]
    pub db_port: Option<u16>,

    /// MySQL database name
    #[arg(long, global = true)]
    pub db_name: Option<String>,

    /// MySQL user
    #[arg(long, global = true)]
    pub db_user: Option<String>,

    /// MySQL password
    #[arg(long, global = true, env = "NTL_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Print results without writing them to disk
    #[arg(long, global = true)]
    pub no_save: bool,

    /// Less terminal output (-q, -qq)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover live hosts in a network (e.g. 192.168.10.0/24)
    #[command(alias = "s")]
    Sweep { network: String },
    /// List the known versions and EOL dates of an OS family
    #[command(alias = "e")]
    Eol {
        #[arg(required = true, num_args = 1..)]
        os: Vec<String>,
    },
    /// Correlate a semicolon-separated inventory file with the EOL catalog
    #[command(alias = "i")]
    Inventory { csv: PathBuf },
    /// Sweep a network and build the obsolescence report
    #[command(alias = "r")]
    Report { network: String },
    /// Send one ICMP echo to a host
    Ping { host: String },
    /// Check the DNS, LDAP and Kerberos services of a domain controller
    AdDns { server: String },
    /// Check that the MySQL database answers
    Mysql { host: String },
    /// Check every configured server, then ping each of them
    FullDiagnostic,
    /// Dump the MySQL database to an SQL file
    Backup { host: String },
    /// Export one MySQL table to CSV
    Export { host: String, table: String },
    /// Export every MySQL table to its own CSV file
    BackupTables { host: String },
    /// Run a command on a remote host
    Remote {
        host: String,
        #[arg(short, long)]
        user: String,
        /// Port of the channel (SSH defaults to 22, WinRM to the listener default)
        #[arg(long)]
        port: Option<u16>,
        /// Private key handed to the SSH client
        #[arg(short, long)]
        identity: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Channel::Ssh)]
        channel: Channel,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        command: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Channel {
    Ssh,
    Winrm,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        let mut cfg = Config {
            no_dns: self.no_dns,
            quiet: self.quiet,
            ..Config::default()
        };
        if let Some(ports) = &self.ports {
            cfg.probe_ports = ports.clone();
        }
        if let Some(ms) = self.timeout_ms {
            cfg.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(eol_file) = &self.eol_file {
            cfg.eol_file = eol_file.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            cfg.output_dir = output_dir.clone();
        }
        if let Some(backup_dir) = &self.backup_dir {
            cfg.backup_dir = backup_dir.clone();
        }
        cfg.database = self.database_settings();
        cfg
    }

    fn database_settings(&self) -> DatabaseSettings {
        let defaults = DatabaseSettings::default();
        DatabaseSettings {
            port: self.db_port.unwrap_or(defaults.port),
            database: self.db_name.clone().unwrap_or(defaults.database),
            user: self.db_user.clone().unwrap_or(defaults.user),
            password: self.db_password.clone(),
        }
    }

    /// `None` when `--no-save` was given.
    pub fn writer(&self, cfg: &Config) -> Option<ReportWriter> {
        (!self.no_save).then(|| ReportWriter::new(&cfg.output_dir))
    }
}

pub fn persist<T: Serialize>(
    writer: Option<&ReportWriter>,
    data: &T,
    prefix: &str,
) -> anyhow::Result<()> {
    if let Some(writer) = writer {
        let path = writer.save(data, prefix)?;
        success!("Results saved to {}", path.display());
    }
    Ok(())
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

    #[test]
    fn global_flags_reach_the_config() {
        let cli = CommandLine::try_parse_from([
            "ntl-toolbox",
            "sweep",
            "10.0.0.0/24",
            "--ports",
            "22,3389",
            "--timeout-ms",
            "250",
            "--workers",
            "16",
            "--no-dns",
            "-qq",
        ])
        .unwrap();

        let cfg = cli.to_config();
        assert_eq!(cfg.probe_ports, vec![22, 3389]);
        assert_eq!(cfg.probe_timeout, Duration::from_millis(250));
        assert_eq!(cfg.workers, 16);
        assert!(cfg.no_dns);
        assert_eq!(cfg.quiet, 2);
        assert!(matches!(cli.command, Commands::Sweep { ref network } if network == "10.0.0.0/24"));
    }

    #[test]
    fn defaults_are_kept_without_flags() {
        let cli = CommandLine::try_parse_from(["ntl-toolbox", "inventory", "hosts.csv"]).unwrap();
        let cfg = cli.to_config();

        assert_eq!(cfg.probe_ports, Config::default().probe_ports);
        assert!(cli.writer(&cfg).is_some());
    }

    #[test]
    fn no_save_disables_the_writer() {
        let cli = CommandLine::try_parse_from(["ntl-toolbox", "ping", "10.0.0.1", "--no-save"]).unwrap();
        assert!(cli.writer(&cli.to_config()).is_none());
    }

    #[test]
    fn multi_word_os_names_are_accepted() {
        let cli = CommandLine::try_parse_from(["ntl-toolbox", "eol", "Windows", "Server"]).unwrap();
        assert!(matches!(cli.command, Commands::Eol { ref os } if os.join(" ") == "Windows Server"));
    }

    #[test]
    fn remote_command_keeps_its_own_flags() {
        let cli = CommandLine::try_parse_from([
            "ntl-toolbox",
            "remote",
            "10.0.0.5",
            "-u",
            "admin",
            "df",
            "-h",
        ])
        .unwrap();

        match cli.command {
            Commands::Remote {
                user,
                port,
                channel,
                command,
                ..
            } => {
                assert_eq!(user, "admin");
                assert_eq!(port, None);
                assert_eq!(channel, Channel::Ssh);
                assert_eq!(command, vec!["df", "-h"]);
            }
            _ => panic!("expected the remote subcommand"),
        }
    }

    #[test]
    fn timeout_outside_the_sub_second_range_is_rejected() {
        for ms in ["0", "1000", "60000"] {
            let parsed = CommandLine::try_parse_from(["ntl-toolbox", "sweep", "10.0.0.0/24", "--timeout-ms", ms]);
            assert!(parsed.is_err(), "--timeout-ms {ms} was accepted");
        }

        let cli =
            CommandLine::try_parse_from(["ntl-toolbox", "sweep", "10.0.0.0/24", "--timeout-ms", "999"])
                .unwrap();
        assert_eq!(cli.to_config().probe_timeout, Duration::from_millis(999));
    }

    #[test]
    fn database_flags_override_the_defaults() {
        let cli = CommandLine::try_parse_from([
            "ntl-toolbox",
            "export",
            "192.168.10.21",
            "orders",
            "--db-port",
            "3307",
            "--db-user",
            "backup",
            "--backup-dir",
            "/srv/backups",
        ])
        .unwrap();
        let cfg = cli.to_config();

        assert_eq!(cfg.database.port, 3307);
        assert_eq!(cfg.database.user, "backup");
        assert_eq!(cfg.database.database, "wms_db");
        assert_eq!(cfg.backup_dir, PathBuf::from("/srv/backups"));
        assert!(matches!(cli.command, Commands::Export { ref table, .. } if table == "orders"));
    }

    #[test]
    fn full_diagnostic_takes_no_arguments() {
        let cli = CommandLine::try_parse_from(["ntl-toolbox", "full-diagnostic"]).unwrap();
        assert!(matches!(cli.command, Commands::FullDiagnostic));
        assert_eq!(cli.to_config().servers.len(), 4);
    }
}
