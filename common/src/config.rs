use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Ports tried on every address during a sweep.
pub const DEFAULT_PROBE_PORTS: [u16; 6] = [22, 80, 443, 445, 3389, 3306];

pub const DEFAULT_EOL_FILE: &str = "data/eol_database.json";
pub const DEFAULT_OUTPUT_DIR: &str = "output/reports";
pub const DEFAULT_BACKUP_DIR: &str = "output/backups";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// What the full diagnostic checks on a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerRole {
    /// AD/DNS services.
    DomainController,
    /// The MySQL database.
    Database,
    /// Reachability of the SSH service.
    Application,
}

/// One entry of the critical server list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSpec {
    pub name: String,
    pub address: String,
    pub role: ServerRole,
}

impl ServerSpec {
    pub fn new(name: &str, address: &str, role: ServerRole) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            role,
        }
    }
}

/// The NTL critical servers.
pub fn default_servers() -> Vec<ServerSpec> {
    vec![
        ServerSpec::new("DC01", "192.168.10.10", ServerRole::DomainController),
        ServerSpec::new("DC02", "192.168.10.11", ServerRole::DomainController),
        ServerSpec::new("WMS-DB", "192.168.10.21", ServerRole::Database),
        ServerSpec::new("WMS-APP", "192.168.10.22", ServerRole::Application),
    ]
}

/// MySQL connection settings shared by the database diagnostic and the backups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub port: u16,
    pub database: String,
    pub user: String,
    /// `None` connects without a password.
    pub password: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_MYSQL_PORT,
            database: "wms_db".to_string(),
            user: "wms_user".to_string(),
            password: None,
        }
    }
}

/// Settings for one run of the toolbox.
///
/// Built once from the command line and handed to each component by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// Candidate ports for the host prober.
    pub probe_ports: Vec<u16>,
    /// Connect timeout applied to each port individually.
    pub probe_timeout: Duration,
    /// Upper bound on addresses probed at the same time.
    pub workers: usize,
    /// Number of addresses between two progress notifications.
    pub progress_batch: usize,
    /// Skips reverse hostname lookups for reachable hosts.
    pub no_dns: bool,
    /// Optional override for the bundled EOL table.
    pub eol_file: PathBuf,
    /// Where JSON results are written.
    pub output_dir: PathBuf,
    /// Where SQL dumps and CSV exports are written.
    pub backup_dir: PathBuf,
    pub database: DatabaseSettings,
    /// Servers visited by the full diagnostic, in order.
    pub servers: Vec<ServerSpec>,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_ports: DEFAULT_PROBE_PORTS.to_vec(),
            probe_timeout: Duration::from_millis(500),
            workers: 64,
            progress_batch: 10,
            no_dns: false,
            eol_file: PathBuf::from(DEFAULT_EOL_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            database: DatabaseSettings::default(),
            servers: default_servers(),
            quiet: 0,
        }
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

    #[test]
    fn default_probe_timeout_is_sub_second() {
        let cfg = Config::default();
        assert!(cfg.probe_timeout < Duration::from_secs(1));
    }

    #[test]
    fn default_server_list_covers_every_role() {
        let servers = default_servers();
        assert_eq!(servers.len(), 4);
        assert_eq!(servers[0].name, "DC01");
        assert_eq!(servers[2].role, ServerRole::Database);
        assert_eq!(servers[2].address, "192.168.10.21");
        assert!(servers.iter().any(|s| s.role == ServerRole::Application));
    }

    #[test]
    fn default_ports_match_the_sweep_set() {
        let cfg = Config::default();
        assert_eq!(cfg.probe_ports, vec![22, 80, 443, 445, 3389, 3306]);
    }
}
