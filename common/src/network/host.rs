use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

/// Ports whose presence suggests a Windows host.
pub const WINDOWS_PORTS: [u16; 2] = [3389, 445];
/// Port whose presence suggests a Linux/Unix host.
pub const SSH_PORT: u16 = 22;

/// Informational OS family inferred from open ports. Not authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OsGuess {
    #[serde(rename = "Windows Server")]
    WindowsServer,
    #[serde(rename = "Linux/Unix")]
    LinuxUnix,
    Unknown,
}

impl OsGuess {
    /// Windows ports take precedence over SSH.
    pub fn from_open_ports(open_ports: &BTreeSet<u16>) -> Self {
        if WINDOWS_PORTS.iter().any(|port| open_ports.contains(port)) {
            OsGuess::WindowsServer
        } else if open_ports.contains(&SSH_PORT) {
            OsGuess::LinuxUnix
        } else {
            OsGuess::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsGuess::WindowsServer => "Windows Server",
            OsGuess::LinuxUnix => "Linux/Unix",
            OsGuess::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OsGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of probing one address.
///
/// A host that is not reachable never carries open ports, a hostname, or an OS guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostProbe {
    pub address: IpAddr,
    pub reachable: bool,
    pub hostname: Option<String>,
    pub open_ports: BTreeSet<u16>,
    pub os_guess: Option<OsGuess>,
}

impl HostProbe {
    pub fn unreachable(address: IpAddr) -> Self {
        Self {
            address,
            reachable: false,
            hostname: None,
            open_ports: BTreeSet::new(),
            os_guess: None,
        }
    }

    /// Builds the result of a probe from the ports that accepted a connection.
    pub fn from_open_ports(address: IpAddr, open_ports: BTreeSet<u16>) -> Self {
        if open_ports.is_empty() {
            return Self::unreachable(address);
        }
        let os_guess = Some(OsGuess::from_open_ports(&open_ports));
        Self {
            address,
            reachable: true,
            hostname: None,
            open_ports,
            os_guess,
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
