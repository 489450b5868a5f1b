//! # End-of-Life Model
//!
//! Vocabulary shared by the EOL catalog and everything that consumes its answers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OS families tracked by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    #[serde(rename = "windows_server")]
    WindowsServer,
    #[serde(rename = "ubuntu")]
    Ubuntu,
    #[serde(rename = "centos")]
    CentOS,
    #[serde(rename = "debian")]
    Debian,
}

/// Keyword table for free-text family detection, evaluated in order, first match wins.
///
/// This is a heuristic: "Windows 10" lands in `WindowsServer` just like a real server does.
pub const FAMILY_KEYWORDS: [(&str, OsFamily); 4] = [
    ("windows", OsFamily::WindowsServer),
    ("ubuntu", OsFamily::Ubuntu),
    ("centos", OsFamily::CentOS),
    ("debian", OsFamily::Debian),
];

impl OsFamily {
    /// Case-insensitive substring detection over [`FAMILY_KEYWORDS`].
    pub fn detect(hint: &str) -> Option<Self> {
        let hint = hint.to_lowercase();
        FAMILY_KEYWORDS
            .iter()
            .find(|(keyword, _)| hint.contains(keyword))
            .map(|(_, family)| *family)
    }

    /// Key used in the JSON catalog file.
    pub fn key(&self) -> &'static str {
        match self {
            OsFamily::WindowsServer => "windows_server",
            OsFamily::Ubuntu => "ubuntu",
            OsFamily::CentOS => "centos",
            OsFamily::Debian => "debian",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FAMILY_KEYWORDS
            .iter()
            .map(|(_, family)| *family)
            .find(|family| family.key() == key)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::WindowsServer => "Windows Server",
            OsFamily::Ubuntu => "Ubuntu",
            OsFamily::CentOS => "CentOS",
            OsFamily::Debian => "Debian",
        };
        f.write_str(name)
    }
}

/// Support status recorded in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EolStatus {
    Supported,
    EndingSoon,
    Obsolete,
}

/// Status assigned to a system after matching it against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedStatus {
    Supported,
    EndingSoon,
    Obsolete,
    /// No catalog entry matched.
    Unknown,
}

impl From<EolStatus> for ResolvedStatus {
    fn from(status: EolStatus) -> Self {
        match status {
            EolStatus::Supported => ResolvedStatus::Supported,
            EolStatus::EndingSoon => ResolvedStatus::EndingSoon,
            EolStatus::Obsolete => ResolvedStatus::Obsolete,
        }
    }
}

impl fmt::Display for ResolvedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolvedStatus::Supported => "supported",
            ResolvedStatus::EndingSoon => "ending_soon",
            ResolvedStatus::Obsolete => "obsolete",
            ResolvedStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One row of the catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EolEntry {
    pub family: OsFamily,
    #[serde(rename = "version")]
    pub version_label: String,
    pub eol_date: NaiveDate,
    pub status: EolStatus,
}

impl EolEntry {
    /// Signed day count from `today` to the EOL date; negative once the date has passed.
    pub fn days_until_eol(&self, today: NaiveDate) -> i64 {
        (self.eol_date - today).num_days()
    }
}

/// Every catalog version known for the family named in `os_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EolListing {
    pub os_name: String,
    pub family: Option<OsFamily>,
    pub versions: Vec<EolEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
