use std::fmt;
use std::net::IpAddr;

use chrono::NaiveDate;
use serde::Serialize;

use super::eol::ResolvedStatus;
use super::inventory::StatusTally;
use crate::network::host::{HostProbe, OsGuess};
use crate::network::range::CidrBlock;

/// Outcome of one sweep. `hosts` holds reachable hosts only, in ascending address order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepResult {
    pub network: CidrBlock,
    #[serde(rename = "total_scanned")]
    pub scanned_count: u64,
    #[serde(rename = "hosts_found")]
    pub found_count: usize,
    pub hosts: Vec<HostProbe>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub total_scanned: u64,
    pub hosts_found: usize,
}

impl From<&SweepResult> for SweepSummary {
    fn from(sweep: &SweepResult) -> Self {
        Self {
            total_scanned: sweep.scanned_count,
            hosts_found: sweep.found_count,
        }
    }
}

/// EOL view of one discovered host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAnalysis {
    #[serde(rename = "ip")]
    pub address: IpAddr,
    pub hostname: Option<String>,
    pub os_guess: Option<OsGuess>,
    pub status: ResolvedStatus,
    pub eol_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => f.write_str("HIGH"),
            Priority::Medium => f.write_str("MEDIUM"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

/// Sweep and catalog analysis merged into one document. Written once per audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub network: CidrBlock,
    pub scan_summary: SweepSummary,
    pub hosts_analysis: Vec<HostAnalysis>,
    pub summary: StatusTally,
    pub recommendations: Vec<Recommendation>,
}
