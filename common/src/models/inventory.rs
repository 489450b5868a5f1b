use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::eol::ResolvedStatus;

/// Placeholder for a column missing from the inventory file.
pub const NOT_AVAILABLE: &str = "N/A";

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// One input row, as read from the inventory CSV or derived from a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    #[serde(default = "not_available")]
    pub hostname: String,
    #[serde(rename = "ip", default = "not_available")]
    pub address: String,
    #[serde(rename = "os", default = "not_available")]
    pub os_name: String,
    #[serde(rename = "version", default = "not_available")]
    pub os_version: String,
}

impl InventoryRow {
    pub fn new(
        hostname: impl Into<String>,
        address: impl Into<String>,
        os_name: impl Into<String>,
        os_version: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
            os_name: os_name.into(),
            os_version: os_version.into(),
        }
    }
}

/// An inventory row joined against the EOL catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    pub hostname: String,
    #[serde(rename = "ip")]
    pub address: String,
    #[serde(rename = "os")]
    pub os_name: String,
    #[serde(rename = "version")]
    pub os_version: String,
    #[serde(rename = "status")]
    pub resolved_status: ResolvedStatus,
    pub eol_date: Option<NaiveDate>,
    pub days_until_eol: Option<i64>,
}

/// Count of records per status. The four buckets always add up to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub total: usize,
    pub supported: usize,
    pub ending_soon: usize,
    pub obsolete: usize,
    pub unknown: usize,
}

impl StatusTally {
    pub fn record(&mut self, status: ResolvedStatus) {
        self.total += 1;
        match status {
            ResolvedStatus::Supported => self.supported += 1,
            ResolvedStatus::EndingSoon => self.ending_soon += 1,
            ResolvedStatus::Obsolete => self.obsolete += 1,
            ResolvedStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.supported + self.ending_soon + self.obsolete + self.unknown
    }
}

impl FromIterator<ResolvedStatus> for StatusTally {
    fn from_iter<I: IntoIterator<Item = ResolvedStatus>>(iter: I) -> Self {
        let mut tally = StatusTally::default();
        for status in iter {
            tally.record(status);
        }
        tally
    }
}

/// Result of correlating a batch of inventory rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_file: Option<String>,
    pub systems: Vec<InventoryRecord>,
    pub summary: StatusTally,
}

impl InventoryAnalysis {
    pub fn obsolete_systems(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.systems
            .iter()
            .filter(|record| record.resolved_status == ResolvedStatus::Obsolete)
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
    fn tally_buckets_sum_to_total() {
        let tally: StatusTally = [
            ResolvedStatus::Obsolete,
            ResolvedStatus::Obsolete,
            ResolvedStatus::Supported,
            ResolvedStatus::Unknown,
            ResolvedStatus::EndingSoon,
        ]
        .into_iter()
        .collect();

        assert_eq!(tally.total, 5);
        assert_eq!(tally.obsolete, 2);
        assert_eq!(tally.supported, 1);
        assert_eq!(tally.ending_soon, 1);
        assert_eq!(tally.unknown, 1);
        assert!(tally.is_consistent());
    }

    #[test]
    fn missing_columns_default_to_not_available() {
        let data = "hostname;os\nsrv1;CentOS\n";
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(data.as_bytes());

        let row: InventoryRow = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(row, InventoryRow::new("srv1", NOT_AVAILABLE, "CentOS", NOT_AVAILABLE));
    }
}
