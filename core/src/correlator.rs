//! # Inventory Correlator
//!
//! Joins inventory rows against the EOL catalog and tallies the resulting statuses.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Local, NaiveDate};
use ntl_common::error::Result;
use ntl_common::models::eol::ResolvedStatus;
use ntl_common::models::inventory::{InventoryAnalysis, InventoryRecord, InventoryRow, StatusTally};
use tracing::{info, warn};

use crate::catalog::EolCatalog;

pub struct Correlator<'a> {
    catalog: &'a EolCatalog,
}

impl<'a> Correlator<'a> {
    pub fn new(catalog: &'a EolCatalog) -> Self {
        Self { catalog }
    }

    /// Correlates `rows` against today's date.
    pub fn correlate(&self, rows: &[InventoryRow]) -> (Vec<InventoryRecord>, StatusTally) {
        self.correlate_on(rows, Local::now().date_naive())
    }

    /// Correlates `rows`, computing `days_until_eol` relative to `today`.
    ///
    /// Output order matches input order and every row lands in exactly one bucket.
    pub fn correlate_on(
        &self,
        rows: &[InventoryRow],
        today: NaiveDate,
    ) -> (Vec<InventoryRecord>, StatusTally) {
        let records: Vec<InventoryRecord> = rows
            .iter()
            .map(|row| self.resolve(row, today))
            .collect();
        let tally: StatusTally = records.iter().map(|r| r.resolved_status).collect();
        (records, tally)
    }

    fn resolve(&self, row: &InventoryRow, today: NaiveDate) -> InventoryRecord {
        let entry = self.catalog.lookup(&row.os_name, Some(&row.os_version));

        InventoryRecord {
            hostname: row.hostname.clone(),
            address: row.address.clone(),
            os_name: row.os_name.clone(),
            os_version: row.os_version.clone(),
            resolved_status: entry.map_or(ResolvedStatus::Unknown, |e| e.status.into()),
            eol_date: entry.map(|e| e.eol_date),
            days_until_eol: entry.map(|e| e.days_until_eol(today)),
        }
    }

    /// Reads an inventory file and correlates it.
    pub fn analyze_csv(&self, path: &Path) -> Result<InventoryAnalysis> {
        let rows = read_inventory(File::open(path)?)?;
        let (systems, summary) = self.correlate(&rows);

        info!(
            "Inventory {} analysed: {} systems, {} obsolete",
            path.display(),
            summary.total,
            summary.obsolete
        );

        Ok(InventoryAnalysis {
            csv_file: Some(path.display().to_string()),
            systems,
            summary,
        })
    }
}

/// Parses the semicolon-separated inventory format (`hostname;ip;os;version`).
///
/// A header row is required. Missing columns become "N/A"; unreadable rows are skipped
/// with a warning.
pub fn read_inventory<R: Read>(reader: R) -> Result<Vec<InventoryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    rdr.headers()?;

    let mut rows: Vec<InventoryRow> = Vec::new();
    for (line, result) in rdr.deserialize::<InventoryRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Skipping inventory line {}: {e}", line + 2),
        }
    }
    Ok(rows)
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
    use ntl_common::models::inventory::NOT_AVAILABLE;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_rows() -> Vec<InventoryRow> {
        vec![
            InventoryRow::new("srv1", "10.0.0.1", "CentOS", "7"),
            InventoryRow::new("srv2", "10.0.0.2", "Ubuntu", "20.04"),
            InventoryRow::new("srv3", "10.0.0.3", "Windows Server", "2022"),
            InventoryRow::new("srv4", "10.0.0.4", "FreeBSD", "14"),
            InventoryRow::new("srv5", "10.0.0.5", "Debian", "9"),
        ]
    }

    #[test]
    fn centos_7_is_obsolete() {
        let catalog = EolCatalog::builtin();
        let correlator = Correlator::new(&catalog);
        let rows = vec![InventoryRow::new("srv1", NOT_AVAILABLE, "CentOS", "7")];

        let (records, tally) = correlator.correlate_on(&rows, date(2024, 6, 1));

        assert_eq!(records[0].resolved_status, ResolvedStatus::Obsolete);
        assert_eq!(records[0].eol_date, Some(date(2024, 6, 30)));
        assert_eq!(records[0].days_until_eol, Some(29));
        assert_eq!(tally.obsolete, 1);
    }

    #[test]
    fn statuses_partition_the_input() {
        let catalog = EolCatalog::builtin();
        let correlator = Correlator::new(&catalog);

        let (records, tally) = correlator.correlate_on(&sample_rows(), date(2025, 1, 1));

        assert_eq!(records.len(), 5);
        assert_eq!(tally.total, 5);
        assert_eq!(tally.obsolete, 2);
        assert_eq!(tally.ending_soon, 1);
        assert_eq!(tally.supported, 1);
        assert_eq!(tally.unknown, 1);
        assert!(tally.is_consistent());
    }

    #[test]
    fn unknown_rows_have_no_dates() {
        let catalog = EolCatalog::builtin();
        let correlator = Correlator::new(&catalog);
        let rows = vec![InventoryRow::new("box", "10.0.0.9", "FreeBSD", "14")];

        let (records, _) = correlator.correlate_on(&rows, date(2025, 1, 1));

        assert_eq!(records[0].resolved_status, ResolvedStatus::Unknown);
        assert!(records[0].eol_date.is_none());
        assert!(records[0].days_until_eol.is_none());
    }

    #[test]
    fn past_eol_dates_give_negative_days() {
        let catalog = EolCatalog::builtin();
        let correlator = Correlator::new(&catalog);
        let rows = vec![InventoryRow::new("old", "10.0.0.8", "Debian", "9")];

        let (records, _) = correlator.correlate_on(&rows, date(2022, 7, 10));
        assert_eq!(records[0].days_until_eol, Some(-10));
    }

    #[test]
    fn correlation_is_idempotent() {
        let catalog = EolCatalog::builtin();
        let correlator = Correlator::new(&catalog);
        let rows = sample_rows();
        let today = date(2025, 3, 3);

        assert_eq!(correlator.correlate_on(&rows, today), correlator.correlate_on(&rows, today));
    }

    #[test]
    fn reads_semicolon_inventory_with_missing_columns() {
        let data = "hostname;ip;os\nsrv1;10.0.0.1;CentOS\nsrv2;10.0.0.2;Ubuntu\n";
        let rows = read_inventory(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hostname, "srv1");
        assert_eq!(rows[0].os_version, NOT_AVAILABLE);
        assert_eq!(rows[1].address, "10.0.0.2");
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let data = "Hostname;IP;OS;Version\nsrv1;10.0.0.1;CentOS;7\n";
        let rows = read_inventory(data.as_bytes()).unwrap();

        assert_eq!(
            rows[0],
            InventoryRow::new(NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE)
        );
    }

    #[test]
    fn analyze_csv_reports_obsolete_systems() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hostname;ip;os;version").unwrap();
        writeln!(file, "srv1;10.0.0.1;CentOS;7").unwrap();
        writeln!(file, "srv2;10.0.0.2;Windows Server;2019").unwrap();

        let catalog = EolCatalog::builtin();
        let analysis = Correlator::new(&catalog).analyze_csv(file.path()).unwrap();

        assert_eq!(analysis.summary.total, 2);
        let obsolete: Vec<&str> = analysis.obsolete_systems().map(|r| r.hostname.as_str()).collect();
        assert_eq!(obsolete, vec!["srv1"]);
    }

    #[test]
    fn missing_inventory_file_is_an_io_error() {
        let catalog = EolCatalog::builtin();
        let result = Correlator::new(&catalog).analyze_csv(Path::new("/nonexistent/inventory.csv"));
        assert!(matches!(result, Err(ntl_common::error::AuditError::Io(_))));
    }
}
