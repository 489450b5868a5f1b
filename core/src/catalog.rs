//! # EOL Catalog
//!
//! Static mapping from OS family to its ordered list of versions, end-of-life dates,
//! and support status.
//!
//! The catalog is loaded once per run, either from a JSON override file or from the
//! built-in table, and never mutated afterwards. Lookups are pure.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use ntl_common::error::{AuditError, Result};
use ntl_common::models::eol::{EolEntry, EolListing, EolStatus, OsFamily};
use serde::Deserialize;
use tracing::{debug, info, warn};

type BuiltinRow = (OsFamily, &'static str, (i32, u32, u32), EolStatus);

const BUILTIN: &[BuiltinRow] = &[
    (OsFamily::WindowsServer, "Windows Server 2008", (2020, 1, 14), EolStatus::Obsolete),
    (OsFamily::WindowsServer, "Windows Server 2008 R2", (2020, 1, 14), EolStatus::Obsolete),
    (OsFamily::WindowsServer, "Windows Server 2012", (2023, 10, 10), EolStatus::Obsolete),
    (OsFamily::WindowsServer, "Windows Server 2012 R2", (2023, 10, 10), EolStatus::Obsolete),
    (OsFamily::WindowsServer, "Windows Server 2016", (2027, 1, 12), EolStatus::Supported),
    (OsFamily::WindowsServer, "Windows Server 2019", (2029, 1, 9), EolStatus::Supported),
    (OsFamily::WindowsServer, "Windows Server 2022", (2031, 10, 14), EolStatus::Supported),
    (OsFamily::Ubuntu, "Ubuntu 16.04 LTS", (2021, 4, 30), EolStatus::Obsolete),
    (OsFamily::Ubuntu, "Ubuntu 18.04 LTS", (2023, 5, 31), EolStatus::Obsolete),
    (OsFamily::Ubuntu, "Ubuntu 20.04 LTS", (2025, 4, 30), EolStatus::EndingSoon),
    (OsFamily::Ubuntu, "Ubuntu 22.04 LTS", (2027, 4, 30), EolStatus::Supported),
    (OsFamily::Ubuntu, "Ubuntu 24.04 LTS", (2029, 4, 30), EolStatus::Supported),
    (OsFamily::CentOS, "CentOS 6", (2020, 11, 30), EolStatus::Obsolete),
    (OsFamily::CentOS, "CentOS 7", (2024, 6, 30), EolStatus::Obsolete),
    (OsFamily::CentOS, "CentOS 8", (2021, 12, 31), EolStatus::Obsolete),
    (OsFamily::Debian, "Debian 9", (2022, 6, 30), EolStatus::Obsolete),
    (OsFamily::Debian, "Debian 10", (2024, 6, 30), EolStatus::Obsolete),
    (OsFamily::Debian, "Debian 11", (2026, 6, 30), EolStatus::Supported),
    (OsFamily::Debian, "Debian 12", (2028, 6, 30), EolStatus::Supported),
];

/// Shape of one entry in the JSON catalog file.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    version: String,
    eol_date: NaiveDate,
    status: EolStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EolCatalog {
    entries: BTreeMap<OsFamily, Vec<EolEntry>>,
}

impl Default for EolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EolCatalog {
    /// The table bundled with the binary.
    pub fn builtin() -> Self {
        let mut entries: BTreeMap<OsFamily, Vec<EolEntry>> = BTreeMap::new();
        for (family, label, (y, m, d), status) in BUILTIN {
            if let Some(eol_date) = NaiveDate::from_ymd_opt(*y, *m, *d) {
                entries.entry(*family).or_default().push(EolEntry {
                    family: *family,
                    version_label: label.to_string(),
                    eol_date,
                    status: *status,
                });
            }
        }
        Self { entries }
    }

    /// Loads the override file, falling back to [`EolCatalog::builtin`] on any failure.
    ///
    /// A missing or malformed file is not fatal; it is logged and the tool keeps working
    /// offline with the bundled dates.
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(catalog) => {
                info!("Loaded EOL catalog from {}", path.display());
                catalog
            }
            Err(e) => {
                warn!("{e}, using built-in EOL data");
                Self::builtin()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AuditError::CatalogLoad(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parses a document of the form `{"<family key>": [{version, eol_date, status}, ...]}`.
    ///
    /// Unknown family keys are skipped. Entry order inside a family is preserved.
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: HashMap<String, Vec<CatalogRow>> =
            serde_json::from_str(raw).map_err(|e| AuditError::CatalogLoad(e.to_string()))?;

        let mut entries: BTreeMap<OsFamily, Vec<EolEntry>> = BTreeMap::new();
        for (key, rows) in document {
            let Some(family) = OsFamily::from_key(&key) else {
                debug!("Ignoring unknown EOL family '{key}'");
                continue;
            };
            let family_entries = rows
                .into_iter()
                .map(|row| EolEntry {
                    family,
                    version_label: row.version,
                    eol_date: row.eol_date,
                    status: row.status,
                })
                .collect();
            entries.insert(family, family_entries);
        }

        Ok(Self { entries })
    }

    /// Entries for `family`, in catalog order. Empty when the family is absent.
    pub fn entries(&self, family: OsFamily) -> &[EolEntry] {
        self.entries.get(&family).map(Vec::as_slice).unwrap_or_default()
    }

    /// Matches free text against the catalog. `None` means the status is unknown.
    ///
    /// * With a version hint, the first entry of the family whose label contains the
    ///   hint (case-insensitive) wins.
    /// * Without one, an entry whose full label appears in `family_hint` is preferred
    ///   (longest label first, so "2012 R2" beats "2012"). Failing that, the last
    ///   supported entry of the family is returned as the upgrade target.
    pub fn lookup(&self, family_hint: &str, version_hint: Option<&str>) -> Option<&EolEntry> {
        let family = OsFamily::detect(family_hint)?;
        let entries = self.entries(family);

        match version_hint.map(str::trim).filter(|v| !v.is_empty()) {
            Some(version) => {
                let version = version.to_lowercase();
                entries
                    .iter()
                    .find(|entry| entry.version_label.to_lowercase().contains(&version))
            }
            None => {
                let hint = family_hint.to_lowercase();
                entries
                    .iter()
                    .filter(|entry| hint.contains(&entry.version_label.to_lowercase()))
                    .max_by_key(|entry| entry.version_label.len())
                    .or_else(|| self.latest_supported(family))
            }
        }
    }

    /// The last supported entry of `family`, used as the recommended upgrade target.
    pub fn latest_supported(&self, family: OsFamily) -> Option<&EolEntry> {
        self.entries(family)
            .iter()
            .rev()
            .find(|entry| entry.status == EolStatus::Supported)
    }

    /// Every version known for the family named in `os_name`.
    pub fn versions(&self, os_name: &str) -> EolListing {
        let family = OsFamily::detect(os_name).filter(|f| self.entries.contains_key(f));
        let versions = family.map(|f| self.entries(f).to_vec()).unwrap_or_default();
        let error = family
            .is_none()
            .then(|| "OS not found in the EOL catalog".to_string());

        EolListing {
            os_name: os_name.to_string(),
            family,
            versions,
            error,
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
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn named_version_without_hint_matches_that_entry() {
        let catalog = EolCatalog::builtin();
        let entry = catalog.lookup("Windows Server 2012", None).unwrap();

        assert_eq!(entry.version_label, "Windows Server 2012");
        assert_eq!(entry.status, EolStatus::Obsolete);
        assert_eq!(entry.eol_date, date(2023, 10, 10));
    }

    #[test]
    fn longest_named_version_wins() {
        let catalog = EolCatalog::builtin();
        let entry = catalog.lookup("windows server 2012 r2 datacenter", None).unwrap();
        assert_eq!(entry.version_label, "Windows Server 2012 R2");
    }

    #[test]
    fn bare_family_returns_latest_supported() {
        let catalog = EolCatalog::builtin();
        let entry = catalog.lookup("Ubuntu", None).unwrap();

        assert_eq!(entry.version_label, "Ubuntu 24.04 LTS");
        assert_eq!(entry.eol_date, date(2029, 4, 30));
    }

    #[test]
    fn version_hint_is_a_first_hit_substring_match() {
        let catalog = EolCatalog::builtin();

        let centos = catalog.lookup("CentOS", Some("7")).unwrap();
        assert_eq!(centos.version_label, "CentOS 7");
        assert_eq!(centos.status, EolStatus::Obsolete);
        assert_eq!(centos.eol_date, date(2024, 6, 30));

        // "2012" hits the plain 2012 entry before the R2 one.
        let windows = catalog.lookup("windows", Some("2012")).unwrap();
        assert_eq!(windows.version_label, "Windows Server 2012");
    }

    #[test]
    fn unmatched_inputs_are_unknown() {
        let catalog = EolCatalog::builtin();

        assert!(catalog.lookup("Solaris", Some("11")).is_none());
        assert!(catalog.lookup("Debian", Some("N/A")).is_none());
        assert!(catalog.lookup("Linux/Unix", None).is_none());
        assert!(catalog.lookup("", None).is_none());
    }

    #[test]
    fn family_without_supported_entries_has_no_target() {
        let catalog = EolCatalog::builtin();
        assert!(catalog.lookup("CentOS", None).is_none());
    }

    #[test]
    fn blank_version_hint_behaves_like_none() {
        let catalog = EolCatalog::builtin();
        assert_eq!(catalog.lookup("Debian", Some("  ")), catalog.lookup("Debian", None));
    }

    #[test]
    fn lookup_is_deterministic() {
        let catalog = EolCatalog::builtin();
        for (family, version) in [("Ubuntu", Some("20.04")), ("Windows", None), ("Debian", Some("9"))] {
            assert_eq!(catalog.lookup(family, version), catalog.lookup(family, version));
        }
    }

    #[test]
    fn json_document_preserves_order_and_skips_unknown_families() {
        let raw = r#"{
            "debian": [
                {"version": "Debian 12", "eol_date": "2028-06-30", "status": "supported"},
                {"version": "Debian 13", "eol_date": "2030-06-30", "status": "supported"}
            ],
            "freebsd": [
                {"version": "FreeBSD 14", "eol_date": "2028-11-30", "status": "supported"}
            ]
        }"#;
        let catalog = EolCatalog::from_json(raw).unwrap();

        let labels: Vec<&str> = catalog
            .entries(OsFamily::Debian)
            .iter()
            .map(|e| e.version_label.as_str())
            .collect();
        assert_eq!(labels, vec!["Debian 12", "Debian 13"]);
        assert!(catalog.entries(OsFamily::Ubuntu).is_empty());
        assert_eq!(catalog.lookup("debian", None).unwrap().version_label, "Debian 13");
    }

    #[test]
    fn malformed_json_is_a_catalog_load_error() {
        let result = EolCatalog::from_json("{ not json");
        assert!(matches!(result, Err(AuditError::CatalogLoad(_))));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = EolCatalog::load(&dir.path().join("absent.json"));
        assert_eq!(catalog, EolCatalog::builtin());
    }

    #[test]
    fn override_file_is_used_when_present() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ubuntu": [{{"version": "Ubuntu 26.04 LTS", "eol_date": "2031-04-30", "status": "supported"}}]}}"#
        )
        .unwrap();

        let catalog = EolCatalog::load(file.path());
        assert_eq!(catalog.lookup("ubuntu", None).unwrap().version_label, "Ubuntu 26.04 LTS");
        assert!(catalog.lookup("centos", Some("7")).is_none());
    }

    #[test]
    fn versions_lists_the_whole_family() {
        let catalog = EolCatalog::builtin();

        let listing = catalog.versions("CentOS Stream");
        assert_eq!(listing.family, Some(OsFamily::CentOS));
        assert_eq!(listing.versions.len(), 3);
        assert!(listing.error.is_none());

        let missing = catalog.versions("AIX");
        assert!(missing.versions.is_empty());
        assert!(missing.error.is_some());
    }

    #[test]
    fn bundled_data_file_matches_builtin_table() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../data/eol_database.json");
        let catalog = EolCatalog::from_file(&path).unwrap();
        assert_eq!(catalog, EolCatalog::builtin());
    }
}
