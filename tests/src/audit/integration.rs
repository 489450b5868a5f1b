use std::fs;
use std::io::Write;

use ntl_common::models::eol::ResolvedStatus;
use ntl_core::audit::AuditService;
use ntl_core::output::ReportWriter;
use serde_json::Value;

use crate::utils::{loopback_config, LoopbackService, LOCALHOST};

#[tokio::test]
async fn full_report_over_loopback_is_saved() {
    let service = LoopbackService::start().await;
    let audit = AuditService::from_config(loopback_config(vec![service.port]));

    let report = audit
        .full_report("127.0.0.0/30", None)
        .await
        .expect("report for a valid block");

    assert_eq!(report.scan_summary.total_scanned, 2);
    assert_eq!(report.scan_summary.hosts_found, 1);
    assert_eq!(report.hosts_analysis[0].address, LOCALHOST);
    assert_eq!(report.hosts_analysis[0].status, ResolvedStatus::Unknown);
    assert_eq!(report.summary.unknown, 1);
    assert!(report.recommendations.is_empty());

    let dir = tempfile::tempdir().expect("temp dir");
    let writer = ReportWriter::new(dir.path());
    let path = writer
        .save(&report, "full_obsolescence_report_127.0.0.0_30")
        .expect("report written");

    let saved: Value = serde_json::from_str(&fs::read_to_string(path).expect("report readable"))
        .expect("valid json");
    assert_eq!(saved["data"]["network"], "127.0.0.0/30");
    assert_eq!(saved["data"]["scan_summary"]["hosts_found"], 1);
    assert_eq!(saved["data"]["hosts_analysis"][0]["ip"], "127.0.0.1");
    assert_eq!(saved["data"]["summary"]["unknown"], 1);
}

#[test]
fn inventory_is_correlated_with_an_override_catalog() {
    let mut catalog = tempfile::NamedTempFile::new().expect("temp catalog");
    write!(
        catalog,
        r#"{{
            "ubuntu": [
                {{"version": "Ubuntu 18.04", "eol_date": "2023-05-31", "status": "obsolete"}},
                {{"version": "Ubuntu 24.04", "eol_date": "2029-04-30", "status": "supported"}}
            ]
        }}"#
    )
    .expect("catalog written");

    let mut inventory = tempfile::NamedTempFile::new().expect("temp inventory");
    writeln!(inventory, "hostname;ip;os;version").expect("header");
    writeln!(inventory, "web01;10.0.0.10;Ubuntu;18.04").expect("row");
    writeln!(inventory, "web02;10.0.0.11;Ubuntu;24.04").expect("row");
    writeln!(inventory, "dc01;10.0.0.2;Windows Server;2019").expect("row");

    let mut cfg = loopback_config(vec![]);
    cfg.eol_file = catalog.path().to_path_buf();
    let audit = AuditService::from_config(cfg);

    let analysis = audit.analyze_inventory(inventory.path()).expect("inventory analysed");

    assert_eq!(analysis.summary.total, 3);
    assert_eq!(analysis.summary.obsolete, 1);
    assert_eq!(analysis.summary.supported, 1);
    // Windows is absent from the override catalog.
    assert_eq!(analysis.summary.unknown, 1);
    assert!(analysis.summary.is_consistent());

    let obsolete: Vec<&str> = analysis.obsolete_systems().map(|r| r.hostname.as_str()).collect();
    assert_eq!(obsolete, vec!["web01"]);
}

#[test]
fn missing_catalog_file_falls_back_to_builtin_data() {
    let mut cfg = loopback_config(vec![]);
    cfg.eol_file = "/nonexistent/eol_database.json".into();
    let audit = AuditService::from_config(cfg);

    let listing = audit.check_eol("Windows Server");
    assert_eq!(listing.versions.len(), 7);
    assert!(listing.error.is_none());
}
