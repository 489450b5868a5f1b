use std::path::Path;

use colored::*;
use ntl_common::config::Config;
use ntl_common::models::inventory::InventoryAnalysis;
use ntl_core::audit::AuditService;
use ntl_core::output::ReportWriter;

use crate::commands::persist;
use crate::terminal::{colors, format, print};

pub fn inventory(
    csv_path: &Path,
    service: &AuditService,
    writer: Option<&ReportWriter>,
) -> anyhow::Result<()> {
    let analysis = service.analyze_inventory(csv_path)?;
    print_analysis(&analysis, service.config());

    persist(writer, &analysis, "csv_inventory_analysis")
}

fn print_analysis(analysis: &InventoryAnalysis, cfg: &Config) {
    print::section("inventory analysis", cfg.quiet);

    let summary = &analysis.summary;
    print::fields(&[
        ("Total", summary.total.to_string().normal()),
        ("Supported", summary.supported.to_string().color(colors::STATUS_OK)),
        ("Ending soon", summary.ending_soon.to_string().color(colors::STATUS_WARN)),
        ("Obsolete", summary.obsolete.to_string().color(colors::STATUS_BAD)),
        ("Unknown", summary.unknown.to_string().color(colors::STATUS_UNKNOWN)),
    ]);

    if cfg.quiet > 1 {
        return;
    }

    let obsolete: Vec<_> = analysis.obsolete_systems().collect();
    if obsolete.is_empty() {
        return;
    }

    print::section("obsolete systems", cfg.quiet);
    for (idx, record) in obsolete.iter().enumerate() {
        print::item(idx, &record.hostname);
        print::branch(&[
            ("IP".to_string(), record.address.color(colors::IPV4_ADDR)),
            (
                "OS".to_string(),
                format!("{} {}", record.os_name, record.os_version).color(colors::PRIMARY),
            ),
            ("EOL".to_string(), format::eol_date(record.eol_date)),
            ("Status".to_string(), format::status(record.resolved_status)),
        ]);
    }
}
