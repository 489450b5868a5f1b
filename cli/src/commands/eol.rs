use ntl_common::config::Config;
use ntl_common::models::eol::EolListing;
use ntl_core::audit::AuditService;
use ntl_core::output::ReportWriter;
use tracing::warn;

use crate::commands::persist;
use crate::terminal::{format, print};

pub fn eol(os_name: &str, service: &AuditService, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    let listing = service.check_eol(os_name);
    print_listing(&listing, service.config());

    persist(writer, &listing, &format!("eol_check_{}", os_name.replace(' ', "_")))
}

fn print_listing(listing: &EolListing, cfg: &Config) {
    if let Some(error) = &listing.error {
        warn!("{}: {error}", listing.os_name);
        return;
    }

    let family = listing
        .family
        .map(|f| f.to_string())
        .unwrap_or_else(|| listing.os_name.clone());
    print::section(&format!("eol dates - {family}"), cfg.quiet);

    if cfg.quiet > 1 {
        return;
    }
    let rows: Vec<(&str, String)> = listing
        .versions
        .iter()
        .map(|entry| {
            let value = format!(
                "{} ({})",
                format::eol_date(Some(entry.eol_date)),
                format::catalog_status(entry.status)
            );
            (entry.version_label.as_str(), value)
        })
        .collect();
    print::fields(&rows);
}
