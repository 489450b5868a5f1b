use colored::*;
use ntl_common::config::Config;
use ntl_common::models::report::{AuditReport, Priority};
use ntl_core::audit::AuditService;
use ntl_core::output::ReportWriter;
use ntl_core::scanner::SweepProgress;

use crate::commands::persist;
use crate::terminal::{colors, format, print, spinner};

pub async fn report(
    network: &str,
    service: &AuditService,
    writer: Option<&ReportWriter>,
) -> anyhow::Result<()> {
    spinner::start(format!("Sweeping {}...", network.bold()));
    let hook = |progress: SweepProgress| spinner::report_sweep_progress(progress);
    let audit = service.full_report(network, Some(&hook)).await;
    spinner::stop();
    let audit = audit?;

    print_report(&audit, service.config());

    let prefix = format!(
        "full_obsolescence_report_{}",
        audit.network.to_string().replace('/', "_")
    );
    persist(writer, &audit, &prefix)
}

fn print_report(audit: &AuditReport, cfg: &Config) {
    print::section(&format!("obsolescence report - {}", audit.network), cfg.quiet);

    if cfg.quiet < 2 {
        for (idx, host) in audit.hosts_analysis.iter().enumerate() {
            print::item(idx, host.hostname.as_deref().unwrap_or("No hostname"));
            let mut details = vec![
                format::address_to_detail(&host.address),
                format::os_to_detail(host.os_guess),
                ("Status".to_string(), format::status(host.status)),
                ("EOL".to_string(), format::eol_date(host.eol_date)),
            ];
            if let Some(target) = &host.recommended_version {
                details.push(("Target".to_string(), target.as_str().color(colors::ACCENT)));
            }
            print::branch(&details);
        }
        print::blank();
    }

    print::fields(&[
        ("Scanned", audit.scan_summary.total_scanned.to_string().normal()),
        ("Hosts found", audit.scan_summary.hosts_found.to_string().normal()),
        ("Obsolete", audit.summary.obsolete.to_string().color(colors::STATUS_BAD)),
        ("Ending soon", audit.summary.ending_soon.to_string().color(colors::STATUS_WARN)),
        ("Unknown", audit.summary.unknown.to_string().color(colors::STATUS_UNKNOWN)),
    ]);

    for rec in &audit.recommendations {
        let priority = match rec.priority {
            Priority::High => rec.priority.to_string().red().bold(),
            Priority::Medium => rec.priority.to_string().yellow().bold(),
        };
        print::note(format!("[{priority}] {}", rec.message));
    }
}
