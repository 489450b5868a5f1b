use std::time::{Duration, Instant};

use colored::*;
use ntl_common::config::Config;
use ntl_common::models::report::SweepResult;
use ntl_common::success;
use ntl_core::audit::AuditService;
use ntl_core::output::ReportWriter;
use ntl_core::scanner::SweepProgress;

use crate::commands::persist;
use crate::terminal::{colors, format, print, spinner};

pub async fn sweep(
    network: &str,
    service: &AuditService,
    writer: Option<&ReportWriter>,
) -> anyhow::Result<()> {
    let cfg = service.config();
    let start_time = Instant::now();

    spinner::start(format!("Sweeping {}...", network.bold()));
    let hook = |progress: SweepProgress| spinner::report_sweep_progress(progress);
    let result = service.scan_network(network, Some(&hook)).await;
    spinner::stop();
    let result = result?;

    sweep_ends(&result, start_time.elapsed(), cfg);

    let prefix = format!("network_scan_{}", result.network.to_string().replace('/', "_"));
    persist(writer, &result, &prefix)
}

fn sweep_ends(result: &SweepResult, total_time: Duration, cfg: &Config) {
    if result.hosts.is_empty() {
        print::section("zero hosts detected", cfg.quiet);
        if cfg.quiet == 0 {
            print::nothing_found(&format!("no host answered in {}", result.network));
        }
        return;
    }

    print::section("network sweep", cfg.quiet);
    if cfg.quiet < 2 {
        for (idx, host) in result.hosts.iter().enumerate() {
            print::item(idx, host.hostname.as_deref().unwrap_or("No hostname"));
            print::branch(&format::host_details(host));
        }
    }
    print_summary(result, total_time, cfg);
}

fn print_summary(result: &SweepResult, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{} active hosts", result.found_count).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString = format!(
        "Sweep complete: {active_hosts} out of {} in {total_time}",
        result.scanned_count
    )
    .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::rule();
            print::centered(&output.to_string());
        }
        _ => success!("{}", output),
    }
}
