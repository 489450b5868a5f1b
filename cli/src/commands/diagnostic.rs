use colored::*;
use ntl_common::config::Config;
use ntl_common::success;
use ntl_core::database::{self, MySqlReport, MySqlTarget};
use ntl_core::diagnostic::full::{self, FullDiagnostic, ServerCheck};
use ntl_core::diagnostic::{self, AdDnsReport, CheckResult, PingReport};
use ntl_core::output::ReportWriter;

use crate::commands::persist;
use crate::terminal::{colors, format, print, spinner};

pub async fn ping(host: &str, cfg: &Config, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    spinner::start(format!("Pinging {host}..."));
    let report: PingReport = diagnostic::ping_report(host).await;
    spinner::stop();

    print::section("ping test", cfg.quiet);
    print::fields(&[(host, check_line(&report.test_result))]);

    persist(writer, &report, &format!("ping_test_{}", host.replace('.', "_")))
}

fn check_line(check: &CheckResult) -> String {
    let port = check.port.map(|p| format!(" (port {p})")).unwrap_or_default();
    format!("{} {}{port}", format::check_status(check.status), check.message)
}

fn print_tests<'a>(tests: impl IntoIterator<Item = (&'a &'static str, &'a CheckResult)>) {
    let rows: Vec<(&str, String)> = tests
        .into_iter()
        .map(|(name, check)| (*name, check_line(check)))
        .collect();
    print::fields(&rows);
}

pub async fn ad_dns(server: &str, cfg: &Config, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    spinner::start(format!("Checking AD/DNS services on {server}..."));
    let report: AdDnsReport = diagnostic::check_ad_dns(server).await;
    spinner::stop();

    print::section(&format!("ad/dns diagnostic - {server}"), cfg.quiet);
    print_tests(&report.tests);
    print::note(format!("Global status: {}", format::check_status(report.global_status)));

    persist(writer, &report, &format!("diagnostic_ad_dns_{server}"))
}

pub async fn mysql(host: &str, cfg: &Config, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    let target = MySqlTarget::new(host, &cfg.database);
    spinner::start(format!("Checking MySQL on {host}:{}...", target.port));
    let report: MySqlReport = database::check_mysql(&target).await;
    spinner::stop();

    print::section(&format!("mysql diagnostic - {host}"), cfg.quiet);
    print_tests(&report.tests);
    print::note(format!("Global status: {}", format::check_status(report.global_status)));

    persist(writer, &report, &format!("diagnostic_mysql_{host}"))
}

pub async fn full_diagnostic(cfg: &Config, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    spinner::start(format!("Diagnosing {} servers...", cfg.servers.len()));
    let diagnostic = full::run_full_diagnostic(cfg).await;
    spinner::stop();

    print_full(&diagnostic, cfg);
    persist(writer, &diagnostic, "diagnostic_full")
}

fn print_full(diagnostic: &FullDiagnostic, cfg: &Config) {
    print::section("full diagnostic - ntl infrastructure", cfg.quiet);

    if cfg.quiet < 2 {
        for (idx, entry) in diagnostic.results.iter().enumerate() {
            print::item(idx, &format!("{} ({})", entry.name, entry.address));
            let mut rows = vec![
                ("Check".to_string(), entry.check_type.color(colors::ACCENT)),
                ("Status".to_string(), format::check_status(entry.result.global_status())),
            ];
            if let ServerCheck::MySql(MySqlReport {
                version: Some(version),
                ..
            }) = &entry.result
            {
                rows.push(("Version".to_string(), version.as_str().color(colors::PRIMARY)));
            }
            print::branch(&rows);
        }
        print::blank();
    }

    print::fields(&[
        ("Checks", diagnostic.total.to_string().normal()),
        ("OK", diagnostic.ok_count.to_string().color(colors::STATUS_OK)),
        ("Alerts", diagnostic.alert_count.to_string().color(colors::STATUS_WARN)),
    ]);
    if diagnostic.alert_count == 0 {
        success!("All {} checks passed", diagnostic.total);
    }
}
