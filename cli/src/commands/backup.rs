use colored::*;
use ntl_common::config::Config;
use ntl_common::success;
use ntl_core::database::{self, MySqlTarget};
use ntl_core::diagnostic::CheckStatus;
use ntl_core::output::ReportWriter;
use tracing::error;

use crate::commands::persist;
use crate::terminal::{colors, format, print, spinner};

pub async fn backup(host: &str, cfg: &Config, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    let target = MySqlTarget::new(host, &cfg.database);
    spinner::start(format!("Dumping {} from {host}...", target.database.bold()));
    let report = database::dump_database(&target, &cfg.backup_dir).await;
    spinner::stop();

    print::section(&format!("database backup - {}", report.database), cfg.quiet);
    match &report.error {
        Some(e) => error!("Backup of {} failed: {e}", report.database),
        None => {
            let size = report.file_size_bytes.unwrap_or_default() as f64 / (1024.0 * 1024.0);
            print::fields(&[
                ("File", report.backup_file.display().to_string().color(colors::PRIMARY)),
                ("Tables", report.tables_count.unwrap_or_default().to_string().normal()),
                ("Size", format!("{size:.2} MB").normal()),
            ]);
            success!("Backup written to {}", report.backup_file.display());
        }
    }

    persist(writer, &report, &format!("backup_report_{}", report.database))
}

pub async fn export(
    host: &str,
    table: &str,
    cfg: &Config,
    writer: Option<&ReportWriter>,
) -> anyhow::Result<()> {
    let target = MySqlTarget::new(host, &cfg.database);
    spinner::start(format!("Exporting {}...", table.bold()));
    let export = database::export_table_csv(&target, table, &cfg.backup_dir).await;
    spinner::stop();

    print::section(&format!("csv export - {table}"), cfg.quiet);
    match &export.error {
        Some(e) => error!("Export of {table} failed: {e}"),
        None => print::fields(&[
            ("File", export.csv_file.display().to_string().color(colors::PRIMARY)),
            ("Rows", export.rows_count.unwrap_or_default().to_string().normal()),
            ("Columns", export.columns_count.unwrap_or_default().to_string().normal()),
        ]),
    }

    persist(writer, &export, &format!("export_csv_{table}"))
}

pub async fn backup_tables(host: &str, cfg: &Config, writer: Option<&ReportWriter>) -> anyhow::Result<()> {
    let target = MySqlTarget::new(host, &cfg.database);
    spinner::start(format!("Exporting every table of {}...", target.database.bold()));
    let bulk = database::dump_all_tables(&target, &cfg.backup_dir).await;
    spinner::stop();

    print::section(&format!("table exports - {}", bulk.database), cfg.quiet);
    if let Some(e) = &bulk.error {
        error!("Could not export {}: {e}", bulk.database);
    } else {
        if cfg.quiet < 2 {
            let rows: Vec<(&str, String)> = bulk
                .exports
                .iter()
                .map(|export| {
                    let detail = match (&export.error, export.rows_count) {
                        (Some(e), _) => e.clone(),
                        (None, rows) => format!("{} rows", rows.unwrap_or_default()),
                    };
                    (export.table.as_str(), format!("{} {detail}", format::check_status(export.status)))
                })
                .collect();
            print::fields(&rows);
        }
        let summary = format!("{}/{} tables exported", bulk.exported, bulk.tables_count);
        match bulk.status {
            CheckStatus::Ok => success!("{summary}"),
            _ => print::note(summary.color(colors::STATUS_WARN)),
        }
    }

    persist(writer, &bulk, &format!("backup_all_{}", bulk.database))
}
