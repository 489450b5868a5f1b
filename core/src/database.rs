//! # MySQL Checks and Backups
//!
//! Health check of the WMS database plus three ways of saving its content: a full SQL
//! dump, a CSV export of one table, and a CSV export of every table.
//!
//! Queries go through the text protocol, so every non-NULL cell arrives as text (or raw
//! bytes for binary columns) and is written back out without re-encoding.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use ntl_common::config::DatabaseSettings;
use ntl_common::error::{AuditError, Result};
use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::diagnostic::{CheckResult, CheckStatus, overall_status};
use crate::output::sanitize;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Round trips slower than this are reported as WARNING.
pub const RESPONSE_WARNING: Duration = Duration::from_millis(100);

/// Column types whose values are written unquoted.
const NUMERIC_TYPES: [&str; 12] = [
    "TINYINT", "SMALLINT", "MEDIUMINT", "INT", "BIGINT", "DECIMAL", "FLOAT", "DOUBLE", "YEAR",
    "BOOLEAN", "BIT", "NUMERIC",
];

fn db_error(e: sqlx::Error) -> AuditError {
    AuditError::Database(e.to_string())
}

/// One MySQL server and the credentials to reach a database on it.
#[derive(Debug, Clone)]
pub struct MySqlTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    password: Option<String>,
}

impl MySqlTarget {
    pub fn new(host: impl Into<String>, settings: &DatabaseSettings) -> Self {
        Self {
            host: host.into(),
            port: settings.port,
            database: settings.database.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
        }
    }

    fn options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    async fn connect(&self) -> Result<MySqlConnection> {
        debug!("Connecting to {}@{}:{}/{}", self.user, self.host, self.port, self.database);
        match timeout(CONNECT_TIMEOUT, self.options().connect()).await {
            Ok(conn) => conn.map_err(db_error),
            Err(_elapsed) => Err(AuditError::Database(format!(
                "connection to {}:{} timed out after {}s",
                self.host,
                self.port,
                CONNECT_TIMEOUT.as_secs()
            ))),
        }
    }
}

async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        debug!("Closing MySQL connection failed: {e}");
    }
}

/// One cell read from a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Number(String),
    Text(String),
    /// Binary column content that is not valid UTF-8.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// The value as it appears in an `INSERT` statement.
    pub fn literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Number(n) => n.clone(),
            SqlValue::Text(text) => {
                let mut out = String::with_capacity(text.len() + 2);
                out.push('\'');
                for c in text.chars() {
                    match c {
                        '\'' => out.push_str("''"),
                        '\\' => out.push_str("\\\\"),
                        '\0' => out.push_str("\\0"),
                        c => out.push(c),
                    }
                }
                out.push('\'');
                out
            }
            SqlValue::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// NULL becomes an empty field.
    fn csv_field(&self) -> &[u8] {
        match self {
            SqlValue::Null => b"",
            SqlValue::Number(s) | SqlValue::Text(s) => s.as_bytes(),
            SqlValue::Bytes(bytes) => bytes,
        }
    }
}

/// `` `name` `` with embedded backticks doubled.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn is_numeric(type_name: &str) -> bool {
    let base = type_name.split_whitespace().next().unwrap_or_default();
    NUMERIC_TYPES.contains(&base)
}

fn cell(row: &MySqlRow, idx: usize) -> Result<SqlValue> {
    let raw = row.try_get_raw(idx).map_err(db_error)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let numeric = is_numeric(row.columns()[idx].type_info().name());

    match row.try_get_unchecked::<String, _>(idx) {
        Ok(text) if numeric => Ok(SqlValue::Number(text)),
        Ok(text) => Ok(SqlValue::Text(text)),
        Err(_) => row
            .try_get_unchecked::<Vec<u8>, _>(idx)
            .map(SqlValue::Bytes)
            .map_err(db_error),
    }
}

fn first_text(row: &MySqlRow, idx: usize) -> Result<String> {
    match cell(row, idx)? {
        SqlValue::Null => Ok(String::new()),
        SqlValue::Number(s) | SqlValue::Text(s) => Ok(s),
        SqlValue::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

async fn fetch(conn: &mut MySqlConnection, sql: &str) -> Result<Vec<MySqlRow>> {
    sqlx::raw_sql(sql).fetch_all(&mut *conn).await.map_err(db_error)
}

async fn list_tables(conn: &mut MySqlConnection) -> Result<Vec<String>> {
    fetch(conn, "SHOW TABLES")
        .await?
        .iter()
        .map(|row| first_text(row, 0))
        .collect()
}

/// A table's definition and content.
#[derive(Debug, Clone, Default)]
pub struct TableDump {
    pub name: String,
    /// `SHOW CREATE TABLE` output, empty when only the rows were read.
    pub create_statement: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

async fn read_rows(conn: &mut MySqlConnection, table: &str) -> Result<TableDump> {
    let ident = quote_ident(table);
    let columns = fetch(conn, &format!("DESCRIBE {ident}"))
        .await?
        .iter()
        .map(|row| first_text(row, 0))
        .collect::<Result<Vec<_>>>()?;

    let rows = fetch(conn, &format!("SELECT * FROM {ident}"))
        .await?
        .iter()
        .map(|row| (0..row.len()).map(|idx| cell(row, idx)).collect())
        .collect::<Result<Vec<Vec<SqlValue>>>>()?;

    Ok(TableDump {
        name: table.to_string(),
        create_statement: String::new(),
        columns,
        rows,
    })
}

async fn read_table(conn: &mut MySqlConnection, table: &str) -> Result<TableDump> {
    let create = fetch(conn, &format!("SHOW CREATE TABLE {}", quote_ident(table))).await?;
    let create_statement = match create.first() {
        Some(row) => first_text(row, 1)?,
        None => return Err(AuditError::Database(format!("no definition returned for {table}"))),
    };

    let mut dump = read_rows(conn, table).await?;
    dump.create_statement = create_statement;
    Ok(dump)
}

#[derive(Debug, Clone, Serialize)]
pub struct MySqlReport {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub tests: BTreeMap<&'static str, CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_count: Option<usize>,
    pub global_status: CheckStatus,
}

pub fn response_status(elapsed: Duration) -> CheckStatus {
    if elapsed < RESPONSE_WARNING {
        CheckStatus::Ok
    } else {
        CheckStatus::Warning
    }
}

/// Connects, reads the server version, times a trivial query and counts the tables.
///
/// A failed connection or query makes the report ERROR; a slow round trip only WARNING.
pub async fn check_mysql(target: &MySqlTarget) -> MySqlReport {
    info!("Checking MySQL on {}:{}", target.host, target.port);
    let mut report = MySqlReport {
        server: target.host.clone(),
        port: target.port,
        database: target.database.clone(),
        tests: BTreeMap::new(),
        version: None,
        response_time_ms: None,
        table_count: None,
        global_status: CheckStatus::Error,
    };

    let mut conn = match target.connect().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("MySQL on {} unreachable: {e}", target.host);
            report
                .tests
                .insert("connection", CheckResult::new(CheckStatus::Error, e.to_string()));
            return report;
        }
    };
    report
        .tests
        .insert("connection", CheckResult::new(CheckStatus::Ok, "Connection established"));

    match interrogate(&mut conn, &mut report).await {
        Ok(()) => report.global_status = overall_status(report.tests.values()),
        Err(e) => {
            report
                .tests
                .insert("query", CheckResult::new(CheckStatus::Error, e.to_string()));
        }
    }
    close(conn).await;
    report
}

async fn interrogate(conn: &mut MySqlConnection, report: &mut MySqlReport) -> Result<()> {
    let version = match fetch(conn, "SELECT VERSION()").await?.first() {
        Some(row) => first_text(row, 0)?,
        None => String::new(),
    };
    report
        .tests
        .insert("version", CheckResult::new(CheckStatus::Ok, format!("MySQL {version}")));
    report.version = Some(version);

    let start = Instant::now();
    fetch(conn, "SELECT 1").await?;
    let elapsed = start.elapsed();
    let ms = (elapsed.as_secs_f64() * 100_000.0).round() / 100.0;
    report.tests.insert(
        "response_time",
        CheckResult::new(response_status(elapsed), format!("{ms:.2} ms")),
    );
    report.response_time_ms = Some(ms);

    let tables = list_tables(conn).await?.len();
    report
        .tests
        .insert("table_count", CheckResult::new(CheckStatus::Ok, format!("{tables} tables")));
    report.table_count = Some(tables);
    Ok(())
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Comment block and database preamble opening an SQL dump.
pub fn write_dump_header<W: Write>(mut out: W, target: &MySqlTarget, generated_at: &str) -> io::Result<()> {
    let db = quote_ident(&target.database);
    writeln!(out, "-- Backup of database {}", target.database)?;
    writeln!(out, "-- Date: {generated_at}")?;
    writeln!(out, "-- Server: {}:{}", target.host, target.port)?;
    writeln!(out)?;
    writeln!(out, "CREATE DATABASE IF NOT EXISTS {db};")?;
    writeln!(out, "USE {db};")?;
    writeln!(out)
}

/// `DROP`/`CREATE` for the table, then one multi-row `INSERT` when it has rows.
pub fn write_table_dump<W: Write>(mut out: W, table: &TableDump) -> io::Result<()> {
    let ident = quote_ident(&table.name);
    writeln!(out, "-- Table: {}", table.name)?;
    writeln!(out, "DROP TABLE IF EXISTS {ident};")?;
    writeln!(out, "{};", table.create_statement)?;
    writeln!(out)?;

    if table.rows.is_empty() {
        return Ok(());
    }

    let columns: Vec<String> = table.columns.iter().map(|c| quote_ident(c)).collect();
    writeln!(out, "-- Data of {} ({} rows)", table.name, table.rows.len())?;
    writeln!(out, "INSERT INTO {ident} ({}) VALUES", columns.join(", "))?;
    let last = table.rows.len() - 1;
    for (i, row) in table.rows.iter().enumerate() {
        let values: Vec<String> = row.iter().map(SqlValue::literal).collect();
        let end = if i == last { ';' } else { ',' };
        writeln!(out, "({}){end}", values.join(", "))?;
    }
    writeln!(out)
}

/// Semicolon-separated CSV with a header row.
pub fn write_table_csv<W: Write>(out: W, table: &TableDump) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(SqlValue::csv_field))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct DumpReport {
    pub database: String,
    pub host: String,
    pub port: u16,
    pub backup_file: PathBuf,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Writes `<database>_backup_<timestamp>.sql` under `backup_dir`.
pub async fn dump_database(target: &MySqlTarget, backup_dir: &Path) -> DumpReport {
    let backup_file = backup_dir.join(format!("{}_backup_{}.sql", sanitize(&target.database), timestamp()));
    info!("Dumping {} to {}", target.database, backup_file.display());

    let mut report = DumpReport {
        database: target.database.clone(),
        host: target.host.clone(),
        port: target.port,
        backup_file,
        status: CheckStatus::Error,
        tables_count: None,
        file_size_bytes: None,
        error: None,
    };

    match write_dump(target, &report.backup_file).await {
        Ok(tables) => {
            report.status = CheckStatus::Ok;
            report.tables_count = Some(tables);
            report.file_size_bytes = fs::metadata(&report.backup_file).map(|m| m.len()).ok();
        }
        Err(e) => {
            warn!("Dump of {} failed: {e}", target.database);
            report.error = Some(e.to_string());
        }
    }
    report
}

async fn write_dump(target: &MySqlTarget, path: &Path) -> Result<usize> {
    let mut conn = target.connect().await?;
    let result = dump_tables(&mut conn, target, path).await;
    close(conn).await;
    result
}

async fn dump_tables(conn: &mut MySqlConnection, target: &MySqlTarget, path: &Path) -> Result<usize> {
    let tables = list_tables(conn).await?;
    debug!("{} tables to dump", tables.len());

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    write_dump_header(&mut out, target, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())?;

    for table in &tables {
        let dump = read_table(conn, table).await?;
        write_table_dump(&mut out, &dump)?;
    }
    out.flush()?;
    Ok(tables.len())
}

#[derive(Debug, Clone, Serialize)]
pub struct TableExport {
    pub database: String,
    pub table: String,
    pub host: String,
    pub csv_file: PathBuf,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Writes `<database>_<table>_<timestamp>.csv` under `backup_dir`.
pub async fn export_table_csv(target: &MySqlTarget, table: &str, backup_dir: &Path) -> TableExport {
    match target.connect().await {
        Ok(mut conn) => {
            let export = export_with(&mut conn, target, table, backup_dir).await;
            close(conn).await;
            export
        }
        Err(e) => {
            let mut export = pending_export(target, table, backup_dir);
            export.error = Some(e.to_string());
            export
        }
    }
}

fn pending_export(target: &MySqlTarget, table: &str, backup_dir: &Path) -> TableExport {
    let csv_file = backup_dir.join(format!(
        "{}_{}_{}.csv",
        sanitize(&target.database),
        sanitize(table),
        timestamp()
    ));
    TableExport {
        database: target.database.clone(),
        table: table.to_string(),
        host: target.host.clone(),
        csv_file,
        status: CheckStatus::Error,
        rows_count: None,
        columns_count: None,
        error: None,
    }
}

async fn export_with(
    conn: &mut MySqlConnection,
    target: &MySqlTarget,
    table: &str,
    backup_dir: &Path,
) -> TableExport {
    let mut export = pending_export(target, table, backup_dir);
    info!("Exporting {table} to {}", export.csv_file.display());

    let written = async {
        let dump = read_rows(conn, table).await?;
        fs::create_dir_all(backup_dir)?;
        write_table_csv(BufWriter::new(File::create(&export.csv_file)?), &dump)?;
        Ok::<_, AuditError>(dump)
    }
    .await;

    match written {
        Ok(dump) => {
            export.status = CheckStatus::Ok;
            export.rows_count = Some(dump.rows.len());
            export.columns_count = Some(dump.columns.len());
        }
        Err(e) => {
            warn!("Export of {table} failed: {e}");
            export.error = Some(e.to_string());
        }
    }
    export
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkExport {
    pub database: String,
    pub host: String,
    pub tables_count: usize,
    pub exported: usize,
    pub exports: Vec<TableExport>,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkExport {
    fn tally(target: &MySqlTarget, exports: Vec<TableExport>) -> Self {
        let exported = exports.iter().filter(|e| e.status == CheckStatus::Ok).count();
        let status = if exported == exports.len() {
            CheckStatus::Ok
        } else {
            CheckStatus::Warning
        };
        Self {
            database: target.database.clone(),
            host: target.host.clone(),
            tables_count: exports.len(),
            exported,
            exports,
            status,
            error: None,
        }
    }
}

/// Exports every table to its own CSV file. A failing table does not stop the others.
pub async fn dump_all_tables(target: &MySqlTarget, backup_dir: &Path) -> BulkExport {
    let listed = async {
        let mut conn = target.connect().await?;
        match list_tables(&mut conn).await {
            Ok(tables) => Ok::<_, AuditError>((conn, tables)),
            Err(e) => {
                close(conn).await;
                Err(e)
            }
        }
    }
    .await;

    let (mut conn, tables) = match listed {
        Ok(listed) => listed,
        Err(e) => {
            warn!("Could not list the tables of {}: {e}", target.database);
            let mut bulk = BulkExport::tally(target, Vec::new());
            bulk.status = CheckStatus::Error;
            bulk.error = Some(e.to_string());
            return bulk;
        }
    };
    info!("{} tables to export", tables.len());

    let mut exports = Vec::with_capacity(tables.len());
    for table in &tables {
        exports.push(export_with(&mut conn, target, table, backup_dir).await);
    }
    close(conn).await;

    BulkExport::tally(target, exports)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
