//! JSON persistence for command results.
//!
//! Every result is wrapped in a small metadata envelope before it is written:
//!
//! ```json
//! { "metadata": { "generated_at": "...", "tool": "...", "format_version": "1.0" },
//!   "data": { ... } }
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use ntl_common::error::Result;
use serde::Serialize;
use tracing::debug;

pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub generated_at: String,
    pub tool: String,
    pub format_version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub metadata: Metadata,
    pub data: &'a T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn wrap(data: &'a T) -> Self {
        Self {
            metadata: Metadata {
                generated_at: Local::now().to_rfc3339(),
                tool: format!("NTL-SysToolbox v{}", env!("CARGO_PKG_VERSION")),
                format_version: FORMAT_VERSION,
            },
            data,
        }
    }
}

/// Writes enveloped results as timestamped files under one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Saves `data` as `<prefix>_<YYYYmmdd_HHMMSS>.json` and returns the path written.
    pub fn save<T: Serialize>(&self, data: &T, prefix: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .output_dir
            .join(format!("{}_{timestamp}.json", sanitize(prefix)));

        let json = serde_json::to_string_pretty(&Envelope::wrap(data))?;
        fs::write(&path, json)?;

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Keeps file names portable: anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
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
    use serde_json::Value;

    #[derive(Serialize)]
    struct Sample {
        network: &'static str,
        hosts_found: usize,
    }

    #[test]
    fn saved_file_has_metadata_and_data() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));
        let sample = Sample {
            network: "192.168.10.0/24",
            hosts_found: 3,
        };

        let path = writer.save(&sample, "network_scan_192.168.10.0/24").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("network_scan_192.168.10.0_24_"), "{name}");
        assert!(name.ends_with(".json"));

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["format_version"], "1.0");
        assert!(value["metadata"]["tool"].as_str().unwrap().starts_with("NTL-SysToolbox v"));
        assert!(value["metadata"]["generated_at"].is_string());
        assert_eq!(value["data"]["hosts_found"], 3);
        assert_eq!(value["data"]["network"], "192.168.10.0/24");
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize("eol_check_Windows Server 2012"), "eol_check_Windows_Server_2012");
        assert_eq!(sanitize("ping_test_10.0.0.1"), "ping_test_10.0.0.1");
    }
}
