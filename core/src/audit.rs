//! # Audit Service
//!
//! Wires the components together for the end-to-end use cases.
//!
//! The service owns the catalog and the prober; each operation below is one command of the
//! toolbox and returns the value that gets printed and saved.

use std::path::Path;
use std::sync::Arc;

use ntl_common::config::Config;
use ntl_common::error::Result;
use ntl_common::models::eol::EolListing;
use ntl_common::models::inventory::InventoryAnalysis;
use ntl_common::models::report::{AuditReport, SweepResult};

use crate::catalog::EolCatalog;
use crate::correlator::Correlator;
use crate::report;
use crate::scanner::{self, ProgressHook, Prober, TcpProber};

pub struct AuditService {
    config: Config,
    catalog: EolCatalog,
    prober: Arc<dyn Prober>,
}

impl AuditService {
    pub fn new(config: Config, catalog: EolCatalog, prober: Arc<dyn Prober>) -> Self {
        Self {
            config,
            catalog,
            prober,
        }
    }

    /// Production wiring: catalog from `config.eol_file` (or the built-in table) and a
    /// TCP connect prober over `config.probe_ports`.
    pub fn from_config(config: Config) -> Self {
        let catalog = EolCatalog::load(&config.eol_file);
        let prober: Arc<dyn Prober> = Arc::new(TcpProber::new(&config));
        Self::new(config, catalog, prober)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &EolCatalog {
        &self.catalog
    }

    pub async fn scan_network(
        &self,
        cidr: &str,
        on_progress: Option<ProgressHook<'_>>,
    ) -> Result<SweepResult> {
        scanner::sweep(cidr, Arc::clone(&self.prober), &self.config, on_progress).await
    }

    pub fn check_eol(&self, os_name: &str) -> EolListing {
        self.catalog.versions(os_name)
    }

    pub fn analyze_inventory(&self, csv_path: &Path) -> Result<InventoryAnalysis> {
        Correlator::new(&self.catalog).analyze_csv(csv_path)
    }

    /// Sweeps `cidr` and assembles the obsolescence report for what was found.
    pub async fn full_report(
        &self,
        cidr: &str,
        on_progress: Option<ProgressHook<'_>>,
    ) -> Result<AuditReport> {
        let sweep = self.scan_network(cidr, on_progress).await?;
        Ok(report::assemble(&sweep, &self.catalog))
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
