//! Audit engine of the NTL toolbox.
//!
//! * **[`catalog`]**: end-of-life dates per OS family.
//! * **[`scanner`]**: host prober and network sweeper.
//! * **[`correlator`]**: inventory rows joined against the catalog.
//! * **[`report`]**: obsolescence report from a sweep.
//! * **[`diagnostic`]**: ping, port and AD/DNS checks, full server diagnostic, remote execution.
//! * **[`database`]**: MySQL health check, SQL dump and CSV exports.
//! * **[`output`]**: JSON persistence of results.

pub mod audit;
pub mod catalog;
pub mod correlator;
pub mod database;
pub mod diagnostic;
pub mod network;
pub mod output;
pub mod report;
pub mod scanner;
