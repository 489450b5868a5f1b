//! # Report Assembler
//!
//! Turns a sweep into an obsolescence report: one EOL analysis per discovered host and
//! at most two recommendations.

use ntl_common::models::eol::ResolvedStatus;
use ntl_common::models::inventory::StatusTally;
use ntl_common::models::report::{
    AuditReport, HostAnalysis, Priority, Recommendation, SweepResult, SweepSummary,
};
use ntl_common::network::host::{HostProbe, OsGuess};
use tracing::info;

use crate::catalog::EolCatalog;

pub fn assemble(sweep: &SweepResult, catalog: &EolCatalog) -> AuditReport {
    let hosts_analysis: Vec<HostAnalysis> = sweep
        .hosts
        .iter()
        .map(|host| analyze_host(host, catalog))
        .collect();

    let summary: StatusTally = hosts_analysis.iter().map(|h| h.status).collect();
    let recommendations = recommend(&summary);

    info!(
        "Report for {} assembled: {} hosts, {} recommendations",
        sweep.network,
        hosts_analysis.len(),
        recommendations.len()
    );

    AuditReport {
        network: sweep.network,
        scan_summary: SweepSummary::from(sweep),
        hosts_analysis,
        summary,
        recommendations,
    }
}

/// Family-only lookup on the OS guess; the match is the recommended upgrade target.
fn analyze_host(host: &HostProbe, catalog: &EolCatalog) -> HostAnalysis {
    let entry = host
        .os_guess
        .filter(|guess| *guess != OsGuess::Unknown)
        .and_then(|guess| catalog.lookup(guess.as_str(), None));

    HostAnalysis {
        address: host.address,
        hostname: host.hostname.clone(),
        os_guess: host.os_guess,
        status: entry.map_or(ResolvedStatus::Unknown, |e| e.status.into()),
        eol_date: entry.map(|e| e.eol_date),
        recommended_version: entry.map(|e| e.version_label.clone()),
    }
}

/// High for obsolete systems, then Medium for systems nearing end of support.
pub fn recommend(summary: &StatusTally) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = Vec::with_capacity(2);

    if summary.obsolete > 0 {
        recommendations.push(Recommendation {
            priority: Priority::High,
            message: format!(
                "{} obsolete systems detected - urgent update required",
                summary.obsolete
            ),
        });
    }

    if summary.ending_soon > 0 {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            message: format!(
                "{} systems nearing end of support - plan the migration",
                summary.ending_soon
            ),
        });
    }

    recommendations
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
