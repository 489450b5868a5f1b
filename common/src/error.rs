use std::net::IpAddr;

use thiserror::Error;

/// Failures surfaced by the audit components.
///
/// Probe and catalog failures are folded into "not reachable" and "built-in defaults"
/// by the sweeper and the catalog loader; the other variants reach the caller.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("invalid network specification '{0}'")]
    InvalidNetworkSpec(String),

    #[error("probe of {0} timed out")]
    ProbeTimeout(IpAddr),

    #[error("{0} is unreachable")]
    ProbeUnreachable(IpAddr),

    #[error("could not load EOL catalog: {0}")]
    CatalogLoad(String),

    #[error("remote channel unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
