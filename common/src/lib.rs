//! Shared building blocks for the NTL toolbox.
//!
//! * **[`models`]**: the audit data model (EOL entries, inventory records, reports).
//! * **[`network`]**: address blocks and per-host probe results.
//! * **[`config`]**: the run-wide settings object, built once and read-only afterwards.
//! * **[`error`]**: the error taxonomy shared by every component.

pub mod config;
pub mod error;
pub mod models;
pub mod network;

pub use tracing;

/// Logs a completed step. The CLI formatter renders these with a success marker.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "ntl::success", $($arg)*)
    };
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
