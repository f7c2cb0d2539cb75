//! Command-line front end: subcommand bodies and status display.

pub mod commands;
pub mod status;
pub mod status_format;

pub use commands::{
    format_components, report_abort, run_check, run_cleanup, run_components, run_deploy,
    run_provision,
};
pub use status::{fetch_status, run_status, ClusterStatus, HealthState, WorkloadStatus};
