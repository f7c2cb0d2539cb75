//! Formatting helpers for the status command display.

use std::fmt::Write as _;

use super::status::{ClusterStatus, HealthState, WorkloadState};

/// Print status in human-readable format.
pub fn print_status_human(status: &ClusterStatus) {
    println!("{}", format_status_table(status));
}

/// Header plus one row per deployment.
pub fn format_status_table(status: &ClusterStatus) -> String {
    let mut out = String::new();
    let health_icon = match status.health {
        HealthState::Healthy => "V",
        HealthState::Degraded => "!",
        HealthState::Unhealthy => "X",
    };

    let _ = writeln!(out, "====================================================");
    let _ = writeln!(out, "  Namespace: {}", status.namespace);
    let _ = writeln!(out, "  Health: {} {:10}  Checked: {}", health_icon, status.health,
        status.checked_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "====================================================");

    let _ = writeln!(out, "\nDeployments ({})", status.workloads.len());
    let _ = writeln!(out, "  Name               | State       | Ready | Image");
    let _ = write!(out, "  -------------------+-------------+-------+--------------------------");
    for workload in &status.workloads {
        let icon = match workload.state {
            WorkloadState::Ready => "V",
            WorkloadState::Progressing => "~",
            WorkloadState::Unavailable => "X",
        };
        let image = workload.images.first().map(String::as_str).unwrap_or("-");
        let _ = write!(
            out,
            "\n  {:18} | {} {:9} | {:>5} | {}",
            truncate(&workload.name, 18),
            icon,
            workload.state,
            format_replicas(workload.ready_replicas, workload.desired_replicas),
            truncate(image, 48)
        );
    }
    out
}

/// `ready/desired`.
pub fn format_replicas(ready: u32, desired: u32) -> String {
    format!("{}/{}", ready, desired)
}

/// Truncate a string to a maximum length.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
