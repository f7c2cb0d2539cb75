//! Typed wrappers around the external CLIs the deployment drives.

pub mod azure;
pub mod docker;
pub mod kubectl;

pub use azure::AzureCli;
pub use docker::Docker;
pub use kubectl::Kubectl;

/// Tools that must be on PATH before a deployment starts.
pub const REQUIRED_TOOLS: [&str; 3] = ["az", "kubectl", "docker"];
