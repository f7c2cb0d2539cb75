// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deployment error type.
//!
//! Every variant is fatal: the first error aborts the run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::exec::ExecError;
use crate::k8s::ManifestError;
use crate::orchestrator::PlanError;

/// Broad failure classes, used for the operator hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing tool, bad configuration, unreadable manifest.
    Environment,
    /// Azure session missing or rejected.
    Authentication,
    /// Cluster or registry does not exist.
    ResourceAbsent,
    /// A build, push, apply or probe returned non-zero.
    Operation,
    /// Readiness not reached in time.
    Timeout,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Required tool '{0}' not found on PATH")]
    MissingTool(String),

    #[error("Azure authentication failed: {0}")]
    Authentication(#[source] ExecError),

    #[error("No active Azure session")]
    NotLoggedIn,

    #[error("AKS cluster '{cluster}' not found in resource group '{resource_group}'")]
    ClusterNotFound {
        cluster: String,
        resource_group: String,
    },

    #[error("AKS cluster '{cluster}' is not reachable: {source}")]
    ClusterUnreachable {
        cluster: String,
        #[source]
        source: ExecError,
    },

    #[error("Container registry '{registry}' not found in resource group '{resource_group}'")]
    RegistryNotFound {
        registry: String,
        resource_group: String,
    },

    #[error("{action} failed: {source}")]
    Step {
        action: String,
        #[source]
        source: ExecError,
    },

    #[error(
        "Deployment '{workload}' not ready after {}s (last status: {last_status})",
        .waited.as_secs()
    )]
    ReadinessTimeout {
        workload: String,
        waited: Duration,
        last_status: String,
    },

    #[error("Unexpected output from '{command}': {reason}")]
    UnexpectedOutput { command: String, reason: String },

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl DeployError {
    /// Wrap a failed external command with what it was doing.
    pub fn step(action: impl Into<String>, source: ExecError) -> Self {
        Self::Step {
            action: action.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTool(_)
            | Self::ManifestRead { .. }
            | Self::Manifest(_)
            | Self::Config(_)
            | Self::Plan(_) => ErrorKind::Environment,
            Self::Authentication(_) | Self::NotLoggedIn => ErrorKind::Authentication,
            Self::ClusterNotFound { .. } | Self::RegistryNotFound { .. } => {
                ErrorKind::ResourceAbsent
            }
            Self::ClusterUnreachable { .. } | Self::Step { .. } | Self::UnexpectedOutput { .. } => {
                ErrorKind::Operation
            }
            Self::ReadinessTimeout { .. } => ErrorKind::Timeout,
        }
    }

    /// What the operator should do next.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Environment => {
                "Install the Azure CLI, kubectl and Docker, and check the deployment configuration."
            }
            ErrorKind::Authentication => "Run 'az login' and select the right subscription, then re-run.",
            ErrorKind::ResourceAbsent => {
                "Provision the infrastructure first with 'aldar-deploy provision', then re-run."
            }
            ErrorKind::Operation => {
                "Check the command output above; for cluster errors inspect 'kubectl get events' in the namespace."
            }
            ErrorKind::Timeout => {
                "Inspect the workload with 'kubectl describe deployment' and 'kubectl logs' in the namespace."
            }
        }
    }

    /// Process exit code. Every failure class maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
