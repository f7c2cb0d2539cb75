//! Status command: deployments in the namespace and overall health.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status_format::print_status_human;
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::exec::CommandRunner;
use crate::k8s::{Deployment, DeploymentList};
use crate::progress::Progress;
use crate::tools::Kubectl;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub namespace: String,
    pub health: HealthState,
    pub checked_at: DateTime<Utc>,
    pub workloads: Vec<WorkloadStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState { Healthy, Degraded, Unhealthy }

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Degraded => write!(f, "degraded"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadStatus {
    pub name: String,
    pub ready_replicas: u32,
    pub desired_replicas: u32,
    pub images: Vec<String>,
    pub state: WorkloadState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadState { Ready, Progressing, Unavailable }

impl std::fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadState::Ready => write!(f, "ready"),
            WorkloadState::Progressing => write!(f, "progressing"),
            WorkloadState::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl WorkloadStatus {
    pub fn from_deployment(deployment: &Deployment) -> Self {
        let status = deployment.status.clone().unwrap_or_default();
        let state = if deployment.is_available() {
            WorkloadState::Ready
        } else if status.ready_replicas > 0 || status.updated_replicas > 0 {
            WorkloadState::Progressing
        } else {
            WorkloadState::Unavailable
        };

        Self {
            name: deployment.metadata.name.clone(),
            ready_replicas: status.ready_replicas,
            desired_replicas: deployment.desired_replicas(),
            images: deployment.images(),
            state,
        }
    }
}

impl ClusterStatus {
    pub fn from_list(namespace: &str, list: &DeploymentList) -> Self {
        let workloads: Vec<WorkloadStatus> =
            list.items.iter().map(WorkloadStatus::from_deployment).collect();
        let health = health_of(&workloads);
        Self {
            namespace: namespace.to_string(),
            health,
            checked_at: Utc::now(),
            workloads,
        }
    }
}

/// Healthy when every workload is ready, unhealthy when none is (or there
/// are none), degraded in between.
fn health_of(workloads: &[WorkloadStatus]) -> HealthState {
    let ready = workloads
        .iter()
        .filter(|w| w.state == WorkloadState::Ready)
        .count();
    if workloads.is_empty() || ready == 0 {
        HealthState::Unhealthy
    } else if ready == workloads.len() {
        HealthState::Healthy
    } else {
        HealthState::Degraded
    }
}

/// Read every deployment in `namespace`.
pub async fn fetch_status(runner: &dyn CommandRunner, namespace: &str) -> Result<ClusterStatus, DeployError> {
    let list = Kubectl::new(runner, namespace).list_deployments().await?;
    Ok(ClusterStatus::from_list(namespace, &list))
}

/// Run the status command and display results.
pub async fn run_status(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    progress: &Progress,
    json_output: bool,
) -> i32 {
    match fetch_status(runner, &config.namespace).await {
        Ok(status) => {
            if json_output {
                match serde_json::to_string_pretty(&status) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        progress.error(format!("Failed to encode status: {}", e));
                        return 1;
                    }
                }
            } else {
                print_status_human(&status);
            }
            if status.health == HealthState::Healthy { 0 } else { 1 }
        }
        Err(e) => {
            progress.error(format!("Error fetching status: {}", e));
            1
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
