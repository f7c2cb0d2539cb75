// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subset of the `apps/v1` Deployment schema read back from `kubectl -o json`.
//!
//! Only the fields needed to judge readiness and print status are modeled;
//! everything else in the API response is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::poll::Probe;

/// `kubectl get deployment NAME -o json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Option<DeploymentSpec>,
    #[serde(default)]
    pub status: Option<DeploymentStatus>,
}

/// `kubectl get deployments -o json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentList {
    #[serde(default)]
    pub items: Vec<Deployment>,
}

/// Common object metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Desired replicas; the API server defaults this to 1.
    #[serde(default)]
    pub replicas: Option<u32>,
    #[serde(default)]
    pub template: Option<PodTemplate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplate {
    #[serde(default)]
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Deployment status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub ready_replicas: u32,
    #[serde(default)]
    pub available_replicas: u32,
    #[serde(default)]
    pub updated_replicas: u32,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Condition for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl Deployment {
    pub fn desired_replicas(&self) -> u32 {
        self.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1)
    }

    fn status_or_default(&self) -> DeploymentStatus {
        self.status.clone().unwrap_or_default()
    }

    pub fn ready_replicas(&self) -> u32 {
        self.status.as_ref().map(|s| s.ready_replicas).unwrap_or(0)
    }

    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.iter().find(|c| c.condition_type == condition_type))
    }

    /// Images of all containers in the pod template.
    pub fn images(&self) -> Vec<String> {
        self.spec
            .as_ref()
            .and_then(|s| s.template.as_ref())
            .and_then(|t| t.spec.as_ref())
            .map(|p| p.containers.iter().filter_map(|c| c.image.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether the controller has seen the latest spec.
    ///
    /// Right after `kubectl apply` the status still describes the previous
    /// generation, whose old pods can satisfy `Available`.
    pub fn is_observed(&self) -> bool {
        match (self.metadata.generation, self.status.as_ref()) {
            (Some(generation), Some(status)) => status
                .observed_generation
                .map(|observed| observed >= generation)
                .unwrap_or(false),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Latest spec observed, fully rolled out and `Available=True`.
    pub fn is_available(&self) -> bool {
        let status = self.status_or_default();
        let available = self
            .condition("Available")
            .map(|c| c.status == "True")
            .unwrap_or(false);
        let desired = self.desired_replicas();
        self.is_observed()
            && available
            && status.updated_replicas >= desired
            && status.available_replicas >= desired
    }

    /// Readiness probe result for [`crate::poll::wait_until`].
    pub fn readiness(&self) -> Probe<u32> {
        if self.is_available() {
            return Probe::Ready(self.ready_replicas());
        }

        if !self.is_observed() {
            return Probe::Pending("waiting for rollout to be observed".to_string());
        }

        let status = self.status_or_default();
        let mut summary = format!(
            "{}/{} available, {} updated",
            status.available_replicas,
            self.desired_replicas(),
            status.updated_replicas
        );
        // A stuck rollout reports why on the Progressing condition.
        if let Some(reason) = self
            .condition("Progressing")
            .filter(|c| c.status != "True")
            .and_then(|c| c.reason.as_deref())
        {
            summary.push_str(", ");
            summary.push_str(reason);
        }
        Probe::Pending(summary)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
