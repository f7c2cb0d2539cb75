// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deployable components and the stateful services they depend on.
//!
//! Each variant carries its image name, build file, manifest file and
//! deployment name as constants, so an unmapped component cannot exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the independently buildable and deployable application units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// The FastAPI application.
    Main,
    /// Celery task worker.
    Worker,
    /// Celery periodic-task scheduler.
    Beat,
    /// Celery monitoring dashboard.
    Flower,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Main,
        Component::Worker,
        Component::Beat,
        Component::Flower,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::Main => "main",
            Component::Worker => "worker",
            Component::Beat => "beat",
            Component::Flower => "flower",
        }
    }

    /// Repository name of the container image, without registry or tag.
    pub fn image_name(&self) -> &'static str {
        match self {
            Component::Main => "aldar-middleware",
            Component::Worker => "aldar-worker",
            Component::Beat => "aldar-beat",
            Component::Flower => "aldar-flower",
        }
    }

    /// Dockerfile path relative to the build context.
    pub fn build_file(&self) -> &'static str {
        match self {
            Component::Main => "Dockerfile",
            Component::Worker => "Dockerfile.worker",
            Component::Beat => "Dockerfile.beat",
            Component::Flower => "Dockerfile.flower",
        }
    }

    /// Manifest file name relative to the manifests directory.
    pub fn manifest_file(&self) -> &'static str {
        match self {
            Component::Main => "main-deployment.yaml",
            Component::Worker => "worker-deployment.yaml",
            Component::Beat => "beat-deployment.yaml",
            Component::Flower => "flower-deployment.yaml",
        }
    }

    /// Name of the Kubernetes Deployment created by the manifest.
    pub fn deployment_name(&self) -> &'static str {
        self.image_name()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Component::Main => "API application",
            Component::Worker => "Celery worker",
            Component::Beat => "Celery beat scheduler",
            Component::Flower => "Flower monitoring dashboard",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown component name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown component '{0}' (expected one of: main, worker, beat, flower)")]
pub struct UnknownComponent(pub String);

impl FromStr for Component {
    type Err = UnknownComponent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownComponent(s.to_string()))
    }
}

/// Stateful backing service applied and awaited before any component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatefulService {
    Postgres,
    Redis,
}

impl StatefulService {
    /// Dependency order: database first, then cache.
    pub const ALL: [StatefulService; 2] = [StatefulService::Postgres, StatefulService::Redis];

    pub fn manifest_file(&self) -> &'static str {
        match self {
            StatefulService::Postgres => "postgres.yaml",
            StatefulService::Redis => "redis.yaml",
        }
    }

    pub fn deployment_name(&self) -> &'static str {
        match self {
            StatefulService::Postgres => "postgres",
            StatefulService::Redis => "redis",
        }
    }
}

impl fmt::Display for StatefulService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.deployment_name())
    }
}

/// Namespace, shared configuration and secrets.
pub const BASE_MANIFESTS: [&str; 3] = ["namespace.yaml", "configmap.yaml", "secrets.yaml"];

/// Workload identity binding and ingress, applied once all components are up.
pub const NETWORK_MANIFESTS: [&str; 2] = ["azure-identity.yaml", "ingress.yaml"];

#[cfg(test)]
#[path = "component_tests.rs"]
mod tests;
