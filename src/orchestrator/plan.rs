// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! What a deployment run is asked to do.

use serde::Serialize;
use thiserror::Error;

use crate::component::{Component, UnknownComponent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error(transparent)]
    UnknownComponent(#[from] UnknownComponent),

    #[error("--build-only and --deploy-only cannot be combined")]
    ConflictingModes,

    #[error("--all cannot be combined with an explicit component list")]
    AllWithComponents,
}

/// Which halves of the per-component work to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployMode {
    /// Build, push, then deploy.
    Full,
    BuildOnly,
    DeployOnly,
}

impl DeployMode {
    pub fn from_flags(build_only: bool, deploy_only: bool) -> Result<Self, PlanError> {
        match (build_only, deploy_only) {
            (false, false) => Ok(DeployMode::Full),
            (true, false) => Ok(DeployMode::BuildOnly),
            (false, true) => Ok(DeployMode::DeployOnly),
            (true, true) => Err(PlanError::ConflictingModes),
        }
    }

    pub fn builds(&self) -> bool {
        matches!(self, DeployMode::Full | DeployMode::BuildOnly)
    }

    pub fn deploys(&self) -> bool {
        matches!(self, DeployMode::Full | DeployMode::DeployOnly)
    }
}

/// Validated components plus mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployPlan {
    pub components: Vec<Component>,
    pub mode: DeployMode,
}

impl DeployPlan {
    pub fn new(components: Vec<Component>, mode: DeployMode) -> Self {
        Self { components, mode }
    }

    /// Parse caller-supplied names.
    ///
    /// No names (or `all`) selects every component. Order is preserved and
    /// repeated names are dropped after their first occurrence.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        all: bool,
        build_only: bool,
        deploy_only: bool,
    ) -> Result<Self, PlanError> {
        let mode = DeployMode::from_flags(build_only, deploy_only)?;

        if all && !names.is_empty() {
            return Err(PlanError::AllWithComponents);
        }

        let mut components = Vec::with_capacity(names.len());
        for name in names {
            let component: Component = name.as_ref().parse()?;
            if !components.contains(&component) {
                components.push(component);
            }
        }

        if components.is_empty() {
            components = Component::ALL.to_vec();
        }

        Ok(Self { components, mode })
    }
}
