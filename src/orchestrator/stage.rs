// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run stages, the report of a finished run, and the abort error.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::plan::{DeployMode, DeployPlan};
use crate::cli::status::ClusterStatus;
use crate::component::{Component, StatefulService};
use crate::error::DeployError;

/// Position in the run's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "target", rename_all = "snake_case")]
pub enum Stage {
    CheckingPrereqs,
    Authenticating,
    VerifyingCluster,
    VerifyingRegistry,
    PreparingNamespace,
    StartingDependency(StatefulService),
    Building(Component),
    Deploying(Component),
    /// Deployment name being polled.
    AwaitingReady(&'static str),
    ConfiguringNetwork,
    ReportingStatus,
    EnsuringResourceGroup,
    EnsuringRegistry,
    EnsuringCluster,
    DeletingNamespace,
    DeletingResourceGroup,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::CheckingPrereqs => write!(f, "checking prerequisites"),
            Stage::Authenticating => write!(f, "authenticating"),
            Stage::VerifyingCluster => write!(f, "verifying cluster"),
            Stage::VerifyingRegistry => write!(f, "verifying registry"),
            Stage::PreparingNamespace => write!(f, "preparing namespace"),
            Stage::StartingDependency(s) => write!(f, "starting {}", s),
            Stage::Building(c) => write!(f, "building {}", c),
            Stage::Deploying(c) => write!(f, "deploying {}", c),
            Stage::AwaitingReady(name) => write!(f, "waiting for {}", name),
            Stage::ConfiguringNetwork => write!(f, "configuring identity and ingress"),
            Stage::ReportingStatus => write!(f, "reporting status"),
            Stage::EnsuringResourceGroup => write!(f, "ensuring resource group"),
            Stage::EnsuringRegistry => write!(f, "ensuring container registry"),
            Stage::EnsuringCluster => write!(f, "ensuring AKS cluster"),
            Stage::DeletingNamespace => write!(f, "deleting namespace"),
            Stage::DeletingResourceGroup => write!(f, "deleting resource group"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// A run that stopped on its first error.
#[derive(Debug, Error)]
#[error("Aborted while {stage}: {error}")]
pub struct Aborted {
    pub stage: Stage,
    #[source]
    pub error: DeployError,
}

impl Aborted {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

/// Record of a run, filled in as stages complete.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub components: Vec<Component>,
    pub mode: DeployMode,
    pub stages: Vec<Stage>,
    pub pushed_images: Vec<String>,
    pub applied_manifests: Vec<String>,
    pub cluster: Option<ClusterStatus>,
}

impl DeployReport {
    pub fn start(plan: &DeployPlan) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            components: plan.components.clone(),
            mode: plan.mode,
            stages: Vec::new(),
            pushed_images: Vec::new(),
            applied_manifests: Vec::new(),
            cluster: None,
        }
    }

    pub fn enter(&mut self, stage: Stage) {
        tracing::info!(run_id = %self.run_id, %stage, "entering stage");
        self.stages.push(stage);
    }

    pub fn current(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::CheckingPrereqs)
    }

    pub fn abort(&self, error: DeployError) -> Aborted {
        let stage = self.current();
        tracing::error!(run_id = %self.run_id, %stage, error = %error, "run aborted");
        Aborted { stage, error }
    }

    pub fn finish(&mut self) {
        self.enter(Stage::Done);
        self.finished_at = Some(Utc::now());
    }

    pub fn elapsed_secs(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }
}
