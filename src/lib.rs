// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Aldar Deploy - AKS deployment orchestration.
//!
//! Builds, pushes and rolls out the Aldar middleware components (API,
//! Celery worker, beat scheduler, Flower dashboard) to an Azure Kubernetes
//! Service cluster by driving `az`, `kubectl` and `docker`.
//!
//! # Architecture
//!
//! - [`orchestrator`]: the stage-by-stage deployment run
//! - [`tools`]: typed wrappers over the external CLIs
//! - [`exec`]: subprocess execution behind the [`exec::CommandRunner`] trait
//! - [`k8s`]: manifest rendering, status types and input validation
//! - [`cli`]: subcommand bodies and status display

pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod exec;
pub mod k8s;
pub mod orchestrator;
pub mod poll;
pub mod progress;
pub mod telemetry;
pub mod tools;

pub use component::{Component, StatefulService};
pub use config::DeployConfig;
pub use error::{DeployError, ErrorKind};
pub use exec::{CommandRunner, FakeRunner, SystemRunner};
pub use orchestrator::{Aborted, DeployMode, DeployPlan, DeployReport, Orchestrator, Stage};
pub use progress::Progress;
