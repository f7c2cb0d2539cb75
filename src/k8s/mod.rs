// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes-side types and helpers.
//!
//! Status types read back from `kubectl`, manifest rendering, and input
//! validation for everything that ends up on a command line.

pub mod manifest;
pub mod types;
pub mod validation;

pub use manifest::{registry_reference, render_image, ManifestError};
pub use types::{Condition, Deployment, DeploymentList, DeploymentStatus};
pub use validation::ValidationError;
