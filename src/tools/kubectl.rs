// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! `kubectl` invocations scoped to the deployment namespace.

use std::path::Path;

use crate::error::DeployError;
use crate::exec::{run_checked, CommandRunner, CommandSpec, ExecError};
use crate::k8s::{Deployment, DeploymentList};

/// Upper bound on a single API server round trip.
const REQUEST_TIMEOUT: &str = "--request-timeout=30s";

pub struct Kubectl<'a> {
    runner: &'a dyn CommandRunner,
    namespace: &'a str,
}

impl<'a> Kubectl<'a> {
    pub fn new(runner: &'a dyn CommandRunner, namespace: &'a str) -> Self {
        Self { runner, namespace }
    }

    pub fn namespace(&self) -> &str {
        self.namespace
    }

    fn kubectl<I, S>(args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new("kubectl").args(args)
    }

    /// Connectivity probe against the current context.
    pub async fn cluster_info(&self) -> Result<(), ExecError> {
        run_checked(self.runner, &Self::kubectl(["cluster-info", REQUEST_TIMEOUT]))
            .await
            .map(|_| ())
    }

    /// `kubectl apply -f PATH`, namespaced unless the manifest is cluster-scoped.
    pub async fn apply_file(&self, path: &Path, namespaced: bool) -> Result<(), DeployError> {
        let path_str = path.to_string_lossy();
        let mut spec = Self::kubectl(["apply"]);
        if namespaced {
            spec = spec.args(["-n", self.namespace]);
        }
        spec = spec.args(["-f", &*path_str]);

        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step(format!("Applying {}", path.display()), e))
    }

    /// `kubectl apply -f -` with the manifest text on stdin.
    pub async fn apply_rendered(&self, manifest: String, label: &str) -> Result<(), DeployError> {
        let spec = Self::kubectl(["apply", "-n", self.namespace, "-f", "-"]).stdin(manifest);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step(format!("Applying {}", label), e))
    }

    fn parse<T: serde::de::DeserializeOwned>(spec: &CommandSpec, stdout: &str) -> Result<T, DeployError> {
        serde_json::from_str(stdout).map_err(|e| DeployError::UnexpectedOutput {
            command: spec.command_line(),
            reason: e.to_string(),
        })
    }

    pub async fn get_deployment(&self, name: &str) -> Result<Deployment, DeployError> {
        let spec = Self::kubectl([
            "get", "deployment", name, "-n", self.namespace, "-o", "json", REQUEST_TIMEOUT,
        ]);
        let output = run_checked(self.runner, &spec)
            .await
            .map_err(|e| DeployError::step(format!("Reading deployment {}", name), e))?;
        Self::parse(&spec, &output.stdout)
    }

    pub async fn list_deployments(&self) -> Result<DeploymentList, DeployError> {
        let spec = Self::kubectl(["get", "deployments", "-n", self.namespace, "-o", "json"]);
        let output = run_checked(self.runner, &spec)
            .await
            .map_err(|e| DeployError::step("Listing deployments", e))?;
        Self::parse(&spec, &output.stdout)
    }

    /// Delete the namespace and everything in it without waiting for finalizers.
    pub async fn delete_namespace(&self) -> Result<(), DeployError> {
        let spec = Self::kubectl([
            "delete", "namespace", self.namespace, "--ignore-not-found", "--wait=false",
        ]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step(format!("Deleting namespace {}", self.namespace), e))
    }
}
