// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! `az` invocations: session, AKS, ACR and resource groups.
//!
//! `show` queries that exit non-zero are read as "resource absent"; the
//! caller decides whether that is fatal.

use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::exec::{run_checked, CommandRunner, CommandSpec, ExecError};

pub struct AzureCli<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> AzureCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn az<I, S>(args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new("az").args(args)
    }

    /// Run a `show`-style query; `None` when it exits non-zero.
    async fn query(&self, spec: CommandSpec) -> Result<Option<String>, ExecError> {
        tracing::debug!(command = %spec, "querying");
        let output = self.runner.run(&spec).await?;
        if output.success() {
            Ok(Some(output.stdout.trim().to_string()))
        } else {
            tracing::debug!(command = %spec, stderr = %output.stderr.trim(), "query returned non-zero");
            Ok(None)
        }
    }

    /// Name of the active subscription, `None` when not logged in.
    pub async fn account(&self) -> Result<Option<String>, DeployError> {
        self.query(Self::az(["account", "show", "--query", "name", "-o", "tsv"]))
            .await
            .map_err(DeployError::Authentication)
    }

    /// Interactive `az login` on the operator's terminal.
    pub async fn login(&self) -> Result<(), DeployError> {
        run_checked(self.runner, &Self::az(["login"]).interactive())
            .await
            .map(|_| ())
            .map_err(DeployError::Authentication)
    }

    /// `provisioningState` of the cluster, `None` when it does not exist.
    pub async fn cluster_state(&self, resource_group: &str, cluster: &str) -> Result<Option<String>, DeployError> {
        let spec = Self::az([
            "aks", "show", "--resource-group", resource_group, "--name", cluster,
            "--query", "provisioningState", "-o", "tsv",
        ]);
        self.query(spec)
            .await
            .map_err(|e| DeployError::step("Looking up AKS cluster", e))
    }

    pub async fn get_credentials(&self, resource_group: &str, cluster: &str) -> Result<(), DeployError> {
        let spec = Self::az([
            "aks", "get-credentials", "--resource-group", resource_group, "--name", cluster,
            "--overwrite-existing",
        ]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Fetching AKS credentials", e))
    }

    /// Login server of the registry, `None` when it does not exist.
    pub async fn registry_login_server(&self, resource_group: &str, registry: &str) -> Result<Option<String>, DeployError> {
        let spec = Self::az([
            "acr", "show", "--resource-group", resource_group, "--name", registry,
            "--query", "loginServer", "-o", "tsv",
        ]);
        self.query(spec)
            .await
            .map_err(|e| DeployError::step("Looking up container registry", e))
    }

    pub async fn registry_login(&self, registry: &str) -> Result<(), DeployError> {
        run_checked(self.runner, &Self::az(["acr", "login", "--name", registry]))
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Logging in to container registry", e))
    }

    pub async fn group_exists(&self, resource_group: &str) -> Result<bool, DeployError> {
        let spec = Self::az(["group", "exists", "--name", resource_group]);
        let output = run_checked(self.runner, &spec)
            .await
            .map_err(|e| DeployError::step("Checking resource group", e))?;
        match output.stdout.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(DeployError::UnexpectedOutput {
                command: spec.command_line(),
                reason: format!("expected 'true' or 'false', got '{}'", other),
            }),
        }
    }

    pub async fn create_group(&self, resource_group: &str, location: &str) -> Result<(), DeployError> {
        let spec = Self::az([
            "group", "create", "--name", resource_group, "--location", location, "-o", "none",
        ]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Creating resource group", e))
    }

    pub async fn create_registry(&self, config: &DeployConfig) -> Result<(), DeployError> {
        let spec = Self::az([
            "acr", "create",
            "--resource-group", config.resource_group.as_str(),
            "--name", config.registry_name.as_str(),
            "--location", config.location.as_str(),
            "--sku", "Basic",
            "-o", "none",
        ]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Creating container registry", e))
    }

    /// Create the cluster with managed identity and pull access to the registry.
    pub async fn create_cluster(&self, config: &DeployConfig) -> Result<(), DeployError> {
        let node_count = config.node_count.to_string();
        let spec = Self::az([
            "aks", "create",
            "--resource-group", config.resource_group.as_str(),
            "--name", config.cluster_name.as_str(),
            "--location", config.location.as_str(),
            "--node-count", node_count.as_str(),
            "--node-vm-size", config.node_vm_size.as_str(),
            "--attach-acr", config.registry_name.as_str(),
            "--enable-managed-identity",
            "--enable-oidc-issuer",
            "--enable-workload-identity",
            "--generate-ssh-keys",
            "-o", "none",
        ])
        .streamed();
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Creating AKS cluster", e))
    }

    /// Grant an existing cluster pull access to the registry.
    pub async fn attach_registry(&self, config: &DeployConfig) -> Result<(), DeployError> {
        let spec = Self::az([
            "aks", "update",
            "--resource-group", config.resource_group.as_str(),
            "--name", config.cluster_name.as_str(),
            "--attach-acr", config.registry_name.as_str(),
            "-o", "none",
        ]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Attaching registry to cluster", e))
    }

    pub async fn delete_group(&self, resource_group: &str) -> Result<(), DeployError> {
        let spec = Self::az(["group", "delete", "--name", resource_group, "--yes", "--no-wait"]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step("Deleting resource group", e))
    }
}
