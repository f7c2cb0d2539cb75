// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Create the Azure infrastructure a deployment runs on.
//!
//! Each resource is looked up first and only created when absent, so
//! re-running against a provisioned environment changes nothing except
//! re-attaching the registry to the cluster.

use serde::Serialize;

use super::preflight;
use super::stage::{Aborted, Stage};
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::exec::CommandRunner;
use crate::progress::Progress;
use crate::tools::{AzureCli, Kubectl};

/// What a provisioning run created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionSummary {
    pub created_resource_group: bool,
    pub created_registry: bool,
    pub created_cluster: bool,
    pub login_server: String,
}

pub struct Provisioner<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DeployConfig,
    progress: &'a Progress,
}

impl<'a> Provisioner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DeployConfig, progress: &'a Progress) -> Self {
        Self {
            runner,
            config,
            progress,
        }
    }

    pub async fn run(&self) -> Result<ProvisionSummary, Aborted> {
        let mut stage = Stage::CheckingPrereqs;
        match self.execute(&mut stage).await {
            Ok(summary) => Ok(summary),
            Err(error) => {
                tracing::error!(%stage, error = %error, "provisioning aborted");
                Err(Aborted { stage, error })
            }
        }
    }

    async fn execute(&self, stage: &mut Stage) -> Result<ProvisionSummary, DeployError> {
        let config = self.config;
        let az = AzureCli::new(self.runner);
        let mut summary = ProvisionSummary::default();

        *stage = Stage::CheckingPrereqs;
        preflight::check_tools(self.runner, self.progress)?;

        *stage = Stage::Authenticating;
        preflight::ensure_authenticated(self.runner, config, self.progress).await?;

        *stage = Stage::EnsuringResourceGroup;
        if az.group_exists(&config.resource_group).await? {
            self.progress.info(format!("Resource group '{}' already exists", config.resource_group));
        } else {
            self.progress.info(format!(
                "Creating resource group '{}' in {}...",
                config.resource_group, config.location
            ));
            az.create_group(&config.resource_group, &config.location).await?;
            summary.created_resource_group = true;
        }

        *stage = Stage::EnsuringRegistry;
        let login_server = match az
            .registry_login_server(&config.resource_group, &config.registry_name)
            .await?
        {
            Some(server) => {
                self.progress.info(format!("Container registry '{}' already exists", config.registry_name));
                server
            }
            None => {
                self.progress.info(format!("Creating container registry '{}'...", config.registry_name));
                az.create_registry(config).await?;
                summary.created_registry = true;
                az.registry_login_server(&config.resource_group, &config.registry_name)
                    .await?
                    .unwrap_or_default()
            }
        };
        summary.login_server = if login_server.is_empty() {
            config.default_login_server()
        } else {
            login_server
        };

        *stage = Stage::EnsuringCluster;
        match az.cluster_state(&config.resource_group, &config.cluster_name).await? {
            Some(state) => {
                self.progress.info(format!(
                    "AKS cluster '{}' already exists (state: {}); attaching registry",
                    config.cluster_name, state
                ));
                az.attach_registry(config).await?;
            }
            None => {
                self.progress.info(format!(
                    "Creating AKS cluster '{}' ({} x {}). This can take several minutes...",
                    config.cluster_name, config.node_count, config.node_vm_size
                ));
                az.create_cluster(config).await?;
                summary.created_cluster = true;
            }
        }

        *stage = Stage::VerifyingCluster;
        az.get_credentials(&config.resource_group, &config.cluster_name).await?;
        Kubectl::new(self.runner, &config.namespace)
            .cluster_info()
            .await
            .map_err(|source| DeployError::ClusterUnreachable {
                cluster: config.cluster_name.clone(),
                source,
            })?;

        *stage = Stage::Done;
        self.progress.success(format!(
            "Infrastructure ready: cluster '{}', registry {}",
            config.cluster_name, summary.login_server
        ));
        Ok(summary)
    }
}
