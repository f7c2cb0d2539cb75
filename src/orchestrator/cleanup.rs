//! Tear down what a deployment created.

use super::preflight;
use super::stage::{Aborted, Stage};
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::exec::CommandRunner;
use crate::progress::Progress;
use crate::tools::{AzureCli, Kubectl};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Also delete the resource group with the cluster and registry in it.
    pub delete_resource_group: bool,
}

pub struct Cleanup<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DeployConfig,
    progress: &'a Progress,
}

impl<'a> Cleanup<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DeployConfig, progress: &'a Progress) -> Self {
        Self {
            runner,
            config,
            progress,
        }
    }

    pub async fn run(&self, options: CleanupOptions) -> Result<(), Aborted> {
        let mut stage = Stage::CheckingPrereqs;
        self.execute(options, &mut stage).await.map_err(|error| {
            tracing::error!(%stage, error = %error, "cleanup aborted");
            Aborted { stage, error }
        })
    }

    async fn execute(&self, options: CleanupOptions, stage: &mut Stage) -> Result<(), DeployError> {
        let config = self.config;
        let az = AzureCli::new(self.runner);

        *stage = Stage::CheckingPrereqs;
        preflight::check_tools(self.runner, self.progress)?;

        *stage = Stage::Authenticating;
        preflight::ensure_authenticated(self.runner, config, self.progress).await?;

        *stage = Stage::VerifyingCluster;
        let cluster = az.cluster_state(&config.resource_group, &config.cluster_name).await?;

        match cluster {
            Some(_) => {
                az.get_credentials(&config.resource_group, &config.cluster_name).await?;
                *stage = Stage::DeletingNamespace;
                self.progress.info(format!("Deleting namespace '{}'...", config.namespace));
                Kubectl::new(self.runner, &config.namespace).delete_namespace().await?;
                self.progress.success(format!("Namespace '{}' deletion started", config.namespace));
            }
            None if options.delete_resource_group => {
                self.progress.warn(format!(
                    "AKS cluster '{}' not found; skipping namespace deletion",
                    config.cluster_name
                ));
            }
            None => {
                return Err(DeployError::ClusterNotFound {
                    cluster: config.cluster_name.clone(),
                    resource_group: config.resource_group.clone(),
                });
            }
        }

        if options.delete_resource_group {
            *stage = Stage::DeletingResourceGroup;
            self.progress.warn(format!(
                "Deleting resource group '{}' and everything in it...",
                config.resource_group
            ));
            az.delete_group(&config.resource_group).await?;
            self.progress.success(format!("Resource group '{}' deletion started", config.resource_group));
        }

        *stage = Stage::Done;
        Ok(())
    }
}
