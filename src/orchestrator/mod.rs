// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deployment orchestration.
//!
//! A run walks a fixed sequence: preconditions, namespace and stateful
//! services, then each requested component (build, push, apply, wait),
//! then identity and ingress, then a status snapshot. Each external call
//! is made once; the first failure aborts the run with the stage it
//! happened in.

pub mod cleanup;
pub mod plan;
pub mod preflight;
pub mod provision;
pub mod stage;

use crate::cli::status::fetch_status;
use crate::cli::status_format::format_status_table;
use crate::component::{Component, StatefulService, BASE_MANIFESTS, NETWORK_MANIFESTS};
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::exec::CommandRunner;
use crate::k8s::{registry_reference, render_image};
use crate::poll::{wait_until, WaitError};
use crate::progress::Progress;
use crate::tools::{AzureCli, Docker, Kubectl};

pub use cleanup::{Cleanup, CleanupOptions};
pub use plan::{DeployMode, DeployPlan, PlanError};
pub use provision::{ProvisionSummary, Provisioner};
pub use stage::{Aborted, DeployReport, Stage};

/// Manifest that creates the namespace itself; applied without `-n`.
const NAMESPACE_MANIFEST: &str = "namespace.yaml";

/// Drives one deployment run against the configured target.
pub struct Orchestrator<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DeployConfig,
    progress: &'a Progress,
}

impl<'a> Orchestrator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DeployConfig, progress: &'a Progress) -> Self {
        Self {
            runner,
            config,
            progress,
        }
    }

    fn azure(&self) -> AzureCli<'a> {
        AzureCli::new(self.runner)
    }

    fn kubectl(&self) -> Kubectl<'a> {
        Kubectl::new(self.runner, &self.config.namespace)
    }

    fn docker(&self) -> Docker<'a> {
        Docker::new(self.runner, &self.config.build_context, &self.config.platform)
    }

    /// Execute `plan` from the first precondition to the status snapshot.
    pub async fn run(&self, plan: &DeployPlan) -> Result<DeployReport, Aborted> {
        let mut report = DeployReport::start(plan);
        tracing::info!(
            run_id = %report.run_id,
            components = ?plan.components,
            mode = ?plan.mode,
            "deployment started"
        );

        match self.execute(plan, &mut report).await {
            Ok(()) => {
                report.finish();
                tracing::info!(run_id = %report.run_id, elapsed_secs = report.elapsed_secs(), "deployment finished");
                Ok(report)
            }
            Err(error) => Err(report.abort(error)),
        }
    }

    /// Run only the precondition stages.
    pub async fn check(&self) -> Result<DeployReport, Aborted> {
        let plan = DeployPlan::new(Vec::new(), DeployMode::Full);
        let mut report = DeployReport::start(&plan);
        match self.preconditions(&mut report).await {
            Ok(_) => {
                report.finish();
                Ok(report)
            }
            Err(error) => Err(report.abort(error)),
        }
    }

    async fn execute(&self, plan: &DeployPlan, report: &mut DeployReport) -> Result<(), DeployError> {
        let login_server = self.preconditions(report).await?;

        if plan.mode.deploys() {
            self.progress.banner("Preparing namespace");
            self.prepare_namespace(report).await?;
            for service in StatefulService::ALL {
                self.start_dependency(service, report).await?;
            }
        }

        for &component in &plan.components {
            self.progress.banner(&format!("Component: {}", component));
            if plan.mode.builds() {
                self.build(component, &login_server, report).await?;
            }
            if plan.mode.deploys() {
                self.deploy(component, &login_server, report).await?;
            }
        }

        if plan.mode.deploys() {
            self.progress.banner("Configuring identity and ingress");
            self.configure_network(report).await?;
            self.report_status(report).await;
        }

        Ok(())
    }

    /// Tools, Azure session, cluster and registry. Returns the registry
    /// login server.
    async fn preconditions(&self, report: &mut DeployReport) -> Result<String, DeployError> {
        self.progress.banner("Checking prerequisites");
        report.enter(Stage::CheckingPrereqs);
        preflight::check_tools(self.runner, self.progress)?;

        report.enter(Stage::Authenticating);
        preflight::ensure_authenticated(self.runner, self.config, self.progress).await?;

        report.enter(Stage::VerifyingCluster);
        self.verify_cluster().await?;

        report.enter(Stage::VerifyingRegistry);
        self.verify_registry().await
    }

    async fn verify_cluster(&self) -> Result<(), DeployError> {
        let config = self.config;
        let az = self.azure();

        let state = az
            .cluster_state(&config.resource_group, &config.cluster_name)
            .await?
            .ok_or_else(|| DeployError::ClusterNotFound {
                cluster: config.cluster_name.clone(),
                resource_group: config.resource_group.clone(),
            })?;
        if state != "Succeeded" {
            self.progress.warn(format!(
                "AKS cluster '{}' provisioning state is '{}'",
                config.cluster_name, state
            ));
        }

        az.get_credentials(&config.resource_group, &config.cluster_name).await?;
        self.kubectl()
            .cluster_info()
            .await
            .map_err(|source| DeployError::ClusterUnreachable {
                cluster: config.cluster_name.clone(),
                source,
            })?;

        self.progress.success(format!("Connected to AKS cluster '{}'", config.cluster_name));
        Ok(())
    }

    async fn verify_registry(&self) -> Result<String, DeployError> {
        let config = self.config;
        let az = self.azure();

        let login_server = az
            .registry_login_server(&config.resource_group, &config.registry_name)
            .await?
            .ok_or_else(|| DeployError::RegistryNotFound {
                registry: config.registry_name.clone(),
                resource_group: config.resource_group.clone(),
            })?;
        let login_server = if login_server.is_empty() {
            config.default_login_server()
        } else {
            login_server
        };

        az.registry_login(&config.registry_name).await?;
        self.progress.success(format!("Logged in to registry {}", login_server));
        Ok(login_server)
    }

    async fn prepare_namespace(&self, report: &mut DeployReport) -> Result<(), DeployError> {
        report.enter(Stage::PreparingNamespace);
        let kubectl = self.kubectl();
        for file in BASE_MANIFESTS {
            let path = self.config.manifest_path(file);
            kubectl.apply_file(&path, file != NAMESPACE_MANIFEST).await?;
            report.applied_manifests.push(file.to_string());
        }
        self.progress.success(format!("Namespace '{}' prepared", self.config.namespace));
        Ok(())
    }

    async fn start_dependency(&self, service: StatefulService, report: &mut DeployReport) -> Result<(), DeployError> {
        report.enter(Stage::StartingDependency(service));
        let path = self.config.manifest_path(service.manifest_file());
        self.kubectl().apply_file(&path, true).await?;
        report.applied_manifests.push(service.manifest_file().to_string());

        self.progress.info(format!("Waiting for {} to be ready...", service));
        self.await_ready(service.deployment_name(), report).await
    }

    async fn build(&self, component: Component, login_server: &str, report: &mut DeployReport) -> Result<(), DeployError> {
        report.enter(Stage::Building(component));
        let tag = &self.config.image_tag;
        let docker = self.docker();

        self.progress.info(format!("Building {} image...", component));
        let local = docker.build(component, tag).await?;

        let reference = registry_reference(login_server, component.image_name(), tag);
        docker.tag(&local, &reference).await?;
        self.progress.info(format!("Pushing {}...", reference));
        docker.push(&reference).await?;

        self.progress.success(format!("Pushed {}", reference));
        report.pushed_images.push(reference);
        Ok(())
    }

    async fn deploy(&self, component: Component, login_server: &str, report: &mut DeployReport) -> Result<(), DeployError> {
        report.enter(Stage::Deploying(component));
        let file = component.manifest_file();
        let path = self.config.manifest_path(file);

        let manifest = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DeployError::ManifestRead {
                path: path.clone(),
                source,
            })?;
        let reference = registry_reference(login_server, component.image_name(), &self.config.image_tag);
        let rendered = render_image(&manifest, file, component.image_name(), &reference)?;

        self.progress.info(format!("Deploying {}...", component));
        self.kubectl().apply_rendered(rendered, file).await?;
        report.applied_manifests.push(file.to_string());

        self.await_ready(component.deployment_name(), report).await
    }

    async fn await_ready(&self, name: &'static str, report: &mut DeployReport) -> Result<(), DeployError> {
        report.enter(Stage::AwaitingReady(name));
        let kubectl = self.kubectl();
        let k = &kubectl;

        let result = wait_until(self.config.wait_policy(), || async move {
            k.get_deployment(name).await.map(|d| d.readiness())
        })
        .await;

        match result {
            Ok(replicas) => {
                self.progress.success(format!("{} is ready ({} replicas)", name, replicas));
                Ok(())
            }
            Err(WaitError::TimedOut { waited, last_status }) => Err(DeployError::ReadinessTimeout {
                workload: name.to_string(),
                waited,
                last_status,
            }),
            Err(WaitError::Check(e)) => Err(e),
        }
    }

    async fn configure_network(&self, report: &mut DeployReport) -> Result<(), DeployError> {
        report.enter(Stage::ConfiguringNetwork);
        let kubectl = self.kubectl();
        for file in NETWORK_MANIFESTS {
            let path = self.config.manifest_path(file);
            kubectl.apply_file(&path, true).await?;
            report.applied_manifests.push(file.to_string());
        }
        self.progress.success("Workload identity and ingress applied");
        Ok(())
    }

    /// Snapshot of the namespace. A failed read only warns; the rollout
    /// itself already succeeded.
    async fn report_status(&self, report: &mut DeployReport) {
        report.enter(Stage::ReportingStatus);
        match fetch_status(self.runner, &self.config.namespace).await {
            Ok(status) => {
                self.progress.block(&format_status_table(&status));
                report.cluster = Some(status);
            }
            Err(e) => {
                tracing::warn!(error = %e, "status snapshot failed");
                self.progress.warn(format!("Could not read deployment status: {}", e));
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
