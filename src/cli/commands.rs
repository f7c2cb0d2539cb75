// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subcommand bodies. Each returns the process exit code.

use crate::component::Component;
use crate::config::DeployConfig;
use crate::exec::CommandRunner;
use crate::orchestrator::{
    Aborted, Cleanup, CleanupOptions, DeployPlan, Orchestrator, Provisioner,
};
use crate::progress::Progress;

/// Final `[ERROR]` line plus the operator hint.
pub fn report_abort(progress: &Progress, aborted: &Aborted) -> i32 {
    progress.error(format!("Failed while {}: {}", aborted.stage, aborted.error));
    progress.info(aborted.error.hint());
    aborted.exit_code()
}

pub async fn run_deploy(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    progress: &Progress,
    plan: &DeployPlan,
) -> i32 {
    let names: Vec<&str> = plan.components.iter().map(Component::name).collect();
    progress.info(format!(
        "Deploying [{}] to '{}' in namespace '{}' (tag: {})",
        names.join(", "),
        config.cluster_name,
        config.namespace,
        config.image_tag
    ));

    match Orchestrator::new(runner, config, progress).run(plan).await {
        Ok(report) => {
            for image in &report.pushed_images {
                progress.info(format!("Image: {}", image));
            }
            progress.success(format!(
                "Deployment complete in {}s (run {})",
                report.elapsed_secs(),
                report.run_id
            ));
            0
        }
        Err(aborted) => report_abort(progress, &aborted),
    }
}

pub async fn run_check(runner: &dyn CommandRunner, config: &DeployConfig, progress: &Progress) -> i32 {
    match Orchestrator::new(runner, config, progress).check().await {
        Ok(_) => {
            progress.success("Environment is ready for deployment");
            0
        }
        Err(aborted) => report_abort(progress, &aborted),
    }
}

pub async fn run_provision(runner: &dyn CommandRunner, config: &DeployConfig, progress: &Progress) -> i32 {
    match Provisioner::new(runner, config, progress).run().await {
        Ok(summary) => {
            tracing::info!(?summary, "provisioning finished");
            progress.info("Next: aldar-deploy deploy");
            0
        }
        Err(aborted) => report_abort(progress, &aborted),
    }
}

/// Requires `confirmed`; nothing is deleted otherwise.
pub async fn run_cleanup(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    progress: &Progress,
    options: CleanupOptions,
    confirmed: bool,
) -> i32 {
    if !confirmed {
        progress.error(format!(
            "Refusing to delete namespace '{}' without --yes",
            config.namespace
        ));
        return 1;
    }

    match Cleanup::new(runner, config, progress).run(options).await {
        Ok(()) => {
            progress.success("Cleanup complete");
            0
        }
        Err(aborted) => report_abort(progress, &aborted),
    }
}

/// Component table.
pub fn format_components() -> String {
    let mut lines = vec![format!(
        "{:8} {:18} {:19} {:24} {}",
        "NAME", "IMAGE", "BUILD FILE", "MANIFEST", "DESCRIPTION"
    )];
    for component in Component::ALL {
        lines.push(format!(
            "{:8} {:18} {:19} {:24} {}",
            component.name(),
            component.image_name(),
            component.build_file(),
            component.manifest_file(),
            component.description()
        ));
    }
    lines.join("\n")
}

pub fn run_components() -> i32 {
    println!("{}", format_components());
    0
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
