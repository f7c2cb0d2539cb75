//! `docker` build, tag and push.

use std::path::Path;

use crate::component::Component;
use crate::error::DeployError;
use crate::exec::{run_checked, CommandRunner, CommandSpec};

pub struct Docker<'a> {
    runner: &'a dyn CommandRunner,
    build_context: &'a Path,
    platform: &'a str,
}

impl<'a> Docker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, build_context: &'a Path, platform: &'a str) -> Self {
        Self {
            runner,
            build_context,
            platform,
        }
    }

    /// Build `component` from its Dockerfile as `<image>:<tag>`.
    pub async fn build(&self, component: Component, tag: &str) -> Result<String, DeployError> {
        let local = format!("{}:{}", component.image_name(), tag);
        let dockerfile = self.build_context.join(component.build_file());
        let context = self.build_context.to_string_lossy();

        let mut spec = CommandSpec::new("docker").args([
            "build".to_string(),
            "-f".to_string(),
            dockerfile.to_string_lossy().into_owned(),
            "-t".to_string(),
            local.clone(),
        ]);
        if !self.platform.is_empty() {
            spec = spec.args(["--platform", self.platform]);
        }
        spec = spec.arg(context.into_owned()).streamed();

        run_checked(self.runner, &spec)
            .await
            .map_err(|e| DeployError::step(format!("Building {} image", component), e))?;
        Ok(local)
    }

    pub async fn tag(&self, source: &str, target: &str) -> Result<(), DeployError> {
        let spec = CommandSpec::new("docker").args(["tag", source, target]);
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step(format!("Tagging {}", target), e))
    }

    pub async fn push(&self, reference: &str) -> Result<(), DeployError> {
        let spec = CommandSpec::new("docker").args(["push", reference]).streamed();
        run_checked(self.runner, &spec)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::step(format!("Pushing {}", reference), e))
    }
}
