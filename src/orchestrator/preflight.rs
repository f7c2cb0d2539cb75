//! Precondition checks shared by `deploy`, `check` and `provision`.

use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::exec::CommandRunner;
use crate::progress::Progress;
use crate::tools::{AzureCli, REQUIRED_TOOLS};

/// Fail on the first required tool missing from PATH.
pub fn check_tools(runner: &dyn CommandRunner, progress: &Progress) -> Result<(), DeployError> {
    for tool in REQUIRED_TOOLS {
        match runner.locate(tool) {
            Some(path) => tracing::debug!(tool, path = %path.display(), "found tool"),
            None => return Err(DeployError::MissingTool(tool.to_string())),
        }
    }
    progress.success("All required tools are installed");
    Ok(())
}

/// Reuse the current Azure session, or attempt one interactive login.
pub async fn ensure_authenticated(
    runner: &dyn CommandRunner,
    config: &DeployConfig,
    progress: &Progress,
) -> Result<(), DeployError> {
    let az = AzureCli::new(runner);

    if let Some(subscription) = az.account().await? {
        progress.success(format!("Logged in to Azure (subscription: {})", subscription));
        return Ok(());
    }

    if !config.interactive_login {
        return Err(DeployError::NotLoggedIn);
    }

    progress.warn("Not logged in to Azure. Starting 'az login'...");
    az.login().await?;

    match az.account().await? {
        Some(subscription) => {
            progress.success(format!("Logged in to Azure (subscription: {})", subscription));
            Ok(())
        }
        None => Err(DeployError::NotLoggedIn),
    }
}
