//! Deployment configuration.
//!
//! Defaults, then a TOML file, then `ALDAR_DEPLOY_*` environment variables.
//! Every command (deploy, provision, cleanup, status) reads the same
//! resource group, so they always target the same cluster.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::k8s::validation::{
    validate_azure_name, validate_dns_label, validate_image_tag, validate_path,
    validate_registry_name, ValidationError,
};
use crate::poll::WaitPolicy;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "deploy.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ALDAR_DEPLOY_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: {reason}")]
    Env { var: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    Inconsistent(String),
}

/// Target environment and tuning for a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub resource_group: String,
    pub cluster_name: String,
    pub namespace: String,
    pub registry_name: String,
    pub location: String,
    pub image_tag: String,
    /// `docker build --platform`; empty disables the flag.
    pub platform: String,
    pub manifests_dir: PathBuf,
    pub build_context: PathBuf,
    pub readiness_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub node_count: u32,
    pub node_vm_size: String,
    /// Fall back to `az login` when no Azure session exists.
    pub interactive_login: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            resource_group: "aldar-middleware-rg".to_string(),
            cluster_name: "aldar-aks".to_string(),
            namespace: "aldar-middleware".to_string(),
            registry_name: "aldaracr".to_string(),
            location: "uaenorth".to_string(),
            image_tag: "latest".to_string(),
            platform: "linux/amd64".to_string(),
            manifests_dir: PathBuf::from("k8s"),
            build_context: PathBuf::from("."),
            readiness_timeout_secs: 300,
            poll_interval_secs: 5,
            node_count: 2,
            node_vm_size: "Standard_D4s_v3".to_string(),
            interactive_login: true,
        }
    }
}

impl DeployConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `ALDAR_DEPLOY_<FIELD>` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("RESOURCE_GROUP") {
            self.resource_group = v;
        }
        if let Some(v) = var("CLUSTER_NAME") {
            self.cluster_name = v;
        }
        if let Some(v) = var("NAMESPACE") {
            self.namespace = v;
        }
        if let Some(v) = var("REGISTRY_NAME") {
            self.registry_name = v;
        }
        if let Some(v) = var("LOCATION") {
            self.location = v;
        }
        if let Some(v) = var("IMAGE_TAG") {
            self.image_tag = v;
        }
        if let Some(v) = var("PLATFORM") {
            self.platform = v;
        }
        if let Some(v) = var("MANIFESTS_DIR") {
            self.manifests_dir = PathBuf::from(v);
        }
        if let Some(v) = var("BUILD_CONTEXT") {
            self.build_context = PathBuf::from(v);
        }
        if let Some(v) = var("READINESS_TIMEOUT_SECS") {
            self.readiness_timeout_secs = parse_env("READINESS_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_env("POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("NODE_COUNT") {
            self.node_count = parse_env("NODE_COUNT", &v)?;
        }
        if let Some(v) = var("NODE_VM_SIZE") {
            self.node_vm_size = v;
        }
        if let Some(v) = var("INTERACTIVE_LOGIN") {
            self.interactive_login = parse_bool("INTERACTIVE_LOGIN", &v)?;
        }
        Ok(())
    }

    /// Check every field that reaches an external command line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_azure_name(&self.resource_group, "resource_group")?;
        validate_azure_name(&self.cluster_name, "cluster_name")?;
        validate_dns_label(&self.namespace, "namespace")?;
        validate_registry_name(&self.registry_name)?;
        validate_dns_label(&self.location, "location")?;
        validate_image_tag(&self.image_tag)?;
        validate_azure_name(&self.node_vm_size, "node_vm_size")?;
        validate_path(&self.manifests_dir.to_string_lossy(), "manifests_dir", true)?;
        validate_path(&self.build_context.to_string_lossy(), "build_context", true)?;

        if self.readiness_timeout_secs == 0 {
            return Err(ConfigError::Inconsistent(
                "readiness_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 || self.poll_interval_secs > self.readiness_timeout_secs {
            return Err(ConfigError::Inconsistent(format!(
                "poll_interval_secs must be between 1 and readiness_timeout_secs ({})",
                self.readiness_timeout_secs
            )));
        }
        if self.node_count == 0 {
            return Err(ConfigError::Inconsistent(
                "node_count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Command-line `--tag`, the last override applied.
    pub fn override_image_tag(&mut self, tag: &str) -> Result<(), ConfigError> {
        validate_image_tag(tag)?;
        self.image_tag = tag.to_string();
        Ok(())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.readiness_timeout_secs),
            Duration::from_secs(self.poll_interval_secs),
        )
    }

    pub fn manifest_path(&self, file: &str) -> PathBuf {
        self.manifests_dir.join(file)
    }

    /// Registry login server used when `az acr show` does not report one.
    pub fn default_login_server(&self) -> String {
        format!("{}.azurecr.io", self.registry_name)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var: format!("{}{}", ENV_PREFIX, name),
        reason: e.to_string(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Env {
            var: format!("{}{}", ENV_PREFIX, name),
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Load configuration: defaults, the file (explicit or `deploy.toml` if
/// present), then process environment overrides. The result is validated.
pub fn load(path: Option<&Path>) -> Result<DeployConfig, ConfigError> {
    load_with(path, |name| std::env::var(name).ok())
}

/// [`load`] with an injectable environment.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<DeployConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let file = match path {
        Some(p) => Some(p),
        None if default_path.is_file() => Some(default_path),
        None => None,
    };

    let mut config = match file {
        Some(p) => {
            let contents = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                path: p.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %p.display(), "loaded config file");
            DeployConfig::from_toml_str(&contents, p)?
        }
        None => DeployConfig::default(),
    };

    config.apply_env(lookup)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
