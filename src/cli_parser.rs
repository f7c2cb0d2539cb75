//! CLI argument parsing for aldar-deploy.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "aldar-deploy")]
#[command(about = "Build, push and roll out Aldar middleware components to AKS")]
#[command(version)]
#[command(after_help = "ENVIRONMENT:
    ALDAR_DEPLOY_<FIELD>  Override a config field, e.g. ALDAR_DEPLOY_NAMESPACE
    RUST_LOG              Diagnostic log filter (overrides -v)
    NO_COLOR              Disable colored progress output

EXIT CODES:
    0  Success
    1  Any failure")]
pub struct Cli {
    /// Config file (defaults to ./deploy.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase diagnostic logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit diagnostic logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable colored progress output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build, push and deploy components
    Deploy(DeployArgs),

    /// Verify tools, Azure login, cluster and registry
    Check,

    /// Create the resource group, registry and cluster when absent
    Provision,

    /// Show deployments in the namespace
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Delete the namespace and optionally the resource group
    Cleanup {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,

        /// Also delete the resource group with everything in it
        #[arg(long)]
        delete_resource_group: bool,
    },

    /// List deployable components
    Components,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Components to process in order: main, worker, beat, flower (default: all)
    #[arg(value_name = "COMPONENT")]
    pub components: Vec<String>,

    /// Process every component
    #[arg(long)]
    pub all: bool,

    /// Build and push images without touching the cluster
    #[arg(long, conflicts_with = "deploy_only")]
    pub build_only: bool,

    /// Deploy already-pushed images without building
    #[arg(long)]
    pub deploy_only: bool,

    /// Image tag (overrides image_tag from config)
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,
}
