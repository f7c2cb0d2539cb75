//! aldar-deploy entry point.
//!
//! Parses arguments, loads configuration and dispatches to a subcommand on
//! a current-thread runtime: every external command is awaited before the
//! next one starts.

mod cli_parser;

use std::process::ExitCode;

use clap::Parser;

use aldar_deploy::cli::{
    run_check, run_cleanup, run_components, run_deploy, run_provision, run_status,
};
use aldar_deploy::config::{self, DeployConfig};
use aldar_deploy::orchestrator::{CleanupOptions, DeployPlan};
use aldar_deploy::{telemetry, Progress, SystemRunner};

use cli_parser::{Cli, Commands, DeployArgs};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and are not failures.
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    telemetry::init_logging(cli.verbose, cli.log_json);
    let progress = Progress::from_env(cli.no_color);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            progress.error(format!("Failed to start runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(dispatch(cli, &progress));
    ExitCode::from(code as u8)
}

async fn dispatch(cli: Cli, progress: &Progress) -> i32 {
    if let Commands::Components = cli.command {
        return run_components();
    }

    let mut config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            progress.error(e);
            return 1;
        }
    };

    let runner = SystemRunner::new();
    match cli.command {
        Commands::Deploy(args) => deploy(&runner, &mut config, progress, args).await,
        Commands::Check => run_check(&runner, &config, progress).await,
        Commands::Provision => run_provision(&runner, &config, progress).await,
        Commands::Status { json } => {
            let progress = if json { Progress::quiet() } else { progress.clone() };
            run_status(&runner, &config, &progress, json).await
        }
        Commands::Cleanup {
            yes,
            delete_resource_group,
        } => {
            let options = CleanupOptions {
                delete_resource_group,
            };
            run_cleanup(&runner, &config, progress, options, yes).await
        }
        Commands::Components => run_components(),
    }
}

async fn deploy(
    runner: &SystemRunner,
    config: &mut DeployConfig,
    progress: &Progress,
    args: DeployArgs,
) -> i32 {
    // Unknown names and mode conflicts are rejected before any external call.
    let plan = match DeployPlan::from_names(
        args.components.as_slice(),
        args.all,
        args.build_only,
        args.deploy_only,
    ) {
        Ok(plan) => plan,
        Err(e) => {
            progress.error(e);
            return 1;
        }
    };

    if let Some(tag) = &args.tag {
        if let Err(e) = config.override_image_tag(tag) {
            progress.error(e);
            return 1;
        }
    }

    run_deploy(runner, config, progress, &plan).await
}
