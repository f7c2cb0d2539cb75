//! Tests for the deployment sequence.

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::component::Component;
use crate::error::ErrorKind;
use crate::exec::{CommandOutput, FakeRunner, Input};

const LOGIN_SERVER: &str = "aldaracr.azurecr.io";

fn ready_json(name: &str) -> String {
    serde_json::json!({
        "metadata": { "name": name },
        "spec": { "replicas": 1 },
        "status": {
            "replicas": 1,
            "readyReplicas": 1,
            "availableReplicas": 1,
            "updatedReplicas": 1,
            "conditions": [{ "type": "Available", "status": "True" }]
        }
    })
    .to_string()
}

fn pending_json(name: &str) -> String {
    serde_json::json!({
        "metadata": { "name": name },
        "spec": { "replicas": 1 },
        "status": {
            "replicas": 1,
            "updatedReplicas": 1,
            "unavailableReplicas": 1,
            "conditions": [
                { "type": "Available", "status": "False", "reason": "MinimumReplicasUnavailable" }
            ]
        }
    })
    .to_string()
}

/// Manifest directory holding every component manifest.
fn manifests() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for component in Component::ALL {
        let body = format!(
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {name}\nspec:\n  template:\n    spec:\n      containers:\n        - name: {short}\n          image: {name}:latest\n",
            name = component.image_name(),
            short = component.name(),
        );
        std::fs::write(dir.path().join(component.manifest_file()), body).unwrap();
    }
    dir
}

fn config_for(dir: &Path) -> DeployConfig {
    DeployConfig {
        manifests_dir: dir.to_path_buf(),
        ..DeployConfig::default()
    }
}

/// Logged in, cluster and registry present, every deployment ready.
///
/// `overrides` registers rules first, so they win over the defaults.
fn scripted(overrides: impl FnOnce(&FakeRunner)) -> FakeRunner {
    let runner = FakeRunner::new();
    overrides(&runner);
    runner.respond("az account show", CommandOutput::ok("Aldar Production\n"));
    runner.respond("az aks show", CommandOutput::ok("Succeeded\n"));
    runner.respond("az acr show", CommandOutput::ok(format!("{}\n", LOGIN_SERVER)));
    runner.respond(
        "kubectl get deployments",
        CommandOutput::ok(serde_json::json!({ "items": [] }).to_string()),
    );
    runner.respond("kubectl get deployment ", CommandOutput::ok(ready_json("any")));
    runner
}

fn healthy_runner() -> FakeRunner {
    scripted(|_| {})
}

fn plan(components: &[Component], mode: DeployMode) -> DeployPlan {
    DeployPlan::new(components.to_vec(), mode)
}

async fn run(runner: &FakeRunner, config: &DeployConfig, plan: &DeployPlan) -> Result<DeployReport, Aborted> {
    let progress = Progress::quiet();
    Orchestrator::new(runner, config, &progress).run(plan).await
}

#[tokio::test]
async fn test_worker_and_beat_sequence() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = healthy_runner();

    let report = run(&runner, &config, &plan(&[Component::Worker, Component::Beat], DeployMode::Full))
        .await
        .unwrap();

    let m = |file: &str| format!("{}", dir.path().join(file).display());
    let expected = vec![
        "az account show".to_string(),
        "az aks show --resource-group aldar-middleware-rg --name aldar-aks".to_string(),
        "az aks get-credentials --resource-group aldar-middleware-rg --name aldar-aks --overwrite-existing".to_string(),
        "kubectl cluster-info".to_string(),
        "az acr show --resource-group aldar-middleware-rg --name aldaracr".to_string(),
        "az acr login --name aldaracr".to_string(),
        format!("kubectl apply -f {}", m("namespace.yaml")),
        format!("kubectl apply -n aldar-middleware -f {}", m("configmap.yaml")),
        format!("kubectl apply -n aldar-middleware -f {}", m("secrets.yaml")),
        format!("kubectl apply -n aldar-middleware -f {}", m("postgres.yaml")),
        "kubectl get deployment postgres -n aldar-middleware -o json --request-timeout=30s".to_string(),
        format!("kubectl apply -n aldar-middleware -f {}", m("redis.yaml")),
        "kubectl get deployment redis -n aldar-middleware -o json --request-timeout=30s".to_string(),
        "docker build -f ./Dockerfile.worker -t aldar-worker:latest --platform linux/amd64 .".to_string(),
        "docker tag aldar-worker:latest aldaracr.azurecr.io/aldar-worker:latest".to_string(),
        "docker push aldaracr.azurecr.io/aldar-worker:latest".to_string(),
        "kubectl apply -n aldar-middleware -f -".to_string(),
        "kubectl get deployment aldar-worker -n aldar-middleware -o json --request-timeout=30s".to_string(),
        "docker build -f ./Dockerfile.beat -t aldar-beat:latest --platform linux/amd64 .".to_string(),
        "docker tag aldar-beat:latest aldaracr.azurecr.io/aldar-beat:latest".to_string(),
        "docker push aldaracr.azurecr.io/aldar-beat:latest".to_string(),
        "kubectl apply -n aldar-middleware -f -".to_string(),
        "kubectl get deployment aldar-beat -n aldar-middleware -o json --request-timeout=30s".to_string(),
        format!("kubectl apply -n aldar-middleware -f {}", m("azure-identity.yaml")),
        format!("kubectl apply -n aldar-middleware -f {}", m("ingress.yaml")),
        "kubectl get deployments -n aldar-middleware -o json".to_string(),
    ];

    let lines = runner.command_lines();
    assert_eq!(lines.len(), expected.len(), "calls: {:#?}", lines);
    for (line, prefix) in lines.iter().zip(&expected) {
        assert!(line.starts_with(prefix.as_str()), "expected '{}' to start with '{}'", line, prefix);
    }

    assert_eq!(
        report.pushed_images,
        vec![
            "aldaracr.azurecr.io/aldar-worker:latest",
            "aldaracr.azurecr.io/aldar-beat:latest"
        ]
    );
    assert_eq!(report.stages.first(), Some(&Stage::CheckingPrereqs));
    assert_eq!(report.stages.last(), Some(&Stage::Done));
    assert!(report.finished_at.is_some());
    assert!(report.cluster.is_some());
}

#[tokio::test]
async fn test_rendered_manifest_piped_to_apply() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = healthy_runner();

    run(&runner, &config, &plan(&[Component::Flower], DeployMode::Full))
        .await
        .unwrap();

    let piped: Vec<String> = runner
        .calls()
        .into_iter()
        .filter_map(|c| match c.input {
            Input::Piped(body) => Some(body),
            _ => None,
        })
        .collect();
    assert_eq!(piped.len(), 1);
    assert!(piped[0].contains("image: aldaracr.azurecr.io/aldar-flower:latest"));

    // The file on disk keeps its original image.
    let on_disk = std::fs::read_to_string(dir.path().join("flower-deployment.yaml")).unwrap();
    assert!(on_disk.contains("image: aldar-flower:latest"));
}

#[tokio::test]
async fn test_build_only_never_touches_cluster_workloads() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = healthy_runner();

    let report = run(&runner, &config, &plan(&Component::ALL, DeployMode::BuildOnly))
        .await
        .unwrap();

    assert_eq!(runner.count("kubectl apply"), 0);
    assert_eq!(runner.count("kubectl get deployment"), 0);
    assert_eq!(runner.count("docker build"), 4);
    assert_eq!(runner.count("docker push"), 4);
    assert!(!report.stages.contains(&Stage::PreparingNamespace));
    assert!(report.applied_manifests.is_empty());
    assert!(report.cluster.is_none());
}

#[tokio::test]
async fn test_deploy_only_never_builds() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = healthy_runner();

    let report = run(&runner, &config, &plan(&[Component::Main, Component::Worker], DeployMode::DeployOnly))
        .await
        .unwrap();

    assert_eq!(runner.count("docker"), 0);
    assert_eq!(runner.count("kubectl apply -n aldar-middleware -f -"), 2);
    assert!(report.pushed_images.is_empty());
    assert!(report.applied_manifests.contains(&"main-deployment.yaml".to_string()));
}

#[tokio::test]
async fn test_dependencies_ready_before_first_component() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = healthy_runner();

    run(&runner, &config, &plan(&[Component::Flower, Component::Main], DeployMode::Full))
        .await
        .unwrap();

    let postgres_ready = runner.position("kubectl get deployment postgres").unwrap();
    let redis_apply = runner.position(&format!(
        "kubectl apply -n aldar-middleware -f {}",
        dir.path().join("redis.yaml").display()
    ));
    let redis_ready = runner.position("kubectl get deployment redis").unwrap();
    let first_build = runner.position("docker build").unwrap();

    assert!(postgres_ready < redis_apply.unwrap());
    assert!(redis_ready < first_build);
    let flower_build = runner.position("docker build -f ./Dockerfile.flower").unwrap();
    let main_build = runner.position("docker build -f ./Dockerfile ").unwrap();
    assert!(flower_build < main_build);
}

#[tokio::test]
async fn test_build_failure_stops_run() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("docker build -f ./Dockerfile.worker", 1, "COPY failed: file not found");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Worker, Component::Beat], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::Building(Component::Worker));
    assert_eq!(aborted.exit_code(), 1);
    assert_eq!(aborted.error.kind(), ErrorKind::Operation);
    assert!(aborted.to_string().contains("COPY failed"));
    assert_eq!(runner.count("docker push"), 0);
    assert_eq!(runner.count("docker build -f ./Dockerfile.beat"), 0);
    assert_eq!(runner.count("kubectl apply -n aldar-middleware -f -"), 0);
}

#[tokio::test]
async fn test_apply_failure_stops_run() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("kubectl apply -n aldar-middleware -f -", 1, "error validating data");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Main, Component::Beat], DeployMode::DeployOnly))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::Deploying(Component::Main));
    assert_eq!(runner.count("kubectl apply -n aldar-middleware -f -"), 1);
    assert_eq!(runner.count("kubectl get deployment aldar-middleware"), 0);
    assert_eq!(runner.count("kubectl get deployment aldar-beat"), 0);
}

#[tokio::test]
async fn test_push_failure_stops_run() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("docker push", 1, "unauthorized: authentication required");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Beat, Component::Flower], DeployMode::BuildOnly))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::Building(Component::Beat));
    assert_eq!(runner.count("docker build"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_readiness_timeout_is_fatal() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.respond("kubectl get deployment postgres", CommandOutput::ok(pending_json("postgres")));
    });

    let started = tokio::time::Instant::now();
    let aborted = run(&runner, &config, &plan(&[Component::Worker], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::AwaitingReady("postgres"));
    assert_eq!(aborted.exit_code(), 1);
    assert_eq!(aborted.error.kind(), ErrorKind::Timeout);
    match &aborted.error {
        DeployError::ReadinessTimeout { workload, waited, last_status } => {
            assert_eq!(workload, "postgres");
            assert!(*waited >= Duration::from_secs(300));
            assert!(last_status.contains("0/1 available"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(started.elapsed() >= Duration::from_secs(300));

    let polls = runner.count("kubectl get deployment postgres");
    assert!((60..=62).contains(&polls), "polled {} times", polls);
    assert_eq!(runner.count("kubectl apply -n aldar-middleware -f -"), 0);
    assert_eq!(runner.count("docker"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_readiness_waits_for_rollout() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.respond_seq(
            "kubectl get deployment aldar-worker",
            vec![
                CommandOutput::ok(pending_json("aldar-worker")),
                CommandOutput::ok(pending_json("aldar-worker")),
                CommandOutput::ok(ready_json("aldar-worker")),
            ],
        );
    });

    let started = tokio::time::Instant::now();
    run(&runner, &config, &plan(&[Component::Worker], DeployMode::DeployOnly))
        .await
        .unwrap();

    assert_eq!(runner.count("kubectl get deployment aldar-worker"), 3);
    assert!(started.elapsed() >= Duration::from_secs(10));
}

#[tokio::test]
async fn test_readiness_read_failure_is_fatal() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("kubectl get deployment redis", 1, "NotFound");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Main], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::AwaitingReady("redis"));
    assert_eq!(runner.count("kubectl get deployment redis"), 1);
    assert_eq!(runner.count("docker"), 0);
}

#[tokio::test]
async fn test_missing_tool_aborts_before_any_command() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = healthy_runner();
    runner.missing_tool("docker");

    let aborted = run(&runner, &config, &plan(&Component::ALL, DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::CheckingPrereqs);
    assert!(matches!(aborted.error, DeployError::MissingTool(ref t) if t == "docker"));
    assert_eq!(aborted.error.kind(), ErrorKind::Environment);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_interactive_login_attempted_once() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.respond_seq(
            "az account show",
            vec![
                CommandOutput::failed(1, "Please run 'az login' to setup account."),
                CommandOutput::ok("Aldar Production\n"),
            ],
        );
    });

    let progress = Progress::quiet();
    Orchestrator::new(&runner, &config, &progress).check().await.unwrap();

    assert_eq!(runner.count("az login"), 1);
    let login = runner.calls().into_iter().find(|c| c.program == "az" && c.args == ["login"]).unwrap();
    assert_eq!(login.input, Input::Inherit);
}

#[tokio::test]
async fn test_failed_login_is_fatal() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = FakeRunner::new();
    runner.fail("az account show", 1, "Please run 'az login'");
    runner.fail("az login", 1, "User cancelled the login");

    let aborted = run(&runner, &config, &plan(&[Component::Main], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::Authenticating);
    assert_eq!(aborted.error.kind(), ErrorKind::Authentication);
    assert_eq!(runner.count("az login"), 1);
    assert_eq!(runner.count("az aks"), 0);
}

#[tokio::test]
async fn test_no_session_without_interactive_login() {
    let dir = manifests();
    let config = DeployConfig {
        interactive_login: false,
        ..config_for(dir.path())
    };
    let runner = FakeRunner::new();
    runner.fail("az account show", 1, "Please run 'az login'");

    let aborted = run(&runner, &config, &plan(&[Component::Main], DeployMode::Full))
        .await
        .unwrap_err();

    assert!(matches!(aborted.error, DeployError::NotLoggedIn));
    assert_eq!(runner.count("az login"), 0);
}

#[tokio::test]
async fn test_missing_cluster_points_to_provision() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("az aks show", 3, "(ResourceNotFound) The Resource 'aldar-aks' was not found.");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Main], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::VerifyingCluster);
    assert_eq!(aborted.error.kind(), ErrorKind::ResourceAbsent);
    assert!(aborted.error.hint().contains("aldar-deploy provision"));
    assert_eq!(runner.count("az aks get-credentials"), 0);
}

#[tokio::test]
async fn test_unreachable_cluster() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("kubectl cluster-info", 1, "Unable to connect to the server");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Main], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::VerifyingCluster);
    assert!(matches!(aborted.error, DeployError::ClusterUnreachable { .. }));
    assert_eq!(runner.count("az acr"), 0);
}

#[tokio::test]
async fn test_missing_registry() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("az acr show", 3, "ResourceNotFound");
    });

    let aborted = run(&runner, &config, &plan(&[Component::Main], DeployMode::Full))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::VerifyingRegistry);
    assert_eq!(aborted.error.kind(), ErrorKind::ResourceAbsent);
    assert_eq!(runner.count("az acr login"), 0);
}

#[tokio::test]
async fn test_empty_login_server_uses_default() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.respond("az acr show", CommandOutput::ok("\n"));
    });

    let report = run(&runner, &config, &plan(&[Component::Beat], DeployMode::BuildOnly))
        .await
        .unwrap();
    assert_eq!(report.pushed_images, vec!["aldaracr.azurecr.io/aldar-beat:latest"]);
}

#[tokio::test]
async fn test_missing_component_manifest() {
    let dir = manifests();
    std::fs::remove_file(dir.path().join("beat-deployment.yaml")).unwrap();
    let config = config_for(dir.path());
    let runner = healthy_runner();

    let aborted = run(&runner, &config, &plan(&[Component::Beat], DeployMode::DeployOnly))
        .await
        .unwrap_err();

    assert_eq!(aborted.stage, Stage::Deploying(Component::Beat));
    assert!(matches!(aborted.error, DeployError::ManifestRead { .. }));
    assert_eq!(aborted.error.kind(), ErrorKind::Environment);
}

#[tokio::test]
async fn test_status_snapshot_failure_only_warns() {
    let dir = manifests();
    let config = config_for(dir.path());
    let runner = scripted(|r| {
        r.fail("kubectl get deployments", 1, "timeout");
    });

    let report = run(&runner, &config, &plan(&[Component::Main], DeployMode::DeployOnly))
        .await
        .unwrap();
    assert!(report.cluster.is_none());
    assert_eq!(report.stages.last(), Some(&Stage::Done));
}

#[tokio::test]
async fn test_custom_tag_and_platform() {
    let dir = manifests();
    let config = DeployConfig {
        image_tag: "v1.4.2".to_string(),
        platform: String::new(),
        ..config_for(dir.path())
    };
    let runner = healthy_runner();

    run(&runner, &config, &plan(&[Component::Main], DeployMode::BuildOnly))
        .await
        .unwrap();

    assert_eq!(
        runner.count("docker build -f ./Dockerfile -t aldar-middleware:v1.4.2 ."),
        1
    );
    assert_eq!(runner.count("docker push aldaracr.azurecr.io/aldar-middleware:v1.4.2"), 1);
}

#[tokio::test]
async fn test_check_runs_preconditions_only() {
    let runner = healthy_runner();
    let config = DeployConfig::default();
    let progress = Progress::quiet();

    let report = Orchestrator::new(&runner, &config, &progress).check().await.unwrap();

    assert_eq!(
        report.stages,
        vec![
            Stage::CheckingPrereqs,
            Stage::Authenticating,
            Stage::VerifyingCluster,
            Stage::VerifyingRegistry,
            Stage::Done
        ]
    );
    assert_eq!(runner.count("kubectl apply"), 0);
    assert_eq!(runner.count("docker"), 0);
    assert_eq!(runner.count("az acr login"), 1);
}

#[test]
fn test_plan_defaults_to_all_components() {
    let plan = DeployPlan::from_names::<&str>(&[], false, false, false).unwrap();
    assert_eq!(plan.components, Component::ALL.to_vec());
    assert_eq!(plan.mode, DeployMode::Full);

    let plan = DeployPlan::from_names::<&str>(&[], true, true, false).unwrap();
    assert_eq!(plan.components.len(), 4);
    assert_eq!(plan.mode, DeployMode::BuildOnly);
}

#[test]
fn test_plan_keeps_order_and_drops_duplicates() {
    let plan = DeployPlan::from_names(&["flower", "main", "flower"], false, false, true).unwrap();
    assert_eq!(plan.components, vec![Component::Flower, Component::Main]);
    assert_eq!(plan.mode, DeployMode::DeployOnly);
    assert!(!plan.mode.builds());
    assert!(plan.mode.deploys());
}

#[test]
fn test_plan_rejects_bad_input() {
    assert!(matches!(
        DeployPlan::from_names(&["main", "api"], false, false, false),
        Err(PlanError::UnknownComponent(_))
    ));
    assert_eq!(
        DeployPlan::from_names::<&str>(&[], false, true, true),
        Err(PlanError::ConflictingModes)
    );
    assert_eq!(
        DeployPlan::from_names(&["main"], true, false, false),
        Err(PlanError::AllWithComponents)
    );
}

#[test]
fn test_stage_display() {
    assert_eq!(Stage::Building(Component::Worker).to_string(), "building worker");
    assert_eq!(Stage::AwaitingReady("redis").to_string(), "waiting for redis");
    assert_eq!(
        Stage::StartingDependency(crate::component::StatefulService::Postgres).to_string(),
        "starting postgres"
    );
}

#[tokio::test]
async fn test_provision_creates_missing_resources() {
    let runner = FakeRunner::new();
    runner.respond("az account show", CommandOutput::ok("Aldar Production\n"));
    runner.respond("az group exists", CommandOutput::ok("false\n"));
    runner.respond_seq(
        "az acr show",
        vec![
            CommandOutput::failed(3, "ResourceNotFound"),
            CommandOutput::ok(LOGIN_SERVER),
        ],
    );
    runner.fail("az aks show", 3, "ResourceNotFound");

    let config = DeployConfig::default();
    let progress = Progress::quiet();
    let summary = Provisioner::new(&runner, &config, &progress).run().await.unwrap();

    assert!(summary.created_resource_group);
    assert!(summary.created_registry);
    assert!(summary.created_cluster);
    assert_eq!(summary.login_server, LOGIN_SERVER);

    let group = runner.position("az group create --name aldar-middleware-rg --location uaenorth").unwrap();
    let registry = runner.position("az acr create --resource-group aldar-middleware-rg --name aldaracr").unwrap();
    let cluster = runner.position("az aks create --resource-group aldar-middleware-rg --name aldar-aks").unwrap();
    let credentials = runner.position("az aks get-credentials").unwrap();
    assert!(group < registry && registry < cluster && cluster < credentials);
    assert_eq!(runner.count("az aks update"), 0);

    let create = runner
        .calls()
        .into_iter()
        .find(|c| c.command_line().starts_with("az aks create"))
        .unwrap();
    assert!(create.args.iter().any(|a| a == "--attach-acr"));
    assert!(create.args.iter().any(|a| a == "--enable-managed-identity"));
    assert!(create.args.iter().any(|a| a == "--generate-ssh-keys"));
}

#[tokio::test]
async fn test_provision_existing_environment_attaches_registry() {
    let runner = FakeRunner::new();
    runner.respond("az account show", CommandOutput::ok("Aldar Production\n"));
    runner.respond("az group exists", CommandOutput::ok("true\n"));
    runner.respond("az acr show", CommandOutput::ok(LOGIN_SERVER));
    runner.respond("az aks show", CommandOutput::ok("Succeeded\n"));

    let config = DeployConfig::default();
    let progress = Progress::quiet();
    let summary = Provisioner::new(&runner, &config, &progress).run().await.unwrap();

    assert_eq!(summary.login_server, LOGIN_SERVER);
    assert!(!summary.created_resource_group && !summary.created_registry && !summary.created_cluster);
    assert_eq!(runner.count("az group create"), 0);
    assert_eq!(runner.count("az acr create"), 0);
    assert_eq!(runner.count("az aks create"), 0);
    assert_eq!(runner.count("az aks update --resource-group aldar-middleware-rg --name aldar-aks --attach-acr aldaracr"), 1);
}

#[tokio::test]
async fn test_provision_failure_reports_stage() {
    let runner = FakeRunner::new();
    runner.respond("az account show", CommandOutput::ok("Aldar Production\n"));
    runner.respond("az group exists", CommandOutput::ok("true\n"));
    runner.fail("az acr show", 3, "ResourceNotFound");
    runner.fail("az acr create", 1, "The registry name is already in use");

    let config = DeployConfig::default();
    let progress = Progress::quiet();
    let aborted = Provisioner::new(&runner, &config, &progress).run().await.unwrap_err();

    assert_eq!(aborted.stage, Stage::EnsuringRegistry);
    assert_eq!(runner.count("az aks"), 0);
}
