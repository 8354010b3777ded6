//! Scenario: restarting a service host by host
//!
//! Success Criteria:
//! - each host has its own gate; declining one skips only that host
//! - `reload` is preferred unless restart is forced
//! - status is polled at most five times, one second apart
//! - status is not polled when every host was declined

use std::sync::Arc;
use std::time::Duration;

use rollout::domain::entities::CommandSet;
use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{Outcome, PipelineKind, RolloutError, RunMode};

use crate::common::*;

fn service() -> CommandSet {
    CommandSet {
        reload: Some("pm2 reload api".to_string()),
        restart: Some("pm2 restart api".to_string()),
        status: Some("pm2 status api".to_string()),
        ..CommandSet::default()
    }
}

fn run(runner: ScriptedRunner, harness: &mut Harness, mode: RunMode) -> rollout::RunSummary {
    let api = target_with_commands("api", &["app1", "app2"], service());
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", Arc::new(runner)));
    harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Restart, mode)
}

fn runner() -> ScriptedRunner {
    let api = target_with_commands("api", &["app1", "app2"], service());
    ScriptedRunner::for_target(&api)
}

#[test]
fn scenario_declining_one_host_skips_only_that_host() {
    let api = target_with_commands("api", &["app1", "app2"], service());
    let runner = Arc::new(ScriptedRunner::for_target(&api));
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::answering([true, false]);

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Restart, RunMode::default());

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert_eq!(
        harness.prompts(),
        vec![
            ("[api] Restart the app1 ?".to_string(), true),
            ("[api] Restart the app2 ?".to_string(), true),
        ]
    );
    let reloads: Vec<Vec<String>> = runner
        .issued()
        .into_iter()
        .filter(|c| c.command == "pm2 reload api")
        .map(|c| c.hosts)
        .collect();
    assert_eq!(reloads, vec![vec!["app1".to_string()]]);
    assert_eq!(harness.events.declined("api"), vec!["restart app2"]);
}

#[test]
fn scenario_declining_every_host_skips_the_status_poll() {
    let api = target_with_commands("api", &["app1", "app2"], service());
    let runner = Arc::new(ScriptedRunner::for_target(&api).fail("pm2 status api", 3, "stopped"));
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::answering([false, false]);

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Restart, RunMode::default());

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert!(!runner.ran("pm2 reload api"));
    assert_eq!(runner.count("pm2 status api"), 0);
    assert!(harness.sleeps.delays().is_empty());
    assert_eq!(
        harness.events.declined("api"),
        vec!["restart app1", "restart app2"]
    );
}

#[test]
fn scenario_forced_restart_prefers_restart_command() {
    let api = target_with_commands("api", &["app1", "app2"], service());
    let runner = Arc::new(ScriptedRunner::for_target(&api));
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::new();
    let mode = RunMode {
        prefer_restart: true,
        ..RunMode::default()
    };

    harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Restart, mode);

    assert_eq!(runner.count("pm2 restart api"), 2);
    assert!(!runner.ran("pm2 reload api"));
    // -f on restart picks the command, it does not skip the gates
    assert_eq!(harness.prompts().len(), 2);
}

#[test]
fn scenario_status_recovers_within_budget() {
    let mut harness = Harness::new();
    let summary = run(
        runner().fail_times("pm2 status api", 3, 2),
        &mut harness,
        RunMode::default(),
    );

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert_eq!(
        harness.sleeps.delays(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
}

#[test]
fn scenario_status_gives_up_after_five_attempts() {
    let api = target_with_commands("api", &["app1", "app2"], service());
    let runner = Arc::new(ScriptedRunner::for_target(&api).fail("pm2 status api", 3, "stopped"));
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Restart, RunMode::default());

    match summary.outcome("api") {
        Some(Outcome::Failed {
            stage: Stage::PostActions,
            error: RolloutError::PollTimeout { attempts, .. },
        }) => assert_eq!(*attempts, 5),
        other => panic!("expected poll timeout, got {other:?}"),
    }
    assert_eq!(runner.count("pm2 status api"), 5);
    assert_eq!(harness.sleeps.delays(), vec![Duration::from_secs(1); 4]);
}
