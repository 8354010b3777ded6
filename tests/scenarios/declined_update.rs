//! Scenario: the operator says no at the update gate
//!
//! Success Criteria:
//! - every host is reset to the commit it had right before the gate
//! - nothing is installed or restarted
//! - the target is aborted, which is not a failure

use std::sync::Arc;

use rollout::domain::entities::CommandSet;
use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{Outcome, PipelineKind, RunMode};

use crate::common::*;

fn service() -> CommandSet {
    CommandSet {
        reload: Some("pm2 reload api".to_string()),
        ..CommandSet::default()
    }
}

#[test]
fn scenario_decline_restores_recorded_tips() {
    let api = target_with_commands("api", &["app1", "app2"], service());
    let runner = Arc::new(
        ScriptedRunner::for_target(&api)
            .on("git rev-parse --abbrev-ref HEAD", "master")
            .with_git("a1b2c3d", "master", "e4f5a6b"),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::answering([false]);

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Update, RunMode::default());

    assert!(matches!(
        summary.outcome("api"),
        Some(Outcome::Aborted {
            stage: Stage::AwaitConfirm,
            ..
        })
    ));
    assert!(!summary.has_failures());
    assert_eq!(runner.head("app1").as_deref(), Some("a1b2c3d"));
    assert_eq!(runner.head("app2").as_deref(), Some("a1b2c3d"));
    assert_eq!(runner.count("git reset --hard a1b2c3d"), 2);
    assert!(!runner.ran("git reset --hard origin/master"));
    assert!(!runner.ran("npm install"));
    assert!(!runner.ran("pm2 reload"));
    assert_eq!(harness.events.declined("api"), vec!["update"]);
    assert_eq!(harness.prompts().len(), 1);
}

#[test]
fn scenario_accept_moves_hosts_to_origin() {
    let api = target("api", &["app1", "app2"]);
    let runner = Arc::new(
        ScriptedRunner::for_target(&api)
            .on("git rev-parse --abbrev-ref HEAD", "master")
            .with_git("a1b2c3d", "master", "e4f5a6b"),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::new();

    harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Update, RunMode::default());

    assert_eq!(runner.head("app1").as_deref(), Some("e4f5a6b"));
    assert_eq!(runner.head("app2").as_deref(), Some("e4f5a6b"));
}

#[test]
fn scenario_failing_checks_default_the_gate_to_no() {
    let api = target("api", &["app1"]);
    let changelog_diff = "@@ -1,4 +1,6 @@\n ## master\n+- fixed the login redirect\n+- fixed the login redirect\n ## 1.4.2\n";
    let runner = Arc::new(
        ScriptedRunner::for_target(&api)
            .on("git rev-parse --abbrev-ref HEAD", "master")
            .on("CHANGELOG.md", changelog_diff)
            .with_git("a1b2c3d", "master", "e4f5a6b"),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Update, RunMode::default());

    assert_eq!(
        harness.prompts()[0],
        ("Do you want to update the api ?".to_string(), false)
    );
    assert!(harness.events.findings("api").contains(&"changelog".to_string()));
    assert!(matches!(summary.outcome("api"), Some(Outcome::Aborted { .. })));
    assert_eq!(runner.head("app1").as_deref(), Some("a1b2c3d"));
}
