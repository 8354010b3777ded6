//! Scenario: a host is checked out on the wrong branch
//!
//! Success Criteria:
//! - the target fails at init, naming the host and both branches
//! - nothing but the branch lookup is issued

use std::sync::Arc;

use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{Outcome, PipelineKind, RolloutError, RunMode};

use crate::common::*;

#[test]
fn scenario_wrong_branch_stops_before_fetch() {
    let worker = target("worker", &["job1"]);
    let runner = Arc::new(
        ScriptedRunner::for_target(&worker).on("git rev-parse --abbrev-ref HEAD", "develop"),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("worker", runner.clone()));
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .run(&[worker], PipelineKind::Update, RunMode::default());

    match summary.outcome("worker") {
        Some(Outcome::Failed {
            stage: Stage::Init,
            error:
                RolloutError::BranchMismatch {
                    host,
                    expected,
                    actual,
                    ..
                },
        }) => {
            assert_eq!(host, "job1");
            assert_eq!(expected, "master");
            assert_eq!(actual, "develop");
        }
        other => panic!("expected branch mismatch at init, got {other:?}"),
    }
    assert_eq!(runner.commands(), vec!["git rev-parse --abbrev-ref HEAD"]);
    assert!(harness.prompts().is_empty());
    assert!(summary.has_failures());
}

#[test]
fn scenario_mismatch_on_second_host_is_reported_for_that_host() {
    let api = target("api", &["app1", "app2"]);
    let runner = Arc::new(
        ScriptedRunner::for_target(&api)
            .on("git rev-parse --abbrev-ref HEAD", "master")
            .on_host("app2", "git rev-parse --abbrev-ref HEAD", "hotfix"),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner));
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Update, RunMode::default());

    let Some(Outcome::Failed { error, .. }) = summary.outcome("api") else {
        panic!("expected failure");
    };
    assert!(error.to_string().contains("app2"));
}
