//! Scenario: several targets in one run
//!
//! Success Criteria:
//! - a target that cannot connect or fails mid-pipeline never stops the others
//! - outcomes come back in selection order, sequential or parallel
//! - prompts from parallel targets name the target they belong to
//! - an interrupt skips targets that have not started

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{Outcome, OutcomeKind, PipelineKind, RunMode, Target};

use crate::common::*;

fn healthy(target: &Target) -> Arc<ScriptedRunner> {
    Arc::new(
        ScriptedRunner::for_target(target).on("git rev-parse --abbrev-ref HEAD", "master"),
    )
}

fn targets() -> Vec<Target> {
    vec![
        target("api", &["app1"]),
        target("broken", &["old1"]),
        target("web", &["web1", "web2"]),
    ]
}

#[test]
fn scenario_unreachable_target_does_not_stop_the_rest() {
    let targets = targets();
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_runner("api", healthy(&targets[0]))
            .with_runner("web", healthy(&targets[2])),
    );
    let mut harness = Harness::new();

    let summary = harness.orchestrator(connector.clone()).run(
        &targets,
        PipelineKind::Update,
        RunMode::default(),
    );

    let names: Vec<&str> = summary.outcomes.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["api", "broken", "web"]);
    assert!(matches!(
        summary.outcome("broken"),
        Some(Outcome::Failed {
            stage: Stage::Init,
            ..
        })
    ));
    assert_eq!(summary.count(OutcomeKind::Done), 2);
    assert_eq!(connector.connected(), vec!["api", "broken", "web"]);
}

#[test]
fn scenario_failed_install_is_isolated() {
    let targets = targets();
    let broken = Arc::new(
        ScriptedRunner::for_target(&targets[1])
            .on("git rev-parse --abbrev-ref HEAD", "master")
            .fail("npm install", 1, "npm ERR! network timeout"),
    );
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_runner("api", healthy(&targets[0]))
            .with_runner("broken", broken)
            .with_runner("web", healthy(&targets[2])),
    );
    // every target: update yes, install yes
    let mut harness = Harness::answering([true; 6]);

    let summary = harness
        .orchestrator(connector)
        .run(&targets, PipelineKind::Update, RunMode::default());

    let Some(Outcome::Failed { stage, error }) = summary.outcome("broken") else {
        panic!("expected broken to fail");
    };
    assert_eq!(*stage, Stage::Apply);
    assert!(error.to_string().contains("network timeout"));
    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert!(matches!(summary.outcome("web"), Some(Outcome::Done)));
    assert!(summary.has_failures());
}

#[test]
fn scenario_parallel_run_keeps_selection_order() {
    let targets = vec![target("api", &["app1"]), target("web", &["web1"])];
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_runner("api", healthy(&targets[0]))
            .with_runner("web", healthy(&targets[1])),
    );
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .with_parallel(true)
        .run(&targets, PipelineKind::Check, RunMode::default());

    let names: Vec<&str> = summary.outcomes.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["api", "web"]);
    assert_eq!(summary.count(OutcomeKind::Done), 2);
}

#[test]
fn scenario_parallel_update_prompts_name_their_target() {
    let targets = vec![target("api", &["app1"]), target("web", &["web1"])];
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_runner("api", healthy(&targets[0]))
            .with_runner("web", healthy(&targets[1])),
    );
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .with_parallel(true)
        .run(&targets, PipelineKind::Update, RunMode::default());

    assert_eq!(summary.count(OutcomeKind::Done), 2);
    let mut messages: Vec<String> = harness.prompts().into_iter().map(|(m, _)| m).collect();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "Do you want to update the api ?",
            "Do you want to update the web ?",
            "[api] Run `npm install` ?",
            "[web] Run `npm install` ?",
        ]
    );
}

#[test]
fn scenario_interrupt_skips_pending_targets() {
    let targets = targets();
    let connector = Arc::new(ScriptedConnector::new());
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector.clone())
        .with_interrupt(Arc::new(AtomicBool::new(true)))
        .run(&targets, PipelineKind::Update, RunMode::default());

    assert_eq!(summary.count(OutcomeKind::Aborted), 3);
    assert!(!summary.has_failures());
    assert!(connector.connected().is_empty());
}
