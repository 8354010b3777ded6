//! Event stream contracts
//!
//! - every target's events open with `TargetStarted` and close with exactly
//!   one `TargetFinished`
//! - the release report is emitted at most once per run, after every target

use std::sync::Arc;

use rollout::domain::entities::CommandSet;
use rollout::domain::ports::DeployEvent;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{PipelineKind, RunMode, Target};

use crate::common::*;

fn release_runner(target: &Target, branch: &str) -> Arc<ScriptedRunner> {
    Arc::new(
        ScriptedRunner::for_target(target)
            .on("git rev-parse --abbrev-ref HEAD", branch)
            .on("git describe", "v2.0.0")
            .on("cat ./CHANGELOG.md", "## 2.0.0\n- new dashboard\n"),
    )
}

fn run(kind: PipelineKind, answers: Vec<bool>) -> Arc<RecordingEventSink> {
    let api = target_with_commands(
        "api",
        &["app1", "app2"],
        CommandSet {
            reload: Some("pm2 reload api".to_string()),
            ..CommandSet::default()
        },
    );
    let web = target("web", &["web1"]);
    let broken = target("broken", &[]);
    let connector = Arc::new(
        ScriptedConnector::new()
            .with_runner("api", release_runner(&api, "master"))
            .with_runner("web", release_runner(&web, "develop"))
            .with_runner("broken", release_runner(&broken, "master")),
    );
    let mut harness = Harness::answering(answers);
    harness
        .orchestrator(connector)
        .run(&[api, web, broken], kind, RunMode::default());
    harness.events.clone()
}

fn assert_bracketed(events: &RecordingEventSink, target: &str) {
    let own = events.for_target(target);
    assert!(
        matches!(own.first(), Some(DeployEvent::TargetStarted { .. })),
        "{target} did not start with TargetStarted"
    );
    assert!(
        matches!(own.last(), Some(DeployEvent::TargetFinished { .. })),
        "{target} did not end with TargetFinished"
    );
    let finished = own
        .iter()
        .filter(|e| matches!(e, DeployEvent::TargetFinished { .. }))
        .count();
    assert_eq!(finished, 1, "{target} finished {finished} times");
}

#[test]
fn contract_every_target_is_bracketed() {
    let answer_sets = [vec![], vec![false, true, false], vec![true; 8]];
    for kind in [PipelineKind::Update, PipelineKind::Restart, PipelineKind::Check] {
        for answers in &answer_sets {
            let events = run(kind, answers.clone());
            for target in ["api", "web", "broken"] {
                assert_bracketed(&events, target);
            }
        }
    }
}

#[test]
fn contract_report_is_last_and_single() {
    let events = run(PipelineKind::Update, vec![]).events();
    let reports: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, DeployEvent::Report { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(reports, vec![events.len() - 1]);

    // only the target on the release branch contributes
    let DeployEvent::Report { text } = &events[events.len() - 1] else {
        unreachable!()
    };
    assert!(text.contains("Release 2.0.0 for api"));
    assert!(!text.contains("for web"));
}

#[test]
fn contract_check_never_prompts_or_mutates() {
    let api = target("api", &["app1"]);
    let runner = release_runner(&api, "master");
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::answering([false, false]);

    harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Check, RunMode::default());

    assert!(harness.prompts().is_empty());
    for forbidden in ["git reset", "git checkout", "npm install", "git fetch"] {
        assert!(!runner.ran(forbidden), "check issued `{forbidden}`");
    }
}
