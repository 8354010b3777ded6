//! Scenario: ad-hoc commands on every host
//!
//! Success Criteria:
//! - a `cmd` key expands to the configured command and runs on every host
//! - each host's output is shown under the command it ran
//! - a failing host fails the target without hiding the others' output
//! - an unconfigured log fails before anything runs

use std::sync::Arc;

use rollout::domain::entities::{CommandSet, NamedPaths};
use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{ExecRequest, Outcome, RemoteExec, RolloutError, Target};

use crate::common::*;

fn api() -> Target {
    let mut target = target_with_commands(
        "api",
        &["app1", "app2"],
        CommandSet {
            status: Some("pm2 status api".to_string()),
            ..CommandSet::default()
        },
    );
    target.remote.cat = Some(NamedPaths::Single("config.json".to_string()));
    target
}

fn status() -> ExecRequest {
    ExecRequest::Command {
        command: "status".to_string(),
        args: Vec::new(),
        user: None,
    }
}

#[test]
fn scenario_command_key_runs_on_every_host() {
    let target = api();
    let runner = Arc::new(
        ScriptedRunner::for_target(&target)
            .on_host("app1", "pm2 status api", "online")
            .on_host("app2", "pm2 status api", "stopped"),
    );
    let connector = ScriptedConnector::new().with_runner("api", runner.clone());
    let events = RecordingEventSink::new();

    let summary = RemoteExec::new(&connector, &events).run(&[target], &status());

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    let issued = runner.issued();
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].command, "pm2 status api");
    assert_eq!(issued[0].hosts, vec!["app1".to_string(), "app2".to_string()]);
    assert_eq!(
        events.outputs("api"),
        vec![
            ("app1".to_string(), "pm2 status api".to_string(), "online".to_string()),
            ("app2".to_string(), "pm2 status api".to_string(), "stopped".to_string()),
        ]
    );
}

#[test]
fn scenario_failing_host_fails_the_target() {
    let target = api();
    let runner = Arc::new(
        ScriptedRunner::for_target(&target)
            .on_host("app1", "cat config.json", "{ \"port\": 8080 }")
            .fail_on_host("app2", "cat config.json", 1, "cat: config.json: No such file"),
    );
    let connector = ScriptedConnector::new().with_runner("api", runner);
    let events = RecordingEventSink::new();

    let summary =
        RemoteExec::new(&connector, &events).run(&[target], &ExecRequest::Cat { name: None });

    match summary.outcome("api") {
        Some(Outcome::Failed {
            stage: Stage::Apply,
            error: RolloutError::Command { host, .. },
        }) => assert_eq!(host, "app2"),
        other => panic!("expected a command failure on app2, got {other:?}"),
    }
    assert_eq!(events.outputs("api").len(), 1);
}

#[test]
fn scenario_unconfigured_log_runs_nothing() {
    let target = api();
    let runner = Arc::new(ScriptedRunner::for_target(&target));
    let connector = ScriptedConnector::new().with_runner("api", runner.clone());
    let events = RecordingEventSink::new();

    let request = ExecRequest::Log {
        name: None,
        lines: 100,
        follow: false,
    };
    let summary = RemoteExec::new(&connector, &events).run(&[target], &request);

    assert!(summary.has_failures());
    assert!(runner.commands().is_empty());
}
