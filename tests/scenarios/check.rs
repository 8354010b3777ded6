//! Scenario: steady-state health check
//!
//! Success Criteria:
//! - busy processes are reported per host, never prompted for
//! - warnings are advisory: the target still finishes cleanly

use std::sync::Arc;

use rollout::domain::ports::DeployEvent;
use rollout::domain::value_objects::HealthWarningKind;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{Outcome, PipelineKind, RunMode};

use crate::common::*;

#[test]
fn scenario_busy_hosts_are_reported() {
    let api = target("api", &["app1", "app2"]);
    let runner = Arc::new(
        ScriptedRunner::for_target(&api)
            .on_host(
                "app2",
                "ps -eo pcpu",
                "97.0  4242 deploy node server.js\n 0.3     1 root   /sbin/init",
            )
            .fail_on_host("app1", "pgrep", 1, ""),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::new();

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Check, RunMode::default());

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert!(harness.prompts().is_empty());

    let warnings: Vec<_> = harness
        .events
        .for_target("api")
        .into_iter()
        .filter_map(|e| match e {
            DeployEvent::Warning { warning, .. } => Some(warning),
            _ => None,
        })
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].host, "app2");
    assert_eq!(warnings[0].kind, HealthWarningKind::HighCpu);
    assert!(warnings[0].detail.starts_with("97.0"));
    assert!(!runner.ran("git"));
}
