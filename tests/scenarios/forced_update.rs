//! Scenario: `update -f` on an unattended run
//!
//! Success Criteria:
//! - no prompt is shown and the branch lookup is skipped
//! - the branch is checked out explicitly before the reset
//! - migrations are reported but never run

use std::sync::Arc;

use rollout::domain::entities::CommandSet;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{Outcome, PipelineKind, RunMode};

use crate::common::*;

#[test]
fn scenario_forced_update_never_prompts_or_migrates() {
    let api = target_with_commands(
        "api",
        &["app1", "app2"],
        CommandSet {
            reload: Some("pm2 reload api".to_string()),
            ..CommandSet::default()
        },
    );
    let runner = Arc::new(
        ScriptedRunner::for_target(&api)
            .on("--name-only", "migrations/2024_add_users.sql")
            .on("package.json", PACKAGE_DIFF_ONE_DEPENDENCY),
    );
    let connector = Arc::new(ScriptedConnector::new().with_runner("api", runner.clone()));
    let mut harness = Harness::new();
    let mode = RunMode {
        bypass_gates: true,
        ..RunMode::default()
    };

    let summary = harness
        .orchestrator(connector)
        .run(&[api], PipelineKind::Update, mode);

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert!(harness.prompts().is_empty());
    assert!(!runner.ran("--abbrev-ref"));
    assert!(!runner.ran("npm run migrate"));
    assert!(runner.ran("npm install"));
    assert_eq!(runner.count("pm2 reload api"), 2);

    let commands = runner.commands();
    let checkout = commands.iter().position(|c| c == "git checkout master");
    let reset = commands
        .iter()
        .position(|c| c == "git reset --hard origin/master");
    assert!(checkout.is_some() && checkout < reset);
}
