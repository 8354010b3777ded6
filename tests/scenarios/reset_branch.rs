//! Scenario: resetting deployed branches onto another branch
//!
//! Success Criteria:
//! - each target's branch is checked out, reset onto `origin/<onto>` and pushed after its gate
//! - declining one target's push skips only that target
//! - the branch always ends back at its own origin tip
//! - a rejected push fails the target

use std::sync::Arc;

use rollout::domain::ports::ScriptedConfirm;
use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{ScriptedConnector, ScriptedRunner};
use rollout::{BranchReset, Outcome, Target};

use crate::common::*;

fn targets() -> Vec<Target> {
    vec![local_target("api", "staging"), local_target("web", "staging")]
}

fn connector(api: &Arc<ScriptedRunner>, web: &Arc<ScriptedRunner>) -> ScriptedConnector {
    ScriptedConnector::new()
        .with_runner("api", api.clone())
        .with_runner("web", web.clone())
}

#[test]
fn scenario_every_target_is_reset_and_pushed() {
    let api = Arc::new(
        ScriptedRunner::new("api", &[]).on("git log", "1a2b3c4 (origin/master) Version 1.4.3"),
    );
    let web = Arc::new(ScriptedRunner::new("web", &[]));
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary = BranchReset::new(&connector(&api, &web), &confirm, &events, "master")
        .run(&targets());

    assert!(matches!(summary.outcome("api"), Some(Outcome::Done)));
    assert!(matches!(summary.outcome("web"), Some(Outcome::Done)));
    assert_eq!(
        api.commands(),
        vec![
            "git fetch --prune",
            "git checkout staging",
            "git reset --hard origin/master",
            "git log --oneline --decorate -n 2",
            "git push origin staging:staging",
            "git reset --hard origin/staging",
        ]
    );
    assert!(web.ran("git push origin staging:staging"));
    assert_eq!(
        confirm.prompts()[0].message,
        "Do you want to push ~/src/api:staging ?"
    );
    assert!(confirm.prompts()[0].default);
    assert_eq!(
        events.outputs("api"),
        vec![(
            "local".to_string(),
            "git log".to_string(),
            "1a2b3c4 (origin/master) Version 1.4.3".to_string()
        )]
    );
}

#[test]
fn scenario_declined_target_is_restored_and_others_continue() {
    let api = Arc::new(ScriptedRunner::new("api", &[]));
    let web = Arc::new(ScriptedRunner::new("web", &[]));
    let confirm = ScriptedConfirm::new([false]);
    let events = RecordingEventSink::new();

    let summary = BranchReset::new(&connector(&api, &web), &confirm, &events, "master")
        .run(&targets());

    assert!(matches!(
        summary.outcome("api"),
        Some(Outcome::Aborted {
            stage: Stage::Push,
            ..
        })
    ));
    assert!(!api.ran("git push"));
    assert!(api.ran("git reset --hard origin/staging"));
    assert_eq!(events.declined("api"), vec!["push"]);
    assert!(matches!(summary.outcome("web"), Some(Outcome::Done)));
    assert!(web.ran("git push origin staging:staging"));
    assert!(!summary.has_failures());
}

#[test]
fn scenario_force_push_passes_the_flag() {
    let api = Arc::new(ScriptedRunner::new("api", &[]));
    let web = Arc::new(ScriptedRunner::new("web", &[]));
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    BranchReset::new(&connector(&api, &web), &confirm, &events, "develop")
        .with_force_push(true)
        .run(&targets()[..1]);

    assert!(api.ran("git reset --hard origin/develop"));
    assert!(api.ran("git push -f origin staging:staging"));
    assert!(web.commands().is_empty());
}

#[test]
fn scenario_rejected_push_fails_and_restores() {
    let api = Arc::new(ScriptedRunner::new("api", &[]).fail(
        "git push origin staging:staging",
        1,
        "! [rejected] staging -> staging (non-fast-forward)",
    ));
    let web = Arc::new(ScriptedRunner::new("web", &[]));
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary = BranchReset::new(&connector(&api, &web), &confirm, &events, "master")
        .run(&targets());

    assert!(matches!(
        summary.outcome("api"),
        Some(Outcome::Failed {
            stage: Stage::Push,
            ..
        })
    ));
    assert_eq!(api.count("git reset --hard origin/staging"), 1);
    assert!(summary.has_failures());
    assert!(matches!(summary.outcome("web"), Some(Outcome::Done)));
}
