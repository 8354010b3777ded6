//! Scenario: merging the release branch into the working branches
//!
//! Success Criteria:
//! - a clean changelog pushes by default
//! - duplicate changelog entries default the push gate to no and reset the branch
//! - a branch that cannot be checked out fails without touching the others

use std::sync::Arc;

use rollout::domain::entities::{LocalConfig, RemoteConfig};
use rollout::domain::ports::ScriptedConfirm;
use rollout::domain::value_objects::Stage;
use rollout::infrastructure::ScriptedRunner;
use rollout::{BranchMerger, Outcome, Target};

use crate::common::*;

const CLEAN_DIFF: &str = "@@ -1,3 +1,4 @@\n ## master\n+- faster search\n ## 1.4.2\n";
const DUPLICATE_DIFF: &str =
    "@@ -1,3 +1,5 @@\n ## master\n+- fixed the login redirect\n+- fixed the login redirect\n ## 1.4.2\n";

fn checkout() -> Target {
    Target::new(
        "api",
        RemoteConfig::default(),
        LocalConfig {
            branch: "master".to_string(),
            path: Some("~/src/api".to_string()),
            url: None,
        },
    )
}

#[test]
fn scenario_clean_merge_pushes_every_branch() {
    let target = checkout();
    let runner = ScriptedRunner::new("api", &[]).on("CHANGELOG.md", CLEAN_DIFF);
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let branches = vec!["test".to_string(), "staging".to_string()];
    let summary =
        BranchMerger::new(&target, &runner, &confirm, &events, "master").run(&branches, false);

    assert!(summary.failed_branches().is_empty());
    assert!(runner.ran("git push origin test:test"));
    assert!(runner.ran("git push origin staging:staging"));
    assert_eq!(
        confirm.prompts()[0].message,
        "~/src/api: push branch \"test\" to \"origin/test\"?"
    );
    assert!(confirm.prompts()[0].default);
}

#[test]
fn scenario_duplicate_entries_hold_the_push() {
    let target = checkout();
    let runner = ScriptedRunner::new("api", &[]).on("CHANGELOG.md", DUPLICATE_DIFF);
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary = BranchMerger::new(&target, &runner, &confirm, &events, "master")
        .run(&["test".to_string()], false);

    assert!(matches!(
        summary.outcomes[0].1,
        Outcome::Aborted {
            stage: Stage::Push,
            ..
        }
    ));
    assert_eq!(summary.failed_branches(), vec!["test"]);
    assert!(!confirm.prompts()[0].default);
    assert!(!runner.ran("git push"));
    // once with the checkout, once more to undo the merge
    assert_eq!(runner.count("git reset --hard origin/test"), 2);
    assert_eq!(events.findings("test"), vec!["changelog"]);
}

#[test]
fn scenario_forced_merge_still_refuses_a_bad_changelog() {
    let target = checkout();
    let runner = ScriptedRunner::new("api", &[]).on("CHANGELOG.md", DUPLICATE_DIFF);
    let confirm = Arc::new(ScriptedConfirm::defaults());
    let events = RecordingEventSink::new();

    BranchMerger::new(&target, &runner, confirm.as_ref(), &events, "master")
        .run(&["test".to_string()], true);

    assert!(confirm.prompts().is_empty());
    assert!(!runner.ran("git push"));
    assert_eq!(
        events.declined("test"),
        vec!["push (changelog checks failed)"]
    );
}

#[test]
fn scenario_failed_checkout_does_not_stop_other_branches() {
    let target = checkout();
    let runner = ScriptedRunner::new("api", &[])
        .fail("git checkout demo", 1, "error: pathspec 'demo' did not match")
        .on("CHANGELOG.md", CLEAN_DIFF);
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let branches = vec!["demo".to_string(), "test".to_string()];
    let summary =
        BranchMerger::new(&target, &runner, &confirm, &events, "master").run(&branches, false);

    assert!(matches!(
        summary.outcomes[0].1,
        Outcome::Failed {
            stage: Stage::Checkout,
            ..
        }
    ));
    assert!(matches!(summary.outcomes[1].1, Outcome::Done));
    assert!(summary.has_failures());
    assert_eq!(summary.failed_branches(), vec!["demo"]);
}
