//! Scenario: cutting a release from the local checkout
//!
//! Success Criteria:
//! - the patch bump starts from the latest tag and lands in package.json and CHANGELOG.md
//! - the version commit and tag are pushed only after the push gate
//! - declining the push deletes the tag and drops the version commit
//! - a rejected branch push leaves nothing behind locally

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use rollout::domain::ports::ScriptedConfirm;
use rollout::domain::services::{Bump, Version};
use rollout::domain::value_objects::Stage;
use rollout::infrastructure::{CheckoutDir, ScriptedRunner};
use rollout::{BuildRequest, Outcome, ReleaseBuilder, VersionSpec};

use crate::common::*;

const MANIFEST: &str = "{\n  \"name\": \"api\",\n  \"version\": \"1.4.2\",\n  \"private\": true\n}\n";
const UNRELEASED: &str = "# Changelog\n\n## master\n- faster search\n\n## 1.4.2\n- fixed the login redirect\n";

fn checkout(with_manifest: bool) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    if with_manifest {
        fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
    }
    fs::write(dir.path().join("CHANGELOG.md"), UNRELEASED).unwrap();
    dir
}

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|d| d.and_hms_opt(14, 5, 0))
        .unwrap()
}

fn patch() -> BuildRequest {
    BuildRequest {
        version: VersionSpec::Bump(Bump::Patch),
        at: at(),
    }
}

fn tagged_runner() -> ScriptedRunner {
    ScriptedRunner::new("api", &[]).on("git describe --abbrev=0 --tags", "v1.4.2\n")
}

fn position(runner: &ScriptedRunner, pattern: &str) -> usize {
    runner
        .commands()
        .iter()
        .position(|c| c.contains(pattern))
        .unwrap_or_else(|| panic!("`{pattern}` was not issued"))
}

#[test]
fn scenario_patch_release_is_committed_tagged_and_pushed() {
    let dir = checkout(true);
    let target = local_target("api", "master");
    let runner = tagged_runner();
    let workspace = CheckoutDir::new(dir.path());
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary =
        ReleaseBuilder::new(&target, &runner, &workspace, &confirm, &events, "master").run(patch());

    assert!(matches!(summary.outcome, Outcome::Done));
    assert_eq!(summary.version, Some(Version::new(1, 4, 3)));

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"version\": \"1.4.3\""));
    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.contains("## master\n\n## 1.4.3 2026-10-19 14:05\n- faster search"));

    let commit = position(&runner, "git commit -am \"Version 1.4.3\"");
    let tag = position(&runner, "git tag v1.4.3");
    let push = position(&runner, "git push origin master:master");
    let push_tag = position(&runner, "git push origin v1.4.3");
    assert!(commit < tag && tag < push && push < push_tag);

    assert_eq!(
        confirm.prompts()[0].message,
        "Push \"master\" to \"origin/master\" ?"
    );
    assert!(confirm.prompts()[0].default);
}

#[test]
fn scenario_declined_push_discards_the_local_release() {
    let dir = checkout(true);
    let target = local_target("api", "master");
    let runner = tagged_runner();
    let workspace = CheckoutDir::new(dir.path());
    let confirm = ScriptedConfirm::new([false]);
    let events = RecordingEventSink::new();

    let summary =
        ReleaseBuilder::new(&target, &runner, &workspace, &confirm, &events, "master").run(patch());

    assert!(matches!(
        summary.outcome,
        Outcome::Aborted {
            stage: Stage::Push,
            ..
        }
    ));
    assert!(runner.ran("git tag -d v1.4.3"));
    // once with the checkout, once more to drop the version commit
    assert_eq!(runner.count("git reset --hard origin/master"), 2);
    assert!(!runner.ran("git push"));
    assert_eq!(events.declined("api"), vec!["push"]);
}

#[test]
fn scenario_exact_version_skips_tag_lookup() {
    let dir = checkout(true);
    let target = local_target("api", "master");
    let runner = ScriptedRunner::new("api", &[]);
    let workspace = CheckoutDir::new(dir.path());
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let request = BuildRequest {
        version: VersionSpec::Exact(Version::new(2, 0, 0)),
        at: at(),
    };
    let summary =
        ReleaseBuilder::new(&target, &runner, &workspace, &confirm, &events, "master").run(request);

    assert!(matches!(summary.outcome, Outcome::Done));
    assert!(!runner.ran("git describe"));
    assert!(runner.ran("git push origin v2.0.0"));
}

#[test]
fn scenario_rejected_push_leaves_nothing_behind() {
    let dir = checkout(true);
    let target = local_target("api", "master");
    let runner = tagged_runner().fail(
        "git push origin master:master",
        1,
        "! [rejected] master -> master (fetch first)",
    );
    let workspace = CheckoutDir::new(dir.path());
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary =
        ReleaseBuilder::new(&target, &runner, &workspace, &confirm, &events, "master").run(patch());

    assert!(matches!(
        summary.outcome,
        Outcome::Failed {
            stage: Stage::Push,
            ..
        }
    ));
    assert!(runner.ran("git tag -d v1.4.3"));
    assert!(!runner.ran("git push origin v1.4.3"));
}

#[test]
fn scenario_untagged_repository_fails_before_editing() {
    let dir = checkout(true);
    let target = local_target("api", "master");
    let runner =
        ScriptedRunner::new("api", &[]).fail("git describe", 128, "fatal: No names found");
    let workspace = CheckoutDir::new(dir.path());
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary =
        ReleaseBuilder::new(&target, &runner, &workspace, &confirm, &events, "master").run(patch());

    assert!(matches!(
        summary.outcome,
        Outcome::Failed {
            stage: Stage::Version,
            ..
        }
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap(),
        UNRELEASED
    );
    assert!(!runner.ran("git commit"));
    assert!(confirm.prompts().is_empty());
}

#[test]
fn scenario_checkout_without_manifest_still_releases() {
    let dir = checkout(false);
    let target = local_target("api", "master");
    let runner = tagged_runner();
    let workspace = CheckoutDir::new(dir.path());
    let confirm = ScriptedConfirm::defaults();
    let events = RecordingEventSink::new();

    let summary = ReleaseBuilder::new(&target, &runner, &workspace, &confirm, &events, "master")
        .run(BuildRequest {
            version: VersionSpec::Bump(Bump::Minor),
            at: at(),
        });

    assert!(matches!(summary.outcome, Outcome::Done));
    assert!(!dir.path().join("package.json").exists());
    assert!(runner.ran("git tag v1.5.0"));
}
