//! Release build
//!
//! Cuts a release in a target's local checkout of the release branch:
//!
//! ```text
//! Checkout -> Version -> Bump -> Tag -> Push
//! ```
//!
//! The version commit and tag stay local until the push gate is accepted;
//! declining it deletes the tag and drops the commit.

use chrono::NaiveDateTime;

use crate::domain::entities::Target;
use crate::domain::ports::{CommandRunner, Confirm, DeployEvent, DeployEventSink, Workspace};
use crate::domain::services::changelog::insert_release_header;
use crate::domain::services::{set_manifest_version, Bump, Version};
use crate::domain::value_objects::{Outcome, RunOptions, Stage};
use crate::error::{RolloutError, RolloutResult};

use super::gate::Gate;
use super::pipeline::{Pipeline, PipelineContext, Step};

pub const MANIFEST: &str = "package.json";
pub const CHANGELOG: &str = "CHANGELOG.md";

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// How the release version is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSpec {
    Exact(Version),
    /// Bump the newest tag reachable from the branch
    Bump(Bump),
}

#[derive(Debug, Clone, Copy)]
pub struct BuildRequest {
    pub version: VersionSpec,
    /// Stamped on the new changelog header
    pub at: NaiveDateTime,
}

/// State threaded through the build steps
pub struct BuildRun<'a> {
    target: &'a Target,
    branch: &'a str,
    runner: &'a dyn CommandRunner,
    workspace: &'a dyn Workspace,
    gate: Gate<'a>,
    events: &'a dyn DeployEventSink,
    request: BuildRequest,
    pub version: Option<Version>,
}

impl PipelineContext for BuildRun<'_> {
    fn subject(&self) -> &str {
        &self.target.name
    }

    fn events(&self) -> &dyn DeployEventSink {
        self.events
    }
}

impl BuildRun<'_> {
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<String> {
        Ok(self.runner.local(command, opts)?.stdout)
    }

    fn version(&self) -> RolloutResult<Version> {
        self.version
            .ok_or_else(|| RolloutError::config(&self.target.name, "release version not resolved"))
    }

    fn show(&self, title: &str, output: String) {
        if output.trim().is_empty() {
            return;
        }
        self.events.on_event(DeployEvent::CommandOutput {
            target: self.target.name.clone(),
            host: "local".to_string(),
            title: title.to_string(),
            output: output.trim_end().to_string(),
        });
    }

    /// Drop the local tag and version commit
    fn discard(&self) -> RolloutResult<()> {
        let version = self.version()?;
        tracing::info!(target_name = %self.target.name, tag = %version.tag(), "discarding local release");
        self.runner
            .local(&format!("git tag -d {}", version.tag()), &RunOptions::muted())?;
        self.runner.local(
            &format!("git reset --hard origin/{}", self.branch),
            &RunOptions::muted(),
        )?;
        Ok(())
    }
}

pub fn build_steps<'a>() -> Vec<Step<BuildRun<'a>>> {
    vec![
        Step::new(Stage::Checkout, "checkout", checkout),
        Step::new(Stage::Version, "resolve-version", resolve_version),
        Step::new(Stage::Bump, "manifest", bump_manifest),
        Step::new(Stage::Bump, "changelog", bump_changelog),
        Step::new(Stage::Tag, "commit", commit),
        Step::new(Stage::Tag, "tag", tag),
        Step::new(Stage::Push, "review", review),
        Step::new(Stage::Push, "confirm-push", confirm_push),
        Step::new(Stage::Push, "push", push),
        Step::new(Stage::Push, "push-tag", push_tag),
    ]
}

fn checkout(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let b = run.branch;
    run.local(
        &format!("git fetch --prune && git checkout {b} && git reset --hard origin/{b}"),
        &RunOptions::default(),
    )?;
    Ok(())
}

fn resolve_version(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let version = match run.request.version {
        VersionSpec::Exact(version) => version,
        VersionSpec::Bump(bump) => {
            let latest = run.local("git describe --abbrev=0 --tags", &RunOptions::muted())?;
            Version::parse(&latest)?.bump(bump)
        }
    };
    tracing::info!(target_name = %run.target.name, version = %version, "cooking the release");
    run.version = Some(version);
    Ok(())
}

fn bump_manifest(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    if !run.workspace.exists(MANIFEST) {
        tracing::warn!(target_name = %run.target.name, "no {MANIFEST}, version not recorded there");
        return Ok(());
    }
    let version = run.version()?;
    let manifest = run.workspace.read(MANIFEST)?;
    match set_manifest_version(&manifest, &version)? {
        Some(updated) => run.workspace.write(MANIFEST, &updated)?,
        None => tracing::warn!(target_name = %run.target.name, "{MANIFEST} has no version field"),
    }
    Ok(())
}

fn bump_changelog(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let version = run.version()?;
    let changelog = run.workspace.read(CHANGELOG)?;
    let stamp = run.request.at.format(STAMP_FORMAT).to_string();
    let updated = insert_release_header(&changelog, &version, &stamp)?;
    run.workspace.write(CHANGELOG, &updated)
}

fn commit(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let version = run.version()?;
    run.local(
        &format!("git commit -am \"Version {version}\""),
        &RunOptions::muted(),
    )?;
    Ok(())
}

fn tag(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let tag = run.version()?.tag();
    tracing::info!(target_name = %run.target.name, tag = %tag, "adding tag");
    run.local(&format!("git tag {tag}"), &RunOptions::muted())?;
    Ok(())
}

fn review(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let quiet = RunOptions::quiet();
    let changelog = run.local(&format!("head -n20 {CHANGELOG}"), &quiet)?;
    run.show(CHANGELOG, changelog);
    let manifest = run.local(&format!("grep '\"version\"' {MANIFEST}"), &quiet)?;
    run.show(MANIFEST, manifest);
    let log = run.local("git log --oneline --decorate -n10", &quiet)?;
    run.show("git log", log);
    Ok(())
}

fn confirm_push(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let b = run.branch;
    let message = format!("Push \"{b}\" to \"origin/{b}\" ?");
    if run.gate.ask(&message, true, true)? {
        return Ok(());
    }

    run.discard()?;
    run.events.on_event(DeployEvent::Declined {
        target: run.target.name.clone(),
        gate: "push".to_string(),
    });
    Err(RolloutError::UserDeclined {
        target: run.target.name.clone(),
        gate: "push".to_string(),
    })
}

fn push(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let b = run.branch;
    tracing::info!(target_name = %run.target.name, branch = b, "pushing release");
    if let Err(err) = run.local(&format!("git push origin {b}:{b}"), &RunOptions::verbose()) {
        // nothing was published; leave the checkout as it was
        run.discard()?;
        return Err(err);
    }
    Ok(())
}

fn push_tag(run: &mut BuildRun<'_>) -> RolloutResult<()> {
    let tag = run.version()?.tag();
    run.local(&format!("git push origin {tag}"), &RunOptions::verbose())?;
    Ok(())
}

/// Result of one build
#[derive(Debug)]
pub struct BuildSummary {
    pub outcome: Outcome,
    /// Resolved release version, when the run got that far
    pub version: Option<Version>,
}

/// Builds a release from one target's local checkout
pub struct ReleaseBuilder<'a> {
    target: &'a Target,
    runner: &'a dyn CommandRunner,
    workspace: &'a dyn Workspace,
    confirm: &'a dyn Confirm,
    events: &'a dyn DeployEventSink,
    branch: &'a str,
}

impl<'a> ReleaseBuilder<'a> {
    pub fn new(
        target: &'a Target,
        runner: &'a dyn CommandRunner,
        workspace: &'a dyn Workspace,
        confirm: &'a dyn Confirm,
        events: &'a dyn DeployEventSink,
        branch: &'a str,
    ) -> Self {
        Self {
            target,
            runner,
            workspace,
            confirm,
            events,
            branch,
        }
    }

    pub fn run(&self, request: BuildRequest) -> BuildSummary {
        self.events.on_event(DeployEvent::TargetStarted {
            target: self.target.name.clone(),
            hosts: vec!["local".to_string()],
        });

        let mut run = BuildRun {
            target: self.target,
            branch: self.branch,
            runner: self.runner,
            workspace: self.workspace,
            gate: Gate::new(self.confirm, false),
            events: self.events,
            request,
            version: None,
        };
        let outcome = Pipeline::new(build_steps()).run(&mut run);

        self.events.on_event(DeployEvent::TargetFinished {
            target: self.target.name.clone(),
            outcome: outcome.kind(),
            stage: outcome.stage(),
            detail: outcome.detail(),
        });
        BuildSummary {
            outcome,
            version: run.version,
        }
    }
}
