//! Release-branch merge
//!
//! Merges the release branch into a list of branches of a target's local
//! checkout, one pipeline run per branch:
//!
//! ```text
//! Checkout -> Merge -> Audit -> Push
//! ```
//!
//! A failed merge or a declined push resets the branch to its origin tip.

use crate::domain::entities::Target;
use crate::domain::ports::{CommandRunner, Confirm, DeployEvent, DeployEventSink};
use crate::domain::value_objects::{checks, CheckResult, Outcome, RunOptions, Stage};
use crate::error::{RolloutError, RolloutResult};

use super::diagnose::ChangelogAudit;
use super::gate::Gate;
use super::pipeline::{Pipeline, PipelineContext, Step};

/// Per-branch state threaded through the merge steps
pub struct MergeRun<'a> {
    target: &'a Target,
    branch: &'a str,
    release_branch: &'a str,
    runner: &'a dyn CommandRunner,
    gate: Gate<'a>,
    events: &'a dyn DeployEventSink,
    pub audit: ChangelogAudit,
}

impl PipelineContext for MergeRun<'_> {
    fn subject(&self) -> &str {
        self.branch
    }

    fn events(&self) -> &dyn DeployEventSink {
        self.events
    }
}

impl MergeRun<'_> {
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<String> {
        Ok(self.runner.local(command, opts)?.stdout)
    }

    fn reset(&self) -> RolloutResult<()> {
        tracing::info!(branch = self.branch, "resetting branch to origin");
        self.runner.local(
            &format!("git reset --hard origin/{}", self.branch),
            &RunOptions::muted(),
        )?;
        Ok(())
    }

    fn emit(&self, event: DeployEvent) {
        self.events.on_event(event);
    }
}

pub fn merge_steps<'a>() -> Vec<Step<MergeRun<'a>>> {
    vec![
        Step::new(Stage::Checkout, "checkout", checkout),
        Step::new(Stage::Merge, "merge", merge_release),
        Step::new(Stage::Audit, "changelog", audit_changelog),
        Step::new(Stage::Push, "confirm-push", confirm_push),
        Step::new(Stage::Push, "push", push),
    ]
}

fn checkout(run: &mut MergeRun<'_>) -> RolloutResult<()> {
    let b = run.branch;
    run.local(
        &format!("git checkout {b} && git fetch --prune && git reset --hard origin/{b}"),
        &RunOptions::default(),
    )?;
    Ok(())
}

fn merge_release(run: &mut MergeRun<'_>) -> RolloutResult<()> {
    let cmd = format!("git pull origin {}", run.release_branch);
    if let Err(err) = run.local(&cmd, &RunOptions::default()) {
        run.reset()?;
        return Err(err);
    }
    Ok(())
}

fn audit_changelog(run: &mut MergeRun<'_>) -> RolloutResult<()> {
    let base = format!("origin/{}", run.release_branch);
    let audit = ChangelogAudit::for_merge(&base, |cmd| run.local(cmd, &RunOptions::muted()))?;

    if !audit.is_empty() {
        run.emit(DeployEvent::CommandOutput {
            target: run.branch.to_string(),
            host: "local".to_string(),
            title: format!("git diff {base} -- CHANGELOG.md"),
            output: audit.diff.trim_end().to_string(),
        });
    }
    let violations = audit.violations();
    if !violations.is_empty() {
        run.emit(DeployEvent::Finding {
            target: run.branch.to_string(),
            name: checks::CHANGELOG.to_string(),
            result: CheckResult::new("CHANGELOG.md checks failed", violations.join("\n")),
        });
    }

    run.audit = audit;
    Ok(())
}

fn confirm_push(run: &mut MergeRun<'_>) -> RolloutResult<()> {
    let ok = run.audit.ok();
    let message = format!(
        "{}: push branch \"{}\" to \"origin/{}\"?",
        run.target.local.path.as_deref().unwrap_or("."),
        run.branch,
        run.branch
    );
    if run.gate.ask(&message, ok, ok)? {
        return Ok(());
    }

    run.reset()?;
    let gate = if run.gate.is_bypassed() {
        "push (changelog checks failed)"
    } else {
        "push"
    };
    run.emit(DeployEvent::Declined {
        target: run.branch.to_string(),
        gate: gate.to_string(),
    });
    Err(RolloutError::UserDeclined {
        target: run.branch.to_string(),
        gate: gate.to_string(),
    })
}

fn push(run: &mut MergeRun<'_>) -> RolloutResult<()> {
    let b = run.branch;
    tracing::info!(branch = b, "pushing to origin");
    run.local(&format!("git push origin {b}:{b}"), &RunOptions::verbose())?;
    Ok(())
}

/// Result of merging into every requested branch
#[derive(Debug, Default)]
pub struct MergeSummary {
    pub outcomes: Vec<(String, Outcome)>,
}

impl MergeSummary {
    /// Branches that were not pushed, in run order
    pub fn failed_branches(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !matches!(o, Outcome::Done))
            .map(|(b, _)| b.as_str())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, o)| o.is_failure())
    }
}

/// Runs the merge pipeline for each branch of one target's local checkout
pub struct BranchMerger<'a> {
    target: &'a Target,
    runner: &'a dyn CommandRunner,
    confirm: &'a dyn Confirm,
    events: &'a dyn DeployEventSink,
    release_branch: &'a str,
}

impl<'a> BranchMerger<'a> {
    pub fn new(
        target: &'a Target,
        runner: &'a dyn CommandRunner,
        confirm: &'a dyn Confirm,
        events: &'a dyn DeployEventSink,
        release_branch: &'a str,
    ) -> Self {
        Self {
            target,
            runner,
            confirm,
            events,
            release_branch,
        }
    }

    pub fn run(&self, branches: &[String], force: bool) -> MergeSummary {
        let pipeline = Pipeline::new(merge_steps());
        let mut summary = MergeSummary::default();

        for branch in branches {
            self.events.on_event(DeployEvent::TargetStarted {
                target: branch.clone(),
                hosts: vec!["local".to_string()],
            });
            let mut run = MergeRun {
                target: self.target,
                branch,
                release_branch: self.release_branch,
                runner: self.runner,
                gate: Gate::new(self.confirm, force),
                events: self.events,
                audit: ChangelogAudit::default(),
            };
            let outcome = pipeline.run(&mut run);
            self.events.on_event(DeployEvent::TargetFinished {
                target: branch.clone(),
                outcome: outcome.kind(),
                stage: outcome.stage(),
                detail: outcome.detail(),
            });
            summary.outcomes.push((branch.clone(), outcome));
        }

        summary
    }
}
