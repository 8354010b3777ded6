//! Branch reset
//!
//! Points each target's deployed branch at another branch's origin tip and
//! pushes it, from the operator's local checkout:
//!
//! ```text
//! Checkout -> Reset -> Push
//! ```
//!
//! Whatever happens after the reset, the local branch ends back at its own
//! origin tip.

use crate::domain::entities::Target;
use crate::domain::ports::{CommandRunner, Confirm, Connector, DeployEvent, DeployEventSink};
use crate::domain::value_objects::{Outcome, RunOptions, Stage};
use crate::error::{RolloutError, RolloutResult};

use super::fanout::RunSummary;
use super::gate::Gate;
use super::pipeline::{Pipeline, PipelineContext, Step};

/// Per-target state threaded through the reset steps
pub struct ResetRun<'a> {
    target: &'a Target,
    runner: &'a dyn CommandRunner,
    gate: Gate<'a>,
    events: &'a dyn DeployEventSink,
    onto: &'a str,
    force_push: bool,
}

impl PipelineContext for ResetRun<'_> {
    fn subject(&self) -> &str {
        &self.target.name
    }

    fn events(&self) -> &dyn DeployEventSink {
        self.events
    }
}

impl ResetRun<'_> {
    fn branch(&self) -> &str {
        &self.target.remote.branch
    }

    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<String> {
        Ok(self.runner.local(command, opts)?.stdout)
    }

    fn restore(&self) -> RolloutResult<()> {
        tracing::info!(target_name = %self.target.name, branch = self.branch(), "resetting branch to origin");
        self.local(
            &format!("git reset --hard origin/{}", self.branch()),
            &RunOptions::muted(),
        )?;
        Ok(())
    }
}

pub fn reset_steps<'a>() -> Vec<Step<ResetRun<'a>>> {
    vec![
        Step::new(Stage::Init, "validate", validate),
        Step::new(Stage::Checkout, "fetch", fetch),
        Step::new(Stage::Checkout, "checkout", checkout),
        Step::new(Stage::Reset, "reset", reset),
        Step::new(Stage::Reset, "show", show),
        Step::new(Stage::Push, "confirm-push", confirm_push),
        Step::new(Stage::Push, "push", push),
        Step::new(Stage::Push, "restore", restore),
    ]
}

fn validate(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    if run.branch().trim().is_empty() {
        return Err(RolloutError::config(&run.target.name, "remote.branch is not set"));
    }
    Ok(())
}

fn fetch(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    run.local("git fetch --prune", &RunOptions::default())?;
    Ok(())
}

fn checkout(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    run.local(&format!("git checkout {}", run.branch()), &RunOptions::default())?;
    Ok(())
}

fn reset(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    tracing::info!(target_name = %run.target.name, onto = run.onto, "resetting branch");
    run.local(
        &format!("git reset --hard origin/{}", run.onto),
        &RunOptions::default(),
    )?;
    Ok(())
}

fn show(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    let log = run.local("git log --oneline --decorate -n 2", &RunOptions::quiet())?;
    if !log.trim().is_empty() {
        run.events.on_event(DeployEvent::CommandOutput {
            target: run.target.name.clone(),
            host: "local".to_string(),
            title: "git log".to_string(),
            output: log.trim_end().to_string(),
        });
    }
    Ok(())
}

fn confirm_push(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    let message = format!(
        "Do you want to push {}:{} ?",
        run.target.local.path.as_deref().unwrap_or("."),
        run.branch()
    );
    if run.gate.ask(&message, true, true)? {
        return Ok(());
    }

    run.restore()?;
    run.events.on_event(DeployEvent::Declined {
        target: run.target.name.clone(),
        gate: "push".to_string(),
    });
    Err(RolloutError::UserDeclined {
        target: run.target.name.clone(),
        gate: "push".to_string(),
    })
}

fn push(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    let b = run.branch();
    let flag = if run.force_push { " -f" } else { "" };
    if let Err(err) = run.local(&format!("git push{flag} origin {b}:{b}"), &RunOptions::verbose()) {
        run.restore()?;
        return Err(err);
    }
    Ok(())
}

fn restore(run: &mut ResetRun<'_>) -> RolloutResult<()> {
    run.restore()
}

/// Runs the reset pipeline for each target, one after another
pub struct BranchReset<'a> {
    connector: &'a dyn Connector,
    confirm: &'a dyn Confirm,
    events: &'a dyn DeployEventSink,
    onto: &'a str,
    force_push: bool,
}

impl<'a> BranchReset<'a> {
    pub fn new(
        connector: &'a dyn Connector,
        confirm: &'a dyn Confirm,
        events: &'a dyn DeployEventSink,
        onto: &'a str,
    ) -> Self {
        Self {
            connector,
            confirm,
            events,
            onto,
            force_push: false,
        }
    }

    /// Push with `-f`
    pub fn with_force_push(mut self, force_push: bool) -> Self {
        self.force_push = force_push;
        self
    }

    pub fn run(&self, targets: &[Target]) -> RunSummary {
        let mut summary = RunSummary::default();

        for target in targets {
            self.events.on_event(DeployEvent::TargetStarted {
                target: target.name.clone(),
                hosts: vec!["local".to_string()],
            });
            let outcome = match self.connector.connect(target) {
                Ok(runner) => {
                    let mut run = ResetRun {
                        target,
                        runner: runner.as_ref(),
                        gate: Gate::new(self.confirm, false),
                        events: self.events,
                        onto: self.onto,
                        force_push: self.force_push,
                    };
                    Pipeline::new(reset_steps()).run(&mut run)
                }
                Err(error) => Outcome::Failed {
                    stage: Stage::Init,
                    error,
                },
            };
            tracing::info!(target_name = %target.name, outcome = %outcome.kind(), "target finished");
            self.events.on_event(DeployEvent::TargetFinished {
                target: target.name.clone(),
                outcome: outcome.kind(),
                stage: outcome.stage(),
                detail: outcome.detail(),
            });
            summary.outcomes.push((target.name.clone(), outcome));
        }

        summary
    }
}
