//! Fan-out Controller
//!
//! Runs one pipeline per target. Targets share no mutable state: each gets
//! its own session from the `Connector`, released when its pipeline ends, and
//! an abort or failure of one target never stops the next.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::domain::entities::{ReportEntry, Target};
use crate::domain::ports::{Confirm, Connector, DeployEvent, DeployEventSink, ReportSink};
use crate::domain::value_objects::{Outcome, OutcomeKind, Stage};
use crate::error::RolloutError;

use super::gate::Gate;
use super::release::ReportBuilder;
use super::settings::Settings;
use super::workflow::{PipelineKind, RunMode, TargetRun};

/// Result of a fan-out run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per-target outcomes in target order
    pub outcomes: Vec<(String, Outcome)>,
    pub report: Vec<ReportEntry>,
}

impl RunSummary {
    /// Whether any target failed (declines and interrupts do not count)
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, o)| o.is_failure())
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.kind() == kind).count()
    }

    pub fn outcome(&self, target: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == target)
            .map(|(_, o)| o)
    }
}

struct TargetResult {
    outcome: Outcome,
    entry: Option<ReportEntry>,
}

pub struct Orchestrator {
    connector: Arc<dyn Connector>,
    confirm: Arc<dyn Confirm>,
    events: Arc<dyn DeployEventSink>,
    report_sink: Arc<dyn ReportSink>,
    settings: Settings,
    interrupted: Arc<AtomicBool>,
    parallel: bool,
}

impl Orchestrator {
    pub fn new(
        connector: Arc<dyn Connector>,
        confirm: Arc<dyn Confirm>,
        events: Arc<dyn DeployEventSink>,
        report_sink: Arc<dyn ReportSink>,
        settings: Settings,
    ) -> Self {
        Self {
            connector,
            confirm,
            events,
            report_sink,
            settings,
            interrupted: Arc::new(AtomicBool::new(false)),
            parallel: false,
        }
    }

    /// Flag checked before each target starts; set it from a signal handler
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Run targets concurrently instead of one after another
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run `kind` on every target and emit the release report once at the end
    pub fn run(&self, targets: &[Target], kind: PipelineKind, mode: RunMode) -> RunSummary {
        let results: Vec<TargetResult> = if self.parallel && targets.len() > 1 {
            thread::scope(|scope| {
                let handles: Vec<_> = targets
                    .iter()
                    .map(|target| scope.spawn(move || self.run_target(target, kind, mode)))
                    .collect();
                handles
                    .into_iter()
                    .zip(targets)
                    .map(|(handle, target)| {
                        handle.join().unwrap_or_else(|_| TargetResult {
                            outcome: Outcome::Failed {
                                stage: Stage::Init,
                                error: RolloutError::config(&target.name, "pipeline panicked"),
                            },
                            entry: None,
                        })
                    })
                    .collect()
            })
        } else {
            targets
                .iter()
                .map(|target| self.run_target(target, kind, mode))
                .collect()
        };

        let mut builder = ReportBuilder::new();
        let mut outcomes = Vec::with_capacity(targets.len());
        for (target, result) in targets.iter().zip(results) {
            if let Some(entry) = result.entry {
                builder.push(entry);
            }
            outcomes.push((target.name.clone(), result.outcome));
        }

        builder.publish(self.events.as_ref(), self.report_sink.as_ref());

        RunSummary {
            outcomes,
            report: builder.into_entries(),
        }
    }

    fn run_target(&self, target: &Target, kind: PipelineKind, mode: RunMode) -> TargetResult {
        let result = if self.interrupted.load(Ordering::SeqCst) {
            TargetResult {
                outcome: Outcome::Aborted {
                    stage: Stage::Init,
                    reason: "interrupted".to_string(),
                },
                entry: None,
            }
        } else {
            self.events.on_event(DeployEvent::TargetStarted {
                target: target.name.clone(),
                hosts: target.remote.servers.clone(),
            });
            self.execute(target, kind, mode)
        };

        let outcome = &result.outcome;
        tracing::info!(target_name = %target.name, outcome = %outcome.kind(), "target finished");
        self.events.on_event(DeployEvent::TargetFinished {
            target: target.name.clone(),
            outcome: outcome.kind(),
            stage: outcome.stage(),
            detail: outcome.detail(),
        });
        result
    }

    fn execute(&self, target: &Target, kind: PipelineKind, mode: RunMode) -> TargetResult {
        let runner = match self.connector.connect(target) {
            Ok(runner) => runner,
            Err(error) => {
                return TargetResult {
                    outcome: Outcome::Failed {
                        stage: Stage::Init,
                        error,
                    },
                    entry: None,
                }
            }
        };

        let gate = Gate::new(self.confirm.as_ref(), mode.bypass_gates);
        let mut run = TargetRun::new(
            target,
            runner.as_ref(),
            &self.settings,
            gate,
            self.events.as_ref(),
            mode,
        );
        let outcome = kind.pipeline().run(&mut run);
        let entry = match outcome {
            Outcome::Done => run.entry.take(),
            _ => None,
        };
        drop(run);
        // session released here, at the target's terminal state
        drop(runner);

        TargetResult { outcome, entry }
    }
}
