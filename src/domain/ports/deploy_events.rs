//! Deploy Event Port
//!
//! Observable interface for pipeline runs. Operator-facing output (findings,
//! hints, warnings, the release report) flows through here so the console and
//! NDJSON renderings stay in step. Every event names its target, which keeps
//! output from concurrently running targets attributable.

use crate::domain::value_objects::{CheckResult, HealthWarning, OutcomeKind, Stage};

/// Event emitted during a pipeline run
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Pipeline started for a target
    TargetStarted { target: String, hosts: Vec<String> },

    /// A stage began
    StageStarted { target: String, stage: Stage },

    /// Diagnostic finding recorded
    Finding {
        target: String,
        name: String,
        result: CheckResult,
    },

    /// Summary shown right before the update gate
    UpdatePlan {
        target: String,
        /// Finding names followed by `code` or `no code changes found`
        tagline: String,
        local_tag: String,
        origin_tag: String,
        violations: Vec<String>,
    },

    /// Operator advice derived from a finding
    Hint { target: String, message: String },

    /// Output worth showing from a command (results summary, migrations)
    CommandOutput {
        target: String,
        host: String,
        title: String,
        output: String,
    },

    /// Advisory health warning
    Warning {
        target: String,
        warning: HealthWarning,
    },

    /// A gate was answered "no"
    Declined { target: String, gate: String },

    /// Pipeline reached a terminal state
    TargetFinished {
        target: String,
        outcome: OutcomeKind,
        stage: Option<Stage>,
        detail: Option<String>,
    },

    /// Cross-target release report, emitted once per run
    Report { text: String },
}

impl DeployEvent {
    /// Target the event belongs to; `None` for run-level events
    pub fn target(&self) -> Option<&str> {
        match self {
            DeployEvent::TargetStarted { target, .. }
            | DeployEvent::StageStarted { target, .. }
            | DeployEvent::Finding { target, .. }
            | DeployEvent::UpdatePlan { target, .. }
            | DeployEvent::Hint { target, .. }
            | DeployEvent::CommandOutput { target, .. }
            | DeployEvent::Warning { target, .. }
            | DeployEvent::Declined { target, .. }
            | DeployEvent::TargetFinished { target, .. } => Some(target),
            DeployEvent::Report { .. } => None,
        }
    }
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: colored terminal output
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: silent operation
pub trait DeployEventSink: Send + Sync {
    fn on_event(&self, event: DeployEvent);

    /// Whether per-stage events are wanted
    ///
    /// Some sinks only care about findings and outcomes.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
