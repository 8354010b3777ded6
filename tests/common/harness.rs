//! Orchestrator wiring over scripted collaborators

use std::sync::Arc;

use rollout::domain::ports::ScriptedConfirm;
use rollout::infrastructure::ScriptedConnector;
use rollout::Orchestrator;

use super::fixtures::{settings, SleepLog};
use super::recorder::{RecordingEventSink, RecordingReportSink};

pub struct Harness {
    pub confirm: Arc<ScriptedConfirm>,
    pub events: Arc<RecordingEventSink>,
    pub reports: Arc<RecordingReportSink>,
    pub sleeps: SleepLog,
}

impl Harness {
    /// Every prompt takes its default
    pub fn new() -> Self {
        Self::answering([])
    }

    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            confirm: Arc::new(ScriptedConfirm::new(answers)),
            events: Arc::new(RecordingEventSink::new()),
            reports: Arc::new(RecordingReportSink::default()),
            sleeps: SleepLog::default(),
        }
    }

    pub fn orchestrator(&mut self, connector: Arc<ScriptedConnector>) -> Orchestrator {
        let (settings, sleeps) = settings();
        self.sleeps = sleeps;
        Orchestrator::new(
            connector,
            self.confirm.clone(),
            self.events.clone(),
            self.reports.clone(),
            settings,
        )
    }

    /// `(message, default)` of every prompt, in order
    pub fn prompts(&self) -> Vec<(String, bool)> {
        self.confirm
            .prompts()
            .into_iter()
            .map(|p| (p.message, p.default))
            .collect()
    }
}
