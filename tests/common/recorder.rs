//! Recording sinks

use std::sync::Mutex;

use rollout::domain::ports::{DeployEvent, DeployEventSink, ReportSink};
use rollout::RolloutResult;

/// Keeps every event, including stage events
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events belonging to `target`, in emission order
    pub fn for_target(&self, target: &str) -> Vec<DeployEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.target() == Some(target))
            .collect()
    }

    /// Finding names recorded for `target`
    pub fn findings(&self, target: &str) -> Vec<String> {
        self.for_target(target)
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::Finding { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn declined(&self, target: &str) -> Vec<String> {
        self.for_target(target)
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::Declined { gate, .. } => Some(gate),
                _ => None,
            })
            .collect()
    }

    /// `(host, title, output)` of every command output shown for `target`
    pub fn outputs(&self, target: &str) -> Vec<(String, String, String)> {
        self.for_target(target)
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::CommandOutput {
                    host,
                    title,
                    output,
                    ..
                } => Some((host, title, output)),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeployEvent::Report { text } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl DeployEventSink for RecordingEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct RecordingReportSink {
    published: Mutex<Vec<String>>,
}

impl RecordingReportSink {
    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingReportSink {
    fn publish(&self, text: &str) -> RolloutResult<()> {
        self.published.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
