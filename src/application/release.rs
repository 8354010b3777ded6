//! Release/Report Builder
//!
//! Collects one `ReportEntry` per released target and emits the joined
//! report once at the end of a run.

use crate::domain::entities::{render_report, ReportEntry};
use crate::domain::ports::{DeployEvent, DeployEventSink, ReportSink};
use crate::domain::services::changelog;

/// Build a target's entry from its CHANGELOG.md text
pub fn build_entry(target_name: &str, version: &str, changelog_text: &str) -> ReportEntry {
    ReportEntry {
        target_name: target_name.to_string(),
        version: version.to_string(),
        changelog_lines: changelog::latest_section(changelog_text),
    }
}

#[derive(Debug, Default)]
pub struct ReportBuilder {
    entries: Vec<ReportEntry>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn into_entries(self) -> Vec<ReportEntry> {
        self.entries
    }

    /// Emit the report and hand it to `sink`; nothing happens without entries.
    ///
    /// A sink failure is logged, never fatal: every target has already
    /// finished by now.
    pub fn publish(&self, events: &dyn DeployEventSink, sink: &dyn ReportSink) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let text = render_report(&self.entries);
        events.on_event(DeployEvent::Report { text: text.clone() });
        if let Err(err) = sink.publish(&text) {
            tracing::warn!(error = %err, "release report sink failed");
        }
        Some(text)
    }
}
