//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
    command: &'static str,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            command,
        }
    }

    fn write_event(&self, mut event: serde_json::Value) {
        if let Some(obj) = event.as_object_mut() {
            obj.insert("command".into(), self.command.into());
            obj.insert("ts".into(), chrono::Utc::now().to_rfc3339().into());
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::TargetStarted { target, hosts } => serde_json::json!({
                "event": "target_start",
                "target": target,
                "hosts": hosts,
            }),

            DeployEvent::StageStarted { target, stage } => serde_json::json!({
                "event": "stage",
                "target": target,
                "stage": stage,
            }),

            DeployEvent::Finding {
                target,
                name,
                result,
            } => serde_json::json!({
                "event": "finding",
                "target": target,
                "name": name,
                "title": result.title,
                "description": result.description,
            }),

            DeployEvent::UpdatePlan {
                target,
                tagline,
                local_tag,
                origin_tag,
                violations,
            } => serde_json::json!({
                "event": "update_plan",
                "target": target,
                "tagline": tagline,
                "local_tag": local_tag,
                "origin_tag": origin_tag,
                "ok": violations.is_empty(),
                "violations": violations,
            }),

            DeployEvent::Hint { target, message } => serde_json::json!({
                "event": "hint",
                "target": target,
                "message": message,
            }),

            DeployEvent::CommandOutput {
                target,
                host,
                title,
                output,
            } => serde_json::json!({
                "event": "output",
                "target": target,
                "host": host,
                "title": title,
                "output": output,
            }),

            DeployEvent::Warning { target, warning } => serde_json::json!({
                "event": "warning",
                "target": target,
                "host": warning.host,
                "kind": warning.kind,
                "detail": warning.detail,
                "suggestion": warning.suggestion,
            }),

            DeployEvent::Declined { target, gate } => serde_json::json!({
                "event": "declined",
                "target": target,
                "gate": gate,
            }),

            DeployEvent::TargetFinished {
                target,
                outcome,
                stage,
                detail,
            } => serde_json::json!({
                "event": "target_complete",
                "target": target,
                "outcome": outcome,
                "stage": stage,
                "detail": detail,
            }),

            DeployEvent::Report { text } => serde_json::json!({
                "event": "report",
                "text": text,
            }),
        };

        self.write_event(json);
    }
}
