//! Release report sink that pipes the report into a local command
//! (`pbcopy`, `xclip -selection clipboard`, a chat relay script, ...)

use std::io::Write;
use std::process::{Command, Stdio};

use crate::domain::ports::ReportSink;
use crate::error::{RolloutError, RolloutResult};

#[derive(Debug, Clone)]
pub struct CommandReportSink {
    command: String,
}

impl CommandReportSink {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl ReportSink for CommandReportSink {
    fn publish(&self, text: &str) -> RolloutResult<()> {
        tracing::debug!(command = %self.command, "publishing release report");
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RolloutError::Spawn {
                target: "report".to_string(),
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(RolloutError::Command {
                target: "report".to_string(),
                host: "localhost".to_string(),
                command: self.command.clone(),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}
