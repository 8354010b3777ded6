//! Command execution value types

use serde::Serialize;

/// Where a command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecScope {
    /// The orchestrator's own machine, inside the target's local checkout
    Local,
    /// Every host of the target, inside its remote checkout
    Remote,
}

/// Per-call execution switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Capture output without echoing it
    pub mute: bool,
    /// Stream output line by line as it arrives
    pub verbose: bool,
    /// Login user override for remote hosts
    pub user: Option<String>,
    /// Return non-zero exits as results instead of `RolloutError::Command`
    pub allow_failure: bool,
}

impl RunOptions {
    pub fn muted() -> Self {
        Self {
            mute: true,
            ..Self::default()
        }
    }

    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    /// Muted and tolerant of non-zero exits
    pub fn quiet() -> Self {
        Self::muted().allow_failure()
    }

    pub fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    pub fn as_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Outcome of one command on one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// Host label (`localhost` for local commands)
    pub host: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn new(host: impl Into<String>, exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Trimmed stdout, the form most git plumbing output is compared in
    pub fn text(&self) -> &str {
        self.stdout.trim()
    }
}
