//! Error types for rollout
//!
//! Library code returns `RolloutResult`; the binary wraps it in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rollout operations
pub type RolloutResult<T> = Result<T, RolloutError>;

/// Main error type for rollout operations
#[derive(Error, Debug)]
pub enum RolloutError {
    /// Target or environment definition is incomplete or unresolvable
    #[error("config error{}: {message}", target_suffix(.target))]
    Config {
        target: Option<String>,
        message: String,
    },

    /// Config file failed to parse
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Checked-out remote branch differs from the configured one
    #[error("[{target}] {host} is on branch '{actual}', but '{expected}' is configured")]
    BranchMismatch {
        target: String,
        host: String,
        expected: String,
        actual: String,
    },

    /// A command exited non-zero where success was required
    #[error("[{target}] `{command}` failed on {host} (exit {exit_code}): {}", .stderr.trim())]
    Command {
        target: String,
        host: String,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// A command could not be started at all (missing ssh binary, bad cwd, ...)
    #[error("[{target}] could not spawn `{command}`: {source}")]
    Spawn {
        target: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Operator rejected a confirmation gate
    #[error("[{target}] declined by operator: {gate}")]
    UserDeclined { target: String, gate: String },

    /// Status command never reported healthy within the attempt budget
    #[error("[{target}] `{command}` did not succeed after {attempts} attempts")]
    PollTimeout {
        target: String,
        command: String,
        attempts: u32,
    },

    /// Release version is not `X.Y.Z`
    #[error("invalid release version '{0}': expected X.Y.Z")]
    InvalidVersion(String),

    /// Interactive prompt could not be shown or read
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Invalid pattern in configuration
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn target_suffix(target: &Option<String>) -> String {
    match target {
        Some(name) => format!(" for target '{name}'"),
        None => String::new(),
    }
}

impl RolloutError {
    /// Shorthand for a target-scoped config error
    pub fn config(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            target: Some(target.into()),
            message: message.into(),
        }
    }

    /// Shorthand for an environment-level config error
    pub fn config_global(message: impl Into<String>) -> Self {
        Self::Config {
            target: None,
            message: message.into(),
        }
    }

    /// Whether this error was raised before anything on the hosts could change
    pub fn is_pre_mutation(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::BranchMismatch { .. })
    }
}
