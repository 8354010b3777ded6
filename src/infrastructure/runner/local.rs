//! Local shell runner for commands on the orchestrator's machine

use std::path::PathBuf;
use std::process::Command;

use crate::domain::entities::Target;
use crate::domain::ports::{check_exit, CommandRunner, Connector};
use crate::domain::value_objects::{CommandResult, RunOptions};
use crate::error::{RolloutError, RolloutResult};

use super::process;

pub const LOCAL_HOST: &str = "localhost";

/// Runs `sh -c` inside a target's local checkout
#[derive(Debug, Clone)]
pub struct LocalShell {
    target: String,
    cwd: Option<PathBuf>,
}

impl LocalShell {
    pub fn new(target: impl Into<String>, cwd: Option<PathBuf>) -> Self {
        Self {
            target: target.into(),
            cwd,
        }
    }

    pub fn for_target(target: &Target) -> Self {
        Self::new(&target.name, target.local.path.as_deref().map(expand_home))
    }

    pub fn cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    pub fn run(&self, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult> {
        tracing::debug!(target_name = %self.target, command, "local");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        let result = process::capture(cmd, LOCAL_HOST, opts).map_err(|source| RolloutError::Spawn {
            target: self.target.clone(),
            command: command.to_string(),
            source,
        })?;
        check_exit(&self.target, command, result, opts)
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    }
}

/// Runner with only a local side, used by `merge`.
///
/// Remote calls are a config error: nothing in the merge flow touches hosts.
pub struct LocalRunner {
    shell: LocalShell,
}

impl LocalRunner {
    pub fn for_target(target: &Target) -> Self {
        Self {
            shell: LocalShell::for_target(target),
        }
    }

    fn no_remote(&self) -> RolloutError {
        RolloutError::config(&self.shell.target, "remote command issued from a local-only session")
    }
}

impl CommandRunner for LocalRunner {
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult> {
        self.shell.run(command, opts)
    }

    fn remote(&self, _command: &str, _opts: &RunOptions) -> RolloutResult<Vec<CommandResult>> {
        Err(self.no_remote())
    }

    fn remote_on(
        &self,
        _host: &str,
        _command: &str,
        _opts: &RunOptions,
    ) -> RolloutResult<CommandResult> {
        Err(self.no_remote())
    }
}

/// Connector handing out `LocalRunner`s
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalConnector;

impl Connector for LocalConnector {
    fn connect(&self, target: &Target) -> RolloutResult<Box<dyn CommandRunner>> {
        Ok(Box::new(LocalRunner::for_target(target)))
    }
}
