//! Command Runner Port
//!
//! Every side effect of a pipeline goes through this trait: git plumbing,
//! installs, restarts and process scans. Infrastructure provides the SSH and
//! local-shell implementations; tests use the scripted runner.

use crate::domain::entities::Target;
use crate::domain::value_objects::{CommandResult, ExecScope, RunOptions};
use crate::error::{RolloutError, RolloutResult};

/// Executes commands for one target.
///
/// `remote` runs the command on every host of the target and returns one
/// result per host, index-aligned with `remote.servers`. It returns only
/// after every host has finished.
///
/// Unless `RunOptions::allow_failure` is set, a non-zero exit is reported as
/// `RolloutError::Command` (for `remote`: the first failing host, in server
/// order, once all hosts have finished).
pub trait CommandRunner: Send + Sync {
    /// Run once on the orchestrator's machine
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult>;

    /// Run on every host of the target
    fn remote(&self, command: &str, opts: &RunOptions) -> RolloutResult<Vec<CommandResult>>;

    /// Run on a single host of the target
    fn remote_on(&self, host: &str, command: &str, opts: &RunOptions)
        -> RolloutResult<CommandResult>;

    /// Scope-dispatching entry point
    fn run(
        &self,
        scope: ExecScope,
        command: &str,
        opts: &RunOptions,
    ) -> RolloutResult<Vec<CommandResult>> {
        match scope {
            ExecScope::Local => Ok(vec![self.local(command, opts)?]),
            ExecScope::Remote => self.remote(command, opts),
        }
    }
}

/// Opens a command session for a target.
///
/// The returned runner owns the session; dropping it releases the
/// connection.
pub trait Connector: Send + Sync {
    fn connect(&self, target: &Target) -> RolloutResult<Box<dyn CommandRunner>>;
}

/// Turn a non-zero exit into `RolloutError::Command` unless tolerated
pub fn check_exit(
    target: &str,
    command: &str,
    result: CommandResult,
    opts: &RunOptions,
) -> RolloutResult<CommandResult> {
    if result.success() || opts.allow_failure {
        Ok(result)
    } else {
        Err(command_error(target, command, result))
    }
}

/// `check_exit` over a per-host result list
pub fn check_all(
    target: &str,
    command: &str,
    mut results: Vec<CommandResult>,
    opts: &RunOptions,
) -> RolloutResult<Vec<CommandResult>> {
    if !opts.allow_failure {
        if let Some(pos) = results.iter().position(|r| !r.success()) {
            let failed = results.swap_remove(pos);
            return Err(command_error(target, command, failed));
        }
    }
    Ok(results)
}

fn command_error(target: &str, command: &str, result: CommandResult) -> RolloutError {
    RolloutError::Command {
        target: target.to_string(),
        host: result.host,
        command: command.to_string(),
        exit_code: result.exit_code,
        stderr: result.stderr,
    }
}
