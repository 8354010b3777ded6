//! SSH Command Runner
//!
//! One multiplexed OpenSSH session per target. The first command to a host
//! opens a control master under a private temp directory; later commands
//! reuse it. Dropping the session closes every master it opened.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;

use tempfile::TempDir;

use crate::domain::entities::Target;
use crate::domain::ports::{check_all, check_exit, CommandRunner, Connector};
use crate::domain::value_objects::{CommandResult, RunOptions};
use crate::error::{RolloutError, RolloutResult};

use super::local::LocalShell;
use super::process;

/// Opens `SshSession`s
#[derive(Debug, Default, Clone)]
pub struct SshConnector {
    /// Extra `-o` options passed to every ssh call
    options: Vec<String>,
}

impl SshConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl Connector for SshConnector {
    fn connect(&self, target: &Target) -> RolloutResult<Box<dyn CommandRunner>> {
        let session = SshSession::open(target.clone(), self.options.clone())?;
        Ok(Box::new(session))
    }
}

/// Command session for one target's hosts
pub struct SshSession {
    target: Target,
    options: Vec<String>,
    control_dir: TempDir,
    /// Destinations with a live control master
    masters: Mutex<BTreeSet<String>>,
    local: LocalShell,
}

impl SshSession {
    pub fn open(target: Target, options: Vec<String>) -> RolloutResult<Self> {
        let control_dir = tempfile::Builder::new().prefix("rollout-ssh-").tempdir()?;
        tracing::debug!(
            target_name = %target.name,
            dir = %control_dir.path().display(),
            "ssh session opened"
        );
        let local = LocalShell::for_target(&target);
        Ok(Self {
            target,
            options,
            control_dir,
            masters: Mutex::new(BTreeSet::new()),
            local,
        })
    }

    fn control_path(&self) -> PathBuf {
        self.control_dir.path().join("%C")
    }

    fn base_command(&self, control_path: &Path) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("ControlMaster=auto")
            .arg("-o")
            .arg(format!("ControlPath={}", control_path.display()))
            .arg("-o")
            .arg("ControlPersist=yes");
        for option in &self.options {
            cmd.arg("-o").arg(option);
        }
        cmd
    }

    fn remote_line(&self, command: &str) -> String {
        format!("cd {} && {}", quote_path(&self.target.remote.path), command)
    }

    fn exec(&self, host: &str, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult> {
        let destination = self.target.destination(host, opts.user.as_deref());
        let line = self.remote_line(command);
        tracing::debug!(target_name = %self.target.name, host, command, "ssh");

        let mut cmd = self.base_command(&self.control_path());
        cmd.arg(&destination).arg(&line);

        if let Ok(mut masters) = self.masters.lock() {
            masters.insert(destination);
        }

        let mut result = process::capture(cmd, host, opts).map_err(|source| RolloutError::Spawn {
            target: self.target.name.clone(),
            command: command.to_string(),
            source,
        })?;
        result.host = host.to_string();
        Ok(result)
    }
}

/// Quote `path` for the remote shell. A leading `~/` stays unquoted so the
/// remote shell still expands it.
fn quote_path(path: &str) -> String {
    let (home, rest) = match path.strip_prefix("~/") {
        Some(rest) => ("~/", rest),
        None if path == "~" => return path.to_string(),
        None => ("", path),
    };
    let plain = |c: char| c.is_ascii_alphanumeric() || "/._-+:@%,".contains(c);
    if !rest.is_empty() && rest.chars().all(plain) {
        return format!("{home}{rest}");
    }
    format!("{home}'{}'", rest.replace('\'', r"'\''"))
}

impl CommandRunner for SshSession {
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult> {
        self.local.run(command, opts)
    }

    fn remote(&self, command: &str, opts: &RunOptions) -> RolloutResult<Vec<CommandResult>> {
        let servers = &self.target.remote.servers;
        let results: Vec<RolloutResult<CommandResult>> = thread::scope(|scope| {
            let handles: Vec<_> = servers
                .iter()
                .map(|host| scope.spawn(move || self.exec(host, command, opts)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(RolloutError::config(&self.target.name, "ssh worker panicked"))
                    })
                })
                .collect()
        });

        let results = results.into_iter().collect::<RolloutResult<Vec<_>>>()?;
        check_all(&self.target.name, command, results, opts)
    }

    fn remote_on(
        &self,
        host: &str,
        command: &str,
        opts: &RunOptions,
    ) -> RolloutResult<CommandResult> {
        let result = self.exec(host, command, opts)?;
        check_exit(&self.target.name, command, result, opts)
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        let masters = match self.masters.lock() {
            Ok(mut masters) => std::mem::take(&mut *masters),
            Err(_) => return,
        };
        let control_path = self.control_path();
        for destination in masters {
            let status = self
                .base_command(&control_path)
                .arg("-O")
                .arg("exit")
                .arg(&destination)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if let Err(err) = status {
                tracing::debug!(destination = %destination, error = %err, "ssh -O exit failed");
            }
        }
        tracing::debug!(target_name = %self.target.name, "ssh session closed");
    }
}
