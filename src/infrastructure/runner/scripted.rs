//! Scripted Command Runner
//!
//! In-memory runner for tests. Commands are answered by the first rule whose
//! pattern is a substring of the command; host-specific rules are tried
//! before rules for every host. Unmatched commands succeed with no output.
//!
//! Optionally simulates each host's git `HEAD`: `git rev-parse HEAD` reports
//! it and `git reset --hard <ref>` moves it, so compensation can be checked
//! exactly.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::domain::entities::Target;
use crate::domain::ports::{check_all, check_exit, CommandRunner, Connector};
use crate::domain::value_objects::{CommandResult, ExecScope, RunOptions};
use crate::error::{RolloutError, RolloutResult};

use super::local::LOCAL_HOST;

/// A command issued against the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCommand {
    pub scope: ExecScope,
    /// Hosts the call addressed (`localhost` for local commands)
    pub hosts: Vec<String>,
    pub command: String,
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    host: Option<String>,
    exit_code: i32,
    stdout: String,
    stderr: String,
    /// Remaining uses; `None` never runs out
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct GitSim {
    heads: HashMap<String, String>,
    origin: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct State {
    rules: Vec<Rule>,
    issued: Vec<IssuedCommand>,
    git: Option<GitSim>,
}

pub struct ScriptedRunner {
    target: String,
    hosts: Vec<String>,
    state: Mutex<State>,
}

impl ScriptedRunner {
    pub fn new(target: impl Into<String>, hosts: &[&str]) -> Self {
        Self {
            target: target.into(),
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn for_target(target: &Target) -> Self {
        Self {
            target: target.name.clone(),
            hosts: target.remote.servers.clone(),
            state: Mutex::new(State::default()),
        }
    }

    fn push_rule(&self, rule: Rule) {
        if let Ok(mut state) = self.state.lock() {
            state.rules.push(rule);
        }
    }

    /// Answer commands containing `pattern` with `stdout` on every host
    pub fn on(self, pattern: &str, stdout: &str) -> Self {
        self.reply(pattern, None, 0, stdout, "", None)
    }

    /// Answer on one host only
    pub fn on_host(self, host: &str, pattern: &str, stdout: &str) -> Self {
        self.reply(pattern, Some(host), 0, stdout, "", None)
    }

    /// Fail commands containing `pattern` on every host
    pub fn fail(self, pattern: &str, exit_code: i32, stderr: &str) -> Self {
        self.reply(pattern, None, exit_code, "", stderr, None)
    }

    pub fn fail_on_host(self, host: &str, pattern: &str, exit_code: i32, stderr: &str) -> Self {
        self.reply(pattern, Some(host), exit_code, "", stderr, None)
    }

    /// Answer the next `times` matching calls per host, then fall through
    pub fn fail_times(self, pattern: &str, exit_code: i32, times: usize) -> Self {
        let mut runner = self;
        for host in runner.hosts.clone() {
            runner = runner.reply(pattern, Some(&host), exit_code, "", "", Some(times));
        }
        runner
    }

    fn reply(
        self,
        pattern: &str,
        host: Option<&str>,
        exit_code: i32,
        stdout: &str,
        stderr: &str,
        remaining: Option<usize>,
    ) -> Self {
        self.push_rule(Rule {
            pattern: pattern.to_string(),
            host: host.map(str::to_string),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            remaining,
        });
        self
    }

    /// Simulate git: every host starts at `head`, `origin/<branch>` at `origin`
    pub fn with_git(self, head: &str, branch: &str, origin: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            let mut git = GitSim::default();
            for host in &self.hosts {
                git.heads.insert(host.clone(), head.to_string());
            }
            git.origin.insert(branch.to_string(), origin.to_string());
            state.git = Some(git);
        }
        self
    }

    /// Current simulated `HEAD` of `host`
    pub fn head(&self, host: &str) -> Option<String> {
        let state = self.state.lock().ok()?;
        state.git.as_ref()?.heads.get(host).cloned()
    }

    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.state
            .lock()
            .map(|s| s.issued.clone())
            .unwrap_or_default()
    }

    /// Commands in issue order, one entry per call
    pub fn commands(&self) -> Vec<String> {
        self.issued().into_iter().map(|c| c.command).collect()
    }

    /// Whether any issued command contains `pattern`
    pub fn ran(&self, pattern: &str) -> bool {
        self.commands().iter().any(|c| c.contains(pattern))
    }

    /// Number of calls whose command contains `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }

    fn record(&self, scope: ExecScope, hosts: Vec<String>, command: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.issued.push(IssuedCommand {
                scope,
                hosts,
                command: command.to_string(),
            });
        }
    }

    fn answer(&self, host: &str, command: &str) -> CommandResult {
        let Ok(mut state) = self.state.lock() else {
            return CommandResult::new(host, 0, "");
        };

        let pick = |rules: &[Rule], specific: bool| {
            rules.iter().position(|r| {
                r.remaining != Some(0)
                    && command.contains(&r.pattern)
                    && match (&r.host, specific) {
                        (Some(h), true) => h == host,
                        (None, false) => true,
                        _ => false,
                    }
            })
        };

        if let Some(i) = pick(&state.rules, true).or_else(|| pick(&state.rules, false)) {
            let rule = &mut state.rules[i];
            if let Some(n) = rule.remaining.as_mut() {
                *n -= 1;
            }
            return CommandResult::new(host, rule.exit_code, rule.stdout.clone())
                .with_stderr(rule.stderr.clone());
        }

        if let Some(git) = state.git.as_mut() {
            if command.trim() == "git rev-parse HEAD" {
                let head = git.heads.get(host).cloned().unwrap_or_default();
                return CommandResult::new(host, 0, format!("{head}\n"));
            }
            if let Some(reference) = command.trim().strip_prefix("git reset --hard ") {
                let reference = reference.trim();
                let resolved = reference
                    .strip_prefix("origin/")
                    .and_then(|b| git.origin.get(b).cloned())
                    .unwrap_or_else(|| reference.to_string());
                git.heads.insert(host.to_string(), resolved);
                return CommandResult::new(host, 0, "");
            }
        }

        CommandResult::new(host, 0, "")
    }
}

impl CommandRunner for ScriptedRunner {
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult> {
        self.record(ExecScope::Local, vec![LOCAL_HOST.to_string()], command);
        let result = self.answer(LOCAL_HOST, command);
        check_exit(&self.target, command, result, opts)
    }

    fn remote(&self, command: &str, opts: &RunOptions) -> RolloutResult<Vec<CommandResult>> {
        self.record(ExecScope::Remote, self.hosts.clone(), command);
        let results = self
            .hosts
            .iter()
            .map(|host| self.answer(host, command))
            .collect();
        check_all(&self.target, command, results, opts)
    }

    fn remote_on(
        &self,
        host: &str,
        command: &str,
        opts: &RunOptions,
    ) -> RolloutResult<CommandResult> {
        self.record(ExecScope::Remote, vec![host.to_string()], command);
        let result = self.answer(host, command);
        check_exit(&self.target, command, result, opts)
    }
}

impl CommandRunner for Arc<ScriptedRunner> {
    fn local(&self, command: &str, opts: &RunOptions) -> RolloutResult<CommandResult> {
        self.as_ref().local(command, opts)
    }

    fn remote(&self, command: &str, opts: &RunOptions) -> RolloutResult<Vec<CommandResult>> {
        self.as_ref().remote(command, opts)
    }

    fn remote_on(
        &self,
        host: &str,
        command: &str,
        opts: &RunOptions,
    ) -> RolloutResult<CommandResult> {
        self.as_ref().remote_on(host, command, opts)
    }
}

/// Hands out shared `ScriptedRunner`s by target name
#[derive(Default)]
pub struct ScriptedConnector {
    runners: HashMap<String, Arc<ScriptedRunner>>,
    connected: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runner(mut self, target: &str, runner: Arc<ScriptedRunner>) -> Self {
        self.runners.insert(target.to_string(), runner);
        self
    }

    /// Target names in connection order
    pub fn connected(&self) -> Vec<String> {
        self.connected.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, target: &Target) -> RolloutResult<Box<dyn CommandRunner>> {
        if let Ok(mut connected) = self.connected.lock() {
            connected.push(target.name.clone());
        }
        match self.runners.get(&target.name) {
            Some(runner) => Ok(Box::new(Arc::clone(runner))),
            None => Err(RolloutError::config(&target.name, "no session available")),
        }
    }
}
