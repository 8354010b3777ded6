//! Ad-hoc remote commands
//!
//! `cmd`, `log` and `cat` run one command on every host of each target,
//! inside its remote checkout, and surface each host's output.

use crate::domain::entities::{NamedPaths, Target};
use crate::domain::ports::{CommandRunner, Connector, DeployEvent, DeployEventSink};
use crate::domain::value_objects::{Outcome, RunOptions, Stage};
use crate::error::{RolloutError, RolloutResult};

use super::fanout::RunSummary;
use super::pipeline::{Pipeline, PipelineContext, Step};

pub const DEFAULT_LOG_LINES: usize = 100;

/// What to run on the hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecRequest {
    /// A `cmd` key (`status`, `reload`, ...) or a raw command line
    Command {
        command: String,
        args: Vec<String>,
        /// Login user instead of `remote.user`
        user: Option<String>,
    },
    /// Tail a file from `remote.log`
    Log {
        name: Option<String>,
        lines: usize,
        follow: bool,
    },
    /// Print a file from `remote.cat`
    Cat { name: Option<String> },
}

impl ExecRequest {
    /// Shell line and run options for `target`
    pub fn render(&self, target: &Target) -> RolloutResult<(String, RunOptions)> {
        match self {
            ExecRequest::Command {
                command,
                args,
                user,
            } => {
                let base = target.remote.cmd.named(command).unwrap_or(command);
                let line = if args.is_empty() {
                    base.to_string()
                } else {
                    format!("{base} {}", args.join(" "))
                };
                let opts = match user {
                    Some(user) => RunOptions::muted().as_user(user),
                    None => RunOptions::muted(),
                };
                Ok((line, opts))
            }
            ExecRequest::Log {
                name,
                lines,
                follow,
            } => {
                let path = pick(target, "log", target.remote.log.as_ref(), name.as_deref())?;
                if *follow {
                    // never returns on its own; stream instead of capturing
                    Ok((format!("tail -n{lines} -f {path}"), RunOptions::verbose()))
                } else {
                    Ok((format!("tail -n{lines} {path}"), RunOptions::muted()))
                }
            }
            ExecRequest::Cat { name } => {
                let path = pick(target, "cat", target.remote.cat.as_ref(), name.as_deref())?;
                Ok((format!("cat {path}"), RunOptions::muted()))
            }
        }
    }
}

fn pick<'t>(
    target: &Target,
    key: &str,
    paths: Option<&'t NamedPaths>,
    name: Option<&str>,
) -> RolloutResult<&'t str> {
    let paths = paths.ok_or_else(|| {
        RolloutError::config(&target.name, format!("remote.{key} is not configured"))
    })?;
    paths
        .pick(name)
        .map_err(|message| RolloutError::config(&target.name, format!("remote.{key}: {message}")))
}

pub struct ExecRun<'a> {
    target: &'a Target,
    runner: &'a dyn CommandRunner,
    events: &'a dyn DeployEventSink,
    request: &'a ExecRequest,
}

impl PipelineContext for ExecRun<'_> {
    fn subject(&self) -> &str {
        &self.target.name
    }

    fn events(&self) -> &dyn DeployEventSink {
        self.events
    }
}

fn exec_steps<'a>() -> Vec<Step<ExecRun<'a>>> {
    vec![
        Step::new(Stage::Init, "validate", validate),
        Step::new(Stage::Apply, "exec", exec),
    ]
}

fn validate(run: &mut ExecRun<'_>) -> RolloutResult<()> {
    run.target.validate()
}

fn exec(run: &mut ExecRun<'_>) -> RolloutResult<()> {
    let (line, opts) = run.request.render(run.target)?;
    let results = run.runner.remote(&line, &opts.allow_failure())?;

    for r in &results {
        if r.stdout.trim().is_empty() {
            continue;
        }
        run.events.on_event(DeployEvent::CommandOutput {
            target: run.target.name.clone(),
            host: r.host.clone(),
            title: line.clone(),
            output: r.stdout.trim_end().to_string(),
        });
    }

    match results.into_iter().find(|r| !r.success()) {
        Some(failed) => Err(RolloutError::Command {
            target: run.target.name.clone(),
            host: failed.host,
            command: line,
            exit_code: failed.exit_code,
            stderr: failed.stderr,
        }),
        None => Ok(()),
    }
}

/// Runs one `ExecRequest` against each target in turn
pub struct RemoteExec<'a> {
    connector: &'a dyn Connector,
    events: &'a dyn DeployEventSink,
}

impl<'a> RemoteExec<'a> {
    pub fn new(connector: &'a dyn Connector, events: &'a dyn DeployEventSink) -> Self {
        Self { connector, events }
    }

    pub fn run(&self, targets: &[Target], request: &ExecRequest) -> RunSummary {
        let mut summary = RunSummary::default();

        for target in targets {
            self.events.on_event(DeployEvent::TargetStarted {
                target: target.name.clone(),
                hosts: target.remote.servers.clone(),
            });
            let outcome = match self.connector.connect(target) {
                Ok(runner) => {
                    let mut run = ExecRun {
                        target,
                        runner: runner.as_ref(),
                        events: self.events,
                        request,
                    };
                    Pipeline::new(exec_steps()).run(&mut run)
                }
                Err(error) => Outcome::Failed {
                    stage: Stage::Init,
                    error,
                },
            };
            self.events.on_event(DeployEvent::TargetFinished {
                target: target.name.clone(),
                outcome: outcome.kind(),
                stage: outcome.stage(),
                detail: outcome.detail(),
            });
            summary.outcomes.push((target.name.clone(), outcome));
        }

        summary
    }
}
