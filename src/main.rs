//! rollout CLI - deploy git checkouts to groups of hosts over SSH
//!
//! Usage: rollout <ENV> <COMMAND> [TARGETS]
//!
//! Commands:
//!   update   Fetch, diagnose, confirm, apply and restart
//!   restart  Reload (or restart) the service and verify it
//!   check    Scan hosts for hung, busy and stuck processes
//!   merge    Merge the release branch into other local branches
//!   build    Version, tag and push a release
//!   reset-branch  Reset branches onto another branch and push them
//!   cmd, log, cat  Ad-hoc commands on every host

mod commands;
mod ui;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rollout::presentation::{Cli, Commands};
use rollout::{ConfigWarning, ExecRequest};

use crate::commands::Session;
use crate::ui::context::UiContext;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Diagnostics go to stderr so `--json` stdout stays clean NDJSON.
/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<bool> {
    let (config, warnings, path) = rollout::config::load(cli.config.as_deref())?;
    tracing::debug!(path = %path.display(), "loaded config");
    for warning in &warnings {
        print_config_warning(warning);
    }

    // Ctrl+C lets the running target finish and skips the rest
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("could not install Ctrl+C handler: {err}");
    }

    let session = Session {
        config,
        env: cli.env.clone(),
        ui: UiContext::new(cli.json, cli.verbose, cli.color),
        interrupted,
    };

    match &cli.command {
        Commands::Update { targets, force } => commands::cmd_update(&session, targets, *force),
        Commands::Restart { targets, force } => commands::cmd_restart(&session, targets, *force),
        Commands::Check { targets } => commands::cmd_check(&session, targets),
        Commands::Merge {
            target,
            branches,
            force,
        } => commands::cmd_merge(&session, target.as_deref(), branches.as_deref(), *force),
        Commands::Build { target, version } => {
            commands::cmd_build(&session, target.as_deref(), version)
        }
        Commands::ResetBranch {
            targets,
            branch,
            force,
        } => commands::cmd_reset_branch(&session, targets.as_deref(), branch.as_deref(), *force),
        Commands::Cmd {
            targets,
            user,
            command,
            args,
        } => {
            let request = ExecRequest::Command {
                command: command.clone(),
                args: args.clone(),
                user: user.clone(),
            };
            commands::cmd_exec(&session, targets.as_deref(), request, "cmd")
        }
        Commands::Log {
            name,
            targets,
            lines,
            follow,
        } => {
            let request = ExecRequest::Log {
                name: name.clone(),
                lines: *lines,
                follow: *follow,
            };
            commands::cmd_exec(&session, targets.as_deref(), request, "log")
        }
        Commands::Cat { name, targets } => {
            let request = ExecRequest::Cat { name: name.clone() };
            commands::cmd_exec(&session, targets.as_deref(), request, "cat")
        }
    }
}

fn print_config_warning(warning: &ConfigWarning) {
    let location = match warning.line {
        Some(line) => format!("{}:{}", warning.file.display(), line),
        None => warning.file.display().to_string(),
    };
    match &warning.suggestion {
        Some(suggestion) => eprintln!(
            "Warning: unknown config key '{}' in {} (did you mean '{}'?)",
            warning.key, location, suggestion
        ),
        None => eprintln!(
            "Warning: unknown config key '{}' in {}",
            warning.key, location
        ),
    }
}
