//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --color, --verbose, --config) are inherited by all subcommands
//! - The environment name comes first: `rollout <ENV> <COMMAND> [TARGETS]`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// rollout - deploy git checkouts to groups of hosts over SSH
#[derive(Parser, Debug)]
#[command(name = "rollout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment from the config file (e.g. prod, staging)
    #[arg(value_name = "ENV")]
    pub env: String,

    /// Output format for CI (NDJSON events)
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: $ROLLOUT_CONFIG, ./rollout.toml, user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target selection shared by the per-target commands
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// `ALL` or a comma-separated list of targets
    #[arg(value_name = "TARGETS")]
    pub targets: Option<String>,

    /// Run targets concurrently (prompts are still asked one at a time)
    #[arg(long)]
    pub parallel: bool,
}

/// Release version selection for `build`; exactly one is required.
///
/// `-v` is the global verbosity flag, so an explicit version is `-s X.Y.Z`.
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct VersionArgs {
    /// Release exactly this version
    #[arg(short = 's', long = "set", value_name = "X.Y.Z")]
    pub set: Option<String>,

    /// Bump the patch version of the latest tag: X.Y.Z+1
    #[arg(short, long)]
    pub patch: bool,

    /// Bump the minor version of the latest tag: X.Y+1.0
    #[arg(short = 'n', long)]
    pub minor: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, diagnose, confirm, apply and restart
    Update {
        #[command(flatten)]
        targets: TargetArgs,

        /// Skip every confirmation (unattended); migrations are never run
        #[arg(short, long)]
        force: bool,
    },

    /// Reload (or restart) the service and verify it
    Restart {
        #[command(flatten)]
        targets: TargetArgs,

        /// Prefer `cmd.restart` over `cmd.reload`
        #[arg(short, long)]
        force: bool,
    },

    /// Scan hosts for hung, busy and stuck processes
    Check {
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Merge the release branch into other branches of the local checkout
    Merge {
        /// Target whose local checkout is merged
        #[arg(value_name = "TARGET")]
        target: Option<String>,

        /// Branches to merge into (default: `merge.branches` from config)
        #[arg(short, long, value_delimiter = ',')]
        branches: Option<Vec<String>>,

        /// Push without confirmation when the changelog checks pass
        #[arg(short, long)]
        force: bool,
    },

    /// Cut a release: bump package.json and CHANGELOG.md, tag and push
    Build {
        /// Target whose local checkout is released
        #[arg(value_name = "TARGET")]
        target: Option<String>,

        #[command(flatten)]
        version: VersionArgs,
    },

    /// Reset each target's branch onto another branch and push it
    #[command(name = "reset-branch")]
    ResetBranch {
        /// `ALL` or a comma-separated list of targets
        #[arg(value_name = "TARGETS")]
        targets: Option<String>,

        /// Branch to reset onto (default: the release branch)
        #[arg(short, long, value_name = "BRANCH")]
        branch: Option<String>,

        /// Force-push
        #[arg(short, long)]
        force: bool,
    },

    /// Run a `cmd` key (status, reload, ...) or a raw command on every host
    Cmd {
        /// `ALL` or a comma-separated list of targets
        #[arg(short, long, value_name = "TARGETS")]
        targets: Option<String>,

        /// Log in as this user instead of `remote.user`
        #[arg(short, long)]
        user: Option<String>,

        /// Command key or command line
        #[arg(value_name = "COMMAND")]
        command: String,

        /// Extra arguments, appended as given (separate with `--`)
        #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show the tail of a log configured in `remote.log`
    Log {
        /// Log name when several are configured
        #[arg(value_name = "NAME")]
        name: Option<String>,

        /// `ALL` or a comma-separated list of targets
        #[arg(short, long, value_name = "TARGETS")]
        targets: Option<String>,

        /// Lines to show
        #[arg(short = 'n', long, default_value_t = default_log_lines())]
        lines: usize,

        /// Keep following the log
        #[arg(short, long)]
        follow: bool,
    },

    /// Print a file configured in `remote.cat`
    Cat {
        /// File name when several are configured
        #[arg(value_name = "NAME")]
        name: Option<String>,

        /// `ALL` or a comma-separated list of targets
        #[arg(short, long, value_name = "TARGETS")]
        targets: Option<String>,
    },
}

fn default_log_lines() -> usize {
    crate::application::exec::DEFAULT_LOG_LINES
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Update { .. } => "update",
            Commands::Restart { .. } => "restart",
            Commands::Check { .. } => "check",
            Commands::Merge { .. } => "merge",
            Commands::Build { .. } => "build",
            Commands::ResetBranch { .. } => "reset-branch",
            Commands::Cmd { .. } => "cmd",
            Commands::Log { .. } => "log",
            Commands::Cat { .. } => "cat",
        }
    }
}
