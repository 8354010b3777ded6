//! Command handlers
//!
//! Each handler returns `Ok(true)` when at least one target (or branch)
//! did not finish cleanly; `main` turns that into exit code 1.

mod build;
mod check;
mod exec;
mod merge;
mod reset_branch;
mod restart;
mod update;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;

use rollout::config::{resolve_targets, Config, TargetSelection};
use rollout::domain::ports::DeployEventSink;
use rollout::infrastructure::JsonEventSink;
use rollout::presentation::{create_orchestrator, TargetArgs};
use rollout::{PipelineKind, RunMode};

use crate::ui::blocks::summary::OutcomeSummary;
use crate::ui::console::ConsoleEventSink;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;

pub use build::cmd_build;
pub use check::cmd_check;
pub use exec::cmd_exec;
pub use merge::cmd_merge;
pub use reset_branch::cmd_reset_branch;
pub use restart::cmd_restart;
pub use update::cmd_update;

/// Everything a command needs that `main` builds once
pub struct Session {
    pub config: Config,
    pub env: String,
    pub ui: UiContext,
    pub interrupted: Arc<AtomicBool>,
}

impl Session {
    /// NDJSON with `--json`, the console otherwise
    pub fn events(&self, command: &'static str, icon: Icon) -> Arc<dyn DeployEventSink> {
        if self.ui.json {
            Arc::new(JsonEventSink::stdout(command))
        } else {
            Arc::new(ConsoleEventSink::stdout(self.ui, icon))
        }
    }

    /// Human-only output; suppressed in JSON mode
    pub fn print(&self, text: &str) {
        if !self.ui.json {
            println!("{text}");
        }
    }
}

fn run_pipeline(
    session: &Session,
    args: &TargetArgs,
    kind: PipelineKind,
    mode: RunMode,
    command: &'static str,
    icon: Icon,
) -> Result<bool> {
    let selection = TargetSelection::parse(args.targets.as_deref());
    let targets = resolve_targets(&session.config, &session.env, &selection)?;

    let events = session.events(command, icon);
    let orchestrator = create_orchestrator(&session.config, events, session.ui.color)?
        .with_interrupt(session.interrupted.clone())
        .with_parallel(args.parallel);

    tracing::debug!(
        env = %session.env,
        targets = targets.len(),
        parallel = args.parallel,
        "starting {command}"
    );
    let summary = orchestrator.run(&targets, kind, mode);

    session.print(
        &OutcomeSummary::from_run(format!("{command} {}", session.env), &summary)
            .render(session.ui.color, session.ui.unicode),
    );
    Ok(summary.has_failures())
}
