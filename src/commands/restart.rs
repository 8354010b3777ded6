//! `restart` command handler

use anyhow::Result;

use rollout::presentation::TargetArgs;
use rollout::{PipelineKind, RunMode};

use super::{run_pipeline, Session};
use crate::ui::primitives::icon::Icon;

pub fn cmd_restart(session: &Session, targets: &TargetArgs, force: bool) -> Result<bool> {
    let mode = RunMode {
        prefer_restart: force,
        ..RunMode::default()
    };
    run_pipeline(
        session,
        targets,
        PipelineKind::Restart,
        mode,
        "restart",
        Icon::Restart,
    )
}
