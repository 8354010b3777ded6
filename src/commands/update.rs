//! `update` command handler

use anyhow::Result;

use rollout::presentation::TargetArgs;
use rollout::{PipelineKind, RunMode};

use super::{run_pipeline, Session};
use crate::ui::primitives::icon::Icon;

/// Fetch, diagnose, confirm, apply and restart every selected target.
///
/// `force` answers every gate with its forced value and skips the branch
/// check; migrations are never run unattended.
pub fn cmd_update(session: &Session, targets: &TargetArgs, force: bool) -> Result<bool> {
    let mode = RunMode {
        bypass_gates: force,
        ..RunMode::default()
    };
    run_pipeline(
        session,
        targets,
        PipelineKind::Update,
        mode,
        "update",
        Icon::Update,
    )
}
