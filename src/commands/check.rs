//! `check` command handler
//!
//! Read-only: scans every host for hung, busy and stuck processes.

use anyhow::Result;

use rollout::presentation::TargetArgs;
use rollout::{PipelineKind, RunMode};

use super::{run_pipeline, Session};
use crate::ui::primitives::icon::Icon;

pub fn cmd_check(session: &Session, targets: &TargetArgs) -> Result<bool> {
    run_pipeline(
        session,
        targets,
        PipelineKind::Check,
        RunMode::default(),
        "check",
        Icon::Check,
    )
}
