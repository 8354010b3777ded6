//! `reset-branch` command handler

use anyhow::Result;

use rollout::config::{resolve_targets, TargetSelection};
use rollout::infrastructure::LocalConnector;
use rollout::presentation::create_confirm;
use rollout::BranchReset;

use super::Session;
use crate::ui::blocks::summary::OutcomeSummary;
use crate::ui::primitives::icon::Icon;

pub fn cmd_reset_branch(
    session: &Session,
    targets: Option<&str>,
    onto: Option<&str>,
    force: bool,
) -> Result<bool> {
    let selection = TargetSelection::parse(targets);
    let targets = resolve_targets(&session.config, &session.env, &selection)?;
    let onto = onto.unwrap_or(&session.config.release_branch);

    let confirm = create_confirm(session.ui.color);
    let events = session.events("reset-branch", Icon::Merge);
    let summary = BranchReset::new(&LocalConnector, confirm.as_ref(), events.as_ref(), onto)
        .with_force_push(force)
        .run(&targets);

    session.print(
        &OutcomeSummary::from_run(format!("reset-branch onto {onto}"), &summary)
            .render(session.ui.color, session.ui.unicode),
    );
    Ok(summary.has_failures())
}
