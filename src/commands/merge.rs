//! `merge` command handler
//!
//! Merges the release branch into each listed branch of one target's
//! local checkout, audits the changelog and pushes.

use anyhow::{Context, Result};

use rollout::config::{resolve_targets, TargetSelection};
use rollout::infrastructure::LocalRunner;
use rollout::presentation::create_confirm;
use rollout::BranchMerger;

use super::Session;
use crate::ui::blocks::summary::OutcomeSummary;
use crate::ui::primitives::icon::Icon;

pub fn cmd_merge(
    session: &Session,
    target: Option<&str>,
    branches: Option<&[String]>,
    force: bool,
) -> Result<bool> {
    let selection = TargetSelection::parse(target);
    let targets = resolve_targets(&session.config, &session.env, &selection)?;
    let target = targets
        .into_iter()
        .next()
        .with_context(|| format!("no target to merge in environment '{}'", session.env))?;

    let branches: Vec<String> = match branches {
        Some(list) => list.to_vec(),
        None => session.config.merge.branches.clone(),
    };
    if branches.is_empty() {
        anyhow::bail!("no branches to merge; pass -b or set merge.branches");
    }

    let runner = LocalRunner::for_target(&target);
    let confirm = create_confirm(session.ui.color);
    let events = session.events("merge", Icon::Merge);
    let merger = BranchMerger::new(
        &target,
        &runner,
        confirm.as_ref(),
        events.as_ref(),
        &session.config.release_branch,
    );

    tracing::debug!(target = %target.name, branches = ?branches, "starting merge");
    let summary = merger.run(&branches, force);

    session.print(
        &OutcomeSummary::from_outcomes(format!("merge {}", target.name), &summary.outcomes)
            .render(session.ui.color, session.ui.unicode),
    );
    let failed = summary.failed_branches();
    if !failed.is_empty() {
        session.print(&format!("failed branches: {}", failed.join(",")));
    }
    Ok(summary.has_failures())
}
