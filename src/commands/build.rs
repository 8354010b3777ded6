//! `build` command handler
//!
//! Cuts a release from one target's local checkout of the release branch.

use anyhow::{Context, Result};

use rollout::config::{resolve_targets, TargetSelection};
use rollout::domain::services::{Bump, Version};
use rollout::infrastructure::{CheckoutDir, LocalRunner};
use rollout::presentation::{create_confirm, VersionArgs};
use rollout::{BuildRequest, ReleaseBuilder, VersionSpec};

use super::Session;
use crate::ui::blocks::summary::OutcomeSummary;
use crate::ui::primitives::icon::Icon;

pub fn cmd_build(session: &Session, target: Option<&str>, version: &VersionArgs) -> Result<bool> {
    let spec = version_spec(version)?;
    let selection = TargetSelection::parse(target);
    let targets = resolve_targets(&session.config, &session.env, &selection)?;
    let target = targets
        .into_iter()
        .next()
        .with_context(|| format!("no target to build in environment '{}'", session.env))?;

    let runner = LocalRunner::for_target(&target);
    let workspace = CheckoutDir::for_target(&target);
    let confirm = create_confirm(session.ui.color);
    let events = session.events("build", Icon::Build);
    let builder = ReleaseBuilder::new(
        &target,
        &runner,
        &workspace,
        confirm.as_ref(),
        events.as_ref(),
        &session.config.release_branch,
    );

    tracing::debug!(target = %target.name, checkout = %workspace.root().display(), "starting build");
    let summary = builder.run(BuildRequest {
        version: spec,
        at: chrono::Local::now().naive_local(),
    });

    let title = match summary.version {
        Some(version) => format!("build {} {}", target.name, version.tag()),
        None => format!("build {}", target.name),
    };
    let failed = summary.outcome.is_failure();
    let rows = [(target.name.clone(), summary.outcome)];
    session.print(
        &OutcomeSummary::from_outcomes(title, &rows).render(session.ui.color, session.ui.unicode),
    );
    Ok(failed)
}

fn version_spec(args: &VersionArgs) -> Result<VersionSpec> {
    if let Some(text) = args.set.as_deref() {
        return Ok(VersionSpec::Exact(Version::parse(text)?));
    }
    if args.minor {
        return Ok(VersionSpec::Bump(Bump::Minor));
    }
    Ok(VersionSpec::Bump(Bump::Patch))
}
