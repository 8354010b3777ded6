//! `cmd`, `log` and `cat` command handlers

use anyhow::Result;

use rollout::config::{resolve_targets, TargetSelection};
use rollout::presentation::create_connector;
use rollout::{ExecRequest, RemoteExec};

use super::Session;
use crate::ui::blocks::summary::OutcomeSummary;
use crate::ui::primitives::icon::Icon;

pub fn cmd_exec(
    session: &Session,
    targets: Option<&str>,
    request: ExecRequest,
    command: &'static str,
) -> Result<bool> {
    let selection = TargetSelection::parse(targets);
    let targets = resolve_targets(&session.config, &session.env, &selection)?;

    let connector = create_connector(&session.config);
    let events = session.events(command, Icon::Exec);
    tracing::debug!(env = %session.env, request = ?request, "starting {command}");
    let summary = RemoteExec::new(&connector, events.as_ref()).run(&targets, &request);

    if summary.has_failures() || targets.len() > 1 {
        session.print(
            &OutcomeSummary::from_run(format!("{command} {}", session.env), &summary)
                .render(session.ui.color, session.ui.unicode),
        );
    }
    Ok(summary.has_failures())
}
