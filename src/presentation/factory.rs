//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::Arc;

use crate::application::{Orchestrator, Settings};
use crate::config::Config;
use crate::domain::ports::{Confirm, DeployEventSink, NoopReportSink, ReportSink};
use crate::error::RolloutResult;
use crate::infrastructure::{CommandReportSink, InteractiveConfirm, SshConnector};

/// Report destination from `report.clipboard`, or nothing
pub fn create_report_sink(config: &Config) -> Arc<dyn ReportSink> {
    match config.report.clipboard.as_deref() {
        Some(command) if !command.trim().is_empty() => Arc::new(CommandReportSink::new(command)),
        _ => Arc::new(NoopReportSink),
    }
}

/// Terminal confirmation prompts
pub fn create_confirm(color: bool) -> Arc<dyn Confirm> {
    Arc::new(InteractiveConfirm::new(color))
}

/// SSH sessions with the `[ssh]` options from config
pub fn create_connector(config: &Config) -> SshConnector {
    config
        .ssh
        .options
        .iter()
        .fold(SshConnector::new(), |connector, option| connector.with_option(option.as_str()))
}

/// Create the fan-out orchestrator with SSH sessions and terminal prompts
///
/// `events` is the rendering chosen by the caller (console or NDJSON).
pub fn create_orchestrator(
    config: &Config,
    events: Arc<dyn DeployEventSink>,
    color: bool,
) -> RolloutResult<Orchestrator> {
    let settings = Settings::from_config(config)?;
    Ok(Orchestrator::new(
        Arc::new(create_connector(config)),
        create_confirm(color),
        events,
        create_report_sink(config),
        settings,
    ))
}
