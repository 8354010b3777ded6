//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod command_runner;
pub mod confirm;
pub mod deploy_events;
pub mod report_sink;
pub mod workspace;

pub use command_runner::{check_all, check_exit, CommandRunner, Connector};
pub use confirm::{Confirm, RecordedPrompt, ScriptedConfirm};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use report_sink::{NoopReportSink, ReportSink};
pub use workspace::Workspace;
