//! Domain Value Objects
//!
//! Immutable value types shared by the pipeline, the runners and the sinks.

mod command;
mod diagnostic;
mod health;
mod outcome;

pub use command::{CommandResult, ExecScope, RunOptions};
pub use diagnostic::{checks, CheckResult, DiagnosticReport};
pub use health::{HealthWarning, HealthWarningKind};
pub use outcome::{Outcome, OutcomeKind, Stage};
