//! Application Layer
//!
//! Use cases that drive targets through their pipelines.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Never touches a shell, terminal or file directly (that is Infrastructure)
//!
//! ## Use Cases
//!
//! - `Orchestrator` - Fan-out of the update/restart/check pipelines over targets
//! - `BranchMerger` - Merge the release branch into local branches
//! - `ReleaseBuilder` - Version, tag and push a release from a local checkout
//! - `BranchReset` - Reset a deployed branch onto another and push it
//! - `RemoteExec` - Ad-hoc `cmd`, `log` and `cat` on every host
//!
//! ## Building blocks
//!
//! - `Pipeline` - Step-list runner producing a terminal `Outcome`
//! - `DiagnosticCollector` - Read-only check battery before the update gate
//! - `Gate` - Confirmation with forced-mode answers
//! - `HealthMonitor` - Status polling and advisory process scans
//! - `ReportBuilder` - Cross-target release report

pub mod build;
pub mod diagnose;
pub mod exec;
pub mod fanout;
pub mod gate;
pub mod health;
pub mod merge;
pub mod pipeline;
pub mod release;
pub mod reset_branch;
pub mod settings;
pub mod workflow;

pub use build::{BuildRequest, BuildSummary, ReleaseBuilder, VersionSpec};
pub use diagnose::{tagline, ChangelogAudit, DiagnosticCollector};
pub use exec::{ExecRequest, RemoteExec};
pub use fanout::{Orchestrator, RunSummary};
pub use gate::Gate;
pub use health::HealthMonitor;
pub use merge::{BranchMerger, MergeSummary};
pub use pipeline::{Pipeline, PipelineContext, Step};
pub use release::{build_entry, ReportBuilder};
pub use reset_branch::BranchReset;
pub use settings::{PollPolicy, Settings};
pub use workflow::{render_migration_command, PipelineKind, RunMode, TargetRun};
