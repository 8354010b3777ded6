//! rollout - deployment workflow orchestrator
//!
//! rollout drives git checkouts on groups of remote hosts through a fixed
//! pipeline: fetch, diagnose, confirm, apply, restart and report. Each
//! configured target runs in isolation; a declined or failed target never
//! stops the others.
//!
//! The crate is layered:
//!
//! - `domain` - entities, value objects, ports and pure parsers
//! - `application` - pipelines, diagnostics, gates, health checks, fan-out
//! - `infrastructure` - SSH/local/scripted runners, prompts, event and report sinks
//! - `presentation` - CLI definition and dependency wiring
//! - `config` - TOML configuration and target resolution

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    BranchMerger, BranchReset, BuildRequest, ExecRequest, MergeSummary, Orchestrator,
    PipelineKind, ReleaseBuilder, RemoteExec, RunMode, RunSummary, Settings, VersionSpec,
};
pub use config::{resolve_targets, Config, ConfigWarning, TargetSelection};
pub use domain::entities::{ReportEntry, Target};
pub use domain::value_objects::{Outcome, OutcomeKind, Stage};
pub use error::{RolloutError, RolloutResult};
