//! Pipeline stages and terminal outcomes

use std::fmt;

use serde::Serialize;

use crate::error::RolloutError;

/// A step position in a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Fetch,
    Diagnose,
    AwaitConfirm,
    Apply,
    PostActions,
    Report,
    // merge pipeline
    Checkout,
    Merge,
    Audit,
    Push,
    // build and reset-branch pipelines
    Version,
    Bump,
    Tag,
    Reset,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Fetch => "fetch",
            Stage::Diagnose => "diagnose",
            Stage::AwaitConfirm => "await_confirm",
            Stage::Apply => "apply",
            Stage::PostActions => "post_actions",
            Stage::Report => "report",
            Stage::Checkout => "checkout",
            Stage::Merge => "merge",
            Stage::Audit => "audit",
            Stage::Push => "push",
            Stage::Version => "version",
            Stage::Bump => "bump",
            Stage::Tag => "tag",
            Stage::Reset => "reset",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one pipeline run
#[derive(Debug)]
pub enum Outcome {
    Done,
    /// Operator declined a gate (or the run was interrupted); not a failure
    Aborted { stage: Stage, reason: String },
    Failed { stage: Stage, error: RolloutError },
}

/// Outcome without its payload, for events and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Done,
    Aborted,
    Failed,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Done => OutcomeKind::Done,
            Outcome::Aborted { .. } => OutcomeKind::Aborted,
            Outcome::Failed { .. } => OutcomeKind::Failed,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Outcome::Done => None,
            Outcome::Aborted { stage, .. } | Outcome::Failed { stage, .. } => Some(*stage),
        }
    }

    /// Human-readable detail: the abort reason or the error message
    pub fn detail(&self) -> Option<String> {
        match self {
            Outcome::Done => None,
            Outcome::Aborted { reason, .. } => Some(reason.clone()),
            Outcome::Failed { error, .. } => Some(error.to_string()),
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeKind::Done => "done",
            OutcomeKind::Aborted => "aborted",
            OutcomeKind::Failed => "failed",
        };
        f.write_str(s)
    }
}
