//! Advisory health findings

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthWarningKind {
    /// Service process re-parented to init, left behind by an earlier start
    HungProcess,
    HighCpu,
    /// Long-running process over its allowed age
    StuckProcess,
}

impl fmt::Display for HealthWarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthWarningKind::HungProcess => "hung process",
            HealthWarningKind::HighCpu => "high cpu",
            HealthWarningKind::StuckProcess => "stuck process",
        };
        f.write_str(s)
    }
}

/// One advisory warning; never fails a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthWarning {
    pub host: String,
    pub kind: HealthWarningKind,
    pub detail: String,
    /// Command the operator may run to resolve it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl HealthWarning {
    pub fn new(host: impl Into<String>, kind: HealthWarningKind, detail: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            kind,
            detail: detail.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
