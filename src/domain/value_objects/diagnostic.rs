//! Diagnostic findings gathered before the update gate

use serde::Serialize;

/// Well-known check names
pub mod checks {
    pub const NOT_RELEASE: &str = "not-release";
    pub const PACKAGES: &str = "packages";
    pub const CHANGELOG: &str = "changelog";
}

/// A single diagnostic finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub title: String,
    pub description: String,
}

impl CheckResult {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Merged findings of one target's diagnose phase.
///
/// `ok` and `has_findings` are independent: informational findings (new
/// packages, pending migrations) leave the report `ok`; only structural
/// violations clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    findings: Vec<(String, CheckResult)>,
    violations: Vec<String>,
    no_changes: bool,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding; a later finding with the same name replaces the earlier one
    pub fn insert(&mut self, name: impl Into<String>, result: CheckResult) {
        let name = name.into();
        if let Some(slot) = self.findings.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = result;
        } else {
            self.findings.push((name, result));
        }
    }

    /// Record a structural failure; the report stops being `ok`
    pub fn add_violation(&mut self, reason: impl Into<String>) {
        self.violations.push(reason.into());
    }

    pub fn set_no_changes(&mut self, no_changes: bool) {
        self.no_changes = no_changes;
    }

    pub fn ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn no_changes(&self) -> bool {
        self.no_changes
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.findings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn findings(&self) -> impl Iterator<Item = (&str, &CheckResult)> {
        self.findings.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> Vec<&str> {
        self.findings.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Default answer for the update gate
    pub fn default_answer(&self) -> bool {
        self.ok()
    }
}
