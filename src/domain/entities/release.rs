//! Release metadata and the cross-target report built from it

use serde::Serialize;

/// Release tags observed on a target's hosts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    /// `git describe` of `origin/<branch>`
    pub origin_tag: String,
    /// `git describe` of the deployed working tree
    pub local_tag: String,
    /// `X.Y.Z` when `origin/<branch>` sits exactly on a `vX.Y.Z` tag
    pub exact_version: Option<String>,
}

/// One target's contribution to the final release report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub target_name: String,
    pub version: String,
    pub changelog_lines: Vec<String>,
}

impl ReportEntry {
    /// Render as the notification text sent to operators
    pub fn render(&self) -> String {
        let mut out = vec![
            format!(
                "<b>Release {} for {} is deployed to production</b>",
                self.version, self.target_name
            ),
            "Changes:".to_string(),
        ];
        out.extend(self.changelog_lines.iter().cloned());
        out.join("\n")
    }
}

/// Join every entry into the single report emitted at the end of a run
pub fn render_report(entries: &[ReportEntry]) -> String {
    entries
        .iter()
        .map(ReportEntry::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}
