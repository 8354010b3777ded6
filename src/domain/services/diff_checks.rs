//! Parsers for git and shell output inspected by the diagnostic checks
//!
//! Each function takes raw command output and returns findings; none of them
//! issue commands.

use regex::Regex;

use crate::error::RolloutResult;

/// Compile a configured path pattern so it only matches from the start of a line
pub fn prefix_pattern(pattern: &str) -> RolloutResult<Regex> {
    Ok(Regex::new(&format!("^(?:{pattern})"))?)
}

/// Changed paths from `git diff --name-only` that match `pattern`
pub fn matching_paths(name_only: &str, pattern: &Regex) -> Vec<String> {
    name_only
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && pattern.is_match(line))
        .map(str::to_string)
        .collect()
}

/// `1. path` listing, one per line
pub fn numbered(paths: &[String]) -> String {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, p))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Added lines of a manifest diff, minus the file header and version bumps
pub fn added_manifest_lines(diff: &str) -> Vec<String> {
    diff.lines()
        .filter(|line| line.starts_with('+') && !line.starts_with("+++"))
        .filter(|line| !line[1..].trim_start().starts_with("\"version\""))
        .map(str::to_string)
        .collect()
}

/// Whether `git diff --name-status` reported any change
pub fn has_changes(name_status: &str) -> bool {
    name_status.lines().any(|line| !line.trim().is_empty())
}

/// First entry of an `ls` listing that matches `pattern`
pub fn find_file(listing: &str, pattern: &Regex) -> Option<String> {
    listing
        .split_whitespace()
        .find(|entry| pattern.is_match(entry))
        .map(str::to_string)
}
