//! CHANGELOG.md structure checks and section extraction
//!
//! The changelog keeps unreleased entries under a `## master` header, followed
//! by released sections headed `## X.Y.Z`.

use regex::Regex;

use crate::error::RolloutResult;

use super::version::Version;

/// Duplicate lines carrying this marker are expected and never flagged
pub const POST_MARKER: &str = "[Post]";

/// Lines at most this long are never flagged as duplicates
pub const DUPLICATE_MIN_LEN: usize = 10;

/// Entries of the newest released section: lines after the first `##` header
/// other than `## master`, up to the next header, blank lines dropped
pub fn latest_section(changelog: &str) -> Vec<String> {
    changelog
        .trim()
        .lines()
        .skip_while(|line| !line.starts_with("##") || is_master_header(line))
        .skip(1)
        .take_while(|line| !line.starts_with("##"))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of hunks in a unified diff
pub fn hunk_count(diff: &str) -> usize {
    diff.lines().filter(|line| line.starts_with("@@")).count()
}

/// Changed lines that land after the first released-version header following
/// `## master`
pub fn misplaced_lines(diff: &str) -> RolloutResult<Vec<String>> {
    let master = Regex::new(r"(?i)^##\s+master")?;
    let version = Regex::new(r"^##\s+\d+\.\d+\.\d+")?;

    let mut master_found = false;
    let mut released = false;
    let mut misplaced = Vec::new();

    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") || line.starts_with("@@") {
            continue;
        }
        let content = strip_marker(line);
        if master.is_match(content) {
            master_found = true;
            continue;
        }
        if master_found && !released && version.is_match(content) {
            released = true;
            continue;
        }
        if released && is_change(line) && !content.trim().is_empty() {
            misplaced.push(line.to_string());
        }
    }

    Ok(misplaced)
}

/// Lines that appear more than once, longer than `DUPLICATE_MIN_LEN` and
/// without `POST_MARKER`. Each duplicated line is returned once, sorted.
pub fn duplicates(diff: &str) -> Vec<String> {
    let mut lines: Vec<&str> = diff.lines().collect();
    lines.sort_unstable();

    let mut dups: Vec<String> = Vec::new();
    for pair in lines.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a == b
            && a.chars().count() > DUPLICATE_MIN_LEN
            && !a.contains(POST_MARKER)
            && dups.last().map(String::as_str) != Some(a)
        {
            dups.push(a.to_string());
        }
    }
    dups
}

/// Open a release section for `version`.
///
/// The `## <version> <stamp>` header goes right below `## master`, so the
/// unreleased entries become the release's entries. Without a `## master`
/// header it goes below the first line. When the file links GitHub compare
/// views, a link from the previous release to this one follows the header.
pub fn insert_release_header(
    changelog: &str,
    version: &Version,
    stamp: &str,
) -> RolloutResult<String> {
    let mut block = vec![String::new(), format!("## {version} {stamp}")];
    if let Some(url) = compare_url(changelog, version)? {
        block.push(String::new());
        block.push(url);
    }

    let lines: Vec<&str> = changelog.split('\n').collect();
    let at = lines
        .iter()
        .position(|line| line.starts_with("##") && is_master_header(line))
        .map_or(1.min(lines.len()), |i| i + 1);

    let mut out: Vec<String> = lines[..at].iter().map(|l| l.to_string()).collect();
    out.extend(block);
    out.extend(lines[at..].iter().map(|l| l.to_string()));
    Ok(out.join("\n"))
}

fn compare_url(changelog: &str, version: &Version) -> RolloutResult<Option<String>> {
    let link = Regex::new(r"(?im)^(.*https://github\.com/.*/compare/)")?;
    let released = Regex::new(r"(?m)^##\s+(\d+\.\d+\.\d+)")?;

    let Some(prefix) = link.captures(changelog).and_then(|c| c.get(1)) else {
        return Ok(None);
    };
    let Some(previous) = released.captures(changelog).and_then(|c| c.get(1)) else {
        return Ok(None);
    };
    Ok(Some(format!(
        "{}v{}...{}",
        prefix.as_str(),
        previous.as_str(),
        version.tag()
    )))
}

fn is_master_header(line: &str) -> bool {
    line.trim_start_matches('#')
        .trim()
        .eq_ignore_ascii_case("master")
}

fn strip_marker(line: &str) -> &str {
    match line.chars().next() {
        Some('+') | Some('-') | Some(' ') => &line[1..],
        _ => line,
    }
}

fn is_change(line: &str) -> bool {
    line.starts_with('+') || line.starts_with('-')
}
