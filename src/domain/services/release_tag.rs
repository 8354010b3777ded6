//! Release tag detection
//!
//! `git describe --tags --always` prints the nearest tag, optionally followed
//! by `-<n>-g<sha>`, or a bare abbreviated sha when no tag is reachable. Only
//! a describe output that ends in `vX.Y.Z` means the commit sits exactly on a
//! release tag.

use regex::Regex;

use crate::error::RolloutResult;

const RELEASE_TAG: &str = r"(?i)v(\d+\.\d+\.\d+)$";

/// Parse the exact release version out of a `git describe` string.
///
/// Returns `Ok(None)` when the tip is not an exact `vX.Y.Z` tag.
pub fn exact_version(describe: &str) -> RolloutResult<Option<String>> {
    let re = Regex::new(RELEASE_TAG)?;
    Ok(re
        .captures(describe.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}
