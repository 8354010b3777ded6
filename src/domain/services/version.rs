//! Release version arithmetic
//!
//! Versions are plain `X.Y.Z`; tags carry a `v` prefix. The first `X.Y.Z`
//! found in the input is used, so `git describe` output and tag names parse
//! the same way.

use std::fmt;

use regex::Regex;

use crate::error::{RolloutError, RolloutResult};

const VERSION: &str = r"(\d+)\.(\d+)\.(\d+)";
const MANIFEST_VERSION: &str = r#"(?i)"version"\s*:\s*"\d+\.\d+\.\d+""#;

/// Which component a release bumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    /// `X.Y.Z+1`
    Patch,
    /// `X.Y+1.0`
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(text: &str) -> RolloutResult<Self> {
        let re = Regex::new(VERSION)?;
        let invalid = || RolloutError::InvalidVersion(text.trim().to_string());
        let caps = re.captures(text).ok_or_else(invalid)?;
        let part = |i: usize| -> RolloutResult<u64> {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(invalid)
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }

    pub fn bump(self, bump: Bump) -> Self {
        match bump {
            Bump::Patch => Self::new(self.major, self.minor, self.patch + 1),
            Bump::Minor => Self::new(self.major, self.minor + 1, 0),
        }
    }

    /// Git tag name, `vX.Y.Z`
    pub fn tag(&self) -> String {
        format!("v{self}")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Rewrite the first `"version": "X.Y.Z"` of a package manifest.
///
/// Returns `Ok(None)` when the manifest has no version field.
pub fn set_manifest_version(manifest: &str, version: &Version) -> RolloutResult<Option<String>> {
    let re = Regex::new(MANIFEST_VERSION)?;
    if !re.is_match(manifest) {
        return Ok(None);
    }
    let replacement = format!("\"version\": \"{version}\"");
    Ok(Some(
        re.replacen(manifest, 1, regex::NoExpand(&replacement))
            .into_owned(),
    ))
}
