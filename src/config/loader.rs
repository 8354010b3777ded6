//! Configuration discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RolloutError, RolloutResult};

use super::types::Config;

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "rollout.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "ROLLOUT_CONFIG";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Candidate config files, highest priority first:
/// `--config`, `$ROLLOUT_CONFIG`, `./rollout.toml`, `<config dir>/rollout/config.toml`
pub fn search_paths(explicit: Option<&Path>, env_value: Option<String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        paths.push(PathBuf::from(value));
    }
    paths.push(PathBuf::from(CONFIG_FILE));
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("rollout").join("config.toml"));
    }
    paths
}

/// Find and load the config file, applying `ROLLOUT_*` overrides.
///
/// An explicit path (flag or env) that does not exist is an error; the
/// implicit locations are skipped when missing.
pub fn load(explicit: Option<&Path>) -> RolloutResult<(Config, Vec<ConfigWarning>, PathBuf)> {
    let env_value = std::env::var(CONFIG_ENV).ok();
    let env_set = env_value.as_deref().is_some_and(|v| !v.trim().is_empty());
    let explicit_count = usize::from(explicit.is_some()) + usize::from(env_set);

    for (i, path) in search_paths(explicit, env_value).into_iter().enumerate() {
        if path.is_file() {
            let (config, warnings) = load_with_warnings(&path)?;
            return Ok((with_env_overrides(config), warnings, path));
        }
        if i < explicit_count {
            return Err(RolloutError::config_global(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
    }

    Err(RolloutError::config_global(format!(
        "no {CONFIG_FILE} found (pass --config or set {CONFIG_ENV})"
    )))
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> RolloutResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

/// Parse config text; `path` is only used for error and warning locations
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> RolloutResult<(Config, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| RolloutError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Apply environment variable overrides (ROLLOUT_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(branch) = var("ROLLOUT_RELEASE_BRANCH").filter(|b| !b.trim().is_empty()) {
        config.release_branch = branch.trim().to_string();
    }

    // empty value disables the clipboard sink
    if let Some(cmd) = var("ROLLOUT_CLIPBOARD") {
        config.report.clipboard = Some(cmd).filter(|c| !c.trim().is_empty());
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "release_branch",
        "report",
        "clipboard",
        "health",
        "process",
        "restart_cpu_threshold",
        "steady_cpu_threshold",
        "top",
        "stuck",
        "pattern",
        "days",
        "merge",
        "branches",
        "ssh",
        "options",
        "migrations",
        "name",
        "command",
        "hint",
        "files",
        "environments",
        "tasks_target",
        "targets",
        "remote",
        "local",
        "branch",
        "path",
        "servers",
        "user",
        "yarn",
        "migrate_task",
        "task_path",
        "cmd",
        "pre",
        "post",
        "status",
        "reload",
        "restart",
        "url",
        "log",
        "cat",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
