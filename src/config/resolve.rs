//! Environment to target resolution
//!
//! Precedence, highest first:
//! 1. explicit selection (`ALL` or a comma-separated list of names)
//! 2. the only target of an environment that defines exactly one
//! 3. the environment itself, when it declares a top-level `remote`
//!
//! Anything else is a config error asking for a selection.

use crate::domain::entities::{LocalConfig, RemoteConfig, Target};
use crate::error::{RolloutError, RolloutResult};

use super::types::{Config, EnvironmentConfig};

/// Which targets of an environment a command should run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    /// Nothing given on the command line
    Default,
    All,
    Named(Vec<String>),
}

impl TargetSelection {
    pub fn parse(arg: Option<&str>) -> Self {
        let Some(arg) = arg.map(str::trim).filter(|a| !a.is_empty()) else {
            return Self::Default;
        };
        if arg == "ALL" {
            return Self::All;
        }
        let names: Vec<String> = arg
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            Self::Default
        } else {
            Self::Named(names)
        }
    }
}

/// Resolve the selected targets of `env_name`, in selection order
pub fn resolve_targets(
    config: &Config,
    env_name: &str,
    selection: &TargetSelection,
) -> RolloutResult<Vec<Target>> {
    let env = environment(config, env_name)?;

    if env.targets.is_empty() {
        return single_environment_target(env, env_name, selection);
    }

    let names: Vec<String> = match selection {
        TargetSelection::All => env.targets.keys().cloned().collect(),
        TargetSelection::Named(names) => names.clone(),
        TargetSelection::Default if env.targets.len() == 1 => {
            env.targets.keys().cloned().collect()
        }
        TargetSelection::Default => {
            return Err(RolloutError::config_global(format!(
                "environment '{env_name}' defines {} targets; select some ({}) or ALL",
                env.targets.len(),
                available(env)
            )))
        }
    };

    let shared_task_path = tasks_target_path(env, env_name)?;

    names
        .iter()
        .map(|name| {
            let def = env.targets.get(name).ok_or_else(|| {
                RolloutError::config_global(format!(
                    "unknown target '{name}' in environment '{env_name}' (available: {})",
                    available(env)
                ))
            })?;
            Ok(build_target(
                name,
                def.remote.clone(),
                def.local.clone(),
                shared_task_path.as_deref(),
            ))
        })
        .collect()
}

fn environment<'a>(config: &'a Config, env_name: &str) -> RolloutResult<&'a EnvironmentConfig> {
    config.environments.get(env_name).ok_or_else(|| {
        let known: Vec<&str> = config.environments.keys().map(String::as_str).collect();
        RolloutError::config_global(format!(
            "unknown environment '{env_name}' (available: {})",
            if known.is_empty() {
                "none".to_string()
            } else {
                known.join(", ")
            }
        ))
    })
}

fn single_environment_target(
    env: &EnvironmentConfig,
    env_name: &str,
    selection: &TargetSelection,
) -> RolloutResult<Vec<Target>> {
    let Some(remote) = env.remote.clone() else {
        return Err(RolloutError::config_global(format!(
            "environment '{env_name}' defines neither targets nor a remote"
        )));
    };
    if let TargetSelection::Named(names) = selection {
        if let Some(other) = names.iter().find(|n| n.as_str() != env_name) {
            return Err(RolloutError::config_global(format!(
                "unknown target '{other}' in environment '{env_name}' (available: {env_name})"
            )));
        }
    }
    let local = env.local.clone().unwrap_or_default();
    Ok(vec![build_target(env_name, remote, local, None)])
}

fn tasks_target_path(env: &EnvironmentConfig, env_name: &str) -> RolloutResult<Option<String>> {
    let Some(name) = env.tasks_target.as_deref() else {
        return Ok(None);
    };
    env.targets
        .get(name)
        .map(|t| Some(t.remote.path.clone()))
        .ok_or_else(|| {
            RolloutError::config_global(format!(
                "tasks_target '{name}' is not a target of environment '{env_name}'"
            ))
        })
}

fn build_target(
    name: &str,
    remote: RemoteConfig,
    local: LocalConfig,
    shared_task_path: Option<&str>,
) -> Target {
    let explicit = remote.task_path.is_some();
    let target = Target::new(name, remote, local);
    match shared_task_path {
        Some(path) if !explicit && !path.is_empty() => target.with_task_path(path),
        _ => target,
    }
}

fn available(env: &EnvironmentConfig) -> String {
    env.targets.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}
