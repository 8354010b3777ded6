//! Configuration type definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{LocalConfig, RemoteConfig};
use crate::domain::services::StuckRule;

/// Top-level `rollout.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Branch on which exact `vX.Y.Z` tags are expected
    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub ssh: SshConfig,

    /// Migration kinds detected in the diff and offered after apply
    #[serde(default = "default_migrations")]
    pub migrations: Vec<MigrationKind>,

    /// Files whose diff is surfaced as a finding when they exist
    #[serde(default = "default_file_checks")]
    pub files: Vec<FileCheck>,

    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            release_branch: default_release_branch(),
            report: ReportConfig::default(),
            health: HealthConfig::default(),
            merge: MergeConfig::default(),
            ssh: SshConfig::default(),
            migrations: default_migrations(),
            files: default_file_checks(),
            environments: BTreeMap::new(),
        }
    }
}

fn default_release_branch() -> String {
    "master".to_string()
}

/// Where the final release report goes besides the console
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Local command fed the report on stdin (`pbcopy`, `xclip -selection clipboard`)
    #[serde(default)]
    pub clipboard: Option<String>,
}

/// Health monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Service process name looked for by the hang scan
    #[serde(default = "default_process")]
    pub process: String,

    #[serde(default = "default_restart_cpu_threshold")]
    pub restart_cpu_threshold: f64,

    #[serde(default = "default_steady_cpu_threshold")]
    pub steady_cpu_threshold: f64,

    #[serde(default = "default_top")]
    pub top: usize,

    #[serde(default)]
    pub stuck: Vec<StuckRule>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            process: default_process(),
            restart_cpu_threshold: default_restart_cpu_threshold(),
            steady_cpu_threshold: default_steady_cpu_threshold(),
            top: default_top(),
            stuck: Vec::new(),
        }
    }
}

fn default_process() -> String {
    "node".to_string()
}

fn default_restart_cpu_threshold() -> f64 {
    1.0
}

fn default_steady_cpu_threshold() -> f64 {
    50.0
}

fn default_top() -> usize {
    5
}

/// Options for every ssh call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshConfig {
    /// Extra `-o` options, e.g. `ConnectTimeout=10`
    #[serde(default)]
    pub options: Vec<String>,
}

/// `merge` command settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_merge_branches")]
    pub branches: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            branches: default_merge_branches(),
        }
    }
}

fn default_merge_branches() -> Vec<String> {
    ["test", "staging", "development", "demo", "vision"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// A kind of database migration: which changed paths signal it and how to run it.
///
/// `command` may reference `{task_path}`, `{node_env}`, `{namespace}` and `{kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationKind {
    pub name: String,
    pub pattern: String,
    pub command: String,
    #[serde(default)]
    pub hint: Option<String>,
}

fn default_migrations() -> Vec<MigrationKind> {
    vec![
        MigrationKind {
            name: "migrations".to_string(),
            pattern: r"migrations/.*\.(sql|js)".to_string(),
            command: "npm run migrate".to_string(),
            hint: Some("you should run task `migrate`!".to_string()),
        },
        MigrationKind {
            name: "flexible-migrations".to_string(),
            pattern: r"migrations/flexible/.*\.xml".to_string(),
            command: "cd {task_path} && NODE_ENV={node_env} node tasks {namespace}/migrate_flexible"
                .to_string(),
            hint: Some("you should run task `migrate_flexible`!".to_string()),
        },
    ]
}

/// A working-tree file whose pending diff is worth a look before restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCheck {
    pub name: String,
    /// Matched against the entries of `ls` in the remote checkout
    pub pattern: String,
    #[serde(default)]
    pub hint: Option<String>,
}

fn default_file_checks() -> Vec<FileCheck> {
    vec![
        FileCheck {
            name: "config".to_string(),
            pattern: r"config\.(js|json)\.sample$".to_string(),
            hint: Some("you should edit config file before restart!".to_string()),
        },
        FileCheck {
            name: "indexes".to_string(),
            pattern: r"indexes\.js$".to_string(),
            hint: Some("you should rebuild the search indexes after restart!".to_string()),
        },
    ]
}

/// A named environment (`prod`, `stage`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Target whose checkout hosts the migration task runners
    #[serde(default)]
    pub tasks_target: Option<String>,

    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,

    /// Single-target shorthand: the environment is its own target
    #[serde(default)]
    pub remote: Option<RemoteConfig>,

    #[serde(default)]
    pub local: Option<LocalConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub local: LocalConfig,
}
