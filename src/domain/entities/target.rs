//! Target entity - one independently configured deployment unit

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RolloutError, RolloutResult};

/// Lifecycle commands configured for a target's service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    #[serde(default)]
    pub pre: Option<String>,
    #[serde(default)]
    pub post: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reload: Option<String>,
    #[serde(default)]
    pub restart: Option<String>,
}

impl CommandSet {
    /// Pick the service restart command.
    ///
    /// `reload` wins over `restart` unless `prefer_restart` is set, in which
    /// case `restart` wins when both are configured.
    pub fn restart_command(&self, prefer_restart: bool) -> Option<&str> {
        let (first, second) = if prefer_restart {
            (&self.restart, &self.reload)
        } else {
            (&self.reload, &self.restart)
        };
        first.as_deref().or(second.as_deref())
    }

    /// Configured command by its key (`status`, `reload`, ...)
    pub fn named(&self, name: &str) -> Option<&str> {
        let cmd = match name {
            "pre" => &self.pre,
            "post" => &self.post,
            "status" => &self.status,
            "reload" => &self.reload,
            "restart" => &self.restart,
            _ => return None,
        };
        cmd.as_deref()
    }
}

/// One remote file path, or several keyed by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedPaths {
    Single(String),
    Named(BTreeMap<String, String>),
}

impl NamedPaths {
    /// Path for `name`; without a name, the only configured path
    pub fn pick(&self, name: Option<&str>) -> Result<&str, String> {
        match (self, name) {
            (NamedPaths::Single(path), None) => Ok(path.as_str()),
            (NamedPaths::Single(_), Some(name)) => {
                Err(format!("only one path is configured, '{name}' is not a name"))
            }
            (NamedPaths::Named(paths), Some(name)) => {
                paths.get(name).map(String::as_str).ok_or_else(|| {
                    format!("no path named '{name}' (available: {})", self.names())
                })
            }
            (NamedPaths::Named(paths), None) if paths.len() == 1 => paths
                .values()
                .next()
                .map(String::as_str)
                .ok_or_else(|| "no paths configured".to_string()),
            (NamedPaths::Named(_), None) => {
                Err(format!("pick one of: {}", self.names()))
            }
        }
    }

    fn names(&self) -> String {
        match self {
            NamedPaths::Single(_) => String::new(),
            NamedPaths::Named(paths) => paths.keys().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Remote side of a target: the deployed checkout on every host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub yarn: bool,
    #[serde(default = "default_true")]
    pub migrate_task: bool,
    /// Checkout that hosts migration task runners, when it is not `path`
    #[serde(default)]
    pub task_path: Option<String>,
    #[serde(default)]
    pub cmd: CommandSet,
    /// Log files followed by `log`
    #[serde(default)]
    pub log: Option<NamedPaths>,
    /// Files printed by `cat`
    #[serde(default)]
    pub cat: Option<NamedPaths>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            branch: String::new(),
            path: String::new(),
            servers: Vec::new(),
            user: None,
            yarn: false,
            migrate_task: true,
            task_path: None,
            cmd: CommandSet::default(),
            log: None,
            cat: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl RemoteConfig {
    /// Dependency install command for the manifest
    pub fn install_command(&self) -> &'static str {
        if self.yarn {
            "yarn install"
        } else {
            "npm install"
        }
    }
}

/// Local side of a target: the operator's own checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A resolved deployment target.
///
/// Built once per run from configuration and never mutated afterwards; the
/// execution handle lives in the session opened for it by a `Connector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub remote: RemoteConfig,
    pub local: LocalConfig,
    /// Resolved directory for migration task runners on the hosts
    pub task_path: String,
}

impl Target {
    pub fn new(name: impl Into<String>, remote: RemoteConfig, local: LocalConfig) -> Self {
        let task_path = remote
            .task_path
            .clone()
            .unwrap_or_else(|| remote.path.clone());
        Self {
            name: name.into(),
            remote,
            local,
            task_path,
        }
    }

    pub fn with_task_path(mut self, task_path: impl Into<String>) -> Self {
        self.task_path = task_path.into();
        self
    }

    /// Reject definitions that cannot be deployed before any host is touched
    pub fn validate(&self) -> RolloutResult<()> {
        if self.remote.branch.trim().is_empty() {
            return Err(RolloutError::config(&self.name, "remote.branch is not set"));
        }
        if self.remote.path.trim().is_empty() {
            return Err(RolloutError::config(&self.name, "remote.path is not set"));
        }
        if self.remote.servers.is_empty() {
            return Err(RolloutError::config(&self.name, "remote.servers is empty"));
        }
        if let Some(blank) = self.remote.servers.iter().find(|s| s.trim().is_empty()) {
            return Err(RolloutError::config(
                &self.name,
                format!("remote.servers contains a blank entry ({blank:?})"),
            ));
        }
        Ok(())
    }

    /// SSH destination for a host, applying `user` unless the host names one
    pub fn destination(&self, host: &str, user: Option<&str>) -> String {
        let user = user.or(self.remote.user.as_deref());
        match user {
            Some(user) if !host.contains('@') => format!("{user}@{host}"),
            _ => host.to_string(),
        }
    }

    /// Branch that carries the compensating reset point
    pub fn home_branch(&self) -> &str {
        if self.local.branch.is_empty() {
            &self.remote.branch
        } else {
            &self.local.branch
        }
    }
}
