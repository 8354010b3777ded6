//! Reusable targets, settings and command output

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rollout::application::settings::PollPolicy;
use rollout::domain::entities::{CommandSet, LocalConfig, RemoteConfig};
use rollout::{Config, Settings, Target};

/// `git diff ..origin/master -- package.json` adding one dependency
pub const PACKAGE_DIFF_ONE_DEPENDENCY: &str = r#"diff --git a/package.json b/package.json
index 3b18e51..a1c9f07 100644
--- a/package.json
+++ b/package.json
@@ -10,6 +10,7 @@
   "dependencies": {
     "express": "4.18.2",
+    "left-pad": "1.3.0",
     "pg": "8.11.3"
   }
 }"#;

/// `git diff ..origin/master -- package.json` that only bumps the version
pub const PACKAGE_DIFF_VERSION_ONLY: &str = r#"--- a/package.json
+++ b/package.json
@@ -1,4 +1,4 @@
 {
   "name": "api",
-  "version": "1.4.1",
+  "version": "1.4.2",
"#;

pub const CHANGELOG: &str = "# Changelog\n\n## 1.4.2\n- fixed the login redirect\n- faster search\n\n## 1.4.1\n- first cut\n";

pub fn remote(branch: &str, servers: &[&str]) -> RemoteConfig {
    RemoteConfig {
        branch: branch.to_string(),
        path: "/srv/acme/api".to_string(),
        servers: servers.iter().map(|s| s.to_string()).collect(),
        ..RemoteConfig::default()
    }
}

/// A target on `master` with the given hosts and no service commands
pub fn target(name: &str, servers: &[&str]) -> Target {
    Target::new(name, remote("master", servers), LocalConfig::default())
}

pub fn target_with_commands(name: &str, servers: &[&str], cmd: CommandSet) -> Target {
    let mut remote = remote("master", servers);
    remote.cmd = cmd;
    Target::new(name, remote, LocalConfig::default())
}

/// A target driven from the operator's checkout at `~/src/<name>`
pub fn local_target(name: &str, branch: &str) -> Target {
    Target::new(
        name,
        remote(branch, &["app1"]),
        LocalConfig {
            branch: branch.to_string(),
            path: Some(format!("~/src/{name}")),
            url: None,
        },
    )
}

/// Delays handed to a `PollPolicy` sleeper, in call order
#[derive(Clone, Default)]
pub struct SleepLog(Arc<Mutex<Vec<Duration>>>);

impl SleepLog {
    pub fn delays(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

/// Default settings with a poll policy that records instead of sleeping
pub fn settings() -> (Settings, SleepLog) {
    let log = SleepLog::default();
    let sink = log.0.clone();
    let settings = Settings::from_config(&Config::default())
        .unwrap()
        .with_poll(PollPolicy::default().with_sleeper(move |d| sink.lock().unwrap().push(d)));
    (settings, log)
}
