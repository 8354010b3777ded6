//! Configuration module for rollout
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (ROLLOUT_*)
//! 3. `--config` / `$ROLLOUT_CONFIG` / `./rollout.toml` / user config dir
//! 4. Built-in defaults (lowest priority)
//!
//! The loaded `Config` is built once in `main` and passed down explicitly.

mod loader;
mod resolve;
mod types;

pub use loader::{
    load, load_with_warnings, parse_with_warnings, search_paths, with_env_overrides,
    ConfigWarning, CONFIG_ENV, CONFIG_FILE,
};
pub use resolve::{resolve_targets, TargetSelection};
pub use types::{
    Config, EnvironmentConfig, FileCheck, HealthConfig, MergeConfig, MigrationKind, ReportConfig,
    SshConfig, TargetConfig,
};
