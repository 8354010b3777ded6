//! Run settings derived once from `Config`
//!
//! Patterns are compiled here so an invalid one fails the run before any
//! host is touched.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use crate::config::{Config, FileCheck, HealthConfig, MigrationKind};
use crate::domain::services::diff_checks::prefix_pattern;
use crate::error::RolloutResult;

/// Status poll attempts after a restart
pub const STATUS_ATTEMPTS: u32 = 5;

/// Delay between status poll attempts
pub const STATUS_DELAY: Duration = Duration::from_secs(1);

type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Bounded retry policy for status verification
#[derive(Clone)]
pub struct PollPolicy {
    pub attempts: u32,
    pub delay: Duration,
    sleep: Sleeper,
}

impl PollPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            sleep: Arc::new(std::thread::sleep),
        }
    }

    /// Replace the blocking sleep, e.g. to record delays in tests
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Arc::new(sleep);
        self
    }

    pub fn sleep(&self) {
        (self.sleep)(self.delay)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(STATUS_ATTEMPTS, STATUS_DELAY)
    }
}

impl fmt::Debug for PollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollPolicy")
            .field("attempts", &self.attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// A migration kind with its compiled path pattern
#[derive(Debug, Clone)]
pub struct MigrationCheck {
    pub kind: MigrationKind,
    pub regex: Regex,
}

/// A file check with its compiled name pattern
#[derive(Debug, Clone)]
pub struct WatchedFile {
    pub check: FileCheck,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub release_branch: String,
    pub migrations: Vec<MigrationCheck>,
    pub files: Vec<WatchedFile>,
    pub health: HealthConfig,
    pub poll: PollPolicy,
}

impl Settings {
    pub fn from_config(config: &Config) -> RolloutResult<Self> {
        let migrations = config
            .migrations
            .iter()
            .map(|kind| {
                Ok(MigrationCheck {
                    regex: prefix_pattern(&kind.pattern)?,
                    kind: kind.clone(),
                })
            })
            .collect::<RolloutResult<Vec<_>>>()?;

        let files = config
            .files
            .iter()
            .map(|check| {
                Ok(WatchedFile {
                    regex: prefix_pattern(&check.pattern)?,
                    check: check.clone(),
                })
            })
            .collect::<RolloutResult<Vec<_>>>()?;

        Ok(Self {
            release_branch: config.release_branch.clone(),
            migrations,
            files,
            health: config.health.clone(),
            poll: PollPolicy::default(),
        })
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
