//! Health Monitor
//!
//! Status verification after a restart is the only fatal check here. The
//! hang, CPU and stuck-process scans are advisory: a scan that cannot run is
//! logged and yields no warnings.

use crate::config::HealthConfig;
use crate::domain::entities::Target;
use crate::domain::ports::CommandRunner;
use crate::domain::services::process_scan;
use crate::domain::value_objects::{HealthWarning, HealthWarningKind, RunOptions};
use crate::error::{RolloutError, RolloutResult};

use super::settings::PollPolicy;

pub struct HealthMonitor<'a> {
    target: &'a Target,
    runner: &'a dyn CommandRunner,
    config: &'a HealthConfig,
}

impl<'a> HealthMonitor<'a> {
    pub fn new(target: &'a Target, runner: &'a dyn CommandRunner, config: &'a HealthConfig) -> Self {
        Self {
            target,
            runner,
            config,
        }
    }

    /// Poll `command` on every host until all exit 0.
    ///
    /// Returns the number of attempts used. Sleeps `policy.delay` between
    /// attempts, never after the last one.
    pub fn verify_status(&self, command: &str, policy: &PollPolicy) -> RolloutResult<u32> {
        for attempt in 1..=policy.attempts {
            let results = self.runner.remote(command, &RunOptions::quiet())?;
            let failing: Vec<&str> = results
                .iter()
                .filter(|r| !r.success())
                .map(|r| r.host.as_str())
                .collect();

            if failing.is_empty() {
                tracing::info!(target_name = %self.target.name, attempt, "status ok");
                return Ok(attempt);
            }

            tracing::debug!(
                target_name = %self.target.name,
                attempt,
                hosts = ?failing,
                "status not ready"
            );
            if attempt < policy.attempts {
                policy.sleep();
            }
        }

        Err(RolloutError::PollTimeout {
            target: self.target.name.clone(),
            command: command.to_string(),
            attempts: policy.attempts,
        })
    }

    /// Orphaned service processes re-parented to init
    pub fn scan_hangs(&self) -> Vec<HealthWarning> {
        let command = process_scan::hang_scan_command(&self.config.process);
        self.scan(&command, |host, stdout| {
            let rows = process_scan::hung_processes(stdout);
            if rows.is_empty() {
                return Vec::new();
            }
            vec![HealthWarning::new(
                host,
                HealthWarningKind::HungProcess,
                format!("found hung {} processes:\n{}", self.config.process, rows.join("\n")),
            )]
        })
    }

    /// Top processes by CPU at or above `threshold` percent
    pub fn scan_cpu(&self, threshold: f64) -> Vec<HealthWarning> {
        let command = process_scan::cpu_scan_command(self.config.top);
        self.scan(&command, |host, stdout| {
            process_scan::high_cpu_lines(stdout, threshold)
                .into_iter()
                .map(|line| HealthWarning::new(host, HealthWarningKind::HighCpu, line))
                .collect()
        })
    }

    /// Processes running longer than their rule allows
    pub fn scan_stuck(&self) -> Vec<HealthWarning> {
        if self.config.stuck.is_empty() {
            return Vec::new();
        }
        self.scan(process_scan::STUCK_SCAN_COMMAND, |host, stdout| {
            process_scan::stuck_processes(stdout, &self.config.stuck)
                .into_iter()
                .map(|p| {
                    HealthWarning::new(
                        host,
                        HealthWarningKind::StuckProcess,
                        format!("running {} days (limit for '{}'): {}", p.days, p.pattern, p.args),
                    )
                    .with_suggestion(p.kill_command())
                })
                .collect()
        })
    }

    /// All advisory scans, CPU at `cpu_threshold`
    pub fn scan_all(&self, cpu_threshold: f64) -> Vec<HealthWarning> {
        let mut warnings = self.scan_hangs();
        warnings.extend(self.scan_cpu(cpu_threshold));
        warnings.extend(self.scan_stuck());
        for warning in &warnings {
            tracing::warn!(
                target_name = %self.target.name,
                host = %warning.host,
                kind = %warning.kind,
                "{}",
                warning.detail
            );
        }
        warnings
    }

    fn scan(
        &self,
        command: &str,
        parse: impl Fn(&str, &str) -> Vec<HealthWarning>,
    ) -> Vec<HealthWarning> {
        match self.runner.remote(command, &RunOptions::quiet()) {
            Ok(results) => results
                .iter()
                .filter(|r| r.success())
                .flat_map(|r| parse(&r.host, &r.stdout))
                .collect(),
            Err(err) => {
                tracing::warn!(target_name = %self.target.name, command, error = %err, "health scan failed");
                Vec::new()
            }
        }
    }
}
