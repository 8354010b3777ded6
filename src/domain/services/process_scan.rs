//! Process table scans used by the health monitor

use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: u64 = 86_400;

/// A process-name pattern and how many days it may run before it counts as stuck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckRule {
    pub pattern: String,
    pub days: u64,
}

/// A process matched by a `StuckRule`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckProcess {
    pub pid: u32,
    pub days: u64,
    pub args: String,
    pub pattern: String,
}

impl StuckProcess {
    pub fn kill_command(&self) -> String {
        format!("kill {}", self.pid)
    }
}

/// Processes named `process` whose parent is init, i.e. orphaned service workers
pub fn hang_scan_command(process: &str) -> String {
    format!("pgrep -P 1 -l | grep {process} | awk '{{print $1}}' | xargs -r ps u")
}

/// Top `top` processes by CPU usage
pub fn cpu_scan_command(top: usize) -> String {
    format!("ps -eo pcpu,pid,user,args --no-headers | sort -k1 -nr | head -n {top}")
}

/// Elapsed seconds, pid and command line of every process
pub const STUCK_SCAN_COMMAND: &str = "ps -eo etimes,pid,args --no-headers";

/// Process rows of a `ps u` listing, header dropped
pub fn hung_processes(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with("USER"))
        .map(str::to_string)
        .collect()
}

/// Rows of a `ps -eo pcpu,...` listing at or above `threshold` percent
pub fn high_cpu_lines(output: &str, threshold: f64) -> Vec<String> {
    output
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .next()
                .and_then(|cpu| cpu.parse::<f64>().ok())
                .is_some_and(|cpu| cpu >= threshold)
        })
        .map(|line| line.trim().to_string())
        .collect()
}

/// Rows of a `ps -eo etimes,pid,args` listing matching a rule at or over its age
pub fn stuck_processes(output: &str, rules: &[StuckRule]) -> Vec<StuckProcess> {
    let mut found = Vec::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(etimes), Some(pid)) = (parts.next(), parts.next()) else {
            continue;
        };
        let (Ok(etimes), Ok(pid)) = (etimes.parse::<u64>(), pid.parse::<u32>()) else {
            continue;
        };
        let args = parts.collect::<Vec<_>>().join(" ");
        let days = etimes / SECONDS_PER_DAY;

        if let Some(rule) = rules
            .iter()
            .find(|rule| args.contains(&rule.pattern) && days >= rule.days)
        {
            found.push(StuckProcess {
                pid,
                days,
                args,
                pattern: rule.pattern.clone(),
            });
        }
    }
    found
}
