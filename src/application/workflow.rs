//! Workflow Pipeline
//!
//! One parameterized state machine drives every per-target command:
//!
//! ```text
//! update:  Init -> Fetch -> Diagnose -> AwaitConfirm -> Apply -> PostActions -> Report
//! restart: Init -> PostActions
//! check:   Init -> PostActions (steady-state scans only)
//! ```
//!
//! Forced mode and reload-vs-restart are `RunMode` inputs, not separate code
//! paths.

use crate::config::MigrationKind;
use crate::domain::entities::{ReleaseInfo, ReportEntry, Target};
use crate::domain::ports::{CommandRunner, DeployEvent, DeployEventSink};
use crate::domain::value_objects::{
    checks, CommandResult, DiagnosticReport, HealthWarning, RunOptions, Stage,
};
use crate::error::{RolloutError, RolloutResult};

use super::diagnose::{tagline, DiagnosticCollector};
use super::gate::Gate;
use super::health::HealthMonitor;
use super::pipeline::{Pipeline, PipelineContext, Step};
use super::release::build_entry;
use super::settings::Settings;

/// Which pipeline a command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Update,
    Restart,
    Check,
}

/// Behavior switches for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Skip every confirmation gate and the branch check (`update -f`)
    pub bypass_gates: bool,
    /// Use `cmd.restart` over `cmd.reload` when both exist (`restart -f`)
    pub prefer_restart: bool,
}

/// Per-target mutable state threaded through the steps
pub struct TargetRun<'a> {
    pub target: &'a Target,
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
    gate: Gate<'a>,
    events: &'a dyn DeployEventSink,
    mode: RunMode,
    pub report: DiagnosticReport,
    pub release: ReleaseInfo,
    /// `(host, commit)` recorded right before the update gate
    pub tips: Vec<(String, String)>,
    pub warnings: Vec<HealthWarning>,
    /// Hosts restarted by the restart step; `None` when it had nothing to run
    pub restarted: Option<Vec<String>>,
    pub entry: Option<ReportEntry>,
}

impl PipelineContext for TargetRun<'_> {
    fn subject(&self) -> &str {
        &self.target.name
    }

    fn events(&self) -> &dyn DeployEventSink {
        self.events
    }
}

impl<'a> TargetRun<'a> {
    pub fn new(
        target: &'a Target,
        runner: &'a dyn CommandRunner,
        settings: &'a Settings,
        gate: Gate<'a>,
        events: &'a dyn DeployEventSink,
        mode: RunMode,
    ) -> Self {
        Self {
            target,
            runner,
            settings,
            gate,
            events,
            mode,
            report: DiagnosticReport::new(),
            release: ReleaseInfo::default(),
            tips: Vec::new(),
            warnings: Vec::new(),
            restarted: None,
            entry: None,
        }
    }

    fn name(&self) -> &str {
        &self.target.name
    }

    fn branch(&self) -> &str {
        &self.target.remote.branch
    }

    fn first_host(&self) -> RolloutResult<&str> {
        self.target
            .remote
            .servers
            .first()
            .map(String::as_str)
            .ok_or_else(|| RolloutError::config(self.name(), "remote.servers is empty"))
    }

    fn emit(&self, event: DeployEvent) {
        self.events.on_event(event);
    }

    fn show_output(&self, title: &str, results: &[CommandResult]) {
        for r in results {
            if r.stdout.trim().is_empty() {
                continue;
            }
            self.emit(DeployEvent::CommandOutput {
                target: self.name().to_string(),
                host: r.host.clone(),
                title: title.to_string(),
                output: r.stdout.trim_end().to_string(),
            });
        }
    }

    /// Gate prompt tagged with the target name, so prompts from concurrent
    /// targets stay attributable
    fn ask(&self, message: &str, default: bool, forced: bool) -> RolloutResult<bool> {
        self.gate
            .ask(&format!("[{}] {message}", self.name()), default, forced)
    }

    fn declined(&self, gate: impl Into<String>) -> RolloutError {
        let gate = gate.into();
        self.emit(DeployEvent::Declined {
            target: self.name().to_string(),
            gate: gate.clone(),
        });
        RolloutError::UserDeclined {
            target: self.name().to_string(),
            gate,
        }
    }

    /// Reset every host to the commit recorded before the gate
    fn compensate(&self) -> RolloutResult<()> {
        if self.tips.is_empty() {
            let fallback = format!("git reset --hard origin/{}", self.target.home_branch());
            self.runner.remote(&fallback, &RunOptions::muted())?;
            return Ok(());
        }
        for (host, tip) in &self.tips {
            tracing::info!(target_name = %self.name(), host = %host, tip = %tip, "restoring recorded tip");
            self.runner
                .remote_on(host, &format!("git reset --hard {tip}"), &RunOptions::muted())?;
        }
        Ok(())
    }

    fn hints(&self) -> Vec<String> {
        let mut hints = Vec::new();
        for m in &self.settings.migrations {
            if let (true, Some(hint)) = (self.report.contains(&m.kind.name), &m.kind.hint) {
                hints.push(hint.clone());
            }
        }
        for f in &self.settings.files {
            if let (true, Some(hint)) = (self.report.contains(&f.check.name), &f.check.hint) {
                hints.push(hint.clone());
            }
        }
        if self.report.contains(checks::PACKAGES) {
            hints.push(format!(
                "you should run `{}`!",
                self.target.remote.install_command()
            ));
        }
        hints
    }
}

impl PipelineKind {
    pub fn pipeline<'a>(&self) -> Pipeline<TargetRun<'a>> {
        Pipeline::new(match self {
            PipelineKind::Update => update_steps(),
            PipelineKind::Restart => restart_steps(),
            PipelineKind::Check => check_steps(),
        })
    }
}

pub fn update_steps<'a>() -> Vec<Step<TargetRun<'a>>> {
    vec![
        Step::new(Stage::Init, "validate", validate),
        Step::new(Stage::Init, "check-branch", check_branch),
        Step::new(Stage::Fetch, "pre-command", pre_command),
        Step::new(Stage::Fetch, "fetch", fetch),
        Step::new(Stage::Diagnose, "diagnose", diagnose),
        Step::new(Stage::AwaitConfirm, "record-tips", record_tips),
        Step::new(Stage::AwaitConfirm, "confirm-update", confirm_update),
        Step::new(Stage::Apply, "checkout", checkout),
        Step::new(Stage::Apply, "reset", reset_to_origin),
        Step::new(Stage::Apply, "install", install),
        Step::new(Stage::Apply, "migrations", migrations),
        Step::new(Stage::PostActions, "restart", restart),
        Step::new(Stage::PostActions, "post-command", post_command),
        Step::new(Stage::PostActions, "verify-status", verify_status),
        Step::new(Stage::PostActions, "health-scan", restart_health_scan),
        Step::new(Stage::PostActions, "release-entry", release_entry),
        Step::new(Stage::Report, "summary", summary),
    ]
}

pub fn restart_steps<'a>() -> Vec<Step<TargetRun<'a>>> {
    vec![
        Step::new(Stage::Init, "validate", validate),
        Step::new(Stage::PostActions, "restart", restart),
        Step::new(Stage::PostActions, "post-command", post_command),
        Step::new(Stage::PostActions, "verify-status", verify_status),
        Step::new(Stage::PostActions, "health-scan", restart_health_scan),
    ]
}

pub fn check_steps<'a>() -> Vec<Step<TargetRun<'a>>> {
    vec![
        Step::new(Stage::Init, "validate", validate),
        Step::new(Stage::PostActions, "health-scan", steady_health_scan),
    ]
}

fn validate(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    run.target.validate()
}

fn check_branch(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    if run.mode.bypass_gates {
        return Ok(());
    }
    let results = run
        .runner
        .remote("git rev-parse --abbrev-ref HEAD", &RunOptions::muted())?;
    if let Some(wrong) = results.iter().find(|r| r.text() != run.branch()) {
        return Err(RolloutError::BranchMismatch {
            target: run.name().to_string(),
            host: wrong.host.clone(),
            expected: run.branch().to_string(),
            actual: wrong.text().to_string(),
        });
    }
    Ok(())
}

fn pre_command(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    if let Some(cmd) = run.target.remote.cmd.pre.as_deref() {
        run.runner.remote(cmd, &RunOptions::verbose())?;
    }
    Ok(())
}

fn fetch(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    run.runner.remote("git fetch --prune", &RunOptions::default())?;
    Ok(())
}

fn diagnose(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let (report, release) =
        DiagnosticCollector::new(run.target, run.runner, run.settings).diagnose();

    for (name, result) in report.findings() {
        run.emit(DeployEvent::Finding {
            target: run.name().to_string(),
            name: name.to_string(),
            result: result.clone(),
        });
    }

    run.report = report;
    run.release = release;
    Ok(())
}

fn record_tips(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let results = run.runner.remote("git rev-parse HEAD", &RunOptions::muted())?;
    run.tips = results
        .into_iter()
        .map(|r| {
            let tip = r.text().to_string();
            (r.host, tip)
        })
        .collect();
    Ok(())
}

fn confirm_update(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    run.emit(DeployEvent::UpdatePlan {
        target: run.name().to_string(),
        tagline: tagline(&run.report),
        local_tag: run.release.local_tag.clone(),
        origin_tag: run.release.origin_tag.clone(),
        violations: run.report.violations().to_vec(),
    });
    for hint in run.hints() {
        run.emit(DeployEvent::Hint {
            target: run.name().to_string(),
            message: hint,
        });
    }

    let message = format!("Do you want to update the {} ?", run.name());
    if run
        .gate
        .ask(&message, run.report.default_answer(), true)?
    {
        return Ok(());
    }

    run.compensate()?;
    Err(run.declined("update"))
}

fn checkout(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    if !run.mode.bypass_gates {
        return Ok(());
    }
    run.runner
        .remote(&format!("git checkout {}", run.branch()), &RunOptions::default())?;
    Ok(())
}

fn reset_to_origin(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    run.runner.remote(
        &format!("git reset --hard origin/{}", run.branch()),
        &RunOptions::default(),
    )?;
    tracing::info!(target_name = %run.name(), branch = %run.branch(), "updated to origin");
    Ok(())
}

fn install(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let cmd = run.target.remote.install_command();
    let new_packages = run.report.contains(checks::PACKAGES);
    let message = if new_packages {
        format!("New modules were found! Run `{cmd}` ?")
    } else {
        format!("Run `{cmd}` ?")
    };

    if run.ask(&message, new_packages, true)? {
        run.runner.remote(cmd, &RunOptions::verbose())?;
    }
    Ok(())
}

fn migrations(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    if !run.target.remote.migrate_task {
        return Ok(());
    }
    for m in &run.settings.migrations {
        if !run.report.contains(&m.kind.name) {
            continue;
        }
        let cmd = render_migration_command(&m.kind, run.target);
        // forced runs never migrate unattended
        if !run.ask(&format!("Run: {cmd} ?"), false, false)? {
            continue;
        }
        let host = run.first_host()?;
        let result = run.runner.remote_on(host, &cmd, &RunOptions::verbose())?;
        run.show_output(&m.kind.name, &[result]);
    }
    Ok(())
}

fn restart(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let Some(cmd) = run
        .target
        .remote
        .cmd
        .restart_command(run.mode.prefer_restart)
    else {
        tracing::debug!(target_name = %run.name(), "no reload or restart command configured");
        return Ok(());
    };

    let mut restarted = Vec::new();
    for host in &run.target.remote.servers {
        if run.ask(&format!("Restart the {host} ?"), true, true)? {
            run.runner.remote_on(host, cmd, &RunOptions::verbose())?;
            restarted.push(host.clone());
        } else {
            // declining one host skips only that host
            run.events.on_event(DeployEvent::Declined {
                target: run.name().to_string(),
                gate: format!("restart {host}"),
            });
            tracing::warn!(target_name = %run.name(), host = %host, "restart skipped by operator");
        }
    }
    run.restarted = Some(restarted);
    Ok(())
}

fn post_command(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    if let Some(cmd) = run.target.remote.cmd.post.as_deref() {
        run.runner.remote(cmd, &RunOptions::verbose())?;
    }
    Ok(())
}

fn verify_status(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let Some(cmd) = run.target.remote.cmd.status.as_deref() else {
        return Ok(());
    };
    if run.restarted.as_ref().is_some_and(Vec::is_empty) {
        tracing::info!(target_name = %run.name(), "no host restarted, status not polled");
        return Ok(());
    }
    HealthMonitor::new(run.target, run.runner, &run.settings.health)
        .verify_status(cmd, &run.settings.poll)?;
    Ok(())
}

fn restart_health_scan(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let threshold = run.settings.health.restart_cpu_threshold;
    health_scan(run, threshold);
    Ok(())
}

fn steady_health_scan(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let threshold = run.settings.health.steady_cpu_threshold;
    health_scan(run, threshold);
    Ok(())
}

fn health_scan(run: &mut TargetRun<'_>, cpu_threshold: f64) {
    let warnings =
        HealthMonitor::new(run.target, run.runner, &run.settings.health).scan_all(cpu_threshold);
    for warning in &warnings {
        run.emit(DeployEvent::Warning {
            target: run.name().to_string(),
            warning: warning.clone(),
        });
    }
    run.warnings.extend(warnings);
}

fn release_entry(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    if run.branch() != run.settings.release_branch || run.report.contains(checks::NOT_RELEASE) {
        return Ok(());
    }
    let Some(version) = run.release.exact_version.clone() else {
        return Ok(());
    };

    let host = run.first_host()?;
    let result = run
        .runner
        .remote_on(host, "cat ./CHANGELOG.md", &RunOptions::quiet())?;
    if !result.success() {
        tracing::warn!(target_name = %run.name(), "CHANGELOG.md not readable, report entry has no changes");
    }

    run.entry = Some(build_entry(run.name(), &version, &result.stdout));
    Ok(())
}

fn summary(run: &mut TargetRun<'_>) -> RolloutResult<()> {
    let log = run
        .runner
        .remote("git log --oneline -n5", &RunOptions::quiet())?;
    run.show_output("git log", &log);

    let changed = run
        .runner
        .remote("git diff --name-status @{1}..", &RunOptions::quiet())?;
    run.show_output("last changed files", &changed);
    Ok(())
}

/// Fill a migration command template for `target`
pub fn render_migration_command(kind: &MigrationKind, target: &Target) -> String {
    let node_env = if target.remote.branch == "development" {
        "development"
    } else {
        "production"
    };
    let namespace = target
        .remote
        .path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    kind.command
        .replace("{task_path}", &target.task_path)
        .replace("{node_env}", node_env)
        .replace("{namespace}", namespace)
        .replace("{kind}", &kind.name)
}
