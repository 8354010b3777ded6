//! Diagnostic Collector
//!
//! Runs the read-only check battery against a target's first host and merges
//! the findings into one `DiagnosticReport`. Checks are independent and run
//! concurrently; results are merged in battery order so the report does not
//! depend on scheduling. A check that errors is recorded as a `<name>-error`
//! finding plus a violation, and the others still run.

use std::thread;

use crate::domain::entities::{ReleaseInfo, Target};
use crate::domain::ports::CommandRunner;
use crate::domain::services::{changelog, diff_checks, exact_version};
use crate::domain::value_objects::{checks, CheckResult, DiagnosticReport, RunOptions};
use crate::error::{RolloutError, RolloutResult};

use super::settings::{WatchedFile, MigrationCheck, Settings};

/// Structural state of a CHANGELOG.md diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogAudit {
    pub diff: String,
    pub hunks: usize,
    pub misplaced: Vec<String>,
    pub duplicates: Vec<String>,
}

impl ChangelogAudit {
    /// Audit a branch about to be merged with the release branch at `base`.
    ///
    /// Entries must stay under `## master`; any change below a released
    /// section counts as misplaced.
    pub fn for_merge(
        base: &str,
        run: impl Fn(&str) -> RolloutResult<String>,
    ) -> RolloutResult<Self> {
        Self::collect(base, true, run)
    }

    /// Audit the changelog an update is about to pull in.
    ///
    /// A release moves the `## master` entries under a new `## X.Y.Z`
    /// header, so placement is not checked here.
    pub fn for_update(
        base: &str,
        run: impl Fn(&str) -> RolloutResult<String>,
    ) -> RolloutResult<Self> {
        Self::collect(base, false, run)
    }

    /// `run` executes a command and returns its stdout. An empty diff skips
    /// the structural checks.
    fn collect(
        base: &str,
        placement: bool,
        run: impl Fn(&str) -> RolloutResult<String>,
    ) -> RolloutResult<Self> {
        let diff = run(&format!("git diff {base} -- CHANGELOG.md"))?;
        if diff.trim().is_empty() {
            return Ok(Self::default());
        }
        let single = run(&format!("git diff -U0 {base} -- CHANGELOG.md"))?;
        let misplaced = if placement {
            let wide = run(&format!("git diff -U10 {base} -- CHANGELOG.md"))?;
            changelog::misplaced_lines(&wide)?
        } else {
            Vec::new()
        };

        Ok(Self {
            hunks: changelog::hunk_count(&single),
            misplaced,
            duplicates: changelog::duplicates(&diff),
            diff,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty()
    }

    pub fn violations(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        if self.hunks != 1 {
            out.push(format!(
                "CHANGELOG.md changes span {} sections, expected 1",
                self.hunks
            ));
        }
        out.extend(
            self.misplaced
                .iter()
                .map(|l| format!("entry added below a released section: {}", l.trim())),
        );
        out.extend(
            self.duplicates
                .iter()
                .map(|l| format!("duplicate entry: {}", l.trim())),
        );
        out
    }

    pub fn ok(&self) -> bool {
        self.violations().is_empty()
    }
}

/// Partial result of a single check
#[derive(Debug, Default)]
struct CheckOutput {
    findings: Vec<(String, CheckResult)>,
    violations: Vec<String>,
    origin_tag: Option<String>,
    local_tag: Option<String>,
    exact_version: Option<String>,
    no_changes: Option<bool>,
}

impl CheckOutput {
    fn finding(name: impl Into<String>, result: CheckResult) -> Self {
        Self {
            findings: vec![(name.into(), result)],
            ..Self::default()
        }
    }
}

enum Check<'s> {
    Release,
    LocalTag,
    Migration(&'s MigrationCheck),
    Packages,
    File(&'s WatchedFile),
    Changelog,
    NoChanges,
}

impl Check<'_> {
    fn name(&self) -> &str {
        match self {
            Check::Release => "release",
            Check::LocalTag => "local-tag",
            Check::Migration(m) => m.kind.name.as_str(),
            Check::Packages => checks::PACKAGES,
            Check::File(f) => f.check.name.as_str(),
            Check::Changelog => checks::CHANGELOG,
            Check::NoChanges => "no-changes",
        }
    }
}

pub struct DiagnosticCollector<'a> {
    target: &'a Target,
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
}

impl<'a> DiagnosticCollector<'a> {
    pub fn new(target: &'a Target, runner: &'a dyn CommandRunner, settings: &'a Settings) -> Self {
        Self {
            target,
            runner,
            settings,
        }
    }

    /// Run the full battery
    pub fn diagnose(&self) -> (DiagnosticReport, ReleaseInfo) {
        let battery = self.battery();

        let outputs: Vec<(String, RolloutResult<CheckOutput>)> = thread::scope(|scope| {
            let handles: Vec<_> = battery
                .iter()
                .map(|check| {
                    let name = check.name().to_string();
                    (name, scope.spawn(move || self.run_check(check)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(RolloutError::config(
                            &self.target.name,
                            format!("check '{name}' panicked"),
                        ))
                    });
                    (name, result)
                })
                .collect()
        });

        let mut report = DiagnosticReport::new();
        let mut release = ReleaseInfo::default();

        for (name, output) in outputs {
            match output {
                Ok(out) => {
                    for (finding, result) in out.findings {
                        report.insert(finding, result);
                    }
                    for violation in out.violations {
                        report.add_violation(violation);
                    }
                    if let Some(tag) = out.origin_tag {
                        release.origin_tag = tag;
                    }
                    if let Some(tag) = out.local_tag {
                        release.local_tag = tag;
                    }
                    if out.exact_version.is_some() {
                        release.exact_version = out.exact_version;
                    }
                    if let Some(no_changes) = out.no_changes {
                        report.set_no_changes(no_changes);
                    }
                }
                Err(err) => {
                    tracing::warn!(target_name = %self.target.name, check = %name, error = %err, "check failed");
                    report.insert(
                        format!("{name}-error"),
                        CheckResult::new(format!("check '{name}' failed"), err.to_string()),
                    );
                    report.add_violation(format!("check '{name}' failed: {err}"));
                }
            }
        }

        (report, release)
    }

    fn battery(&self) -> Vec<Check<'a>> {
        let mut battery = vec![Check::Release, Check::LocalTag];
        battery.extend(self.settings.migrations.iter().map(Check::Migration));
        battery.push(Check::Packages);
        battery.extend(self.settings.files.iter().map(Check::File));
        battery.push(Check::Changelog);
        battery.push(Check::NoChanges);
        battery
    }

    fn run_check(&self, check: &Check<'_>) -> RolloutResult<CheckOutput> {
        match check {
            Check::Release => self.check_release(),
            Check::LocalTag => self.check_local_tag(),
            Check::Migration(m) => self.check_migrations(m),
            Check::Packages => self.check_packages(),
            Check::File(f) => self.check_file(f),
            Check::Changelog => self.check_changelog(),
            Check::NoChanges => self.check_no_changes(),
        }
    }

    fn branch(&self) -> &str {
        &self.target.remote.branch
    }

    /// Stdout of `command` on the first host
    fn inspect(&self, command: &str, opts: &RunOptions) -> RolloutResult<String> {
        let host = self
            .target
            .remote
            .servers
            .first()
            .ok_or_else(|| RolloutError::config(&self.target.name, "remote.servers is empty"))?;
        Ok(self.runner.remote_on(host, command, opts)?.stdout)
    }

    fn check_release(&self) -> RolloutResult<CheckOutput> {
        let branch = self.branch();
        let origin = self.inspect(
            &format!("git describe --tags --always $(git rev-parse origin/{branch})"),
            &RunOptions::muted(),
        )?;
        let origin = origin.trim().to_string();

        let mut out = CheckOutput::default();
        if branch == self.settings.release_branch {
            match exact_version(&origin)? {
                Some(version) => out.exact_version = Some(version),
                None => out.findings.push((
                    checks::NOT_RELEASE.to_string(),
                    CheckResult::new(format!("release not found at origin/{branch}"), &origin),
                )),
            }
        }
        out.origin_tag = Some(origin);
        Ok(out)
    }

    fn check_local_tag(&self) -> RolloutResult<CheckOutput> {
        let local = self.inspect("git describe --tags --always", &RunOptions::muted())?;
        Ok(CheckOutput {
            local_tag: Some(local.trim().to_string()),
            ..CheckOutput::default()
        })
    }

    fn check_migrations(&self, migration: &MigrationCheck) -> RolloutResult<CheckOutput> {
        let changed = self.inspect(
            &format!("git diff --name-only origin/{}", self.branch()),
            &RunOptions::muted(),
        )?;
        let paths = diff_checks::matching_paths(&changed, &migration.regex);
        if paths.is_empty() {
            return Ok(CheckOutput::default());
        }
        Ok(CheckOutput::finding(
            &migration.kind.name,
            CheckResult::new(
                format!("new {}: {} found", migration.kind.name, paths.len()),
                diff_checks::numbered(&paths),
            ),
        ))
    }

    fn check_packages(&self) -> RolloutResult<CheckOutput> {
        let diff = self.inspect(
            &format!("git diff ..origin/{} -- package.json", self.branch()),
            &RunOptions::muted(),
        )?;
        let added = diff_checks::added_manifest_lines(&diff);
        if added.is_empty() {
            return Ok(CheckOutput::default());
        }
        Ok(CheckOutput::finding(
            checks::PACKAGES,
            CheckResult::new("new packages found", added.join("\n")),
        ))
    }

    fn check_file(&self, watched: &WatchedFile) -> RolloutResult<CheckOutput> {
        let listing = self.inspect("ls", &RunOptions::quiet())?;
        let Some(file) = diff_checks::find_file(&listing, &watched.regex) else {
            return Ok(CheckOutput::default());
        };
        let diff = self.inspect(
            &format!("git diff ..origin/{} -- {file}", self.branch()),
            &RunOptions::muted(),
        )?;
        if diff.trim().is_empty() {
            return Ok(CheckOutput::default());
        }
        Ok(CheckOutput::finding(
            &watched.check.name,
            CheckResult::new(format!("{} changes found", watched.check.name), diff),
        ))
    }

    fn check_changelog(&self) -> RolloutResult<CheckOutput> {
        let base = format!("..origin/{}", self.branch());
        let audit =
            ChangelogAudit::for_update(&base, |cmd| self.inspect(cmd, &RunOptions::muted()))?;
        let violations = audit.violations();
        if violations.is_empty() {
            return Ok(CheckOutput::default());
        }
        Ok(CheckOutput {
            findings: vec![(
                checks::CHANGELOG.to_string(),
                CheckResult::new("CHANGELOG.md needs attention", violations.join("\n")),
            )],
            violations,
            ..CheckOutput::default()
        })
    }

    fn check_no_changes(&self) -> RolloutResult<CheckOutput> {
        let status = self.inspect(
            &format!("git diff --name-status ..origin/{}", self.branch()),
            &RunOptions::muted(),
        )?;
        Ok(CheckOutput {
            no_changes: Some(!diff_checks::has_changes(&status)),
            ..CheckOutput::default()
        })
    }
}

/// Finding names followed by `code`, or `no code changes found`
pub fn tagline(report: &DiagnosticReport) -> String {
    let mut tags: Vec<&str> = report.names();
    tags.push(if report.no_changes() {
        "no code changes found"
    } else {
        "code"
    });
    tags.join(" ")
}
