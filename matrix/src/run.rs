//! Matrix execution.
//!
//! Replays the step table once per library version. All run-wide state
//! (auth, current environment binding) lives on [`RunContext`], which the
//! loop threads through every version.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::auth::AuthState;
use crate::core::commands;
use crate::core::outcome::{Outcome, classify_checkpoints, classify_run};
use crate::core::plan::Step;
use crate::core::types::{ExpectedCount, Operation, RunConfiguration, VersionIdentifier};
use crate::core::versions::VersionRange;
use crate::io::checker::{Checker, Checkpoint, CheckpointOutcome};
use crate::io::config::CheckpointConfig;
use crate::io::invoker::Invoker;
use crate::io::layout::{EnvBinding, Layout};
use crate::io::process::CommandOutcome;

/// Everything the loop carries from one version to the next.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: RunConfiguration,
    pub layout: Layout,
    pub auth: AuthState,
    /// Environment of the version currently (or most recently) under test.
    pub binding: Option<EnvBinding>,
    pub label: String,
    pub expected_exit_code: i32,
}

impl RunContext {
    pub fn new(config: RunConfiguration, layout: Layout, checkpoint: &CheckpointConfig) -> Self {
        Self {
            config,
            layout,
            auth: AuthState::default(),
            binding: None,
            label: checkpoint.label.clone(),
            expected_exit_code: checkpoint.expected_exit_code,
        }
    }

    fn switch_to(&mut self, version: &VersionIdentifier) -> EnvBinding {
        let binding = self.layout.bind(version);
        self.binding = Some(binding.clone());
        binding
    }

    fn checkpoint(&self, binding: &EnvBinding, expected: ExpectedCount) -> Checkpoint {
        let title = &self.config.post_title;
        let blog = &self.config.blog_name;
        Checkpoint {
            command: binding.invocation(commands::list(title, blog)),
            expected_count: expected,
            expected_exit_code: self.expected_exit_code,
            label: self.label.clone(),
            cleanup: binding.invocation(commands::delete(title, blog)),
        }
    }
}

/// A single invocation and what it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub command: String,
    pub outcome: CommandOutcome,
}

/// What happened at one step of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepRecord {
    Checkpoint {
        command: String,
        outcome: CheckpointOutcome,
    },
    Mutate {
        operation: Operation,
        command: String,
        outcome: CommandOutcome,
    },
}

impl StepRecord {
    /// `Some(passed)` for checkpoints, `None` for mutations.
    pub fn checkpoint_passed(&self) -> Option<bool> {
        match self {
            StepRecord::Checkpoint { outcome, .. } => Some(outcome.passed),
            StepRecord::Mutate { .. } => None,
        }
    }

    /// Same vocabulary as [`Step`]'s display: `count==N` or the operation name.
    pub fn describe(&self) -> String {
        match self {
            StepRecord::Checkpoint { outcome, .. } => format!("count=={}", outcome.expected_count),
            StepRecord::Mutate { operation, .. } => operation.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReport {
    pub version: VersionIdentifier,
    pub env_var: String,
    pub library_path: String,
    /// Present only for the version that triggered forced auth.
    pub auth: Option<InvocationRecord>,
    pub steps: Vec<StepRecord>,
    pub outcome: Outcome,
}

impl VersionReport {
    /// `(passed, total)` checkpoints.
    pub fn checkpoint_tally(&self) -> (usize, usize) {
        let results: Vec<bool> = self
            .steps
            .iter()
            .filter_map(StepRecord::checkpoint_passed)
            .collect();
        let passed = results.iter().filter(|passed| **passed).count();
        (passed, results.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixReport {
    pub versions: Vec<VersionReport>,
    pub outcome: Outcome,
}

impl MatrixReport {
    pub fn passed_versions(&self) -> usize {
        self.versions
            .iter()
            .filter(|version| version.outcome == Outcome::Pass)
            .count()
    }
}

/// Run the step table against every version in ascending order.
///
/// `on_version` is called after each version completes, before the next starts.
/// Only invocations that cannot be spawned abort the run; failed auth, failed
/// mutations and mismatched checkpoints are recorded and the loop continues.
#[instrument(skip_all, fields(versions = versions.len(), steps = steps.len()))]
pub fn run_matrix<I, C, F>(
    ctx: &mut RunContext,
    versions: &VersionRange,
    steps: &[Step],
    invoker: &I,
    checker: &C,
    mut on_version: F,
) -> Result<MatrixReport>
where
    I: Invoker,
    C: Checker,
    F: FnMut(&VersionReport),
{
    info!(blog = %ctx.config.blog_name, "matrix run started");
    let mut reports = Vec::with_capacity(versions.len());
    for version in versions.iter() {
        let report = run_version(ctx, &version, steps, invoker, checker)
            .with_context(|| format!("run version {version}"))?;
        on_version(&report);
        reports.push(report);
    }
    let outcome = classify_run(reports.iter().map(|report| report.outcome));
    info!(outcome = ?outcome, "matrix run finished");
    Ok(MatrixReport {
        versions: reports,
        outcome,
    })
}

#[instrument(skip_all, fields(version = %version))]
fn run_version<I: Invoker, C: Checker>(
    ctx: &mut RunContext,
    version: &VersionIdentifier,
    steps: &[Step],
    invoker: &I,
    checker: &C,
) -> Result<VersionReport> {
    let binding = ctx.switch_to(version);
    debug!(library_path = %binding.library_path.display(), "environment switched");

    let auth = if ctx.auth.needs_auth() {
        let invocation = binding.invocation(commands::force_auth(
            &ctx.config.username,
            &ctx.config.blog_name,
        ));
        let outcome = invoker.invoke(&invocation).context("run forced auth")?;
        ctx.auth.mark_attempted();
        if outcome.success() {
            info!("forced auth finished");
        } else {
            warn!(exit_code = ?outcome.exit_code, "forced auth failed, continuing");
        }
        Some(InvocationRecord {
            command: invocation.display(),
            outcome,
        })
    } else {
        None
    };

    let mut records = Vec::with_capacity(steps.len());
    for step in steps {
        let record = match *step {
            Step::Checkpoint(expected) => {
                let checkpoint = ctx.checkpoint(&binding, expected);
                let outcome = checker
                    .should_be(&checkpoint)
                    .with_context(|| format!("checkpoint {step}"))?;
                StepRecord::Checkpoint {
                    command: checkpoint.command.display(),
                    outcome,
                }
            }
            Step::Mutate(operation) => {
                let invocation = binding.invocation(commands::mutation(operation, &ctx.config));
                let outcome = invoker
                    .invoke(&invocation)
                    .with_context(|| format!("run {}", operation.name()))?;
                if !outcome.success() {
                    warn!(
                        operation = operation.name(),
                        exit_code = ?outcome.exit_code,
                        "mutation failed, continuing"
                    );
                }
                StepRecord::Mutate {
                    operation,
                    command: invocation.display(),
                    outcome,
                }
            }
        };
        records.push(record);
    }

    let outcome = classify_checkpoints(records.iter().filter_map(StepRecord::checkpoint_passed));
    debug!(outcome = ?outcome, "version finished");
    Ok(VersionReport {
        version: version.clone(),
        env_var: binding.env_var.clone(),
        library_path: binding.library_path.to_string_lossy().into_owned(),
        auth,
        steps: records,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::plan::default_steps;
    use crate::io::checker::{CleanupPolicy, CountChecker};
    use crate::io::config::MatrixConfig;
    use crate::test_support::{ScriptedInvoker, run_configuration};

    fn context() -> RunContext {
        let cfg = MatrixConfig::default();
        RunContext::new(
            run_configuration("alice", "myblog"),
            Layout::from_config(&cfg, Path::new("/work")),
            &cfg.checkpoint,
        )
    }

    fn two_versions() -> VersionRange {
        VersionRange {
            last: 2,
            ..VersionRange::default()
        }
    }

    #[test]
    fn auth_runs_only_for_first_version() {
        let invoker = ScriptedInvoker::new();
        let checker = CountChecker::new(&invoker, CleanupPolicy::Always);
        let mut ctx = context();
        let report = run_matrix(
            &mut ctx,
            &two_versions(),
            &default_steps(),
            &invoker,
            &checker,
            |_| {},
        )
        .expect("run");

        assert!(report.versions[0].auth.is_some());
        assert!(report.versions[1].auth.is_none());
        assert_eq!(ctx.auth, AuthState::Authenticated);
        assert_eq!(report.outcome, Outcome::Pass);
    }

    #[test]
    fn context_keeps_last_binding() {
        let invoker = ScriptedInvoker::new();
        let checker = CountChecker::new(&invoker, CleanupPolicy::Always);
        let mut ctx = context();
        run_matrix(
            &mut ctx,
            &two_versions(),
            &default_steps(),
            &invoker,
            &checker,
            |_| {},
        )
        .expect("run");
        let binding = ctx.binding.expect("binding");
        assert_eq!(binding.version.as_str(), "gdata-2.0.2");
    }

    #[test]
    fn failed_auth_does_not_stop_the_run() {
        let invoker = ScriptedInvoker::new().with_failing_auth();
        let checker = CountChecker::new(&invoker, CleanupPolicy::Always);
        let mut ctx = context();
        let report = run_matrix(
            &mut ctx,
            &two_versions(),
            &default_steps(),
            &invoker,
            &checker,
            |_| {},
        )
        .expect("run");
        let auth = report.versions[0].auth.as_ref().expect("auth record");
        assert!(!auth.outcome.success());
        assert_eq!(report.versions.len(), 2);
        assert_eq!(invoker.auth_calls(), 1);
    }

    #[test]
    fn callback_sees_each_version_in_order() {
        let invoker = ScriptedInvoker::new();
        let checker = CountChecker::new(&invoker, CleanupPolicy::Always);
        let mut ctx = context();
        let mut seen = Vec::new();
        run_matrix(
            &mut ctx,
            &two_versions(),
            &default_steps(),
            &invoker,
            &checker,
            |report| seen.push(report.version.to_string()),
        )
        .expect("run");
        assert_eq!(seen, vec!["gdata-2.0.1", "gdata-2.0.2"]);
    }

    #[test]
    fn checkpoint_tally_counts_passes() {
        let invoker = ScriptedInvoker::new().with_existing_post("myblog", "example post title");
        let checker = CountChecker::new(&invoker, CleanupPolicy::Always);
        let mut ctx = context();
        let report = run_matrix(
            &mut ctx,
            &two_versions(),
            &default_steps(),
            &invoker,
            &checker,
            |_| {},
        )
        .expect("run");
        assert_eq!(report.versions[0].checkpoint_tally(), (2, 3));
        assert_eq!(report.versions[0].outcome, Outcome::Fail);
        assert_eq!(report.versions[1].checkpoint_tally(), (3, 3));
        assert_eq!(report.passed_versions(), 1);
        assert_eq!(report.outcome, Outcome::Fail);
    }
}
