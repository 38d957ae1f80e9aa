//! Checkpoint assertions (`should_be`).
//!
//! The runner only assembles a [`Checkpoint`]; a [`Checker`] decides whether
//! it matched and is responsible for running the cleanup command.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::core::count::count_listed;
use crate::core::types::ExpectedCount;
use crate::io::invoker::{Invocation, Invoker};

/// When the checker runs a checkpoint's cleanup command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// After every checkpoint, match or mismatch.
    #[default]
    Always,
    OnMismatch,
    Never,
}

impl CleanupPolicy {
    pub fn applies(self, passed: bool) -> bool {
        match self {
            CleanupPolicy::Always => true,
            CleanupPolicy::OnMismatch => !passed,
            CleanupPolicy::Never => false,
        }
    }
}

/// Parameters of one count assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// List command whose output is counted.
    pub command: Invocation,
    pub expected_count: ExpectedCount,
    pub expected_exit_code: i32,
    /// Noun for reports, e.g. "blog post".
    pub label: String,
    /// Deletes any post matching the run's title.
    pub cleanup: Invocation,
}

/// What the checker observed for a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointOutcome {
    pub passed: bool,
    pub expected_count: u32,
    pub observed_count: u32,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Human-readable mismatch description; `None` when passed.
    pub message: Option<String>,
    pub cleanup_ran: bool,
    pub cleanup_exit_code: Option<i32>,
}

pub trait Checker {
    fn should_be(&self, checkpoint: &Checkpoint) -> Result<CheckpointOutcome>;
}

/// Checker that counts non-blank lines printed by the list command.
pub struct CountChecker<'a, I: Invoker> {
    invoker: &'a I,
    cleanup: CleanupPolicy,
}

impl<'a, I: Invoker> CountChecker<'a, I> {
    pub fn new(invoker: &'a I, cleanup: CleanupPolicy) -> Self {
        Self { invoker, cleanup }
    }
}

impl<I: Invoker> Checker for CountChecker<'_, I> {
    #[instrument(skip_all, fields(expected = checkpoint.expected_count.0))]
    fn should_be(&self, checkpoint: &Checkpoint) -> Result<CheckpointOutcome> {
        let listed = self
            .invoker
            .invoke(&checkpoint.command)
            .context("run checkpoint command")?;
        let observed_count = count_listed(&listed.stdout);
        let expected_count = checkpoint.expected_count.0;

        let message = mismatch_message(
            checkpoint,
            observed_count,
            listed.exit_code,
            listed.timed_out,
        );
        let passed = message.is_none();
        if let Some(message) = &message {
            warn!(command = %checkpoint.command.display(), stderr = %listed.stderr.trim(), "checkpoint mismatch: {}", message);
        } else {
            debug!(observed_count, "checkpoint matched");
        }

        let mut cleanup_ran = false;
        let mut cleanup_exit_code = None;
        if self.cleanup.applies(passed) {
            let cleaned = self
                .invoker
                .invoke(&checkpoint.cleanup)
                .context("run checkpoint cleanup")?;
            if !cleaned.success() {
                warn!(exit_code = ?cleaned.exit_code, command = %checkpoint.cleanup.display(), "cleanup failed");
            }
            cleanup_ran = true;
            cleanup_exit_code = cleaned.exit_code;
        }

        Ok(CheckpointOutcome {
            passed,
            expected_count,
            observed_count,
            exit_code: listed.exit_code,
            timed_out: listed.timed_out,
            message,
            cleanup_ran,
            cleanup_exit_code,
        })
    }
}

fn mismatch_message(
    checkpoint: &Checkpoint,
    observed_count: u32,
    exit_code: Option<i32>,
    timed_out: bool,
) -> Option<String> {
    let label = &checkpoint.label;
    if timed_out {
        return Some(format!("listing {label}s timed out"));
    }
    if exit_code != Some(checkpoint.expected_exit_code) {
        return Some(format!(
            "expected exit code {}, got {}",
            checkpoint.expected_exit_code,
            exit_code.map_or_else(|| "none".to_string(), |code| code.to_string())
        ));
    }
    if observed_count != checkpoint.expected_count.0 {
        return Some(format!(
            "expected {} {label}(s), found {observed_count}",
            checkpoint.expected_count.0
        ));
    }
    None
}
