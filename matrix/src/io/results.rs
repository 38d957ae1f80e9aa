//! Result capture and persistence.
//!
//! With `--results-dir`, each run writes its metadata and the full matrix
//! report to `<results-dir>/<run_id>/` for later aggregation by `report`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::core::outcome::Outcome;
use crate::run::MatrixReport;

pub const META_FILE: &str = "meta.json";
pub const REPORT_FILE: &str = "versions.json";

/// Input for capturing results from a completed run.
#[derive(Debug)]
pub struct CaptureInput<'a> {
    pub run_id: &'a str,
    pub username: &'a str,
    pub blog_name: &'a str,
    /// Config file the run loaded, if any.
    pub config_path: Option<&'a Path>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report: &'a MatrixReport,
}

/// Metadata for a run, persisted to `meta.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunMeta {
    pub run_id: String,
    pub username: String,
    pub blog_name: String,
    /// SHA-256 of the config file for reproducibility tracking.
    pub config_hash: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub versions: usize,
    pub versions_passed: usize,
    pub outcome: Outcome,
    /// Non-fatal errors encountered during capture.
    pub errors: Vec<String>,
}

pub fn new_run_id(now: DateTime<Utc>) -> String {
    format!("run-{}", now.format("%Y%m%d_%H%M%S"))
}

pub fn results_dir(base_dir: &Path, run_id: &str) -> PathBuf {
    base_dir.join(run_id)
}

/// Create a fresh run directory, suffixing `-2`, `-3`, ... when `run_id` is taken.
///
/// Returns the id actually used together with its directory.
fn create_run_dir(base_dir: &Path, run_id: &str) -> Result<(String, PathBuf)> {
    fs::create_dir_all(base_dir)
        .with_context(|| format!("create results dir {}", base_dir.display()))?;
    let mut attempt = 1u32;
    loop {
        let candidate = if attempt == 1 {
            run_id.to_string()
        } else {
            format!("{run_id}-{attempt}")
        };
        let run_dir = results_dir(base_dir, &candidate);
        match fs::create_dir(&run_dir) {
            Ok(()) => return Ok((candidate, run_dir)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(run_dir = %run_dir.display(), "run dir taken");
                attempt += 1;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("create results dir {}", run_dir.display()));
            }
        }
    }
}

/// Write `meta.json` and `versions.json` for a completed run.
#[instrument(skip_all, fields(run_id = %input.run_id))]
pub fn capture_results(base_dir: &Path, input: &CaptureInput<'_>) -> Result<PathBuf> {
    let (run_id, run_dir) = create_run_dir(base_dir, input.run_id)?;

    let mut errors = Vec::new();
    let config_hash = match input.config_path {
        Some(path) => match file_sha256(path) {
            Ok(hash) => Some(hash),
            Err(err) => {
                errors.push(format!("config hash: {err:#}"));
                None
            }
        },
        None => None,
    };
    if !errors.is_empty() {
        warn!(errors = ?errors, "result capture had errors");
    }

    let duration = input.finished_at - input.started_at;
    let meta = RunMeta {
        run_id,
        username: input.username.to_string(),
        blog_name: input.blog_name.to_string(),
        config_hash,
        start_time: input.started_at.to_rfc3339(),
        end_time: input.finished_at.to_rfc3339(),
        duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        versions: input.report.versions.len(),
        versions_passed: input.report.passed_versions(),
        outcome: input.report.outcome,
        errors,
    };

    write_json(&run_dir.join(META_FILE), &meta)?;
    write_json(&run_dir.join(REPORT_FILE), input.report)?;
    debug!(run_dir = %run_dir.display(), "results captured");
    Ok(run_dir)
}

pub fn load_meta(run_dir: &Path) -> Result<RunMeta> {
    read_json(&run_dir.join(META_FILE))
}

pub fn load_report(run_dir: &Path) -> Result<MatrixReport> {
    read_json(&run_dir.join(REPORT_FILE))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value).context("serialize json")?;
    fs::write(path, format!("{contents}\n")).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    Ok(hex::encode(hasher.finalize()))
}
