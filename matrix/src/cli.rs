//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, info};

use crate::core::args::validate_args;
use crate::core::outcome::exit_code;
use crate::core::plan::{default_steps, render_plan};
use crate::core::types::RunConfiguration;
use crate::exit_codes;
use crate::io::checker::CountChecker;
use crate::io::config::{DEFAULT_CONFIG_FILE, MatrixConfig, load_config};
use crate::io::invoker::ProcessInvoker;
use crate::io::layout::Layout;
use crate::io::results::{CaptureInput, capture_results, new_run_id};
use crate::report::aggregate;
use crate::run::{RunContext, StepRecord, VersionReport, run_matrix};

/// Inputs of `blogger-matrix run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub username: Option<String>,
    pub blog_name: Option<String>,
    pub config_path: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
}

/// Run the matrix and return the process exit code.
///
/// Missing positional arguments are reported before anything else happens.
pub fn run_command(base_dir: &Path, options: &RunOptions) -> Result<i32> {
    let args = match validate_args(options.username.as_deref(), options.blog_name.as_deref()) {
        Ok(args) => args,
        Err(missing) => {
            println!("{missing}");
            return Ok(exit_codes::INVALID);
        }
    };

    let (cfg, loaded_from) = resolve_config(base_dir, options.config_path.as_deref())?;
    debug!(config = ?loaded_from, "config loaded");

    let config = RunConfiguration {
        username: args.username,
        blog_name: args.blog_name,
        post_title: cfg.post.title.clone(),
        post_body: cfg.post.body.clone(),
        tags: cfg.post.tags.clone(),
    };
    let layout = Layout::from_config(&cfg, base_dir);
    let invoker = ProcessInvoker::from_config(&cfg.tool)?;
    let checker = CountChecker::new(&invoker, cfg.checkpoint.cleanup);
    let mut ctx = RunContext::new(config, layout, &cfg.checkpoint);

    let started_at = Utc::now();
    let run_id = new_run_id(started_at);
    info!(run_id = %run_id, versions = cfg.versions.len(), "starting matrix");
    let report = run_matrix(
        &mut ctx,
        &cfg.versions,
        &default_steps(),
        &invoker,
        &checker,
        print_version,
    )?;
    let finished_at = Utc::now();

    println!(
        "run: blog={} versions={} passed={} outcome={:?}",
        ctx.config.blog_name,
        report.versions.len(),
        report.passed_versions(),
        report.outcome
    );

    if let Some(results_base) = &options.results_dir {
        let input = CaptureInput {
            run_id: &run_id,
            username: &ctx.config.username,
            blog_name: &ctx.config.blog_name,
            config_path: loaded_from.as_deref(),
            started_at,
            finished_at,
            report: &report,
        };
        let run_dir = capture_results(results_base, &input).context("capture results")?;
        println!("results: {}", run_dir.display());
    }

    Ok(exit_code(report.outcome))
}

/// Print the version identifiers the matrix would run.
pub fn list_versions(base_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let (cfg, _) = resolve_config(base_dir, config_path)?;
    let layout = Layout::from_config(&cfg, base_dir);
    for version in cfg.versions.iter() {
        println!("{} {}", version, layout.library_path(&version).display());
    }
    Ok(())
}

/// Print the version x step table.
pub fn show_plan(base_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let (cfg, _) = resolve_config(base_dir, config_path)?;
    for row in render_plan(cfg.versions.iter(), &default_steps()) {
        println!("{row}");
    }
    Ok(())
}

/// Show aggregated results for every captured run.
pub fn report_results(results_dir: &Path) -> Result<()> {
    let (summary, warnings) = aggregate(results_dir)?;
    println!(
        "report: runs={} passed={} failed={}",
        summary.runs, summary.passed, summary.failed
    );
    if let Some(avg) = summary.avg_duration_secs {
        println!("report: avg_duration_secs={:.2}", avg);
    }
    for (version, (passed, total)) in summary.version_pass_rates {
        println!("report: version {} {}/{}", version, passed, total);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

/// Load `config_path` (which must exist) or the default file if present.
///
/// Returns the config and the file it came from, if any.
fn resolve_config(
    base_dir: &Path,
    config_path: Option<&Path>,
) -> Result<(MatrixConfig, Option<PathBuf>)> {
    let path = match config_path {
        Some(path) => {
            let path = base_dir.join(path);
            if !path.exists() {
                bail!("config {} not found", path.display());
            }
            path
        }
        None => base_dir.join(DEFAULT_CONFIG_FILE),
    };
    let loaded_from = path.exists().then(|| path.clone());
    let cfg = load_config(&path).context("load config")?;
    Ok((cfg, loaded_from))
}

fn print_version(report: &VersionReport) {
    let (passed, total) = report.checkpoint_tally();
    println!(
        "version: {} outcome={:?} checkpoints={}/{}",
        report.version, report.outcome, passed, total
    );
    if let Some(auth) = &report.auth
        && !auth.outcome.success()
    {
        println!(
            "warn: version={} auth exit_code={:?}",
            report.version, auth.outcome.exit_code
        );
    }
    for (index, step) in report.steps.iter().enumerate() {
        if let StepRecord::Checkpoint { command, outcome } = step
            && !outcome.passed
        {
            println!(
                "fail: version={} step={} command={} {}",
                report.version,
                index + 1,
                command,
                outcome.message.as_deref().unwrap_or("mismatch")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_username_returns_invalid_without_loading_config() {
        let temp = tempdir().expect("tempdir");
        let options = RunOptions {
            config_path: Some(temp.path().join("does-not-exist.toml")),
            ..RunOptions::default()
        };
        let code = run_command(temp.path(), &options).expect("run");
        assert_eq!(code, exit_codes::INVALID);
    }

    #[test]
    fn explicit_config_must_exist() {
        let temp = tempdir().expect("tempdir");
        let err =
            resolve_config(temp.path(), Some(Path::new("missing.toml"))).expect_err("missing");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn default_config_file_is_optional() {
        let temp = tempdir().expect("tempdir");
        let (cfg, loaded_from) = resolve_config(temp.path(), None).expect("defaults");
        assert_eq!(cfg, MatrixConfig::default());
        assert_eq!(loaded_from, None);
    }

    #[test]
    fn default_config_file_is_picked_up() {
        let temp = tempdir().expect("tempdir");
        std::fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            "[versions]\nfirst = 2\nlast = 3\n",
        )
        .expect("write config");
        let (cfg, loaded_from) = resolve_config(temp.path(), None).expect("config");
        assert_eq!(cfg.versions.len(), 2);
        assert_eq!(loaded_from, Some(temp.path().join(DEFAULT_CONFIG_FILE)));
    }
}
