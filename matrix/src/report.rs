use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::outcome::Outcome;
use crate::io::results::{load_meta, load_report};

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub runs: usize,
    pub passed: usize,
    pub failed: usize,
    pub avg_duration_secs: Option<f64>,
    /// `(version, (passed, total))` in the order versions were first seen.
    pub version_pass_rates: Vec<(String, (usize, usize))>,
}

pub fn load_run_dirs(results_dir: &Path) -> Result<Vec<PathBuf>> {
    if !results_dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in
        fs::read_dir(results_dir).with_context(|| format!("read {}", results_dir.display()))?
    {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Aggregate every captured run under `results_dir`.
///
/// Runs with unreadable `meta.json` or `versions.json` are skipped with a warning.
pub fn aggregate(results_dir: &Path) -> Result<(ReportSummary, Vec<String>)> {
    let mut summary = ReportSummary::default();
    let mut warnings = Vec::new();

    for run_dir in load_run_dirs(results_dir)? {
        let meta = match load_meta(&run_dir) {
            Ok(meta) => meta,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: meta.json invalid ({err})",
                    run_dir.display()
                ));
                continue;
            }
        };
        let report = match load_report(&run_dir) {
            Ok(report) => report,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: versions.json invalid ({err})",
                    run_dir.display()
                ));
                continue;
            }
        };

        summary.runs += 1;
        match meta.outcome {
            Outcome::Pass => summary.passed += 1,
            Outcome::Fail => summary.failed += 1,
        }

        summary.avg_duration_secs = Some(match summary.avg_duration_secs {
            None => meta.duration_secs,
            Some(avg) => {
                let total = avg * (summary.runs as f64 - 1.0) + meta.duration_secs;
                total / summary.runs as f64
            }
        });

        for version in &report.versions {
            let key = version.version.to_string();
            let index = match summary
                .version_pass_rates
                .iter()
                .position(|(seen, _)| *seen == key)
            {
                Some(index) => index,
                None => {
                    summary.version_pass_rates.push((key, (0, 0)));
                    summary.version_pass_rates.len() - 1
                }
            };
            let rate = &mut summary.version_pass_rates[index].1;
            if version.outcome == Outcome::Pass {
                rate.0 += 1;
            }
            rate.1 += 1;
        }
    }

    Ok((summary, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VersionIdentifier;
    use crate::io::results::{CaptureInput, capture_results};
    use crate::run::{MatrixReport, VersionReport};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::tempdir;

    fn version(number: u32, outcome: Outcome) -> VersionReport {
        VersionReport {
            version: VersionIdentifier::new("gdata-2.0.", number),
            env_var: "PYTHONPATH".to_string(),
            library_path: format!("/libs/gdata-2.0.{number}/lib/python"),
            auth: None,
            steps: Vec::new(),
            outcome,
        }
    }

    fn capture(base: &Path, run_id: &str, versions: Vec<VersionReport>, secs: i64) {
        let outcome = crate::core::outcome::classify_run(versions.iter().map(|v| v.outcome));
        let report = MatrixReport { versions, outcome };
        let started_at = Utc.with_ymd_and_hms(2026, 1, 18, 12, 0, 0).unwrap();
        let input = CaptureInput {
            run_id,
            username: "alice",
            blog_name: "myblog",
            config_path: None,
            started_at,
            finished_at: started_at + Duration::seconds(secs),
            report: &report,
        };
        capture_results(base, &input).expect("capture");
    }

    #[test]
    fn aggregates_runs() {
        let temp = tempdir().expect("tempdir");
        capture(
            temp.path(),
            "run-1",
            vec![version(2, Outcome::Pass), version(10, Outcome::Pass)],
            5,
        );
        capture(
            temp.path(),
            "run-2",
            vec![version(2, Outcome::Pass), version(10, Outcome::Fail)],
            15,
        );

        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert!(warnings.is_empty());
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.avg_duration_secs, Some(10.0));
        assert_eq!(
            summary.version_pass_rates,
            vec![
                ("gdata-2.0.2".to_string(), (2, 2)),
                ("gdata-2.0.10".to_string(), (1, 2)),
            ]
        );
    }

    #[test]
    fn invalid_runs_become_warnings() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("run-broken")).expect("dir");
        fs::write(temp.path().join("run-broken").join("meta.json"), "{").expect("meta");
        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert_eq!(summary.runs, 0);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("meta.json invalid"));
    }

    #[test]
    fn missing_results_dir_is_empty() {
        let temp = tempdir().expect("tempdir");
        let (summary, warnings) = aggregate(&temp.path().join("none")).expect("aggregate");
        assert_eq!(summary.runs, 0);
        assert!(warnings.is_empty());
    }
}
