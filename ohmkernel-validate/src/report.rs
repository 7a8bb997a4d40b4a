//! Validation report generation and display.
//!
//! # Report Structure
//!
//! - [`ValidationReport`] - Top-level report containing all results
//!   - [`SuiteResult`] - Results for a suite (e.g. "drift", "noise")
//!     - [`CaseResult`] - Results for one resistor configuration
//!       - [`CheckResult`] - One measured property against its expectation
//!
//! The JSON output carries the timestamp, git commit (if available), sample
//! rate and seed, so a saved report identifies the exact run that produced it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Full validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Seconds since the Unix epoch.
    pub timestamp: String,
    pub git_commit: Option<String>,
    pub sample_rate: f64,
    pub seed: u64,
    pub suites: BTreeMap<String, SuiteResult>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_cases: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub description: String,
    pub passed: usize,
    pub failed: usize,
    pub cases: BTreeMap<String, CaseResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub passed: bool,
    pub checks: Vec<CheckResult>,
}

/// Outcome of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: String,
    pub passed: bool,
    pub measured: f64,
    pub expected: f64,
    pub tolerance: f64,
    /// Unit of `measured` and `expected`.
    pub unit: String,
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl CheckResult {
    pub fn measured(
        check: &str,
        passed: bool,
        measured: f64,
        expected: f64,
        tolerance: f64,
        unit: &str,
    ) -> Self {
        Self {
            check: check.to_string(),
            passed,
            measured,
            expected,
            tolerance,
            unit: unit.to_string(),
            detail: None,
            error: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn from_error(check: &str, error: String) -> Self {
        Self {
            check: check.to_string(),
            passed: false,
            measured: f64::NAN,
            expected: f64::NAN,
            tolerance: f64::NAN,
            unit: String::new(),
            detail: None,
            error: Some(error),
        }
    }
}

impl ValidationReport {
    pub fn new(suites: BTreeMap<String, SuiteResult>, sample_rate: f64, seed: u64) -> Self {
        let mut total = 0;
        let mut passed = 0;
        let mut failed = 0;

        for suite in suites.values() {
            total += suite.passed + suite.failed;
            passed += suite.passed;
            failed += suite.failed;
        }

        let pass_rate = if total > 0 {
            passed as f64 / total as f64
        } else {
            0.0
        };

        Self {
            timestamp: unix_timestamp(),
            git_commit: get_git_commit(),
            sample_rate,
            seed,
            suites,
            summary: ReportSummary {
                total_cases: total,
                passed,
                failed,
                pass_rate,
            },
        }
    }

    /// Save report to a JSON file, creating parent directories.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Print human-readable summary to terminal.
    pub fn print_summary(&self) {
        use colored::Colorize;

        println!("\n{}", "═".repeat(60).bold());
        println!("{}", " OHMKERNEL VALIDATION REPORT ".bold().on_blue());
        println!("{}", "═".repeat(60).bold());

        if let Some(ref commit) = self.git_commit {
            println!("Git commit: {}", commit.dimmed());
        }
        println!("Timestamp:  {}", self.timestamp.dimmed());
        println!("Config:     {} Hz, seed {}", self.sample_rate, self.seed);
        println!();

        for (suite_name, suite) in &self.suites {
            let status = if suite.failed == 0 {
                "PASS".green().bold()
            } else {
                "FAIL".red().bold()
            };

            println!(
                "[{}] {} - {} ({}/{})",
                status,
                suite_name.bold(),
                suite.description.dimmed(),
                suite.passed,
                suite.passed + suite.failed
            );

            for (case_name, case) in &suite.cases {
                let case_status = if case.passed { "✓".green() } else { "✗".red() };
                println!("  {} {}", case_status, case_name);

                for check in &case.checks {
                    if let Some(ref err) = check.error {
                        println!("    {} {} - {}", "⚠".yellow(), check.check.dimmed(), err);
                        continue;
                    }
                    let check_status = if check.passed { "✓".green() } else { "✗".red() };
                    println!(
                        "    {} {} | measured {:.4e} {} | expected {:.4e} ± {:.3e}",
                        check_status,
                        check.check.dimmed(),
                        check.measured,
                        check.unit,
                        check.expected,
                        check.tolerance
                    );
                    if let Some(ref detail) = check.detail {
                        println!("      {}", detail);
                    }
                }
            }
            println!();
        }

        println!("{}", "─".repeat(60));
        let overall_status = if self.summary.failed == 0 {
            "ALL CASES PASSED".green().bold()
        } else {
            format!("{} CASES FAILED", self.summary.failed).red().bold()
        };
        println!(
            "{} | {}/{} passed ({:.1}%)",
            overall_status,
            self.summary.passed,
            self.summary.total_cases,
            self.summary.pass_rate * 100.0
        );
        println!("{}\n", "═".repeat(60).bold());
    }

    /// Print one row per check.
    pub fn print_detailed(&self) {
        use tabled::{Table, Tabled};

        #[derive(Tabled)]
        struct CheckRow {
            suite: String,
            case: String,
            check: String,
            measured: String,
            expected: String,
            tolerance: String,
            unit: String,
            status: String,
        }

        let mut rows = vec![];

        for (suite_name, suite) in &self.suites {
            for (case_name, case) in &suite.cases {
                for check in &case.checks {
                    let (measured, expected, tolerance) = if check.error.is_some() {
                        ("-".to_string(), "-".to_string(), "-".to_string())
                    } else {
                        (
                            format!("{:.4e}", check.measured),
                            format!("{:.4e}", check.expected),
                            format!("{:.2e}", check.tolerance),
                        )
                    };

                    rows.push(CheckRow {
                        suite: suite_name.clone(),
                        case: case_name.clone(),
                        check: check.check.clone(),
                        measured,
                        expected,
                        tolerance,
                        unit: check.unit.clone(),
                        status: if check.passed {
                            "PASS".to_string()
                        } else {
                            "FAIL".to_string()
                        },
                    });
                }
            }
        }

        if !rows.is_empty() {
            let table = Table::new(rows);
            println!("\nDetailed Metrics:\n{}", table);
        }
    }
}

fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

/// Try to get the current git commit hash.
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| {
            if o.status.success() {
                String::from_utf8(o.stdout).ok().map(|s| s.trim().to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite(passed: usize, failed: usize) -> SuiteResult {
        SuiteResult {
            description: "Test".to_string(),
            passed,
            failed,
            cases: BTreeMap::new(),
        }
    }

    #[test]
    fn report_summary_calculation() {
        let mut suites = BTreeMap::new();
        suites.insert("drift".to_string(), suite(3, 1));
        suites.insert("noise".to_string(), suite(4, 0));

        let report = ValidationReport::new(suites, 48_000.0, 42);
        assert_eq!(report.summary.total_cases, 8);
        assert_eq!(report.summary.passed, 7);
        assert_eq!(report.summary.failed, 1);
        assert!((report.summary.pass_rate - 0.875).abs() < 1e-12);
    }

    #[test]
    fn empty_report_has_zero_rate() {
        let report = ValidationReport::new(BTreeMap::new(), 48_000.0, 0);
        assert_eq!(report.summary.total_cases, 0);
        assert_eq!(report.summary.pass_rate, 0.0);
    }

    #[test]
    fn json_is_written_with_parents() {
        let mut cases = BTreeMap::new();
        cases.insert(
            "carbon_100k".to_string(),
            CaseResult {
                passed: true,
                checks: vec![CheckResult::measured("determinism", true, 0.0, 0.0, 0.0, "mismatches")
                    .with_detail("10000 samples")],
            },
        );
        let mut suites = BTreeMap::new();
        suites.insert(
            "noise".to_string(),
            SuiteResult {
                description: "Noise".to_string(),
                passed: 1,
                failed: 0,
                cases,
            },
        );
        let report = ValidationReport::new(suites, 48_000.0, 42);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        report.save_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["summary"]["passed"], 1);
        assert_eq!(
            json["suites"]["noise"]["cases"]["carbon_100k"]["checks"][0]["check"],
            "determinism"
        );
    }
}
