//! # OhmKernel Validation Library
//!
//! Long-capture statistical checks for the `ohmkernel` resistor model:
//! drift identity at the reference temperature, monotonic drift, Johnson
//! noise variance, the 1/f slope of the flicker process and seed
//! determinism.
//!
//! ### Spectral Metrics
//!
//! ```rust
//! use ohmkernel::noise::{NoiseGenerator, NoiseSource};
//! use ohmkernel_validate::metrics;
//!
//! let mut noise = NoiseGenerator::new(7);
//! let pink: Vec<f64> = (0..1 << 16).map(|_| noise.next_pink()).collect();
//!
//! let psd = metrics::welch_psd(&pink, 4096, 48_000.0).unwrap();
//! let slope = metrics::spectral_slope_db_per_decade(&psd, 40.0, 4_000.0).unwrap();
//! assert!((slope + 10.0).abs() < 2.0);
//! ```
//!
//! ### Running Suites
//!
//! ```rust,ignore
//! use ohmkernel_validate::{ValidationConfig, ValidationReport, ValidationRunner};
//!
//! let config = ValidationConfig::default_config();
//! let runner = ValidationRunner::new(config.clone());
//! let report = ValidationReport::new(runner.run_all(), config.global.sample_rate, config.global.seed);
//! report.print_summary();
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # List available cases
//! ohmkernel-validate list
//!
//! # Run all suites, write a JSON report
//! ohmkernel-validate run --report report.json
//!
//! # Run one case
//! ohmkernel-validate run --suite noise --case carbon_100k
//!
//! # Write the default config
//! ohmkernel-validate init
//!
//! # Audition a case's resistance deviation
//! ohmkernel-validate render noise carbon_100k --output carbon_100k.wav
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - YAML suite configuration
//! - [`metrics`] - Statistics, Welch PSD and spectral slope
//! - [`runner`] - Check execution
//! - [`report`] - JSON and terminal reporting

pub mod config;
pub mod metrics;
pub mod report;
pub mod runner;

pub use config::{CheckConfig, ConfigError, GlobalConfig, TestCase, TestSuite, ValidationConfig};
pub use metrics::{MetricsError, Psd};
pub use report::{CaseResult, CheckResult, ReportSummary, SuiteResult, ValidationReport};
pub use runner::{RunnerError, ValidationRunner};
