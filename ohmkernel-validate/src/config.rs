//! YAML-based validation configuration.
//!
//! ```yaml
//! global:
//!   sample_rate: 48000
//!   seed: 42
//!   fft_size: 8192
//!
//! suites:
//!   noise:
//!     description: "Noise statistics"
//!     cases:
//!       carbon_100k:
//!         description: "100k carbon film at room temperature"
//!         resistance: 100k
//!         material: carbon
//!         temperature: 25.0
//!         samples: 262144
//!         checks:
//!           - type: white_variance
//!             tolerance: 0.05
//!           - type: pink_slope
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use ohmkernel::config::ResistanceValue;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    pub suites: BTreeMap<String, TestSuite>,
}

/// Settings shared by every case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
    /// Seed for every model built by the runner, so reports are reproducible.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Segment length for Welch PSD estimates.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
}

fn default_sample_rate() -> f64 { 48_000.0 }
fn default_seed() -> u64 { 42 }
fn default_fft_size() -> usize { 8192 }

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            seed: default_seed(),
            fft_size: default_fft_size(),
        }
    }
}

/// A group of related cases (e.g. "drift", "noise").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub description: String,
    pub cases: BTreeMap<String, TestCase>,
}

/// One resistor configuration and the checks to run against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub description: String,
    pub resistance: ResistanceValue,
    #[serde(default = "default_material")]
    pub material: String,
    /// Ambient temperature in °C.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Capture length for statistical checks.
    #[serde(default = "default_samples")]
    pub samples: usize,
    pub checks: Vec<CheckConfig>,
}

fn default_material() -> String { "carbon".to_string() }
fn default_temperature() -> f64 { 25.0 }
fn default_samples() -> usize { 1 << 18 }

/// A property to verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CheckConfig {
    /// Noise-free output at the reference temperature equals R0.
    #[serde(rename = "drift_identity")]
    DriftIdentity {
        #[serde(default = "default_identity_tolerance")]
        tolerance: f64,
    },
    /// Noise-free output strictly decreases as temperature rises.
    #[serde(rename = "monotonic_drift")]
    MonotonicDrift {
        #[serde(default = "default_sweep_from")]
        from: f64,
        #[serde(default = "default_sweep_to")]
        to: f64,
        #[serde(default = "default_sweep_steps")]
        steps: usize,
    },
    /// Variance of the white term matches `A²/3`, as a relative error.
    #[serde(rename = "white_variance")]
    WhiteVariance {
        #[serde(default = "default_variance_tolerance")]
        tolerance: f64,
    },
    /// PSD slope of the flicker process in dB/decade.
    #[serde(rename = "pink_slope")]
    PinkSlope {
        #[serde(default = "default_pink_slope")]
        expected_db_per_decade: f64,
        #[serde(default = "default_slope_tolerance")]
        tolerance: f64,
        #[serde(default = "default_f_low")]
        f_low: f64,
        #[serde(default = "default_f_high")]
        f_high: f64,
    },
    /// Two models with the same seed produce bit-identical output.
    #[serde(rename = "determinism")]
    Determinism {
        #[serde(default = "default_determinism_samples")]
        samples: usize,
    },
}

fn default_identity_tolerance() -> f64 { 1e-12 }
fn default_sweep_from() -> f64 { -40.0 }
fn default_sweep_to() -> f64 { 125.0 }
fn default_sweep_steps() -> usize { 34 }
fn default_variance_tolerance() -> f64 { 0.05 }
fn default_pink_slope() -> f64 { -10.0 }
fn default_slope_tolerance() -> f64 { 1.5 }
fn default_f_low() -> f64 { 40.0 }
fn default_f_high() -> f64 { 4_000.0 }
fn default_determinism_samples() -> usize { 10_000 }

impl CheckConfig {
    pub fn label(&self) -> &'static str {
        match self {
            CheckConfig::DriftIdentity { .. } => "drift_identity",
            CheckConfig::MonotonicDrift { .. } => "monotonic_drift",
            CheckConfig::WhiteVariance { .. } => "white_variance",
            CheckConfig::PinkSlope { .. } => "pink_slope",
            CheckConfig::Determinism { .. } => "determinism",
        }
    }

    pub fn white_variance() -> Self {
        CheckConfig::WhiteVariance { tolerance: default_variance_tolerance() }
    }

    pub fn pink_slope() -> Self {
        CheckConfig::PinkSlope {
            expected_db_per_decade: default_pink_slope(),
            tolerance: default_slope_tolerance(),
            f_low: default_f_low(),
            f_high: default_f_high(),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// The built-in drift and noise suites.
    pub fn default_config() -> Self {
        Self {
            global: GlobalConfig::default(),
            suites: default_suites(),
        }
    }

    /// Look up a case by suite and case name.
    pub fn case(&self, suite: &str, case: &str) -> Option<&TestCase> {
        self.suites.get(suite).and_then(|s| s.cases.get(case))
    }
}

fn case(
    description: &str,
    resistance: &str,
    material: &str,
    temperature: f64,
    checks: Vec<CheckConfig>,
) -> TestCase {
    TestCase {
        description: description.to_string(),
        resistance: ResistanceValue::Notation(resistance.to_string()),
        material: material.to_string(),
        temperature,
        samples: default_samples(),
        checks,
    }
}

fn default_suites() -> BTreeMap<String, TestSuite> {
    let mut suites = BTreeMap::new();

    let identity = || CheckConfig::DriftIdentity { tolerance: default_identity_tolerance() };
    let sweep = || CheckConfig::MonotonicDrift {
        from: default_sweep_from(),
        to: default_sweep_to(),
        steps: default_sweep_steps(),
    };

    let mut drift = BTreeMap::new();
    drift.insert(
        "carbon_low".to_string(),
        case("4.7Ω carbon, first LUT bucket", "4.7", "carbon", 25.0, vec![identity(), sweep()]),
    );
    drift.insert(
        "carbon_100k".to_string(),
        case("100k carbon, third LUT bucket", "100k", "carbon", 25.0, vec![identity(), sweep()]),
    );
    drift.insert(
        "carbon_4m7".to_string(),
        case("4.7M carbon, last LUT bucket", "4.7M", "carbon", 25.0, vec![identity(), sweep()]),
    );
    drift.insert(
        "metal_10k".to_string(),
        case("10k metal film", "10k", "metal", 25.0, vec![identity(), sweep()]),
    );
    suites.insert("drift".to_string(), TestSuite {
        description: "Thermal drift law and LUT selection".to_string(),
        cases: drift,
    });

    let determinism = || CheckConfig::Determinism { samples: default_determinism_samples() };

    let mut noise = BTreeMap::new();
    noise.insert(
        "carbon_100k".to_string(),
        case(
            "100k carbon film at room temperature",
            "100k",
            "carbon",
            25.0,
            vec![CheckConfig::white_variance(), CheckConfig::pink_slope(), determinism()],
        ),
    );
    noise.insert(
        "metal_1k_hot".to_string(),
        case(
            "1k metal film in a hot chassis",
            "1k",
            "metal",
            70.0,
            vec![CheckConfig::white_variance(), determinism()],
        ),
    );
    noise.insert(
        "carbon_1m_cold".to_string(),
        case(
            "1M carbon film below freezing",
            "1M",
            "carbon",
            -20.0,
            vec![CheckConfig::white_variance(), CheckConfig::pink_slope()],
        ),
    );
    suites.insert("noise".to_string(), TestSuite {
        description: "Johnson and flicker noise statistics".to_string(),
        cases: noise,
    });

    suites
}
