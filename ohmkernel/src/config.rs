//! YAML description of a bank of resistors.
//!
//! ```yaml
//! sample_rate: 48000
//! ambient_temperature: 25.0
//! seed: 42
//! resistors:
//!   - name: R1
//!     resistance: 4.7k
//!     material: carbon
//!   - name: R2
//!     resistance: 100000
//!     material: metal
//!     seed: 7
//! ```
//!
//! `resistance` is either a plain number of ohms or an engineering-notation
//! string (`4.7k`, `1M`, `68R`).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ModelError;
use crate::material::MaterialKind;
use crate::resistor::ResistorModel;
use crate::units::{parse_resistance, ValueError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("resistor {name}: {source}")]
    Value {
        name: String,
        #[source]
        source: ValueError,
    },
    #[error("resistor {name}: {source}")]
    Model {
        name: String,
        #[source]
        source: ModelError,
    },
    #[error("duplicate resistor name {0:?}")]
    DuplicateName(String),
}

/// A resistance as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResistanceValue {
    Ohms(f64),
    Notation(String),
}

impl ResistanceValue {
    pub fn ohms(&self) -> Result<f64, ValueError> {
        match self {
            ResistanceValue::Ohms(v) => Ok(*v),
            ResistanceValue::Notation(s) => parse_resistance(s),
        }
    }
}

impl From<f64> for ResistanceValue {
    fn from(v: f64) -> Self {
        ResistanceValue::Ohms(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistorConfig {
    pub name: String,
    pub resistance: ResistanceValue,
    /// `carbon` or `metal`. Kept as text so an unknown material is reported
    /// with the resistor's name instead of a bare YAML error.
    #[serde(default = "default_material")]
    pub material: String,
    /// Overrides the seed derived from the bank seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_material() -> String {
    MaterialKind::Carbon.name().to_string()
}

impl ResistorConfig {
    pub fn new(name: impl Into<String>, resistance: impl Into<ResistanceValue>, material: MaterialKind) -> Self {
        Self {
            name: name.into(),
            resistance: resistance.into(),
            material: material.name().to_string(),
            seed: None,
        }
    }

    pub fn material_kind(&self) -> Result<MaterialKind, ConfigError> {
        self.material.parse().map_err(|source| ConfigError::Model {
            name: self.name.clone(),
            source,
        })
    }

    pub fn nominal_resistance(&self) -> Result<f64, ConfigError> {
        self.resistance.ohms().map_err(|source| ConfigError::Value {
            name: self.name.clone(),
            source,
        })
    }

    /// Construct the model described by this entry.
    pub fn build(&self, sample_rate: f64, ambient_temp: f64, seed: u64) -> Result<ResistorModel, ConfigError> {
        let nominal = self.nominal_resistance()?;
        let material = self.material_kind()?;
        ResistorModel::new(nominal, material, sample_rate, ambient_temp, Some(self.seed.unwrap_or(seed)))
            .map_err(|source| ConfigError::Model {
                name: self.name.clone(),
                source,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
    /// °C.
    #[serde(default = "default_ambient")]
    pub ambient_temperature: f64,
    /// Group seed. Absent means every run draws fresh entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub resistors: Vec<ResistorConfig>,
}

fn default_sample_rate() -> f64 {
    48_000.0
}

fn default_ambient() -> f64 {
    25.0
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            ambient_temperature: default_ambient(),
            seed: None,
            resistors: Vec::new(),
        }
    }
}

impl BankConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("loading bank config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(src: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(src)?;
        config.check_names()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    fn check_names(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for r in &self.resistors {
            if !seen.insert(r.name.as_str()) {
                return Err(ConfigError::DuplicateName(r.name.clone()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
