//! Resistor material profiles.
//!
//! Resistance of both carbon and metal film parts falls as they heat up, so
//! every temperature coefficient in the tables below is negative. Carbon parts
//! are far more temperature-sensitive and noisier (larger Hooge constant)
//! than metal film.
//!
//! The published coefficients are ranges ("up to X ppm/°C"). Each bucket
//! stores the range maximum as its representative magnitude.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Reference temperature (°C) at which nominal resistances are specified.
pub const NOMINAL_TEMPERATURE_C: f64 = 70.0;

/// Resistor body material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    /// Carbon film / carbon composition.
    Carbon,
    /// Metal film.
    Metal,
}

impl MaterialKind {
    /// The shared, immutable profile for this material.
    pub fn profile(self) -> &'static MaterialProfile {
        match self {
            MaterialKind::Carbon => &CARBON,
            MaterialKind::Metal => &METAL,
        }
    }

    /// Lower-case name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            MaterialKind::Carbon => "carbon",
            MaterialKind::Metal => "metal",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaterialKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carbon" | "carbon_film" | "carbon-film" => Ok(MaterialKind::Carbon),
            "metal" | "metal_film" | "metal-film" => Ok(MaterialKind::Metal),
            _ => Err(ModelError::UnsupportedMaterial(s.to_string())),
        }
    }
}

/// One row of a temperature-coefficient table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaBucket {
    /// Largest nominal resistance (Ω, inclusive) covered by this bucket.
    pub upper_bound: f64,
    /// Coefficient magnitude in 1/°C. Applied negated.
    pub alpha_magnitude: f64,
}

impl AlphaBucket {
    const fn new(upper_bound: f64, alpha_magnitude: f64) -> Self {
        Self { upper_bound, alpha_magnitude }
    }
}

/// Physical constants for one resistor material.
///
/// Profiles are process-wide `static` data, shared read-only by every
/// resistor built from that material.
#[derive(Debug, PartialEq)]
pub struct MaterialProfile {
    pub kind: MaterialKind,
    /// Reference temperature To (°C).
    pub nominal_temperature: f64,
    /// Hooge constant C, scaling flicker-noise power.
    pub hooge_constant: f64,
    /// Buckets ordered by ascending upper bound. The last bucket also covers
    /// everything above its bound, so together they partition (0, +∞).
    pub buckets: &'static [AlphaBucket],
}

static CARBON_BUCKETS: [AlphaBucket; 4] = [
    AlphaBucket::new(10.0, 200e-6),
    AlphaBucket::new(99e3, 450e-6),
    AlphaBucket::new(1e6, 700e-6),
    AlphaBucket::new(10e6, 1500e-6),
];

static METAL_BUCKETS: [AlphaBucket; 1] = [AlphaBucket::new(1e6, 50e-6)];

/// Carbon film profile.
pub static CARBON: MaterialProfile = MaterialProfile {
    kind: MaterialKind::Carbon,
    nominal_temperature: NOMINAL_TEMPERATURE_C,
    hooge_constant: 3e-13,
    buckets: &CARBON_BUCKETS,
};

/// Metal film profile.
pub static METAL: MaterialProfile = MaterialProfile {
    kind: MaterialKind::Metal,
    nominal_temperature: NOMINAL_TEMPERATURE_C,
    hooge_constant: 2e-16,
    buckets: &METAL_BUCKETS,
};

impl MaterialProfile {
    /// Bucket covering `nominal` ohms: the first whose upper bound is ≥
    /// `nominal`, or the last bucket past the end of the table.
    pub fn bucket_for(&self, nominal: f64) -> &AlphaBucket {
        self.buckets
            .iter()
            .find(|b| nominal <= b.upper_bound)
            .unwrap_or(&self.buckets[self.buckets.len() - 1])
    }

    /// Signed temperature coefficient (1/°C) for a nominal resistance.
    #[inline]
    pub fn lookup_alpha(&self, nominal: f64) -> f64 {
        -self.bucket_for(nominal).alpha_magnitude
    }
}

/// Signed temperature coefficient for `kind` at nominal resistance `nominal`.
#[inline]
pub fn lookup_alpha(kind: MaterialKind, nominal: f64) -> f64 {
    kind.profile().lookup_alpha(nominal)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
