//! Construction and parameter-update errors.

use thiserror::Error;

/// Errors raised while constructing or re-parameterising an element model.
///
/// These are all fatal for the call that produced them and are reported
/// immediately; nothing in the per-sample path returns an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("nominal resistance must be positive and finite, got {0} Ω")]
    NonPositiveResistance(f64),
    #[error("sample rate must be positive and finite, got {0} Hz")]
    NonPositiveSampleRate(f64),
    #[error("unsupported material kind: {0:?} (expected \"carbon\" or \"metal\")")]
    UnsupportedMaterial(String),
    #[error("ambient temperature {0} °C is below absolute zero (-273.15 °C)")]
    BelowAbsoluteZero(f64),
    #[error("ambient temperature must be finite, got {0}")]
    NonFiniteTemperature(f64),
}
