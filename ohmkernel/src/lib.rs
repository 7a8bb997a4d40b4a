//! OhmKernel — non-ideal resistor models for real-time virtual-analog
//! circuit simulation.
//!
//! A [`ResistorModel`] turns a nominal resistance and a material into an
//! effective, per-sample resistance that drifts with ambient temperature and
//! carries thermal (Johnson) and flicker (1/f) noise. The value is meant to be
//! consumed by an external nodal solver once per audio sample.
//!
//! # Modules
//!
//! - [`material`] — per-material constants and the temperature-coefficient LUT
//! - [`thermal`] — drift law and a host-side ambient warm-up envelope
//! - [`noise`] — white and pink noise sources with private, seedable state
//! - [`resistor`] — the per-sample resistor model
//! - [`diagnostics`] — lock-free reporting of clamp anomalies
//! - [`bank`] — a set of independent named resistors ticked together
//! - [`config`] — YAML configuration for banks of resistors
//! - [`units`] — nom-based engineering-notation parsing (`4.7k`, `1M`)
//! - [`wav`] — WAV export of resistance traces for auditioning
//!
//! # Example
//!
//! ```
//! use ohmkernel::{MaterialKind, ResistorModel};
//!
//! let mut r = ResistorModel::new(100_000.0, MaterialKind::Carbon, 48_000.0, 25.0, Some(42))?;
//! let effective = r.evaluate();
//! assert!(effective > 0.0 && effective.is_finite());
//!
//! // The host updates the ambient temperature between samples.
//! r.set_ambient_temperature(40.0)?;
//! # Ok::<(), ohmkernel::ModelError>(())
//! ```

pub mod bank;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod material;
pub mod noise;
pub mod resistor;
pub mod thermal;
pub mod units;
pub mod wav;

pub use bank::ResistorBank;
pub use config::{BankConfig, ConfigError, ResistorConfig};
pub use diagnostics::{ClampEvent, ClampLog, DiagnosticSink, LogSink};
pub use error::ModelError;
pub use material::{MaterialKind, MaterialProfile};
pub use noise::{NoiseGenerator, NoiseSource, SilentNoise};
pub use resistor::ResistorModel;
pub use thermal::ThermalEnvelope;

/// Per-sample interface shared by non-ideal element models.
///
/// A host circuit holding heterogeneous element models drives them through
/// this trait: one [`evaluate`](ComponentModel::evaluate) per sample tick,
/// ambient temperature updates between ticks.
pub trait ComponentModel {
    /// Advance one sample and return the element's effective value.
    fn evaluate(&mut self) -> f64;

    /// Update the ambient temperature in °C (call between samples).
    fn set_ambient_temperature(&mut self, celsius: f64) -> Result<(), ModelError>;

    /// Reset all internal state to its freshly constructed condition.
    fn reset(&mut self);
}
