//! The per-sample non-ideal resistor.
//!
//! Each call to [`ResistorModel::evaluate`] produces
//!
//! ```text
//! Rt     = R0 · (1 + α · (T − To))                 thermal drift
//! A_w    = sqrt(K · sqrt(Rt · T_K · fs))            Johnson noise range
//! R      = Rt · (1 + A_w · white + C · pink)
//! ```
//!
//! where `K` = [`JOHNSON_RANGE_SCALE`], `C` is the material's Hooge constant,
//! `white` is uniform on [-1, 1) and `pink` is unit-scale 1/f noise. The
//! sample rate stands in for the noise bandwidth Δf.
//!
//! # The circular dependency
//!
//! Both noise terms really depend on the current through the part, which
//! depends on its resistance. The model breaks the loop with a small-signal
//! approximation: a unity (1 V) drop across the part, and the drifted value
//! `Rt` in place of `R` inside the noise amplitude. Resolving R and current
//! jointly would need the external circuit solver's iteration.
//!
//! # Temperature units
//!
//! All temperatures at the API are °C, matching the 70 °C reference of the
//! material tables. Johnson noise scales with absolute temperature, so the
//! noise amplitude uses the same temperature converted to kelvin.

use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{ClampEvent, DiagnosticSink};
use crate::error::ModelError;
use crate::material::{MaterialKind, MaterialProfile};
use crate::noise::{entropy_seed, NoiseGenerator, NoiseSource};
use crate::thermal::{celsius_to_kelvin, drifted_resistance, ABSOLUTE_ZERO_C};
use crate::ComponentModel;

/// Range scale for the uniform Johnson noise term, `sqrt(K · sqrt(R·T·Δf))`.
pub const JOHNSON_RANGE_SCALE: f64 = 8.91769896e-11;

/// Smallest resistance the model will ever return (Ω).
pub const RESISTANCE_FLOOR: f64 = 1e-6;

/// Uniform white-noise range scale for a resistor at `resistance` ohms,
/// `kelvin` absolute temperature and bandwidth `bandwidth_hz`.
#[inline]
pub fn johnson_amplitude(resistance: f64, kelvin: f64, bandwidth_hz: f64) -> f64 {
    (JOHNSON_RANGE_SCALE * (resistance.max(0.0) * kelvin.max(0.0) * bandwidth_hz).sqrt()).sqrt()
}

fn check_temperature(celsius: f64) -> Result<f64, ModelError> {
    if !celsius.is_finite() {
        return Err(ModelError::NonFiniteTemperature(celsius));
    }
    if celsius < ABSOLUTE_ZERO_C {
        return Err(ModelError::BelowAbsoluteZero(celsius));
    }
    Ok(celsius)
}

/// One simulated resistor.
///
/// Owns its noise state exclusively; `evaluate` takes `&mut self`, so one
/// instance is only ever driven by one thread at a time. Independent
/// instances share nothing but `'static` material data and can run on
/// separate threads without synchronisation.
pub struct ResistorModel<N: NoiseSource = NoiseGenerator> {
    nominal: f64,
    profile: &'static MaterialProfile,
    alpha: f64,
    sample_rate: f64,
    ambient_temp: f64,
    /// Rt at the current ambient temperature.
    drifted: f64,
    /// Johnson range scale at the current operating point.
    white_amplitude: f64,
    noise: N,
    samples: u64,
    clamps: u64,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl ResistorModel<NoiseGenerator> {
    /// Build a resistor with its own noise generator.
    ///
    /// - `nominal`: R0 in ohms, > 0
    /// - `material`: carbon or metal film
    /// - `sample_rate`: fs in Hz, > 0
    /// - `ambient_temp`: T in °C, ≥ −273.15
    /// - `seed`: fixes both noise streams; `None` draws one from system entropy
    pub fn new(
        nominal: f64,
        material: MaterialKind,
        sample_rate: f64,
        ambient_temp: f64,
        seed: Option<u64>,
    ) -> Result<Self, ModelError> {
        let seed = seed.unwrap_or_else(entropy_seed);
        Self::with_noise(nominal, material, sample_rate, ambient_temp, NoiseGenerator::new(seed))
    }

    /// Seed of the owned generator (useful to reproduce an entropy-seeded run).
    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }
}

impl<N: NoiseSource> ResistorModel<N> {
    /// Build a resistor driven by a caller-supplied noise source.
    pub fn with_noise(
        nominal: f64,
        material: MaterialKind,
        sample_rate: f64,
        ambient_temp: f64,
        noise: N,
    ) -> Result<Self, ModelError> {
        if !(nominal > 0.0 && nominal.is_finite()) {
            return Err(ModelError::NonPositiveResistance(nominal));
        }
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(ModelError::NonPositiveSampleRate(sample_rate));
        }
        let ambient_temp = check_temperature(ambient_temp)?;

        let profile = material.profile();
        let mut model = Self {
            nominal,
            profile,
            alpha: profile.lookup_alpha(nominal),
            sample_rate,
            ambient_temp,
            drifted: nominal,
            white_amplitude: 0.0,
            noise,
            samples: 0,
            clamps: 0,
            diagnostics: None,
        };
        model.refresh_operating_point();

        log::debug!(
            "resistor {} Ω {} at {} Hz, {} °C: alpha={:e}, Rt={} Ω",
            nominal,
            material,
            sample_rate,
            ambient_temp,
            model.alpha,
            model.drifted
        );
        Ok(model)
    }

    /// Attach a sink that receives every clamp event.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    pub fn set_diagnostics(&mut self, sink: Option<Arc<dyn DiagnosticSink>>) {
        self.diagnostics = sink;
    }

    /// Update the ambient temperature (°C). Call between samples.
    ///
    /// On error the previous temperature is kept.
    pub fn set_ambient_temperature(&mut self, celsius: f64) -> Result<(), ModelError> {
        self.ambient_temp = check_temperature(celsius)?;
        self.refresh_operating_point();
        Ok(())
    }

    /// Recompute the parts of the formula that only depend on R0, T and fs.
    fn refresh_operating_point(&mut self) {
        self.drifted = drifted_resistance(
            self.nominal,
            self.ambient_temp,
            self.alpha,
            self.profile.nominal_temperature,
        );
        self.white_amplitude = johnson_amplitude(
            self.drifted,
            celsius_to_kelvin(self.ambient_temp),
            self.sample_rate,
        );
    }

    /// Effective resistance for the next sample.
    ///
    /// Advances each noise process by exactly one step. Never allocates,
    /// never blocks, never panics; a non-physical result is replaced by
    /// [`RESISTANCE_FLOOR`] and reported to the attached sink.
    #[inline]
    pub fn evaluate(&mut self) -> f64 {
        let white = self.noise.next_white() * self.white_amplitude;
        let pink = self.noise.next_pink() * self.profile.hooge_constant;
        let r = self.drifted * (white + pink + 1.0);

        let index = self.samples;
        self.samples = self.samples.wrapping_add(1);

        if r > 0.0 && r.is_finite() {
            return r;
        }
        self.clamp(index, r)
    }

    #[cold]
    fn clamp(&mut self, sample_index: u64, raw: f64) -> f64 {
        self.clamps += 1;
        if let Some(sink) = &self.diagnostics {
            sink.report(ClampEvent {
                sample_index,
                raw_resistance: raw,
                clamped_to: RESISTANCE_FLOOR,
            });
        }
        RESISTANCE_FLOOR
    }

    /// Fill `out` with consecutive samples.
    pub fn evaluate_block(&mut self, out: &mut [f64]) {
        for slot in out.iter_mut() {
            *slot = self.evaluate();
        }
    }

    /// Restart the noise processes from `seed` and zero the counters.
    pub fn reseed(&mut self, seed: u64) {
        self.noise.reseed(seed);
        self.samples = 0;
        self.clamps = 0;
    }

    /// Return the noise state and counters to their initial condition.
    /// Temperature is left as set.
    pub fn reset(&mut self) {
        self.noise.reset();
        self.samples = 0;
        self.clamps = 0;
    }

    /// Nominal resistance R0 (Ω).
    pub fn nominal_resistance(&self) -> f64 {
        self.nominal
    }

    pub fn material(&self) -> MaterialKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &'static MaterialProfile {
        self.profile
    }

    /// Signed temperature coefficient (1/°C).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Ambient temperature (°C).
    pub fn ambient_temperature(&self) -> f64 {
        self.ambient_temp
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Noise-free resistance Rt at the current temperature (Ω).
    pub fn drifted_resistance(&self) -> f64 {
        self.drifted
    }

    /// Range scale of the white term, relative to Rt.
    pub fn white_amplitude(&self) -> f64 {
        self.white_amplitude
    }

    /// Scale of the pink term, relative to Rt (the Hooge constant).
    pub fn pink_amplitude(&self) -> f64 {
        self.profile.hooge_constant
    }

    /// Samples evaluated since construction, reseed or reset.
    pub fn samples_evaluated(&self) -> u64 {
        self.samples
    }

    /// Clamp events since construction, reseed or reset.
    pub fn clamp_count(&self) -> u64 {
        self.clamps
    }

    pub fn noise(&self) -> &N {
        &self.noise
    }

    pub fn noise_mut(&mut self) -> &mut N {
        &mut self.noise
    }
}

impl<N: NoiseSource> ComponentModel for ResistorModel<N> {
    fn evaluate(&mut self) -> f64 {
        ResistorModel::evaluate(self)
    }

    fn set_ambient_temperature(&mut self, celsius: f64) -> Result<(), ModelError> {
        ResistorModel::set_ambient_temperature(self, celsius)
    }

    fn reset(&mut self) {
        ResistorModel::reset(self)
    }
}

impl<N: NoiseSource + fmt::Debug> fmt::Debug for ResistorModel<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResistorModel")
            .field("nominal", &self.nominal)
            .field("material", &self.profile.kind)
            .field("alpha", &self.alpha)
            .field("sample_rate", &self.sample_rate)
            .field("ambient_temp", &self.ambient_temp)
            .field("drifted", &self.drifted)
            .field("white_amplitude", &self.white_amplitude)
            .field("noise", &self.noise)
            .field("samples", &self.samples)
            .field("clamps", &self.clamps)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SilentNoise;

    const FS: f64 = 48_000.0;

    fn silent(nominal: f64, material: MaterialKind, temp: f64) -> ResistorModel<SilentNoise> {
        ResistorModel::with_noise(nominal, material, FS, temp, SilentNoise).unwrap()
    }

    #[test]
    fn identity_at_reference_temperature() {
        let mut r = silent(100_000.0, MaterialKind::Carbon, 70.0);
        assert_eq!(r.evaluate(), 100_000.0);
        assert_eq!(r.drifted_resistance(), 100_000.0);
    }

    #[test]
    fn silent_model_returns_drifted_value_exactly() {
        let mut r = silent(4_700.0, MaterialKind::Carbon, 20.0);
        let expected = drifted_resistance(4_700.0, 20.0, -450e-6, 70.0);
        for _ in 0..16 {
            assert_eq!(r.evaluate(), expected);
        }
    }

    #[test]
    fn alpha_is_cached_from_lut() {
        let r = silent(1e6, MaterialKind::Carbon, 25.0);
        assert_eq!(r.alpha(), -700e-6);
        let m = silent(1e6, MaterialKind::Metal, 25.0);
        assert_eq!(m.alpha(), -50e-6);
    }

    #[test]
    fn johnson_amplitude_formula() {
        let r = silent(100_000.0, MaterialKind::Carbon, 70.0);
        let expected = (JOHNSON_RANGE_SCALE * (100_000.0 * 343.15 * FS).sqrt()).sqrt();
        assert!((r.white_amplitude() - expected).abs() < 1e-15);
        // Roughly a percent of jitter for a 100k part at audio rate.
        assert!(r.white_amplitude() > 0.005 && r.white_amplitude() < 0.02);
    }

    #[test]
    fn johnson_amplitude_is_zero_without_bandwidth_or_heat() {
        assert_eq!(johnson_amplitude(1_000.0, 0.0, FS), 0.0);
        assert_eq!(johnson_amplitude(-5.0, 300.0, FS), 0.0);
    }

    #[test]
    fn temperature_update_moves_operating_point() {
        let mut r = silent(10_000.0, MaterialKind::Carbon, 70.0);
        let before = r.white_amplitude();
        r.set_ambient_temperature(100.0).unwrap();
        assert!(r.drifted_resistance() < 10_000.0);
        assert_ne!(r.white_amplitude(), before);
        assert_eq!(r.ambient_temperature(), 100.0);
    }

    #[test]
    fn rejected_temperature_keeps_previous() {
        let mut r = silent(10_000.0, MaterialKind::Metal, 30.0);
        assert_eq!(
            r.set_ambient_temperature(-300.0),
            Err(ModelError::BelowAbsoluteZero(-300.0))
        );
        assert!(r.set_ambient_temperature(f64::NAN).is_err());
        assert_eq!(r.ambient_temperature(), 30.0);
    }

    #[test]
    fn construction_errors() {
        let e = ResistorModel::new(0.0, MaterialKind::Carbon, FS, 25.0, Some(1)).unwrap_err();
        assert_eq!(e, ModelError::NonPositiveResistance(0.0));
        let e = ResistorModel::new(-10.0, MaterialKind::Carbon, FS, 25.0, Some(1)).unwrap_err();
        assert_eq!(e, ModelError::NonPositiveResistance(-10.0));
        let e = ResistorModel::new(1e3, MaterialKind::Carbon, 0.0, 25.0, Some(1)).unwrap_err();
        assert_eq!(e, ModelError::NonPositiveSampleRate(0.0));
        let e = ResistorModel::new(1e3, MaterialKind::Metal, FS, -274.0, Some(1)).unwrap_err();
        assert_eq!(e, ModelError::BelowAbsoluteZero(-274.0));
        assert!(ResistorModel::new(f64::INFINITY, MaterialKind::Metal, FS, 25.0, Some(1)).is_err());
        assert!(ResistorModel::new(1e3, MaterialKind::Metal, f64::NAN, 25.0, Some(1)).is_err());
    }

    #[test]
    fn absolute_zero_is_accepted() {
        let mut r = ResistorModel::new(1e3, MaterialKind::Metal, FS, ABSOLUTE_ZERO_C, Some(1)).unwrap();
        assert_eq!(r.white_amplitude(), 0.0);
        assert!(r.evaluate() > 0.0);
    }

    #[test]
    fn noisy_output_stays_near_drifted_value() {
        let mut r = ResistorModel::new(10_000.0, MaterialKind::Carbon, FS, 25.0, Some(3)).unwrap();
        let rt = r.drifted_resistance();
        let bound = rt * (r.white_amplitude() + r.pink_amplitude() * 2.0) * 1.0001;
        for _ in 0..10_000 {
            let v = r.evaluate();
            assert!(v > 0.0 && v.is_finite());
            assert!((v - rt).abs() <= bound, "{v} too far from {rt}");
        }
        assert_eq!(r.samples_evaluated(), 10_000);
        assert_eq!(r.clamp_count(), 0);
    }

    #[test]
    fn explicit_seed_is_reported() {
        let r = ResistorModel::new(1e3, MaterialKind::Carbon, FS, 25.0, Some(99)).unwrap();
        assert_eq!(r.seed(), 99);
    }

    #[test]
    fn reset_replays() {
        let mut r = ResistorModel::new(1e3, MaterialKind::Carbon, FS, 25.0, Some(8)).unwrap();
        let a: Vec<f64> = (0..32).map(|_| r.evaluate()).collect();
        r.reset();
        assert_eq!(r.samples_evaluated(), 0);
        let b: Vec<f64> = (0..32).map(|_| r.evaluate()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn block_matches_single_steps() {
        let mut a = ResistorModel::new(2_200.0, MaterialKind::Metal, FS, 40.0, Some(5)).unwrap();
        let mut b = ResistorModel::new(2_200.0, MaterialKind::Metal, FS, 40.0, Some(5)).unwrap();
        let mut block = [0.0; 64];
        a.evaluate_block(&mut block);
        for &v in &block {
            assert_eq!(v.to_bits(), b.evaluate().to_bits());
        }
    }

    #[test]
    fn models_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ResistorModel>();
        assert_send::<ResistorModel<SilentNoise>>();
    }
}
