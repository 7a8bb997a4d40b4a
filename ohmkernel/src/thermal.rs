//! Thermal drift of resistance, and a host-side ambient warm-up envelope.
//!
//! Resistance follows a linear temperature law around the material's
//! reference temperature To:
//!
//! ```text
//! Rt = R0 · (1 + α · (T − To))
//! ```
//!
//! with α < 0 for both carbon and metal film parts, so a resistor reads low
//! when hot and high when cold. T and To are both in °C.
//!
//! Ambient temperature itself changes on a time scale of minutes. The
//! [`ThermalEnvelope`] models the enclosure warming from room temperature
//! toward a steady operating temperature so a host can feed a realistic,
//! slowly varying temperature into its resistor models.

/// Absolute zero in °C.
pub const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Drifted resistance `R0 · (1 + α · (T − To))`.
///
/// Pure function; `temp_c` and `nominal_temp_c` must share a unit (°C).
#[inline]
pub fn drifted_resistance(nominal: f64, temp_c: f64, alpha: f64, nominal_temp_c: f64) -> f64 {
    nominal * (1.0 + alpha * (temp_c - nominal_temp_c))
}

/// Convert °C to kelvin.
#[inline]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius - ABSOLUTE_ZERO_C
}

/// First-order warm-up of the air around a circuit.
///
/// The temperature follows
/// `T(t) = T_ambient + (T_steady − T_ambient) · (1 − exp(−t/τ))`.
///
/// Updates are only computed every `update_interval` samples; thermal time
/// constants are hundreds of seconds, so per-sample updates buy nothing.
#[derive(Debug, Clone)]
pub struct ThermalEnvelope {
    /// Starting temperature in °C.
    ambient_temp: f64,
    /// Temperature the enclosure settles at in °C.
    steady_state_temp: f64,
    /// Thermal time constant in seconds.
    thermal_tau: f64,
    /// Current temperature in °C.
    temperature: f64,
    /// Elapsed time in seconds.
    elapsed: f64,
    sample_rate: f64,
    samples_since_update: usize,
    /// At 48 kHz, 1000 samples is ~21 ms, tens of thousands of updates per
    /// time constant.
    update_interval: usize,
}

impl ThermalEnvelope {
    /// - `ambient_temp`: starting temperature in °C
    /// - `steady_state_temp`: settled operating temperature in °C
    /// - `thermal_tau`: time constant in seconds (300 = 5 min warm-up)
    /// - `sample_rate`: audio sample rate
    pub fn new(ambient_temp: f64, steady_state_temp: f64, thermal_tau: f64, sample_rate: f64) -> Self {
        Self {
            ambient_temp,
            steady_state_temp,
            thermal_tau,
            temperature: ambient_temp,
            elapsed: 0.0,
            sample_rate,
            samples_since_update: 0,
            update_interval: 1000,
        }
    }

    /// A pedal enclosure on a stage: room temperature up to ~40 °C over
    /// about ten minutes.
    pub fn pedal_enclosure(sample_rate: f64) -> Self {
        Self::new(25.0, 40.0, 600.0, sample_rate)
    }

    /// A valve amplifier chassis. Runs hot and takes a long time to settle;
    /// the steady state sits at the resistors' 70 °C reference.
    pub fn tube_chassis(sample_rate: f64) -> Self {
        Self::new(25.0, 70.0, 900.0, sample_rate)
    }

    /// Change how often (in samples) the temperature is recomputed.
    pub fn with_update_interval(mut self, samples: usize) -> Self {
        self.update_interval = samples.max(1);
        self
    }

    /// Advance by one audio sample.
    ///
    /// Returns `Some(temperature)` on the samples where the temperature was
    /// recomputed, so the host only pushes updates into its models when
    /// something changed.
    #[inline]
    pub fn tick(&mut self) -> Option<f64> {
        self.samples_since_update += 1;
        if self.samples_since_update < self.update_interval {
            return None;
        }
        self.samples_since_update = 0;
        self.elapsed += self.update_interval as f64 / self.sample_rate;

        let progress = 1.0 - (-self.elapsed / self.thermal_tau).exp();
        self.temperature =
            self.ambient_temp + (self.steady_state_temp - self.ambient_temp) * progress;
        Some(self.temperature)
    }

    /// Current temperature in °C.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Elapsed simulated time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Back to a cold start.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.samples_since_update = 0;
        self.temperature = self.ambient_temp;
    }

    /// Jump straight to the settled temperature.
    pub fn warm_up(&mut self) {
        self.elapsed = self.thermal_tau * 10.0;
        self.temperature = self.steady_state_temp;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
