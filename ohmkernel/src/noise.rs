//! Noise sources for the resistor model.
//!
//! Two independent processes, each with its own generator state:
//!
//! - **White** — xorshift64* mapped to a uniform distribution on [-1, 1).
//!   Zero mean, flat spectrum, independent from sample to sample.
//! - **Pink** — Paul Kellet's refined pink filter (seven first-order stages)
//!   fed by its own white stream. Accurate to within ±0.05 dB of a 1/f
//!   slope (−10 dB/decade) from ~10 Hz up to the top of the audio band at
//!   44.1–48 kHz.
//!
//! | stage | pole      | input gain  |
//! |-------|-----------|-------------|
//! | b0    | 0.99886   | 0.0555179   |
//! | b1    | 0.99332   | 0.0750759   |
//! | b2    | 0.96900   | 0.1538520   |
//! | b3    | 0.86650   | 0.3104856   |
//! | b4    | 0.55000   | 0.5329522   |
//! | b5    | −0.7616   | −0.0168980  |
//! | b6    | (1-sample delay) | 0.115926 |
//! | direct|           | 0.5362      |
//!
//! The summed output is scaled by [`PINK_GAIN`] so peaks stay roughly
//! within ±1.
//!
//! Everything here is allocation-free and constant-time per sample.

/// Output gain applied to the summed pink filter stages.
pub const PINK_GAIN: f64 = 0.11;

const PINK_STREAM: u64 = 0x6A09_E667_F3BC_C909;

/// SplitMix64 finaliser. Spreads nearby seeds across the whole state space.
#[inline]
pub fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic per-member seed for member `index` of a group seeded
/// with `group_seed`.
#[inline]
pub fn derive_seed(group_seed: u64, index: usize) -> u64 {
    splitmix64(group_seed.wrapping_add(index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Seed drawn from system entropy, for models built without an explicit seed.
pub fn entropy_seed() -> u64 {
    rand::random()
}

/// A pair of noise processes feeding a resistor model.
///
/// Implementors return unit-scale samples; the model applies the physical
/// amplitudes. Each call advances the corresponding process by one step.
pub trait NoiseSource {
    /// Next uniform white sample on [-1, 1).
    fn next_white(&mut self) -> f64;

    /// Next unit-amplitude 1/f sample.
    fn next_pink(&mut self) -> f64;

    /// Restart both processes from `seed`.
    fn reseed(&mut self, seed: u64);

    /// Return to the state immediately after construction.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// White
// ---------------------------------------------------------------------------

/// Uniform white noise on [-1, 1) from a xorshift64* generator.
#[derive(Debug, Clone, PartialEq)]
pub struct WhiteNoise {
    state: u64,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        let mut w = Self { state: 0 };
        w.reseed(seed);
        w
    }

    pub fn reseed(&mut self, seed: u64) {
        // xorshift never leaves the all-zero state.
        self.state = match splitmix64(seed) {
            0 => 0x2545_F491_4F6C_DD1D,
            s => s,
        };
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Next sample on [-1, 1).
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        // Top 53 bits give an exactly representable value on [0, 1).
        let unit = (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
        unit * 2.0 - 1.0
    }
}

// ---------------------------------------------------------------------------
// Pink
// ---------------------------------------------------------------------------

/// 1/f noise from Paul Kellet's refined filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PinkNoise {
    white: WhiteNoise,
    b: [f64; 7],
}

impl PinkNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            white: WhiteNoise::new(seed),
            b: [0.0; 7],
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.white.reseed(seed);
        self.b = [0.0; 7];
    }

    /// Clear the filter accumulators without touching the generator.
    pub fn clear(&mut self) {
        self.b = [0.0; 7];
    }

    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let x = self.white.next_sample();
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + x * 0.0555179;
        b[1] = 0.99332 * b[1] + x * 0.0750759;
        b[2] = 0.96900 * b[2] + x * 0.1538520;
        b[3] = 0.86650 * b[3] + x * 0.3104856;
        b[4] = 0.55000 * b[4] + x * 0.5329522;
        b[5] = -0.7616 * b[5] - x * 0.0168980;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + x * 0.5362;
        b[6] = x * 0.115926;
        pink * PINK_GAIN
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The default noise state owned by each resistor: one white and one pink
/// process, seeded from a single value through separate streams.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseGenerator {
    seed: u64,
    white: WhiteNoise,
    pink: PinkNoise,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            white: WhiteNoise::new(seed),
            pink: PinkNoise::new(seed ^ PINK_STREAM),
        }
    }

    /// Generator seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }

    /// The seed this generator was (re)started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Wrap this generator so only the selected channels reach the model.
    pub fn masked(self, white: bool, pink: bool) -> Masked<Self> {
        Masked::new(self, white, pink)
    }
}

impl NoiseSource for NoiseGenerator {
    #[inline]
    fn next_white(&mut self) -> f64 {
        self.white.next_sample()
    }

    #[inline]
    fn next_pink(&mut self) -> f64 {
        self.pink.next_sample()
    }

    fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}

/// A noise source that is always zero. Yields the pure drift response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SilentNoise;

impl NoiseSource for SilentNoise {
    #[inline]
    fn next_white(&mut self) -> f64 {
        0.0
    }

    #[inline]
    fn next_pink(&mut self) -> f64 {
        0.0
    }

    fn reseed(&mut self, _seed: u64) {}

    fn reset(&mut self) {}
}

/// Passes through only the enabled channels of an inner source.
///
/// Disabled channels are still stepped, so a masked source stays in lock-step
/// with an unmasked one built from the same seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Masked<N> {
    inner: N,
    white: bool,
    pink: bool,
}

impl<N: NoiseSource> Masked<N> {
    pub fn new(inner: N, white: bool, pink: bool) -> Self {
        Self { inner, white, pink }
    }

    pub fn into_inner(self) -> N {
        self.inner
    }
}

impl<N: NoiseSource> NoiseSource for Masked<N> {
    #[inline]
    fn next_white(&mut self) -> f64 {
        let x = self.inner.next_white();
        if self.white { x } else { 0.0 }
    }

    #[inline]
    fn next_pink(&mut self) -> f64 {
        let x = self.inner.next_pink();
        if self.pink { x } else { 0.0 }
    }

    fn reseed(&mut self, seed: u64) {
        self.inner.reseed(seed);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
