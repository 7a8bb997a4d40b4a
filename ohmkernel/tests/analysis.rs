//! Shared statistics and fixtures for integration tests.

#![allow(dead_code)]

use ohmkernel::NoiseSource;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SAMPLE_RATE: f64 = 48_000.0;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub fn mean(buf: &[f64]) -> f64 {
    buf.iter().sum::<f64>() / buf.len() as f64
}

/// Unbiased sample variance.
pub fn variance(buf: &[f64]) -> f64 {
    let m = mean(buf);
    buf.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (buf.len() - 1) as f64
}

pub fn lag1_correlation(buf: &[f64]) -> f64 {
    let m = mean(buf);
    let num: f64 = buf.windows(2).map(|w| (w[0] - m) * (w[1] - m)).sum();
    let den: f64 = buf.iter().map(|x| (x - m) * (x - m)).sum();
    num / den
}

/// `R/Rt − 1` for each sample.
pub fn deviation(trace: &[f64], drifted: f64) -> Vec<f64> {
    trace.iter().map(|&r| r / drifted - 1.0).collect()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Silent except for scripted white values at chosen sample indices.
///
/// Used to force non-physical resistances on demand.
#[derive(Debug, Clone)]
pub struct ScriptedNoise {
    spikes: Vec<(u64, f64)>,
    index: u64,
}

impl ScriptedNoise {
    pub fn new(spikes: &[(u64, f64)]) -> Self {
        Self {
            spikes: spikes.to_vec(),
            index: 0,
        }
    }
}

impl NoiseSource for ScriptedNoise {
    fn next_white(&mut self) -> f64 {
        let i = self.index;
        self.spikes
            .iter()
            .find(|(at, _)| *at == i)
            .map(|&(_, v)| v)
            .unwrap_or(0.0)
    }

    // The model draws white then pink once per sample; the pink call
    // advances the script.
    fn next_pink(&mut self) -> f64 {
        self.index += 1;
        0.0
    }

    fn reseed(&mut self, _seed: u64) {
        self.index = 0;
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}
