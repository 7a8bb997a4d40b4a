//! Statistics and spectral estimates for noise captures.
//!
//! | Metric | Function | Description |
//! |--------|----------|-------------|
//! | Mean | [`mean`] | Arithmetic mean |
//! | Variance | [`variance`] | Unbiased sample variance |
//! | Relative error | [`relative_error`] | `(measured − expected) / expected` |
//! | PSD | [`welch_psd`] | Welch-averaged one-sided power spectrum |
//! | Spectral slope | [`spectral_slope_db_per_decade`] | Log-log least-squares fit |
//!
//! # Interpreting Results
//!
//! - White noise has a slope near 0 dB/decade.
//! - 1/f (pink) noise falls by 10 dB per decade (≈ −3 dB/octave).
//! - 1/f² (brown) noise falls by 20 dB per decade.

use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("capture of {len} samples is shorter than one {fft_size}-point segment")]
    TooShort { len: usize, fft_size: usize },
    #[error("FFT size must be an even number ≥ 16, got {0}")]
    BadFftSize(usize),
    #[error("FFT failed: {0}")]
    Fft(#[from] realfft::FftError),
    #[error("no PSD bins between {f_low} Hz and {f_high} Hz")]
    EmptyBand { f_low: f64, f_high: f64 },
}

pub fn mean(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    buf.iter().sum::<f64>() / buf.len() as f64
}

/// Unbiased sample variance (0 for fewer than two samples).
pub fn variance(buf: &[f64]) -> f64 {
    if buf.len() < 2 {
        return 0.0;
    }
    let m = mean(buf);
    buf.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (buf.len() - 1) as f64
}

pub fn relative_error(measured: f64, expected: f64) -> f64 {
    (measured - expected) / expected
}

fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
        .collect()
}

/// One-sided power spectral density.
#[derive(Debug, Clone)]
pub struct Psd {
    /// Bin centre frequencies in Hz, DC first.
    pub frequencies: Vec<f64>,
    /// Power per Hz at each bin.
    pub power: Vec<f64>,
    /// Number of averaged segments.
    pub segments: usize,
}

/// Welch PSD: Hann-windowed segments of `fft_size` samples with 50% overlap.
pub fn welch_psd(signal: &[f64], fft_size: usize, sample_rate: f64) -> Result<Psd, MetricsError> {
    if fft_size < 16 || fft_size % 2 != 0 {
        return Err(MetricsError::BadFftSize(fft_size));
    }
    if signal.len() < fft_size {
        return Err(MetricsError::TooShort { len: signal.len(), fft_size });
    }

    let window = hann(fft_size);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let hop = fft_size / 2;

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let mut segment = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let bins = fft_size / 2 + 1;
    let mut power = vec![0.0; bins];
    let mut segments = 0;

    let mut start = 0;
    while start + fft_size <= signal.len() {
        for ((dst, &x), &w) in segment.iter_mut().zip(&signal[start..start + fft_size]).zip(&window) {
            *dst = x * w;
        }
        fft.process(&mut segment, &mut spectrum)?;
        for (p, c) in power.iter_mut().zip(&spectrum) {
            *p += c.norm_sqr();
        }
        segments += 1;
        start += hop;
    }

    let scale = 1.0 / (sample_rate * window_power * segments as f64);
    for (k, p) in power.iter_mut().enumerate() {
        *p *= scale;
        // Fold negative frequencies into the one-sided estimate.
        if k != 0 && k != bins - 1 {
            *p *= 2.0;
        }
    }

    let frequencies = (0..bins).map(|k| k as f64 * sample_rate / fft_size as f64).collect();
    Ok(Psd { frequencies, power, segments })
}

/// Least-squares slope of `10·log10(P)` against `log10(f)` over
/// `[f_low, f_high]`, in dB per decade.
pub fn spectral_slope_db_per_decade(psd: &Psd, f_low: f64, f_high: f64) -> Result<f64, MetricsError> {
    let points: Vec<(f64, f64)> = psd
        .frequencies
        .iter()
        .zip(&psd.power)
        .map(|(&f, &p)| (f, p))
        .filter(|&(f, p)| f >= f_low && f <= f_high && p > 0.0)
        .map(|(f, p)| (f.log10(), 10.0 * p.log10()))
        .collect();
    if points.len() < 2 {
        return Err(MetricsError::EmptyBand { f_low, f_high });
    }

    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxy: f64 = points.iter().map(|(x, y)| (x - mx) * (y - my)).sum();
    let sxx: f64 = points.iter().map(|(x, _)| (x - mx) * (x - mx)).sum();
    Ok(sxy / sxx)
}

/// Magnitude of a single windowed FFT frame, for quick inspection.
pub fn magnitude_spectrum(frame: &[f64]) -> Result<Vec<f64>, MetricsError> {
    let n = frame.len();
    if n < 16 || n % 2 != 0 {
        return Err(MetricsError::BadFftSize(n));
    }
    let mut windowed: Vec<f64> = frame.iter().zip(hann(n)).map(|(x, w)| x * w).collect();

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut spectrum = vec![Complex::new(0.0, 0.0); n / 2 + 1];
    fft.process(&mut windowed, &mut spectrum)?;

    Ok(spectrum.iter().map(|c| c.norm() / n as f64).collect())
}
