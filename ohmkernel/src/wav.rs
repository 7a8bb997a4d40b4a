//! WAV export of resistance traces.
//!
//! The deviation `R/Rt − 1` of a resistor is an audio-rate signal in its own
//! right; writing it out with `hound` lets the noise floor be auditioned or
//! inspected in an audio editor.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::noise::NoiseSource;
use crate::resistor::ResistorModel;

/// 48 kHz, 32-bit float, mono.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Evaluate `model` for `len` consecutive samples.
pub fn render_trace<N: NoiseSource>(model: &mut ResistorModel<N>, len: usize) -> Vec<f64> {
    let mut trace = vec![0.0; len];
    model.evaluate_block(&mut trace);
    trace
}

/// `R/Rt − 1` for each sample of a trace.
pub fn relative_deviation(trace: &[f64], drifted: f64) -> Vec<f64> {
    trace.iter().map(|&r| r / drifted - 1.0).collect()
}

/// Scale so the largest magnitude is `peak`. A silent buffer is left as is.
pub fn normalize_peak(samples: &mut [f64], peak: f64) {
    let max = samples.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
    if max > 0.0 {
        let gain = peak / max;
        for s in samples.iter_mut() {
            *s *= gain;
        }
    }
}

/// Write raw f64 samples to a mono float WAV file.
pub fn write_wav(samples: &[f64], path: &Path, sample_rate: u32) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, wav_spec(sample_rate))?;
    for &s in samples {
        writer.write_sample(s as f32)?;
    }
    writer.finalize()
}

/// Render `len` samples of a resistor's deviation, normalised to 0.9 peak,
/// and write it to `path`. Returns the rendered trace in ohms.
pub fn render_deviation_wav<N: NoiseSource>(
    model: &mut ResistorModel<N>,
    len: usize,
    path: &Path,
) -> Result<Vec<f64>, hound::Error> {
    let trace = render_trace(model, len);
    let mut deviation = relative_deviation(&trace, model.drifted_resistance());
    normalize_peak(&mut deviation, 0.9);
    let sample_rate = model.sample_rate().round() as u32;
    write_wav(&deviation, path, sample_rate)?;
    log::info!(
        "wrote {} samples of {} Ω {} deviation to {}",
        len,
        model.nominal_resistance(),
        model.material(),
        path.display()
    );
    Ok(trace)
}

/// Read a mono WAV (float or integer PCM) into f64 samples on [-1, 1].
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f64>, u32), hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec.sample_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;
    use crate::noise::SilentNoise;

    #[test]
    fn trace_length_and_counter() {
        let mut r = ResistorModel::new(10_000.0, MaterialKind::Carbon, 48_000.0, 25.0, Some(1)).unwrap();
        let trace = render_trace(&mut r, 480);
        assert_eq!(trace.len(), 480);
        assert_eq!(r.samples_evaluated(), 480);
    }

    #[test]
    fn silent_deviation_is_zero() {
        let mut r = ResistorModel::with_noise(1_000.0, MaterialKind::Metal, 48_000.0, 0.0, SilentNoise).unwrap();
        let trace = render_trace(&mut r, 16);
        let dev = relative_deviation(&trace, r.drifted_resistance());
        assert!(dev.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn normalize_hits_peak() {
        let mut buf = vec![0.1, -0.4, 0.2];
        normalize_peak(&mut buf, 0.8);
        assert!((buf[1] + 0.8).abs() < 1e-12);

        let mut silent = vec![0.0; 4];
        normalize_peak(&mut silent, 0.8);
        assert_eq!(silent, vec![0.0; 4]);
    }

    #[test]
    fn deviation_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r1.wav");
        let mut r = ResistorModel::new(100_000.0, MaterialKind::Carbon, 48_000.0, 25.0, Some(9)).unwrap();
        let trace = render_deviation_wav(&mut r, 4_800, &path).unwrap();
        assert_eq!(trace.len(), 4_800);

        let (samples, rate) = read_wav_mono(&path).unwrap();
        assert_eq!(rate, 48_000);
        assert_eq!(samples.len(), 4_800);
        let peak = samples.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
        assert!((peak - 0.9).abs() < 1e-6, "peak {peak}");
    }
}
