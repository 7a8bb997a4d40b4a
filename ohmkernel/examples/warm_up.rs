//! Offline render of a resistor bank warming up inside a pedal enclosure.
//!
//! Usage:
//!   cargo run --example warm_up -- <bank.yaml> <output.wav> [seconds]
//!
//! The bank's first resistor's deviation `R/Rt − 1` is written to the WAV;
//! drift over the run is printed per resistor.

use ohmkernel::wav::{normalize_peak, write_wav};
use ohmkernel::{BankConfig, LogSink, ResistorBank, ThermalEnvelope};
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <bank.yaml> <output.wav> [seconds]", args[0]);
        process::exit(1);
    }

    let config = BankConfig::load(Path::new(&args[1])).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {e}", args[1]);
        process::exit(1);
    });
    let seconds: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(10.0);

    let mut bank = ResistorBank::from_config(&config)
        .unwrap_or_else(|e| {
            eprintln!("Error building bank: {e}");
            process::exit(1);
        })
        .with_diagnostics(Arc::new(LogSink::new("warm_up")));
    if bank.is_empty() {
        eprintln!("Bank has no resistors");
        process::exit(1);
    }

    let cold: Vec<f64> = bank.iter().map(|(_, m)| m.drifted_resistance()).collect();

    // A fast-forwarded warm-up so the drift is visible over a short render.
    let mut envelope = ThermalEnvelope::new(
        config.ambient_temperature,
        config.ambient_temperature + 20.0,
        seconds / 3.0,
        config.sample_rate,
    );

    let len = (seconds * config.sample_rate) as usize;
    let mut out = vec![0.0; bank.len()];
    let mut deviation = Vec::with_capacity(len);
    for _ in 0..len {
        if let Some(t) = envelope.tick() {
            if let Err(e) = bank.set_ambient_temperature(t) {
                eprintln!("Temperature update failed: {e}");
                process::exit(1);
            }
        }
        bank.tick(&mut out);
        let rt = bank.iter().next().map(|(_, m)| m.drifted_resistance()).unwrap_or(1.0);
        deviation.push(out[0] / rt - 1.0);
    }

    normalize_peak(&mut deviation, 0.9);
    if let Err(e) = write_wav(&deviation, Path::new(&args[2]), config.sample_rate as u32) {
        eprintln!("Error writing {}: {e}", args[2]);
        process::exit(1);
    }

    println!("Final temperature: {:.2} °C", envelope.temperature());
    for ((name, model), before) in bank.iter().zip(&cold) {
        let after = model.drifted_resistance();
        println!(
            "  {name:>8}: {before:>12.3} Ω -> {after:>12.3} Ω ({:+.4}%)",
            (after / before - 1.0) * 100.0
        );
    }
    println!("Clamp events: {}", bank.clamp_count());
}
