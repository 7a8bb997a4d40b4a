//! Integration tests for resistor banks built from YAML.

mod analysis;

use std::sync::Arc;

use analysis::*;
use ohmkernel::{BankConfig, ClampLog, ConfigError, MaterialKind, ResistorBank};

const BANK_YAML: &str = r#"
sample_rate: 48000
ambient_temperature: 25.0
seed: 1977
resistors:
  - name: R_in
    resistance: 1M
    material: carbon
  - name: R_gain
    resistance: 4.7k
    material: carbon
  - name: R_tone
    resistance: 10kΩ
    material: metal
  - name: R_out
    resistance: 100
    material: metal
"#;

#[test]
fn bank_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.yaml");
    std::fs::write(&path, BANK_YAML).unwrap();

    let config = BankConfig::load(&path).unwrap();
    let bank = ResistorBank::from_config(&config).unwrap();
    assert_eq!(bank.len(), 4);

    let gain = bank.get("R_gain").unwrap();
    assert!((gain.nominal_resistance() - 4_700.0).abs() < 1e-9);
    assert_eq!(gain.material(), MaterialKind::Carbon);
    assert_eq!(gain.alpha(), -450e-6);

    let tone = bank.get("R_tone").unwrap();
    assert!((tone.nominal_resistance() - 10_000.0).abs() < 1e-9);
    assert_eq!(tone.sample_rate(), SAMPLE_RATE);
}

#[test]
fn bank_is_deterministic_for_a_group_seed() {
    let config = BankConfig::from_yaml(BANK_YAML).unwrap();
    let mut a = ResistorBank::from_config(&config).unwrap();
    let mut b = ResistorBank::from_config(&config).unwrap();
    let mut out_a = vec![0.0; a.len()];
    let mut out_b = vec![0.0; b.len()];
    for _ in 0..10_000 {
        a.tick(&mut out_a);
        b.tick(&mut out_b);
        assert_eq!(out_a, out_b);
    }
}

#[test]
fn members_are_statistically_independent() {
    let mut config = BankConfig::from_yaml(BANK_YAML).unwrap();
    // Two identical parts, so any correlation comes from shared noise.
    config.resistors[3].resistance = 4_700.0.into();
    config.resistors[3].material = "carbon".to_string();
    let mut bank = ResistorBank::from_config(&config).unwrap();

    let n = 50_000;
    let mut out = vec![0.0; bank.len()];
    let (mut x, mut y) = (Vec::with_capacity(n), Vec::with_capacity(n));
    for _ in 0..n {
        bank.tick(&mut out);
        x.push(out[1]);
        y.push(out[3]);
    }
    let (mx, my) = (mean(&x), mean(&y));
    let cov: f64 = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).sum::<f64>() / n as f64;
    let corr = cov / (variance(&x).sqrt() * variance(&y).sqrt());
    assert!(corr.abs() < 0.03, "cross-correlation {corr}");
}

#[test]
fn threads_match_sequential_run() {
    let config = BankConfig::from_yaml(BANK_YAML).unwrap();
    let n = 5_000;

    let mut sequential = ResistorBank::from_config(&config).unwrap();
    let mut expected = vec![Vec::with_capacity(n); sequential.len()];
    let mut out = vec![0.0; sequential.len()];
    for _ in 0..n {
        sequential.tick(&mut out);
        for (trace, &v) in expected.iter_mut().zip(&out) {
            trace.push(v);
        }
    }

    let mut parallel = ResistorBank::from_config(&config).unwrap();
    let traces: Vec<Vec<f64>> = std::thread::scope(|s| {
        let handles: Vec<_> = parallel
            .models_mut()
            .iter_mut()
            .map(|model| s.spawn(move || (0..n).map(|_| model.evaluate()).collect::<Vec<f64>>()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(traces, expected);
}

#[test]
fn bank_wide_temperature_and_diagnostics() {
    let config = BankConfig::from_yaml(BANK_YAML).unwrap();
    let log = Arc::new(ClampLog::new(16));
    let mut bank = ResistorBank::from_config(&config).unwrap().with_diagnostics(log.clone());

    let mut cold = vec![0.0; bank.len()];
    bank.tick(&mut cold);
    let cold_rt: Vec<f64> = bank.iter().map(|(_, m)| m.drifted_resistance()).collect();

    bank.set_ambient_temperature(85.0).unwrap();
    let hot_rt: Vec<f64> = bank.iter().map(|(_, m)| m.drifted_resistance()).collect();
    for (c, h) in cold_rt.iter().zip(&hot_rt) {
        assert!(h < c);
    }

    let mut out = vec![0.0; bank.len()];
    for _ in 0..10_000 {
        bank.tick(&mut out);
    }
    assert_eq!(bank.clamp_count(), 0);
    assert_eq!(log.total(), 0);
}

#[test]
fn config_errors_name_the_resistor() {
    let src = BANK_YAML.replace("resistance: 100\n", "resistance: -100\n");
    let config = BankConfig::from_yaml(&src).unwrap();
    let err = ResistorBank::from_config(&config).unwrap_err();
    match err {
        ConfigError::Model { name, .. } => assert_eq!(name, "R_out"),
        other => panic!("unexpected error: {other}"),
    }
}
