//! A named set of independent resistors ticked together.
//!
//! Each member owns its model and noise state outright. Members are seeded
//! from one group seed so a whole bank reproduces from a single number, yet
//! no two members share a stream.

use std::sync::Arc;

use crate::config::{BankConfig, ConfigError};
use crate::diagnostics::DiagnosticSink;
use crate::error::ModelError;
use crate::noise::{derive_seed, entropy_seed};
use crate::resistor::ResistorModel;
use crate::ComponentModel;

#[derive(Debug, Default)]
pub struct ResistorBank {
    names: Vec<String>,
    models: Vec<ResistorModel>,
}

impl ResistorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every resistor in `config`.
    ///
    /// Member `i` gets `derive_seed(group_seed, i)` unless its entry sets an
    /// explicit seed. Without a group seed one is drawn from entropy.
    pub fn from_config(config: &BankConfig) -> Result<Self, ConfigError> {
        let group_seed = config.seed.unwrap_or_else(entropy_seed);
        let mut bank = Self::new();
        for (i, entry) in config.resistors.iter().enumerate() {
            let model = entry.build(
                config.sample_rate,
                config.ambient_temperature,
                derive_seed(group_seed, i),
            )?;
            bank.push(entry.name.clone(), model);
        }
        log::info!(
            "built bank of {} resistors at {} Hz, {} °C (group seed {})",
            bank.len(),
            config.sample_rate,
            config.ambient_temperature,
            group_seed
        );
        Ok(bank)
    }

    pub fn push(&mut self, name: impl Into<String>, model: ResistorModel) {
        self.names.push(name.into());
        self.models.push(model);
    }

    /// Evaluate every member once, writing member `i` into `out[i]`.
    #[inline]
    pub fn tick(&mut self, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.models.len());
        for (slot, model) in out.iter_mut().zip(self.models.iter_mut()) {
            *slot = model.evaluate();
        }
    }

    /// Apply one ambient temperature to every member.
    ///
    /// Every member validates the value the same way, so an error from the
    /// first leaves the whole bank unchanged.
    pub fn set_ambient_temperature(&mut self, celsius: f64) -> Result<(), ModelError> {
        for model in &mut self.models {
            model.set_ambient_temperature(celsius)?;
        }
        Ok(())
    }

    /// Attach the same diagnostic sink to every member.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        for model in &mut self.models {
            model.set_diagnostics(Some(Arc::clone(&sink)));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResistorModel> {
        self.position(name).map(|i| &self.models[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ResistorModel> {
        self.position(name).map(move |i| &mut self.models[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResistorModel)> {
        self.names.iter().map(String::as_str).zip(self.models.iter())
    }

    /// Mutable access to every member, for driving them from separate threads.
    pub fn models_mut(&mut self) -> &mut [ResistorModel] {
        &mut self.models
    }

    /// Total clamp events across all members.
    pub fn clamp_count(&self) -> u64 {
        self.models.iter().map(|m| m.clamp_count()).sum()
    }
}

impl ComponentModel for ResistorBank {
    /// Evaluates every member and returns the first member's value (0 when empty).
    fn evaluate(&mut self) -> f64 {
        let mut first = 0.0;
        for (i, model) in self.models.iter_mut().enumerate() {
            let v = model.evaluate();
            if i == 0 {
                first = v;
            }
        }
        first
    }

    fn set_ambient_temperature(&mut self, celsius: f64) -> Result<(), ModelError> {
        ResistorBank::set_ambient_temperature(self, celsius)
    }

    fn reset(&mut self) {
        for model in &mut self.models {
            model.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResistorConfig;
    use crate::material::MaterialKind;

    fn config() -> BankConfig {
        BankConfig {
            seed: Some(42),
            resistors: vec![
                ResistorConfig::new("R1", 4_700.0, MaterialKind::Carbon),
                ResistorConfig::new("R2", 100_000.0, MaterialKind::Metal),
                ResistorConfig::new("R3", 1e6, MaterialKind::Carbon),
            ],
            ..BankConfig::default()
        }
    }

    #[test]
    fn builds_named_members() {
        let bank = ResistorBank::from_config(&config()).unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.names().collect::<Vec<_>>(), vec!["R1", "R2", "R3"]);
        assert_eq!(bank.get("R2").unwrap().material(), MaterialKind::Metal);
        assert!(bank.get("R9").is_none());
    }

    #[test]
    fn members_get_distinct_seeds() {
        let bank = ResistorBank::from_config(&config()).unwrap();
        let seeds: Vec<u64> = bank.iter().map(|(_, m)| m.seed()).collect();
        assert_eq!(seeds[0], derive_seed(42, 0));
        assert_ne!(seeds[0], seeds[1]);
        assert_ne!(seeds[1], seeds[2]);
    }

    #[test]
    fn same_config_same_output() {
        let mut a = ResistorBank::from_config(&config()).unwrap();
        let mut b = ResistorBank::from_config(&config()).unwrap();
        let mut out_a = [0.0; 3];
        let mut out_b = [0.0; 3];
        for _ in 0..1000 {
            a.tick(&mut out_a);
            b.tick(&mut out_b);
            assert_eq!(out_a, out_b);
        }
    }

    #[test]
    fn temperature_applies_to_all() {
        let mut bank = ResistorBank::from_config(&config()).unwrap();
        bank.set_ambient_temperature(60.0).unwrap();
        assert!(bank.iter().all(|(_, m)| m.ambient_temperature() == 60.0));
        assert!(bank.set_ambient_temperature(-500.0).is_err());
        assert!(bank.iter().all(|(_, m)| m.ambient_temperature() == 60.0));
    }

    #[test]
    fn get_mut_reaches_member() {
        let mut bank = ResistorBank::from_config(&config()).unwrap();
        bank.get_mut("R3").unwrap().set_ambient_temperature(90.0).unwrap();
        assert_eq!(bank.get("R3").unwrap().ambient_temperature(), 90.0);
        assert_eq!(bank.get("R1").unwrap().ambient_temperature(), 25.0);
    }

    #[test]
    fn reset_replays_bank() {
        let mut bank = ResistorBank::from_config(&config()).unwrap();
        let mut first = [0.0; 3];
        bank.tick(&mut first);
        ComponentModel::reset(&mut bank);
        let mut again = [0.0; 3];
        bank.tick(&mut again);
        assert_eq!(first, again);
    }

    #[test]
    fn empty_bank() {
        let mut bank = ResistorBank::new();
        assert!(bank.is_empty());
        bank.tick(&mut []);
        assert_eq!(ComponentModel::evaluate(&mut bank), 0.0);
        assert_eq!(bank.clamp_count(), 0);
    }
}
