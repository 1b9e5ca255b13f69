//! Experiment configuration: which presets, policies and seeds to run.

use std::fs;
use std::path::Path;

use fleet_core::config::CostWeights;
use fleet_core::policy::PolicyKind;
use fleet_core::scenario::{ScenarioPreset, DEFAULT_DURATION_MIN, DEFAULT_SEED};
use serde::{Deserialize, Serialize};

use crate::runner::RunSpec;

/// A grid of runs: every preset × policy × seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub experiment_id: String,
    pub presets: Vec<ScenarioPreset>,
    pub policies: Vec<PolicyKind>,
    pub seeds: Vec<u64>,
    pub duration_min: u64,
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
    pub weights: CostWeights,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_id: "policy-comparison".to_string(),
            presets: ScenarioPreset::ALL.to_vec(),
            policies: PolicyKind::ALL.to_vec(),
            seeds: vec![DEFAULT_SEED],
            duration_min: DEFAULT_DURATION_MIN,
            threads: None,
            weights: CostWeights::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn with_experiment_id(mut self, id: impl Into<String>) -> Self {
        self.experiment_id = id.into();
        self
    }

    pub fn with_presets(mut self, presets: Vec<ScenarioPreset>) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_policies(mut self, policies: Vec<PolicyKind>) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_duration_min(mut self, duration_min: u64) -> Self {
        self.duration_min = duration_min;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.presets.is_empty() || self.policies.is_empty() || self.seeds.is_empty() {
            return Err("experiment needs at least one preset, policy and seed".to_string());
        }
        if self.threads == Some(0) {
            return Err("threads must be at least 1".to_string());
        }
        self.weights.validate().map_err(|e| e.to_string())
    }

    /// Expand the grid, preset-major then seed then policy, numbering runs from 0.
    pub fn specs(&self) -> Vec<RunSpec> {
        let mut specs = Vec::with_capacity(self.presets.len() * self.policies.len() * self.seeds.len());
        for &preset in &self.presets {
            for &seed in &self.seeds {
                for &policy in &self.policies {
                    specs.push(RunSpec {
                        experiment_id: self.experiment_id.clone(),
                        run_id: specs.len(),
                        preset,
                        policy,
                        seed,
                        duration_min: self.duration_min,
                        weights: self.weights,
                    });
                }
            }
        }
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_covers_every_pair() {
        let specs = ExperimentConfig::default().with_seeds(vec![1, 2]).specs();
        assert_eq!(specs.len(), 3 * 3 * 2);
        assert_eq!(specs[0].preset, ScenarioPreset::Low);
        assert_eq!(specs[0].policy, PolicyKind::Baseline);
        assert_eq!(specs[2].policy, PolicyKind::Global);
        assert_eq!(specs[3].seed, 2);
        assert!(specs.iter().enumerate().all(|(i, s)| s.run_id == i));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = ExperimentConfig::from_json_str(
            r#"{ "presets": ["high"], "policies": ["global"], "seeds": [7, 8] }"#,
        )
        .expect("valid config");
        assert_eq!(config.presets, vec![ScenarioPreset::High]);
        assert_eq!(config.policies, vec![PolicyKind::Global]);
        assert_eq!(config.duration_min, DEFAULT_DURATION_MIN);
        assert_eq!(config.threads, None);
        assert_eq!(config.specs().len(), 2);
    }

    #[test]
    fn rejects_empty_grid_and_zero_threads() {
        assert!(ExperimentConfig::default().with_seeds(vec![]).validate().is_err());
        assert!(ExperimentConfig::default().with_threads(0).validate().is_err());
        assert!(ExperimentConfig::from_json_str(r#"{ "policies": [] }"#).is_err());
        assert!(ExperimentConfig::from_json_str(r#"{ "policies": ["random"] }"#).is_err());
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("experiment.json");
        fs::write(&path, r#"{ "experiment_id": "smoke", "duration_min": 30 }"#).expect("write");
        let config = ExperimentConfig::from_json_file(&path).expect("valid config");
        assert_eq!(config.experiment_id, "smoke");
        assert_eq!(config.duration_min, 30);
    }
}
