//! Engine configuration resources.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Weights of the dispatch cost terms shared by the heuristic and global policies.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Per minute of travel.
    pub w_travel: f64,
    /// Per minute past the order deadline.
    pub w_late: f64,
    /// Per minute of estimated station queue wait.
    pub w_queue: f64,
    /// Per minute a bike spends out of service (travel + queue) to charge.
    pub w_downtime: f64,
    /// Multiplier of the battery risk penalty.
    pub w_battery_risk: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            w_travel: 1.0,
            w_late: 10.0,
            w_queue: 2.0,
            w_downtime: 2.0,
            w_battery_risk: 10.0,
        }
    }
}

impl CostWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("w_travel", self.w_travel),
            ("w_late", self.w_late),
            ("w_queue", self.w_queue),
            ("w_downtime", self.w_downtime),
            ("w_battery_risk", self.w_battery_risk),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::new(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Physical and feasibility constants of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SOC a charging session aims for when no policy target is set.
    pub default_charge_target_soc: f64,
    /// SOC buffer added on top of the energy an order round-trip needs.
    pub safety_margin_soc: f64,
    /// SOC below which the battery risk penalty kicks in.
    pub battery_critical_soc: f64,
    /// Charge minutes assumed per queued bike when ranking stations.
    pub queue_chunk_min: f64,
    /// Record a trace frame after every tick.
    pub record_trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_charge_target_soc: 0.80,
            safety_margin_soc: 0.05,
            battery_critical_soc: 0.15,
            queue_chunk_min: 10.0,
            record_trace: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fractions = [
            ("default_charge_target_soc", self.default_charge_target_soc),
            ("safety_margin_soc", self.safety_margin_soc),
            ("battery_critical_soc", self.battery_critical_soc),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::new(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if !self.queue_chunk_min.is_finite() || self.queue_chunk_min < 0.0 {
            return Err(ValidationError::new(format!(
                "queue_chunk_min must be a finite non-negative number, got {}",
                self.queue_chunk_min
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CostWeights::default().validate().is_ok());
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_negative_weight() {
        let weights = CostWeights {
            w_late: -1.0,
            ..CostWeights::default()
        };
        let err = weights.validate().expect_err("negative weight");
        assert!(err.message().contains("w_late"));
    }

    #[test]
    fn rejects_margin_outside_unit_interval() {
        let config = EngineConfig {
            safety_margin_soc: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
        let nan = EngineConfig {
            battery_critical_soc: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(nan.validate().is_err());
    }
}
