//! Host power consumption model.

use serde::{Deserialize, Serialize};

/// The linear power model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearPowerModel {
    base_power: f64,
    max_power: f64,
}

impl LinearPowerModel {
    /// Creates linear power model with specified parameters.
    ///
    /// * `base_power` - The power consumption when idle (0% utilization).
    /// * `max_power` - The power consumption at 100% utilization.
    pub fn new(base_power: f64, max_power: f64) -> Self {
        Self { base_power, max_power }
    }

    pub fn base_power(&self) -> f64 {
        self.base_power
    }

    pub fn max_power(&self) -> f64 {
        self.max_power
    }

    /// Instantaneous power draw at the given CPU utilization.
    pub fn power(&self, utilization: f64) -> f64 {
        self.base_power + (self.max_power - self.base_power) * utilization
    }
}
