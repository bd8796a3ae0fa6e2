//! Point-in-time statistics of a simulation run.

use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};

/// Point-in-time statistics of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Elapsed simulated time.
    pub simulation_time: f64,
    /// Number of completed ticks.
    pub ticks: u64,
    /// Total number of successful migrations.
    pub total_migrations: usize,
    /// Energy accumulated so far, in Watts times time units.
    pub total_energy: f64,
    /// `total_energy / simulation_time`, or `0` before the first tick.
    pub average_power: f64,
    /// Current CPU utilization of every host by host id.
    pub host_utilizations: BTreeMap<String, f64>,
    /// Number of workloads currently assigned to any host.
    pub active_vms: usize,
    /// Number of workloads stuck on an overloaded host because they reached the migration cap.
    pub capped_vms: usize,
}

impl Statistics {
    pub fn average_utilization(&self) -> f64 {
        if self.host_utilizations.is_empty() {
            0.0
        } else {
            self.host_utilizations.values().sum::<f64>() / self.host_utilizations.len() as f64
        }
    }
}

/// Shared read access to the statistics a simulation publishes at each tick boundary.
#[derive(Clone, Debug, Default)]
pub struct StatisticsHandle {
    inner: Arc<RwLock<Statistics>>,
}

impl StatisticsHandle {
    pub fn new(stats: Statistics) -> Self {
        Self {
            inner: Arc::new(RwLock::new(stats)),
        }
    }

    /// A value copy of the last published statistics.
    pub fn snapshot(&self) -> Statistics {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn publish(&self, stats: Statistics) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = stats;
    }
}
