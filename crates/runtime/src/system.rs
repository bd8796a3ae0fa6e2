use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    host::Host,
};

fn one() -> usize {
    1
}

fn default_migration_threshold() -> f64 {
    0.8
}

fn default_interval() -> f64 {
    1.0
}

/// A group of identical hosts. With `count > 1` hosts are named `{name}1..{name}{count}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostConfig {
    pub name: String,
    #[serde(default = "one")]
    pub count: usize,
    pub total_cpu: u32,
    pub total_ram: f64,
    pub base_power: f64,
    pub max_power: f64,
}

impl HostConfig {
    pub fn new(name: impl Into<String>, total_cpu: u32, total_ram: f64, base_power: f64, max_power: f64) -> Self {
        Self {
            name: name.into(),
            count: 1,
            total_cpu,
            total_ram,
            base_power,
            max_power,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidHost {
            host: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.count == 0 {
            return Err(invalid("count must be at least 1"));
        }
        if !(self.total_ram.is_finite() && self.total_ram >= 0.0) {
            return Err(invalid("total_ram must be a non-negative number"));
        }
        if !(self.base_power.is_finite() && self.base_power >= 0.0) {
            return Err(invalid("base_power must be a non-negative number"));
        }
        if !(self.max_power.is_finite() && self.max_power >= self.base_power) {
            return Err(invalid("max_power must not be less than base_power"));
        }
        if self.total_cpu == 0 {
            warn!("host {} has no cores, nothing will be placed on it", self.name);
        }
        Ok(())
    }

    pub fn host_names(&self) -> Vec<String> {
        if self.count == 1 {
            vec![self.name.clone()]
        } else {
            (1..=self.count).map(|i| format!("{}{}", self.name, i)).collect()
        }
    }

    pub fn build(&self) -> Result<Vec<Host>> {
        self.validate()?;
        Ok(self
            .host_names()
            .into_iter()
            .map(|name| Host::new(name, self.total_cpu, self.total_ram, self.base_power, self.max_power))
            .collect())
    }
}

/// Build empty hosts from configs, in order, rejecting duplicate names.
pub fn build_hosts(configs: &[HostConfig]) -> Result<Vec<Host>> {
    let mut hosts = Vec::new();
    let mut seen = HashSet::new();
    for config in configs.iter() {
        for host in config.build()? {
            if !seen.insert(host.id.clone()) {
                return Err(Error::DuplicateHost(host.id));
            }
            hosts.push(host);
        }
    }
    Ok(hosts)
}

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Utilization above which a host is overloaded. Half of it is the underloaded cutoff.
    #[serde(default = "default_migration_threshold")]
    pub migration_threshold: f64,
    /// Total simulated time.
    pub duration: f64,
    /// Length of one tick.
    #[serde(default = "default_interval")]
    pub interval: f64,
}

impl SimulationConfig {
    pub fn new(duration: f64) -> Self {
        Self {
            migration_threshold: default_migration_threshold(),
            duration,
            interval: default_interval(),
        }
    }

    pub fn with_migration_threshold(mut self, migration_threshold: f64) -> Self {
        self.migration_threshold = migration_threshold;
        self
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.migration_threshold > 0.0 && self.migration_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "migration_threshold must be in (0, 1], got {}",
                self.migration_threshold
            )));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "interval must be positive, got {}",
                self.interval
            )));
        }
        Ok(())
    }
}

/// Hosts plus run parameters, as described in a system file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemConfig {
    pub hosts: Vec<HostConfig>,
    pub simulation: SimulationConfig,
}

impl SystemConfig {
    pub fn hosts(&self) -> Result<Vec<Host>> {
        build_hosts(&self.hosts)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.hosts().map(|_| ())
    }
}

impl From<&Host> for HostConfig {
    fn from(host: &Host) -> Self {
        HostConfig::new(
            host.id.clone(),
            host.total_cpu,
            host.total_ram,
            host.power_model().base_power(),
            host.power_model().max_power(),
        )
    }
}
