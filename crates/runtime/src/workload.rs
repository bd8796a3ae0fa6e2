//! Workloads (VMs) placed onto hosts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type WorkloadId = u64;

/// Extra information a metrics source may attach to a workload.
///
/// Never used by placement or energy accounting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadMetadata {
    /// CPU utilization observed by the source, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_cpu_utilization: Option<f64>,
    /// Where the workload record came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A unit of CPU and RAM demand with an optional finite lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub id: WorkloadId,
    /// CPU demand in cores.
    pub cpu: f64,
    /// RAM demand in GB.
    pub ram: f64,
    /// Lifetime in time units, `None` for unbounded.
    pub duration: Option<f64>,
    /// Logical time the workload was created at.
    pub created_at: f64,
    /// Number of successful relocations.
    pub migration_count: u32,
    pub metadata: Option<WorkloadMetadata>,
}

impl Workload {
    pub fn new(id: WorkloadId, cpu: f64, ram: f64, duration: Option<f64>) -> Self {
        Self {
            id,
            cpu,
            ram,
            duration,
            created_at: 0.0,
            migration_count: 0,
            metadata: None,
        }
    }

    pub fn with_created_at(mut self, created_at: f64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_metadata(mut self, metadata: WorkloadMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.created_at
    }

    /// Workloads without a duration never expire.
    pub fn is_expired(&self, now: f64) -> bool {
        match self.duration {
            Some(duration) => self.elapsed(now) >= duration,
            None => false,
        }
    }

    pub fn remaining_time(&self, now: f64) -> f64 {
        match self.duration {
            Some(duration) => (duration - self.elapsed(now)).max(0.0),
            None => f64::INFINITY,
        }
    }
}

/// Workload record as supplied by an external generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub id: WorkloadId,
    pub cpu: f64,
    pub ram: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<WorkloadMetadata>,
}

impl WorkloadSpec {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidWorkload {
            id: self.id,
            reason: reason.to_string(),
        };
        if !(self.cpu.is_finite() && self.cpu > 0.0) {
            return Err(invalid("cpu demand must be positive"));
        }
        if !(self.ram.is_finite() && self.ram > 0.0) {
            return Err(invalid("ram demand must be positive"));
        }
        if let Some(duration) = self.duration {
            if duration.is_nan() || duration <= 0.0 {
                return Err(invalid("duration must be positive"));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Workload> {
        self.validate()?;
        Ok(Workload {
            id: self.id,
            cpu: self.cpu,
            ram: self.ram,
            duration: self.duration,
            created_at: self.created_at,
            migration_count: 0,
            metadata: self.metadata.clone(),
        })
    }
}

impl From<&Workload> for WorkloadSpec {
    fn from(workload: &Workload) -> Self {
        Self {
            id: workload.id,
            cpu: workload.cpu,
            ram: workload.ram,
            duration: workload.duration,
            created_at: workload.created_at,
            metadata: workload.metadata.clone(),
        }
    }
}

/// Validate and build workloads from generator records, rejecting repeated ids.
pub fn build_workloads(specs: &[WorkloadSpec]) -> Result<Vec<Workload>> {
    let mut seen = HashSet::new();
    specs
        .iter()
        .map(|spec| {
            if !seen.insert(spec.id) {
                return Err(Error::InvalidWorkload {
                    id: spec.id,
                    reason: "id is used more than once".to_string(),
                });
            }
            spec.build()
        })
        .collect()
}
