use std::collections::HashSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    host::Host,
    placement_strategies::{best_fit_decreasing, min_utilization, random},
    workload::{Workload, WorkloadId},
};

fn default_seed() -> u64 {
    123
}

/// Initial placement policy. Every variant assigns each workload to at most one host with enough
/// residual CPU and RAM and reports the rest as unplaced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlacementStrategy {
    /// Largest CPU demand first, into the host left with the least spare CPU.
    BestFitDecreasing,
    /// Shuffled workloads onto uniformly chosen fitting hosts.
    Random {
        #[serde(default = "default_seed")]
        seed: u64,
    },
    /// Workloads in given order onto the least utilized fitting host.
    MinimumUtilization,
}

impl PlacementStrategy {
    pub fn random() -> Self {
        Self::Random { seed: default_seed() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BestFitDecreasing => "BestFitDecreasing",
            Self::Random { .. } => "Random",
            Self::MinimumUtilization => "MinimumUtilization",
        }
    }

    /// Assign workloads to hosts, returning ids of workloads that fit nowhere.
    ///
    /// A workload whose id repeats an earlier one, or one already on a host, is never placed and is
    /// reported as unplaced.
    pub fn place_all(&self, workloads: Vec<Workload>, hosts: &mut [Host]) -> Vec<WorkloadId> {
        let total = workloads.len();
        let mut seen = hosts
            .iter()
            .flat_map(|host| host.vms().iter().map(|vm| vm.id))
            .collect::<HashSet<_>>();
        let (workloads, duplicates): (Vec<_>, Vec<_>) = workloads.into_iter().partition(|vm| seen.insert(vm.id));
        let mut unplaced = Vec::new();
        for vm in duplicates.iter() {
            warn!("workload {} is listed more than once, skipping the copy", vm.id);
            unplaced.push(vm.id);
        }
        unplaced.extend(match self {
            Self::BestFitDecreasing => best_fit_decreasing::place(workloads, hosts),
            Self::Random { seed } => random::place(*seed, workloads, hosts),
            Self::MinimumUtilization => min_utilization::place(workloads, hosts),
        });
        debug!(
            "{}: placed {} of {} workloads on {} hosts",
            self.name(),
            total - unplaced.len(),
            total,
            hosts.len()
        );
        unplaced
    }
}

/// Assign `workloads` to `hosts` with `strategy`, returning ids of unplaced workloads.
pub fn place(workloads: Vec<Workload>, hosts: &mut [Host], strategy: &PlacementStrategy) -> Vec<WorkloadId> {
    strategy.place_all(workloads, hosts)
}

/// Hand `vm` to the host at `target` or record it as unplaced.
pub(crate) fn assign_or_report(vm: Workload, target: Option<usize>, hosts: &mut [Host], unplaced: &mut Vec<WorkloadId>) {
    let Some(idx) = target else {
        warn!("workload {} could not be allocated", vm.id);
        unplaced.push(vm.id);
        return;
    };
    if let Err(vm) = hosts[idx].try_assign(vm) {
        warn!("workload {} does not fit chosen host {}", vm.id, hosts[idx].id);
        unplaced.push(vm.id);
    }
}
