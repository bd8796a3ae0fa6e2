//! Fixed-capacity hosts and workload migration between them.

use serde::{Deserialize, Serialize};

use crate::{
    power_model::LinearPowerModel,
    workload::{Workload, WorkloadId},
};

/// One relocation of a workload, recorded in both hosts' histories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MigrationEvent {
    pub vm_id: WorkloadId,
    pub source_host: String,
    pub target_host: String,
    pub timestamp: f64,
}

/// A compute node with fixed CPU and RAM capacity.
///
/// The host exclusively owns the workloads assigned to it. The sum of their demands never exceeds
/// `total_cpu` and `total_ram`.
#[derive(Clone, Debug)]
pub struct Host {
    pub id: String,
    pub total_cpu: u32,
    pub total_ram: f64,
    power_model: LinearPowerModel,
    vms: Vec<Workload>,
    migration_history: Vec<MigrationEvent>,
}

impl Host {
    pub fn new(id: impl Into<String>, total_cpu: u32, total_ram: f64, base_power: f64, max_power: f64) -> Self {
        Self {
            id: id.into(),
            total_cpu,
            total_ram,
            power_model: LinearPowerModel::new(base_power, max_power),
            vms: Vec::new(),
            migration_history: Vec::new(),
        }
    }

    pub fn power_model(&self) -> &LinearPowerModel {
        &self.power_model
    }

    pub fn vms(&self) -> &[Workload] {
        &self.vms
    }

    pub fn workload(&self, vm_id: WorkloadId) -> Option<&Workload> {
        self.vms.iter().find(|vm| vm.id == vm_id)
    }

    pub fn workload_mut(&mut self, vm_id: WorkloadId) -> Option<&mut Workload> {
        self.vms.iter_mut().find(|vm| vm.id == vm_id)
    }

    pub fn migration_history(&self) -> &[MigrationEvent] {
        &self.migration_history
    }

    pub fn used_cpu(&self) -> f64 {
        self.vms.iter().map(|vm| vm.cpu).sum()
    }

    pub fn used_ram(&self) -> f64 {
        self.vms.iter().map(|vm| vm.ram).sum()
    }

    pub fn available_cpu(&self) -> f64 {
        self.total_cpu as f64 - self.used_cpu()
    }

    pub fn available_ram(&self) -> f64 {
        self.total_ram - self.used_ram()
    }

    /// Fraction of CPU claimed by assigned workloads, `0` for a host without cores.
    pub fn utilization(&self) -> f64 {
        if self.total_cpu > 0 {
            self.used_cpu() / self.total_cpu as f64
        } else {
            0.0
        }
    }

    pub fn can_fit(&self, vm: &Workload) -> bool {
        self.available_cpu() >= vm.cpu && self.available_ram() >= vm.ram
    }

    /// Assign a workload if residual capacity allows and its id is not taken here, otherwise hand it back.
    pub fn try_assign(&mut self, vm: Workload) -> Result<(), Workload> {
        if self.can_fit(&vm) && self.workload(vm.id).is_none() {
            self.vms.push(vm);
            Ok(())
        } else {
            Err(vm)
        }
    }

    /// Drop every workload whose lifetime has run out at `now`, keeping the order of the rest.
    pub fn remove_expired(&mut self, now: f64) -> Vec<Workload> {
        let (expired, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut self.vms)
            .into_iter()
            .partition(|vm| vm.is_expired(now));
        self.vms = alive;
        expired
    }

    /// Instantaneous power draw at the current utilization.
    pub fn power(&self) -> f64 {
        self.power_model.power(self.utilization())
    }
}

/// Move workload `vm_id` from `source` to `target` and return the moved workload.
///
/// Fails without side effects if the workload is not on `source` or `target` already holds that id.
/// Target capacity is not checked here.
pub fn migrate<'a>(
    vm_id: WorkloadId,
    source: &mut Host,
    target: &'a mut Host,
    timestamp: f64,
) -> Option<&'a mut Workload> {
    if target.workload(vm_id).is_some() {
        return None;
    }
    let pos = source.vms.iter().position(|vm| vm.id == vm_id)?;
    let vm = source.vms.remove(pos);
    let event = MigrationEvent {
        vm_id,
        source_host: source.id.clone(),
        target_host: target.id.clone(),
        timestamp,
    };
    source.migration_history.push(event.clone());
    target.migration_history.push(event);
    target.vms.push(vm);
    target.vms.last_mut()
}

/// Mutable references to two distinct hosts of a slice.
pub fn pair_mut(hosts: &mut [Host], first: usize, second: usize) -> Option<(&mut Host, &mut Host)> {
    if first == second || first >= hosts.len() || second >= hosts.len() {
        return None;
    }
    if first < second {
        let (left, right) = hosts.split_at_mut(second);
        Some((&mut left[first], &mut right[0]))
    } else {
        let (left, right) = hosts.split_at_mut(first);
        Some((&mut right[0], &mut left[second]))
    }
}

/// Total instantaneous power of a set of hosts.
pub fn total_power(hosts: &[Host]) -> f64 {
    hosts.iter().map(Host::power).sum()
}
