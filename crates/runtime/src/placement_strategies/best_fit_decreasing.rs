use crate::{
    host::Host,
    placement_strategy::assign_or_report,
    workload::{Workload, WorkloadId},
};

use super::common::first_min_by_key;

/// Sort by CPU demand descending (stable), then put each workload on the host that is left with the least
/// spare CPU.
pub fn place(mut workloads: Vec<Workload>, hosts: &mut [Host]) -> Vec<WorkloadId> {
    workloads.sort_by(|a, b| b.cpu.total_cmp(&a.cpu));
    let mut unplaced = Vec::new();
    for vm in workloads.into_iter() {
        let demand = vm.cpu;
        let target = first_min_by_key(&vm, hosts, |host| host.available_cpu() - demand);
        assign_or_report(vm, target, hosts, &mut unplaced);
    }
    unplaced
}
