use crate::{
    host::Host,
    placement_strategy::assign_or_report,
    workload::{Workload, WorkloadId},
};

use super::common::first_min_by_key;

/// Keep the given order and put each workload on the least utilized fitting host.
pub fn place(workloads: Vec<Workload>, hosts: &mut [Host]) -> Vec<WorkloadId> {
    let mut unplaced = Vec::new();
    for vm in workloads.into_iter() {
        let target = first_min_by_key(&vm, hosts, Host::utilization);
        assign_or_report(vm, target, hosts, &mut unplaced);
    }
    unplaced
}
