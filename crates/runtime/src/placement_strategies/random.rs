use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::{
    host::Host,
    placement_strategy::assign_or_report,
    workload::{Workload, WorkloadId},
};

use super::common::{fitting_hosts, shuffle};

/// Shuffle the workloads, then put each one on a fitting host chosen uniformly at random.
pub fn place(seed: u64, mut workloads: Vec<Workload>, hosts: &mut [Host]) -> Vec<WorkloadId> {
    let mut rng = Pcg64::seed_from_u64(seed);
    shuffle(&mut rng, &mut workloads);
    let mut unplaced = Vec::new();
    for vm in workloads.into_iter() {
        let candidates = fitting_hosts(&vm, hosts).collect::<Vec<_>>();
        let target = if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        };
        assign_or_report(vm, target, hosts, &mut unplaced);
    }
    unplaced
}
