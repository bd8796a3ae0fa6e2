use rand::Rng;
use rand_pcg::Pcg64;

use crate::{host::Host, workload::Workload};

/// Indices of hosts with enough residual CPU and RAM for `vm`, in host order.
pub fn fitting_hosts<'a>(vm: &'a Workload, hosts: &'a [Host]) -> impl Iterator<Item = usize> + 'a {
    hosts
        .iter()
        .enumerate()
        .filter(|(_, host)| host.can_fit(vm))
        .map(|(idx, _)| idx)
}

/// Index of the fitting host with the smallest `key`; the first one wins ties.
pub fn first_min_by_key(vm: &Workload, hosts: &[Host], key: impl Fn(&Host) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for idx in fitting_hosts(vm, hosts) {
        let score = key(&hosts[idx]);
        match best {
            Some((_, best_score)) if best_score <= score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

pub fn shuffle<T>(rng: &mut Pcg64, data: &mut [T]) {
    for i in 1..data.len() {
        data.swap(i, rng.gen_range(0..=i));
    }
}
