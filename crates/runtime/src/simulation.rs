//! Time-stepped simulation of placed workloads: expiry, load balancing and energy accounting.

use log::{debug, info, warn};

use crate::{
    clock::{NoDelay, StopSignal, TickDelay},
    error::Result,
    host::{migrate, pair_mut, total_power, Host},
    run_stats::{Statistics, StatisticsHandle},
    system::{HostConfig, SimulationConfig},
    trace::{Trace, TraceEvent},
    workload::WorkloadId,
};

/// A workload is never relocated more often than this.
pub const MAX_MIGRATIONS_PER_VM: u32 = 3;

pub struct Simulation {
    hosts: Vec<Host>,
    config: SimulationConfig,
    ticks: u64,
    // Clock origin for the current interval, moved when the interval changes.
    origin_time: f64,
    origin_ticks: u64,
    total_migrations: usize,
    total_energy: f64,
    stop: StopSignal,
    delay: Box<dyn TickDelay>,
    stats: StatisticsHandle,
    trace: Option<Trace>,
}

impl Simulation {
    /// Create a simulation over already populated hosts.
    pub fn new(hosts: Vec<Host>, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let sim = Simulation {
            hosts,
            config,
            ticks: 0,
            origin_time: 0.0,
            origin_ticks: 0,
            total_migrations: 0,
            total_energy: 0.0,
            stop: StopSignal::new(),
            delay: Box::new(NoDelay),
            stats: StatisticsHandle::default(),
            trace: None,
        };
        sim.stats.publish(sim.statistics());
        Ok(sim)
    }

    pub fn with_delay(mut self, delay: impl TickDelay + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Share a stop signal, e.g. one signal for several runs.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Trace::new(self.hosts.iter().map(HostConfig::from).collect()));
        self
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn into_hosts(self) -> Vec<Host> {
        self.hosts
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn statistics_handle(&self) -> StatisticsHandle {
        self.stats.clone()
    }

    /// Elapsed simulated time.
    pub fn elapsed(&self) -> f64 {
        self.time_at(self.ticks)
    }

    fn time_at(&self, ticks: u64) -> f64 {
        self.origin_time + (ticks - self.origin_ticks) as f64 * self.config.interval
    }

    /// Run until the configured duration elapses or a stop is requested.
    pub fn run(&mut self) -> Statistics {
        info!(
            "starting simulation: {} hosts, {} workloads, duration {}, interval {}",
            self.hosts.len(),
            self.active_vms(),
            self.config.duration,
            self.config.interval
        );
        while self.elapsed() < self.config.duration {
            if self.stop.is_requested() {
                warn!("simulation stopped at time {}", self.elapsed());
                break;
            }
            self.step();
            if self.elapsed() >= self.config.duration {
                break;
            }
            self.delay.wait(self.config.interval, &self.stop);
        }
        let stats = self.statistics();
        info!(
            "simulation finished at time {}: {} migrations, energy {:.2}, {} active workloads",
            stats.simulation_time, stats.total_migrations, stats.total_energy, stats.active_vms
        );
        stats
    }

    /// Run with a new tick interval until the elapsed time reaches `duration`.
    ///
    /// `duration` is the total elapsed time to reach, counted from time zero, not an increment.
    pub fn run_for(&mut self, duration: f64, interval: f64) -> Result<Statistics> {
        let config = SimulationConfig {
            migration_threshold: self.config.migration_threshold,
            duration,
            interval,
        };
        config.validate()?;
        self.origin_time = self.elapsed();
        self.origin_ticks = self.ticks;
        self.config = config;
        Ok(self.run())
    }

    /// Perform one tick: expiry, migration pass, energy accounting, clock advance.
    pub fn step(&mut self) {
        let now = self.time_at(self.ticks + 1);
        self.remove_expired_vms(now);
        self.check_migrations(now);

        let power = total_power(&self.hosts);
        self.total_energy += power * self.config.interval;
        self.ticks += 1;

        let active_vms = self.active_vms();
        debug!("tick {} at time {}: power {:.2}, {} active workloads", self.ticks, now, power, active_vms);
        if let Some(trace) = self.trace.as_mut() {
            trace.log(TraceEvent::TickCompleted {
                time: now,
                power,
                active_vms,
            });
        }
        self.stats.publish(self.statistics());
    }

    fn remove_expired_vms(&mut self, now: f64) {
        for host in self.hosts.iter_mut() {
            for vm in host.remove_expired(now) {
                debug!("workload {} expired on host {} at time {}", vm.id, host.id, now);
                if let Some(trace) = self.trace.as_mut() {
                    trace.log(TraceEvent::WorkloadExpired {
                        time: now,
                        vm_id: vm.id,
                        host: host.id.clone(),
                    });
                }
            }
        }
    }

    /// Move workloads from overloaded hosts to underloaded ones. Both sets are fixed at the start of the pass.
    fn check_migrations(&mut self, now: f64) {
        let threshold = self.config.migration_threshold;
        let overloaded = self.hosts_where(|host| host.utilization() > threshold);
        let underloaded = self.hosts_where(|host| host.utilization() < threshold / 2.0);
        if overloaded.is_empty() || underloaded.is_empty() {
            return;
        }

        for &source in overloaded.iter() {
            let vm_ids = self.hosts[source].vms().iter().map(|vm| vm.id).collect::<Vec<WorkloadId>>();
            for vm_id in vm_ids {
                let Some(vm) = self.hosts[source].workload(vm_id) else {
                    continue;
                };
                if vm.migration_count >= MAX_MIGRATIONS_PER_VM {
                    continue;
                }
                let (cpu, ram) = (vm.cpu, vm.ram);
                let Some(target) = underloaded.iter().copied().find(|&target| {
                    let host = &self.hosts[target];
                    host.available_cpu() >= cpu && host.available_ram() >= ram
                }) else {
                    continue;
                };
                let Some((src, dst)) = pair_mut(&mut self.hosts, source, target) else {
                    continue;
                };
                let Some(moved) = migrate(vm_id, src, dst, now) else {
                    continue;
                };
                moved.migration_count += 1;
                self.total_migrations += 1;
                debug!("migrated workload {} from {} to {} at time {}", vm_id, src.id, dst.id, now);
                if let Some(trace) = self.trace.as_mut() {
                    trace.log(TraceEvent::WorkloadMigrated {
                        time: now,
                        vm_id,
                        from: src.id.clone(),
                        to: dst.id.clone(),
                    });
                }
            }
        }
    }

    fn hosts_where(&self, predicate: impl Fn(&Host) -> bool) -> Vec<usize> {
        self.hosts
            .iter()
            .enumerate()
            .filter(|(_, host)| predicate(host))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn active_vms(&self) -> usize {
        self.hosts.iter().map(|host| host.vms().len()).sum()
    }

    fn capped_vms(&self) -> usize {
        self.hosts
            .iter()
            .filter(|host| host.utilization() > self.config.migration_threshold)
            .flat_map(|host| host.vms())
            .filter(|vm| vm.migration_count >= MAX_MIGRATIONS_PER_VM)
            .count()
    }

    /// A value copy of the current statistics.
    pub fn statistics(&self) -> Statistics {
        let simulation_time = self.elapsed();
        Statistics {
            simulation_time,
            ticks: self.ticks,
            total_migrations: self.total_migrations,
            total_energy: self.total_energy,
            average_power: if simulation_time > 0.0 {
                self.total_energy / simulation_time
            } else {
                0.0
            },
            host_utilizations: self
                .hosts
                .iter()
                .map(|host| (host.id.clone(), host.utilization()))
                .collect(),
            active_vms: self.active_vms(),
            capped_vms: self.capped_vms(),
        }
    }
}
