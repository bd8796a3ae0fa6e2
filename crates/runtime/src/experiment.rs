//! Side-by-side comparison of placement strategies and simulation configs.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Instant,
};

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;

use crate::{
    clock::StopSignal,
    error::{Error, Result},
    placement_strategy::PlacementStrategy,
    run_stats::Statistics,
    simulation::Simulation,
    system::{build_hosts, HostConfig, SimulationConfig},
    workload::{build_workloads, WorkloadId, WorkloadSpec},
};

struct Run {
    strategy: (String, PlacementStrategy),
    config: (String, SimulationConfig),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy: String,
    pub config: String,
    pub unplaced: Vec<WorkloadId>,
    pub stats: Statistics,
}

pub struct Experiment {
    hosts: Arc<Vec<HostConfig>>,
    workloads: Arc<Vec<WorkloadSpec>>,
    strategies: Vec<(String, PlacementStrategy)>,
    configs: Vec<(String, SimulationConfig)>,
    traces_folder: Option<PathBuf>,
    stop: StopSignal,
}

impl Experiment {
    pub fn new(
        hosts: Vec<HostConfig>,
        workloads: Vec<WorkloadSpec>,
        strategies: Vec<(String, PlacementStrategy)>,
        configs: Vec<(String, SimulationConfig)>,
    ) -> Self {
        Self {
            hosts: Arc::new(hosts),
            workloads: Arc::new(workloads),
            strategies,
            configs,
            traces_folder: None,
            stop: StopSignal::new(),
        }
    }

    /// Write a JSON trace of every run into `folder`.
    pub fn with_traces_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.traces_folder = Some(folder.into());
        self
    }

    /// Signal that stops every run of this experiment at its next tick boundary.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    fn validate(&self) -> Result<()> {
        build_hosts(&self.hosts)?;
        build_workloads(&self.workloads)?;
        for (_name, config) in self.configs.iter() {
            config.validate()?;
        }
        Ok(())
    }

    /// Run every strategy with every config, each on its own copy of hosts and workloads.
    pub fn run(self, threads: usize) -> Result<Vec<RunResult>> {
        self.validate()?;
        if let Some(dir) = &self.traces_folder {
            std::fs::create_dir_all(dir).map_err(|source| Error::Io {
                path: dir.clone(),
                source,
            })?;
        }

        let runs = self
            .strategies
            .into_iter()
            .cartesian_product(self.configs)
            .map(|(strategy, config)| Run { strategy, config })
            .collect::<Vec<_>>();

        let total_runs = runs.len();

        let finished_run_atomic = Arc::new(AtomicUsize::new(0));
        let results = Arc::new(Mutex::new(Vec::new()));

        let pool = ThreadPool::new(threads.max(1));
        let start_time = Instant::now();
        for run in runs.into_iter() {
            let finished_run_atomic = finished_run_atomic.clone();
            let results = results.clone();
            let hosts = self.hosts.clone();
            let workloads = self.workloads.clone();
            let stop = self.stop.clone();
            let trace_path = self
                .traces_folder
                .as_ref()
                .map(|folder| folder.join(trace_file_name(&run.strategy.0, &run.config.0)));
            pool.execute(move || {
                let result = execute_run(&hosts, &workloads, run, stop, trace_path.as_deref());
                results.lock().unwrap_or_else(PoisonError::into_inner).push(result);

                let finished_runs = finished_run_atomic.fetch_add(1, Ordering::SeqCst) + 1;
                info!(
                    "finished {}/{} runs in {:.2?}",
                    finished_runs,
                    total_runs,
                    start_time.elapsed()
                );
            });
        }

        pool.join();
        info!("finished {} runs in {:.2?}", total_runs, start_time.elapsed());

        let results = std::mem::take(&mut *results.lock().unwrap_or_else(PoisonError::into_inner));
        let mut results = results.into_iter().collect::<Result<Vec<_>>>()?;
        results.sort_by_cached_key(|run| (run.strategy.clone(), run.config.clone()));
        Ok(results)
    }
}

fn execute_run(
    hosts: &[HostConfig],
    workloads: &[WorkloadSpec],
    run: Run,
    stop: StopSignal,
    trace_path: Option<&Path>,
) -> Result<RunResult> {
    let (strategy_name, strategy) = run.strategy;
    let (config_name, config) = run.config;

    let mut hosts = build_hosts(hosts)?;
    let unplaced = strategy.place_all(build_workloads(workloads)?, &mut hosts);

    let mut sim = Simulation::new(hosts, config)?.with_stop_signal(stop);
    if trace_path.is_some() {
        sim = sim.with_trace();
    }
    let stats = sim.run();
    if let (Some(path), Some(trace)) = (trace_path, sim.trace()) {
        trace.save(path)?;
    }

    Ok(RunResult {
        strategy: strategy_name,
        config: config_name,
        unplaced,
        stats,
    })
}

/// `{strategy}_{config}.json` with every character outside `[A-Za-z0-9._-]` replaced by `_`, so the file
/// always lands directly in the traces folder.
fn trace_file_name(strategy: &str, config: &str) -> String {
    let sanitize = |name: &str| {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect::<String>()
    };
    format!("{}_{}.json", sanitize(strategy), sanitize(config))
}

/// The run that consumed the least energy.
pub fn best_by_energy(results: &[RunResult]) -> Option<&RunResult> {
    results
        .iter()
        .min_by(|a, b| a.stats.total_energy.total_cmp(&b.stats.total_energy))
}
