//! Monte Carlo driver
//!
//! Repeats the run engine with one configuration and independent seeds,
//! then aggregates the finished runs. Run `i` always uses seed
//! `base_seed + i`, so an experiment is reproducible regardless of how many
//! worker threads execute it.

mod histogram;
mod stats;

pub use histogram::*;
pub use stats::*;

use crate::config::{Goal, SimulationConfig};
use crate::rng::{run_seed, seeded_rng};
use crate::simulation::{RunResult, RunStatus, Simulation, SimulationError};
use log::{debug, info, warn};
use serde::Serialize;
use std::thread;

/// Per-run figures kept after a run finishes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub index: usize,
    pub seed: u64,
    pub total_time_seconds: f64,
    pub adjustments: usize,
    pub increase_count: u64,
    pub decrease_count: u64,
    pub final_difficulty: f64,
}

impl RunSummary {
    fn new(index: usize, seed: u64, result: &RunResult) -> Self {
        Self {
            index,
            seed,
            total_time_seconds: result.total_time_seconds(),
            adjustments: result.adjustments(),
            increase_count: result.increase_count(),
            decrease_count: result.decrease_count(),
            final_difficulty: result.final_difficulty(),
        }
    }

    pub fn total_time_hours(&self) -> f64 {
        self.total_time_seconds / crate::constants::SECONDS_PER_HOUR
    }
}

/// Outcome of a Monte Carlo experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    pub goal: Goal,
    pub runs: Vec<RunSummary>,
    /// Block times of every run, in run order
    pub block_times: Vec<f64>,
}

impl Experiment {
    /// Completion time of each run in hours
    pub fn final_times_hours(&self) -> Vec<f64> {
        self.runs.iter().map(RunSummary::total_time_hours).collect()
    }

    /// Statistics of completion time (hours) across runs
    pub fn completion_stats(&self) -> Option<Summary> {
        Summary::from_samples(&self.final_times_hours())
    }

    /// Statistics of individual block times (seconds) pooled across runs
    pub fn block_time_stats(&self) -> Option<Summary> {
        Summary::from_samples(&self.block_times)
    }

    /// Completion time for difficulty goals, block time for fixed iterations
    pub fn headline_stats(&self) -> Option<Summary> {
        if self.goal.is_difficulty_target() {
            self.completion_stats()
        } else {
            self.block_time_stats()
        }
    }
}

/// Repeated-run experiment over one configuration
#[derive(Debug, Clone)]
pub struct MonteCarlo {
    config: SimulationConfig,
    runs: usize,
    base_seed: u64,
    max_steps: Option<u64>,
    workers: usize,
}

impl MonteCarlo {
    pub fn new(config: SimulationConfig, runs: usize) -> Self {
        Self {
            config,
            runs,
            base_seed: 0,
            max_steps: None,
            workers: 1,
        }
    }

    pub fn with_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Abort the experiment when a run needs more than `max_steps` steps
    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Execute all runs and aggregate them
    pub fn run(&self) -> Result<Experiment, SimulationError> {
        let workers = self.workers.min(self.runs).max(1);
        info!(
            "running {} simulations ({}, {} sampler) on {} worker(s), base seed {}",
            self.runs,
            self.config.goal().alg(),
            self.config.sampler_kind(),
            workers,
            self.base_seed
        );

        let results = if workers == 1 {
            self.run_range(0..self.runs)?
        } else {
            self.run_parallel(workers)?
        };

        let mut runs = Vec::with_capacity(results.len());
        let mut block_times = Vec::new();
        for (index, result) in results.iter().enumerate() {
            runs.push(RunSummary::new(index, self.seed_of(index), result));
            block_times.extend(result.block_times());
        }

        info!("finished {} simulations", runs.len());
        Ok(Experiment {
            goal: self.config.goal(),
            runs,
            block_times,
        })
    }

    /// Execute run `index` on its own seeded generator
    pub fn run_one(&self, index: usize) -> Result<RunResult, SimulationError> {
        let mut rng = seeded_rng(self.seed_of(index));
        let mut simulation = Simulation::new(&self.config, &mut rng);

        if let Some(max_steps) = self.max_steps {
            while simulation.status() == RunStatus::Running {
                if simulation.steps_taken() as u64 >= max_steps {
                    warn!(
                        "run {} still at difficulty {} after {} steps, aborting",
                        index,
                        simulation.difficulty(),
                        max_steps
                    );
                    return Err(SimulationError::SafetyBoundExceeded { max_steps });
                }
                simulation.advance()?;
            }
        }

        let result = simulation.run()?;
        debug!(
            "run {} finished: {:.2} hours, {} adjustments (+{} / -{})",
            index,
            result.total_time_hours(),
            result.adjustments(),
            result.increase_count(),
            result.decrease_count()
        );
        Ok(result)
    }

    fn seed_of(&self, index: usize) -> u64 {
        run_seed(self.base_seed, index as u64)
    }

    fn run_range(&self, range: std::ops::Range<usize>) -> Result<Vec<RunResult>, SimulationError> {
        range.map(|index| self.run_one(index)).collect()
    }

    fn run_parallel(&self, workers: usize) -> Result<Vec<RunResult>, SimulationError> {
        let chunk = self.runs.div_ceil(workers);

        thread::scope(|scope| -> Result<Vec<RunResult>, SimulationError> {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let start = (worker * chunk).min(self.runs);
                    let end = ((worker + 1) * chunk).min(self.runs);
                    scope.spawn(move || self.run_range(start..end))
                })
                .collect();

            let mut results = Vec::with_capacity(self.runs);
            for handle in handles {
                match handle.join() {
                    Ok(chunk_results) => results.extend(chunk_results?),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok(results)
        })
    }
}
