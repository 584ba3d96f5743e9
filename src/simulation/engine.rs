//! Run engine
//!
//! One [`Simulation`] owns the state of one run. Each step samples a block
//! time, applies the control law and records the boundary. The goal is
//! checked before every step, so a run whose goal already holds at the
//! start takes no steps at all.

use super::{AdjustmentStep, RunResult, SimulationError};
use crate::config::SimulationConfig;
use crate::constants::SECONDS_PER_HOUR;
use crate::mining::BlockTimeSampler;
use log::trace;
use rand::Rng;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Terminated,
}

/// Direction of one adjustment step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Increase,
    Decrease,
    Unchanged,
}

impl Adjustment {
    /// Classify a step; exact equality counts as neither direction
    pub fn classify(previous: f64, next: f64) -> Self {
        if next > previous {
            Adjustment::Increase
        } else if next < previous {
            Adjustment::Decrease
        } else {
            Adjustment::Unchanged
        }
    }
}

/// Mutable state of an in-progress run
#[derive(Debug, Clone)]
struct RunState {
    difficulty: f64,
    elapsed_hours: f64,
    steps: Vec<AdjustmentStep>,
    increase_count: u64,
    decrease_count: u64,
    total_time_seconds: f64,
}

impl RunState {
    fn new(initial_difficulty: f64) -> Self {
        Self {
            difficulty: initial_difficulty,
            elapsed_hours: 0.0,
            steps: Vec::new(),
            increase_count: 0,
            decrease_count: 0,
            total_time_seconds: 0.0,
        }
    }

    /// Recorded difficulty values including the initial one
    fn trace_points(&self) -> usize {
        self.steps.len() + 1
    }
}

/// Single-run state machine
pub struct Simulation<'a, R: Rng + ?Sized> {
    config: &'a SimulationConfig,
    rng: &'a mut R,
    state: RunState,
    status: RunStatus,
}

impl<'a, R: Rng + ?Sized> Simulation<'a, R> {
    /// Start a run at the configured initial difficulty
    pub fn new(config: &'a SimulationConfig, rng: &'a mut R) -> Self {
        let mut simulation = Self {
            config,
            rng,
            state: RunState::new(config.initial_difficulty()),
            status: RunStatus::Running,
        };
        simulation.update_status();
        simulation
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Adjustment steps completed so far
    pub fn steps_taken(&self) -> usize {
        self.state.steps.len()
    }

    /// Current difficulty
    pub fn difficulty(&self) -> f64 {
        self.state.difficulty
    }

    /// Take one step unless the run has terminated
    ///
    /// Returns the status after the step. Terminated runs are left untouched.
    pub fn advance(&mut self) -> Result<RunStatus, SimulationError> {
        if self.status == RunStatus::Terminated {
            return Ok(RunStatus::Terminated);
        }

        self.step()?;
        self.update_status();
        Ok(self.status)
    }

    /// Advance until the goal is reached and return the result
    pub fn run(mut self) -> Result<RunResult, SimulationError> {
        while self.advance()? == RunStatus::Running {}
        self.into_result()
    }

    /// Final result; fails if the goal has not been reached yet
    pub fn into_result(self) -> Result<RunResult, SimulationError> {
        if self.status != RunStatus::Terminated {
            return Err(SimulationError::Incomplete {
                steps: self.steps_taken(),
            });
        }

        let state = self.state;
        Ok(RunResult {
            initial_difficulty: self.config.initial_difficulty(),
            steps: state.steps,
            increase_count: state.increase_count,
            decrease_count: state.decrease_count,
            total_time_seconds: state.total_time_seconds,
        })
    }

    fn update_status(&mut self) {
        if self
            .config
            .goal()
            .is_reached(self.state.difficulty, self.state.trace_points())
        {
            self.status = RunStatus::Terminated;
        }
    }

    fn step(&mut self) -> Result<(), SimulationError> {
        let config = self.config;
        let controller = config.controller();
        let previous = self.state.difficulty;

        let block_time = config.sampler_kind().sample(
            config.total_mining_power(),
            previous,
            controller,
            &mut *self.rng,
        )?;

        let difficulty = controller.next_difficulty(previous, block_time);
        match Adjustment::classify(previous, difficulty) {
            Adjustment::Increase => self.state.increase_count += 1,
            Adjustment::Decrease => self.state.decrease_count += 1,
            Adjustment::Unchanged => {}
        }

        let elapsed_hours = self.state.elapsed_hours + block_time / SECONDS_PER_HOUR;
        self.state.steps.push(AdjustmentStep {
            block_time,
            elapsed_hours,
            difficulty,
        });
        self.state.elapsed_hours = elapsed_hours;
        self.state.total_time_seconds += block_time;
        self.state.difficulty = difficulty;

        trace!(
            "step {}: block {}s, difficulty {} -> {}",
            self.state.steps.len(),
            block_time,
            previous,
            difficulty
        );

        Ok(())
    }
}
