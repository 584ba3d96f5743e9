//! Simulation module - single-run engine and its result record

mod engine;
mod result;

pub use engine::*;
pub use result::*;

use crate::config::SimulationConfig;
use crate::mining::SamplingError;
use rand::Rng;
use thiserror::Error;

/// Simulation errors
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Sampling failed: {0}")]
    Sampling(#[from] SamplingError),
    #[error("Run still in progress after {steps} steps")]
    Incomplete { steps: usize },
    #[error("Run exceeded safety bound of {max_steps} steps")]
    SafetyBoundExceeded { max_steps: u64 },
}

/// Drive one run to completion
///
/// The configuration is already validated, so the only failure is a
/// sampling domain error, which discards the partial run. There is no
/// iteration cap: a goal the control law cannot reach loops forever. Use
/// [`Simulation::advance`] directly to impose a bound.
pub fn run_simulation<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<RunResult, SimulationError> {
    Simulation::new(config, rng).run()
}
