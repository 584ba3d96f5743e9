//! Difficulty retargeting simulator core library
//!
//! Models how a proof-of-work style difficulty evolves when blocks are found
//! by a stochastic process and every block feeds a clamped proportional
//! control law. The engine is a pure, single-run state machine; the driver
//! repeats it with independent seeds and aggregates the results.

pub mod config;
pub mod difficulty;
pub mod mining;
pub mod simulation;
pub mod driver;
pub mod rng;

pub use config::{ConfigError, Goal, SamplerKind, SimulationConfig};
pub use simulation::{run_simulation, RunResult, SimulationError};

/// Model constants shared by the sampler, controller and presets
pub mod constants {
    /// Tick length of the block discovery process (seconds)
    pub const BLOCK_INTERVAL: f64 = 12.0;

    /// Mining power contributed by one storage replica (samples per tick)
    pub const ONE_REPLICA_MINING_POWER: f64 = 1024.0 * 1024.0;

    /// Replicas mining in the default experiment
    pub const DEFAULT_REPLICAS: f64 = 20.0;

    /// Default design block interval (3 hours)
    pub const DEFAULT_TARGET_BLOCK_TIME: f64 = 3.0 * 3600.0;

    /// Default divisor of the per-step adjustment (factor = 1 / divisor)
    pub const DEFAULT_DIFF_ADJ_DIVISOR: u64 = 1024;

    /// Largest multiple of the adjustment factor a single slow block can subtract
    pub const MAX_DECREASE_MULTIPLE: f64 = 99.0;

    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}
