//! Simulation configuration
//!
//! A [`SimulationConfig`] is validated once, before any run starts, and is
//! immutable afterwards. Every rejection here is fatal: nothing is simulated
//! with a configuration that failed validation.

mod presets;

pub use presets::*;

use crate::difficulty::{target_block_time_cutoff, DifficultyController};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported goal: {0}")]
    UnsupportedGoal(String),
    #[error("Unsupported sampler: {0}")]
    UnsupportedSampler(String),
    #[error("Initial difficulty must be positive and finite, got {0}")]
    InvalidInitialDifficulty(f64),
    /// Non-finite, or too short for a non-zero cutoff (below 1.5 seconds)
    #[error("Target block time must be finite and at least 1.5 seconds, got {0}")]
    TargetBlockTimeTooShort(f64),
    #[error("Total mining power must be positive and finite, got {0}")]
    InvalidMiningPower(f64),
    /// The factor must lie strictly inside `(0, 1/99)`. At exactly 1/99 the
    /// clamped decrease is `1 - 99 * factor = 0`, so one slow block would
    /// take difficulty to zero (or below it by rounding).
    #[error("Difficulty adjustment factor {0} outside (0, 1/99)")]
    AdjustmentFactorOutOfRange(f64),
    #[error("Goal target must be finite, got {0}")]
    NonFiniteGoalTarget(f64),
    #[error("Iteration count must be a non-negative integer, got {0}")]
    InvalidIterationCount(f64),
    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Termination goal of a run
///
/// Serialized adjacently tagged, e.g. `{"alg": "grow_to_diff", "target": 2e10}`.
/// Config files are read through [`RawGoal`] so an unknown `alg` surfaces as
/// [`ConfigError::UnsupportedGoal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "alg", content = "target")]
pub enum Goal {
    /// Run until difficulty >= target
    #[serde(rename = "grow_to_diff")]
    GrowToDifficulty(f64),
    /// Run until difficulty <= target
    #[serde(rename = "drop_to_diff")]
    DropToDifficulty(f64),
    /// Run for exactly this many adjustment steps
    #[serde(rename = "iterations")]
    FixedIterations(u64),
}

impl Goal {
    /// Build a goal from its algorithm name and its target (difficulty or step count)
    pub fn from_alg(alg: &str, target_or_iterations: f64) -> Result<Self, ConfigError> {
        match alg {
            "grow_to_diff" => Ok(Goal::GrowToDifficulty(target_or_iterations)),
            "drop_to_diff" => Ok(Goal::DropToDifficulty(target_or_iterations)),
            "iterations" => {
                let count = target_or_iterations;
                if !count.is_finite() || count < 0.0 || count.fract() != 0.0 {
                    return Err(ConfigError::InvalidIterationCount(count));
                }
                Ok(Goal::FixedIterations(count as u64))
            }
            other => Err(ConfigError::UnsupportedGoal(other.to_string())),
        }
    }

    /// Algorithm name used on the command line and in config files
    pub fn alg(&self) -> &'static str {
        match self {
            Goal::GrowToDifficulty(_) => "grow_to_diff",
            Goal::DropToDifficulty(_) => "drop_to_diff",
            Goal::FixedIterations(_) => "iterations",
        }
    }

    /// Termination predicate, evaluated before every sampling step
    ///
    /// `trace_points` counts recorded difficulty values including the initial one.
    pub fn is_reached(&self, difficulty: f64, trace_points: usize) -> bool {
        match *self {
            Goal::GrowToDifficulty(target) => difficulty >= target,
            Goal::DropToDifficulty(target) => difficulty <= target,
            Goal::FixedIterations(count) => trace_points as u64 > count,
        }
    }

    /// Whether the run is judged by completion time rather than block times
    pub fn is_difficulty_target(&self) -> bool {
        !matches!(self, Goal::FixedIterations(_))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Goal::GrowToDifficulty(target) | Goal::DropToDifficulty(target)
                if !target.is_finite() =>
            {
                Err(ConfigError::NonFiniteGoalTarget(target))
            }
            _ => Ok(()),
        }
    }
}

/// Block-time sampling model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Poisson discovery, exponential waiting time floored to whole ticks
    #[default]
    Exponential,
    /// Per-tick Bernoulli trials against the anticipated difficulty
    IterativeRetry,
}

impl FromStr for SamplerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exponential" => Ok(SamplerKind::Exponential),
            "iterative_retry" | "iterative" => Ok(SamplerKind::IterativeRetry),
            other => Err(ConfigError::UnsupportedSampler(other.to_string())),
        }
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerKind::Exponential => write!(f, "exponential"),
            SamplerKind::IterativeRetry => write!(f, "iterative_retry"),
        }
    }
}

/// Goal as written in a config file, before the `alg` name is checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGoal {
    pub alg: String,
    pub target: f64,
}

impl From<Goal> for RawGoal {
    fn from(goal: Goal) -> Self {
        let target = match goal {
            Goal::GrowToDifficulty(target) | Goal::DropToDifficulty(target) => target,
            Goal::FixedIterations(count) => count as f64,
        };
        RawGoal {
            alg: goal.alg().to_string(),
            target,
        }
    }
}

/// Unvalidated configuration as it appears in a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub difficulty_adjustment_factor: f64,
    pub initial_difficulty: f64,
    pub goal: RawGoal,
    pub target_block_time: f64,
    #[serde(default)]
    pub sampler: SamplerKind,
    pub total_mining_power: f64,
}

/// Validated, immutable parameters of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct SimulationConfig {
    initial_difficulty: f64,
    goal: Goal,
    target_block_time: f64,
    sampler_kind: SamplerKind,
    total_mining_power: f64,
    controller: DifficultyController,
}

impl SimulationConfig {
    /// Create a validated configuration
    ///
    /// `difficulty_adjustment_factor` must lie strictly below 1/99 so that the
    /// largest clamped decrease cannot take difficulty to zero.
    pub fn new(
        difficulty_adjustment_factor: f64,
        initial_difficulty: f64,
        goal: Goal,
        target_block_time: f64,
        sampler_kind: SamplerKind,
        total_mining_power: f64,
    ) -> Result<Self, ConfigError> {
        let max_factor = 1.0 / crate::constants::MAX_DECREASE_MULTIPLE;
        if !(difficulty_adjustment_factor > 0.0 && difficulty_adjustment_factor < max_factor) {
            return Err(ConfigError::AdjustmentFactorOutOfRange(difficulty_adjustment_factor));
        }
        if !(initial_difficulty.is_finite() && initial_difficulty > 0.0) {
            return Err(ConfigError::InvalidInitialDifficulty(initial_difficulty));
        }
        // The cutoff is floor(2/3 of the target) and must not be zero
        if !(target_block_time.is_finite() && target_block_time_cutoff(target_block_time) > 0.0) {
            return Err(ConfigError::TargetBlockTimeTooShort(target_block_time));
        }
        if !(total_mining_power.is_finite() && total_mining_power > 0.0) {
            return Err(ConfigError::InvalidMiningPower(total_mining_power));
        }
        goal.validate()?;

        Ok(Self {
            initial_difficulty,
            goal,
            target_block_time,
            sampler_kind,
            total_mining_power,
            controller: DifficultyController::new(target_block_time, difficulty_adjustment_factor),
        })
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("loading simulation config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Same configuration with a different sampling model
    pub fn with_sampler(mut self, sampler_kind: SamplerKind) -> Self {
        self.sampler_kind = sampler_kind;
        self
    }

    pub fn difficulty_adjustment_factor(&self) -> f64 {
        self.controller.difficulty_adjustment_factor()
    }

    pub fn initial_difficulty(&self) -> f64 {
        self.initial_difficulty
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn target_block_time(&self) -> f64 {
        self.target_block_time
    }

    pub fn sampler_kind(&self) -> SamplerKind {
        self.sampler_kind
    }

    pub fn total_mining_power(&self) -> f64 {
        self.total_mining_power
    }

    /// Controller cutoff, `floor(target_block_time * 2 / 3)`
    pub fn target_block_time_cutoff(&self) -> f64 {
        self.controller.cutoff()
    }

    /// Control law bound to this configuration
    pub fn controller(&self) -> &DifficultyController {
        &self.controller
    }
}

impl TryFrom<RawConfig> for SimulationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        SimulationConfig::new(
            raw.difficulty_adjustment_factor,
            raw.initial_difficulty,
            Goal::from_alg(&raw.goal.alg, raw.goal.target)?,
            raw.target_block_time,
            raw.sampler,
            raw.total_mining_power,
        )
    }
}

impl From<SimulationConfig> for RawConfig {
    fn from(config: SimulationConfig) -> Self {
        RawConfig {
            difficulty_adjustment_factor: config.difficulty_adjustment_factor(),
            initial_difficulty: config.initial_difficulty,
            goal: config.goal.into(),
            target_block_time: config.target_block_time,
            sampler: config.sampler_kind,
            total_mining_power: config.total_mining_power,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADJ: f64 = 1.0 / 1024.0;

    fn config_with(adj: f64, init: f64, block_time: f64, power: f64) -> Result<SimulationConfig, ConfigError> {
        SimulationConfig::new(
            adj,
            init,
            Goal::GrowToDifficulty(20.0),
            block_time,
            SamplerKind::Exponential,
            power,
        )
    }

    #[test]
    fn test_valid_config() {
        let config = config_with(ADJ, 10.0, 10_800.0, 1.0).unwrap();
        assert_eq!(config.target_block_time_cutoff(), 7200.0);
        assert_eq!(config.difficulty_adjustment_factor(), ADJ);
        assert_eq!(config.initial_difficulty(), 10.0);
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        assert!(matches!(
            config_with(ADJ, 0.0, 10_800.0, 1.0),
            Err(ConfigError::InvalidInitialDifficulty(_))
        ));
        assert!(matches!(
            config_with(ADJ, -5.0, 10_800.0, 1.0),
            Err(ConfigError::InvalidInitialDifficulty(_))
        ));
        assert!(matches!(
            config_with(ADJ, 10.0, 0.0, 1.0),
            Err(ConfigError::TargetBlockTimeTooShort(_))
        ));
        assert!(matches!(
            config_with(ADJ, 10.0, 1.4, 1.0),
            Err(ConfigError::TargetBlockTimeTooShort(_))
        ));
        assert!(matches!(
            config_with(ADJ, 10.0, f64::INFINITY, 1.0),
            Err(ConfigError::TargetBlockTimeTooShort(_))
        ));
        assert!(matches!(
            config_with(ADJ, 10.0, 10_800.0, 0.0),
            Err(ConfigError::InvalidMiningPower(_))
        ));
        assert!(matches!(
            config_with(ADJ, 10.0, 10_800.0, f64::NAN),
            Err(ConfigError::InvalidMiningPower(_))
        ));
    }

    #[test]
    fn test_adjustment_factor_bounds() {
        assert!(config_with(1.0 / 100.0, 10.0, 10_800.0, 1.0).is_ok());
        assert!(matches!(
            config_with(1.0 / 99.0, 10.0, 10_800.0, 1.0),
            Err(ConfigError::AdjustmentFactorOutOfRange(_))
        ));
        assert!(matches!(
            config_with(1.0 / 32.0, 10.0, 10_800.0, 1.0),
            Err(ConfigError::AdjustmentFactorOutOfRange(_))
        ));
        assert!(matches!(
            config_with(0.0, 10.0, 10_800.0, 1.0),
            Err(ConfigError::AdjustmentFactorOutOfRange(_))
        ));
        assert!(matches!(
            config_with(f64::NAN, 10.0, 10_800.0, 1.0),
            Err(ConfigError::AdjustmentFactorOutOfRange(_))
        ));
    }

    #[test]
    fn test_goal_from_alg() {
        assert_eq!(Goal::from_alg("grow_to_diff", 5.0).unwrap(), Goal::GrowToDifficulty(5.0));
        assert_eq!(Goal::from_alg("drop_to_diff", 5.0).unwrap(), Goal::DropToDifficulty(5.0));
        assert_eq!(Goal::from_alg("iterations", 1000.0).unwrap(), Goal::FixedIterations(1000));
        assert!(matches!(
            Goal::from_alg("iterations", 2.5),
            Err(ConfigError::InvalidIterationCount(_))
        ));
        assert!(matches!(
            Goal::from_alg("iterations", -1.0),
            Err(ConfigError::InvalidIterationCount(_))
        ));
        assert!(matches!(
            Goal::from_alg("hover", 1.0),
            Err(ConfigError::UnsupportedGoal(alg)) if alg == "hover"
        ));
    }

    #[test]
    fn test_goal_predicates() {
        let grow = Goal::GrowToDifficulty(20.0);
        assert!(!grow.is_reached(19.99, 1));
        assert!(grow.is_reached(20.0, 1));

        let drop = Goal::DropToDifficulty(20.0);
        assert!(!drop.is_reached(20.01, 1));
        assert!(drop.is_reached(20.0, 1));

        let fixed = Goal::FixedIterations(3);
        assert!(!fixed.is_reached(1.0, 3));
        assert!(fixed.is_reached(1.0, 4));
        assert!(Goal::FixedIterations(0).is_reached(1.0, 1));
    }

    #[test]
    fn test_rejects_non_finite_goal() {
        let result = SimulationConfig::new(
            ADJ,
            10.0,
            Goal::GrowToDifficulty(f64::NAN),
            10_800.0,
            SamplerKind::Exponential,
            1.0,
        );
        assert!(matches!(result, Err(ConfigError::NonFiniteGoalTarget(_))));
    }

    #[test]
    fn test_sampler_from_str() {
        assert_eq!("exponential".parse::<SamplerKind>().unwrap(), SamplerKind::Exponential);
        assert_eq!("iterative_retry".parse::<SamplerKind>().unwrap(), SamplerKind::IterativeRetry);
        assert!("gamma".parse::<SamplerKind>().is_err());
        assert_eq!(SamplerKind::IterativeRetry.to_string(), "iterative_retry");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "difficulty_adjustment_factor": 0.0009765625,
            "initial_difficulty": 10.0,
            "goal": { "alg": "drop_to_diff", "target": 5.0 },
            "target_block_time": 10800,
            "sampler": "iterative_retry",
            "total_mining_power": 2.0
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.goal(), Goal::DropToDifficulty(5.0));
        assert_eq!(config.sampler_kind(), SamplerKind::IterativeRetry);
        assert_eq!(config.difficulty_adjustment_factor(), ADJ);

        let encoded = serde_json::to_string(&config).unwrap();
        assert_eq!(SimulationConfig::from_json_str(&encoded).unwrap(), config);
    }

    #[test]
    fn test_json_float_target_block_time() {
        let json = r#"{
            "difficulty_adjustment_factor": 0.0009765625,
            "initial_difficulty": 10.0,
            "goal": { "alg": "grow_to_diff", "target": 20.0 },
            "target_block_time": 10800.0,
            "total_mining_power": 2.0
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.target_block_time(), 10_800.0);
        assert_eq!(config.target_block_time_cutoff(), 7200.0);
        assert_eq!(config.sampler_kind(), SamplerKind::Exponential);

        let fractional = SimulationConfig::new(
            ADJ,
            10.0,
            Goal::FixedIterations(1),
            1.5,
            SamplerKind::Exponential,
            1.0,
        )
        .unwrap();
        assert_eq!(fractional.target_block_time_cutoff(), 1.0);
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let unknown_goal = r#"{
            "difficulty_adjustment_factor": 0.0009765625,
            "initial_difficulty": 10.0,
            "goal": { "alg": "hover", "target": 5.0 },
            "target_block_time": 10800,
            "total_mining_power": 2.0
        }"#;
        assert!(matches!(
            SimulationConfig::from_json_str(unknown_goal),
            Err(ConfigError::UnsupportedGoal(alg)) if alg == "hover"
        ));

        let fractional_iterations = r#"{
            "difficulty_adjustment_factor": 0.0009765625,
            "initial_difficulty": 10.0,
            "goal": { "alg": "iterations", "target": 2.5 },
            "target_block_time": 10800,
            "total_mining_power": 2.0
        }"#;
        assert!(matches!(
            SimulationConfig::from_json_str(fractional_iterations),
            Err(ConfigError::InvalidIterationCount(_))
        ));

        let short_target = r#"{
            "difficulty_adjustment_factor": 0.0009765625,
            "initial_difficulty": 10.0,
            "goal": { "alg": "iterations", "target": 10 },
            "target_block_time": 1.2,
            "total_mining_power": 2.0
        }"#;
        assert!(matches!(
            SimulationConfig::from_json_str(short_target),
            Err(ConfigError::TargetBlockTimeTooShort(_))
        ));

        let bad_power = r#"{
            "difficulty_adjustment_factor": 0.0009765625,
            "initial_difficulty": 10.0,
            "goal": { "alg": "iterations", "target": 10 },
            "target_block_time": 10800,
            "total_mining_power": -2.0
        }"#;
        assert!(SimulationConfig::from_json_str(bad_power).is_err());
    }
}
