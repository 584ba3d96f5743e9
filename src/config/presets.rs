//! Experiment presets
//!
//! Parameters of the reference storage-mining experiment: 20 replicas mine
//! against a 3 hour block target, difficulty is expressed in multiples of
//! what one replica can cover in one block interval.

use super::{ConfigError, Goal, SamplerKind, SimulationConfig};
use crate::constants::{
    BLOCK_INTERVAL, DEFAULT_REPLICAS, DEFAULT_TARGET_BLOCK_TIME, ONE_REPLICA_MINING_POWER,
};

/// Steps simulated by the `iterations` preset
pub const PRESET_ITERATIONS: u64 = 1000;

/// Difficulty one replica meets on average once per target block time
pub fn one_replica_difficulty(target_block_time: f64) -> f64 {
    target_block_time / BLOCK_INTERVAL * ONE_REPLICA_MINING_POWER
}

/// Aggregate mining power of the reference network
pub fn default_mining_power() -> f64 {
    ONE_REPLICA_MINING_POWER * DEFAULT_REPLICAS
}

/// Build the reference configuration for an algorithm name
///
/// * `grow_to_diff` - start at 10 replicas worth of difficulty, stop at 20
/// * `drop_to_diff` - start at 40, stop at 20
/// * `iterations` - start at 20 and run `PRESET_ITERATIONS` steps
pub fn for_alg(
    alg: &str,
    diff_adj_divisor: u64,
    sampler: SamplerKind,
) -> Result<SimulationConfig, ConfigError> {
    let target_block_time = DEFAULT_TARGET_BLOCK_TIME;
    let replica = one_replica_difficulty(target_block_time);

    let (initial_difficulty, goal) = match alg {
        "grow_to_diff" => (replica * 10.0, Goal::from_alg(alg, replica * 20.0)?),
        "drop_to_diff" => (replica * 40.0, Goal::from_alg(alg, replica * 20.0)?),
        "iterations" => (replica * 20.0, Goal::from_alg(alg, PRESET_ITERATIONS as f64)?),
        other => return Err(ConfigError::UnsupportedGoal(other.to_string())),
    };

    SimulationConfig::new(
        1.0 / diff_adj_divisor as f64,
        initial_difficulty,
        goal,
        target_block_time,
        sampler,
        default_mining_power(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_replica_difficulty() {
        assert_eq!(one_replica_difficulty(10_800.0), 900.0 * 1024.0 * 1024.0);
    }

    #[test]
    fn test_presets() {
        let replica = one_replica_difficulty(DEFAULT_TARGET_BLOCK_TIME);

        let grow = for_alg("grow_to_diff", 1024, SamplerKind::Exponential).unwrap();
        assert_eq!(grow.initial_difficulty(), replica * 10.0);
        assert_eq!(grow.goal(), Goal::GrowToDifficulty(replica * 20.0));
        assert_eq!(grow.total_mining_power(), 20.0 * 1024.0 * 1024.0);

        let drop = for_alg("drop_to_diff", 1024, SamplerKind::Exponential).unwrap();
        assert_eq!(drop.initial_difficulty(), replica * 40.0);

        let fixed = for_alg("iterations", 1024, SamplerKind::IterativeRetry).unwrap();
        assert_eq!(fixed.goal(), Goal::FixedIterations(PRESET_ITERATIONS));
        assert_eq!(fixed.sampler_kind(), SamplerKind::IterativeRetry);
    }

    #[test]
    fn test_preset_rejects_bad_input() {
        assert!(matches!(
            for_alg("sideways", 1024, SamplerKind::Exponential),
            Err(ConfigError::UnsupportedGoal(_))
        ));
        assert!(matches!(
            for_alg("grow_to_diff", 0, SamplerKind::Exponential),
            Err(ConfigError::AdjustmentFactorOutOfRange(_))
        ));
        assert!(matches!(
            for_alg("grow_to_diff", 32, SamplerKind::Exponential),
            Err(ConfigError::AdjustmentFactorOutOfRange(_))
        ));
    }
}
