//! Run results
//!
//! A run is recorded as its origin plus one [`AdjustmentStep`] per block, so
//! elapsed time, difficulty and block time can never drift out of index
//! alignment. The flat views are derived on demand.

use crate::constants::SECONDS_PER_HOUR;
use serde::Serialize;

/// One block and the adjustment it triggered
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustmentStep {
    /// Seconds the block took
    pub block_time: f64,
    /// Cumulative hours at the end of the block
    pub elapsed_hours: f64,
    /// Difficulty after the adjustment
    pub difficulty: f64,
}

/// Immutable summary of a finished run
///
/// Only the engine builds one, so the counters always agree with the steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub(crate) initial_difficulty: f64,
    pub(crate) steps: Vec<AdjustmentStep>,
    pub(crate) increase_count: u64,
    pub(crate) decrease_count: u64,
    pub(crate) total_time_seconds: f64,
}

impl RunResult {
    /// Sum of all block times
    pub fn total_time_seconds(&self) -> f64 {
        self.total_time_seconds
    }

    pub fn total_time_hours(&self) -> f64 {
        self.total_time_seconds / SECONDS_PER_HOUR
    }

    /// Cumulative hours at each adjustment boundary, starting at 0
    pub fn elapsed_time_hours(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.steps.iter().map(|step| step.elapsed_hours))
            .collect()
    }

    /// Difficulty at each adjustment boundary, starting at the initial difficulty
    pub fn difficulty_trace(&self) -> Vec<f64> {
        std::iter::once(self.initial_difficulty)
            .chain(self.steps.iter().map(|step| step.difficulty))
            .collect()
    }

    /// Seconds taken by each block
    pub fn block_times(&self) -> Vec<f64> {
        self.steps.iter().map(|step| step.block_time).collect()
    }

    /// `(elapsed_hours, difficulty)` at every boundary including the origin
    pub fn trace_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        std::iter::once((0.0, self.initial_difficulty))
            .chain(self.steps.iter().map(|step| (step.elapsed_hours, step.difficulty)))
    }

    pub fn steps(&self) -> &[AdjustmentStep] {
        &self.steps
    }

    /// Number of adjustment steps (equals the number of blocks)
    pub fn adjustments(&self) -> usize {
        self.steps.len()
    }

    /// Steps that strictly raised difficulty
    pub fn increase_count(&self) -> u64 {
        self.increase_count
    }

    /// Steps that strictly lowered difficulty
    pub fn decrease_count(&self) -> u64 {
        self.decrease_count
    }

    pub fn initial_difficulty(&self) -> f64 {
        self.initial_difficulty
    }

    pub fn final_difficulty(&self) -> f64 {
        self.steps
            .last()
            .map_or(self.initial_difficulty, |step| step.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> RunResult {
        RunResult {
            initial_difficulty: 10.0,
            steps: vec![
                AdjustmentStep { block_time: 1800.0, elapsed_hours: 0.5, difficulty: 11.0 },
                AdjustmentStep { block_time: 3600.0, elapsed_hours: 1.5, difficulty: 10.5 },
            ],
            increase_count: 1,
            decrease_count: 1,
            total_time_seconds: 5400.0,
        }
    }

    #[test]
    fn test_parallel_views_are_aligned() {
        let result = sample_result();
        assert_eq!(result.elapsed_time_hours(), vec![0.0, 0.5, 1.5]);
        assert_eq!(result.difficulty_trace(), vec![10.0, 11.0, 10.5]);
        assert_eq!(result.block_times(), vec![1800.0, 3600.0]);
        assert_eq!(result.trace_points().count(), 3);
        assert_eq!(result.adjustments(), 2);
        assert_eq!(result.total_time_hours(), 1.5);
        assert_eq!(result.final_difficulty(), 10.5);
    }

    #[test]
    fn test_serializes_for_trace_output() {
        let value = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(value["steps"][0]["block_time"], 1800.0);
        assert_eq!(value["steps"][1]["difficulty"], 10.5);
        assert_eq!(value["increase_count"], 1);
        assert_eq!(value["total_time_seconds"], 5400.0);
    }

    #[test]
    fn test_empty_run_views() {
        let result = RunResult {
            initial_difficulty: 3.0,
            steps: Vec::new(),
            increase_count: 0,
            decrease_count: 0,
            total_time_seconds: 0.0,
        };
        assert_eq!(result.elapsed_time_hours(), vec![0.0]);
        assert_eq!(result.difficulty_trace(), vec![3.0]);
        assert!(result.block_times().is_empty());
        assert_eq!(result.final_difficulty(), 3.0);
    }
}
