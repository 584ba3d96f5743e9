//! Difficulty adjustment algorithm
//!
//! Pure proportional control law applied after every block. A block faster
//! than the cutoff raises difficulty by one adjustment factor; a slow block
//! lowers it by one factor per elapsed cutoff, clamped at
//! `MAX_DECREASE_MULTIPLE` factors.

use crate::constants::MAX_DECREASE_MULTIPLE;

/// Derive the controller cutoff from the design block interval
///
/// `floor(target_block_time * 2 / 3)`, computed once per configuration.
pub fn target_block_time_cutoff(target_block_time: f64) -> f64 {
    (target_block_time * 2.0 / 3.0).floor()
}

/// Calculate the signed adjustment factor for an observed block time
///
/// # Arguments
/// * `observed_block_time` - Seconds the block took
/// * `cutoff` - Controller cutoff (must be positive)
/// * `difficulty_adjustment_factor` - Magnitude of one correction step
///
/// # Returns
/// `max(1 - floor(observed / cutoff), -99) * difficulty_adjustment_factor`
pub fn adjustment_factor(
    observed_block_time: f64,
    cutoff: f64,
    difficulty_adjustment_factor: f64,
) -> f64 {
    let ratio = (observed_block_time / cutoff).floor();
    let multiple = (1.0 - ratio).max(-MAX_DECREASE_MULTIPLE);

    multiple * difficulty_adjustment_factor
}

/// Calculate the difficulty that follows a block
///
/// This is a pure function with no side effects. Positivity of the result
/// is guaranteed for positive input as long as
/// `difficulty_adjustment_factor < 1/99`; that bound is enforced when the
/// configuration is built, not here.
///
/// # Arguments
/// * `previous_difficulty` - Difficulty the block was mined at
/// * `observed_block_time` - Seconds the block took
/// * `cutoff` - Controller cutoff, see [`target_block_time_cutoff`]
/// * `difficulty_adjustment_factor` - Magnitude of one correction step
pub fn calculate_next_difficulty(
    previous_difficulty: f64,
    observed_block_time: f64,
    cutoff: f64,
    difficulty_adjustment_factor: f64,
) -> f64 {
    let adjfac = adjustment_factor(observed_block_time, cutoff, difficulty_adjustment_factor);
    previous_difficulty * (1.0 + adjfac)
}

/// Control law bound to one configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyController {
    cutoff: f64,
    difficulty_adjustment_factor: f64,
}

impl DifficultyController {
    /// Create a controller, deriving the cutoff from the design block interval
    pub fn new(target_block_time: f64, difficulty_adjustment_factor: f64) -> Self {
        Self {
            cutoff: target_block_time_cutoff(target_block_time),
            difficulty_adjustment_factor,
        }
    }

    /// Controller cutoff in seconds
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn difficulty_adjustment_factor(&self) -> f64 {
        self.difficulty_adjustment_factor
    }

    /// Adjustment factor a block of `observed_block_time` seconds would produce
    pub fn adjustment_factor(&self, observed_block_time: f64) -> f64 {
        adjustment_factor(observed_block_time, self.cutoff, self.difficulty_adjustment_factor)
    }

    /// Next difficulty after a block of `observed_block_time` seconds
    pub fn next_difficulty(&self, previous_difficulty: f64, observed_block_time: f64) -> f64 {
        calculate_next_difficulty(
            previous_difficulty,
            observed_block_time,
            self.cutoff,
            self.difficulty_adjustment_factor,
        )
    }
}
