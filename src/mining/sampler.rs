//! Block-time samplers
//!
//! Each sampler draws the waiting time until the next block from an injected
//! uniform source. Time advances in `BLOCK_INTERVAL` second ticks, so every
//! sampled block time is a whole number of ticks. Block times are `f64`
//! seconds: a weak network against a huge difficulty can wait far longer
//! than any integer counter holds.

use crate::config::SamplerKind;
use crate::constants::BLOCK_INTERVAL;
use crate::difficulty::DifficultyController;
use rand::Rng;
use thiserror::Error;

/// Sampling errors
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SamplingError {
    #[error("Difficulty must be positive and finite, got {0}")]
    NonPositiveDifficulty(f64),
    #[error("Mining power must be positive and finite, got {0}")]
    NonPositiveMiningPower(f64),
}

/// Strategy producing one block time in seconds
pub trait BlockTimeSampler {
    /// Draw the time until the next block is found at `difficulty`
    ///
    /// # Arguments
    /// * `mining_power` - Aggregate mining power of the network
    /// * `difficulty` - Difficulty the block is mined at
    /// * `controller` - Control law (cutoff and adjustment factor) of the run
    /// * `rng` - Uniform random source
    fn sample<R: Rng + ?Sized>(
        &self,
        mining_power: f64,
        difficulty: f64,
        controller: &DifficultyController,
        rng: &mut R,
    ) -> Result<f64, SamplingError>;
}

fn check_inputs(mining_power: f64, difficulty: f64) -> Result<(), SamplingError> {
    if !(difficulty.is_finite() && difficulty > 0.0) {
        return Err(SamplingError::NonPositiveDifficulty(difficulty));
    }
    if !(mining_power.is_finite() && mining_power > 0.0) {
        return Err(SamplingError::NonPositiveMiningPower(mining_power));
    }
    Ok(())
}

/// Poisson block discovery
///
/// The waiting time in ticks is exponential with rate
/// `mining_power / difficulty` and is floored to whole ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialSampler;

impl BlockTimeSampler for ExponentialSampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        mining_power: f64,
        difficulty: f64,
        _controller: &DifficultyController,
        rng: &mut R,
    ) -> Result<f64, SamplingError> {
        check_inputs(mining_power, difficulty)?;

        let rate = mining_power / difficulty;
        let u: f64 = rng.gen();
        // Inverse transform; 1 - u lies in (0, 1]
        let ticks = -(1.0 - u).ln() / rate;

        Ok(ticks.floor() * BLOCK_INTERVAL)
    }
}

/// Per-tick Bernoulli trials
///
/// Every tick the sampler asks what difficulty the controller would set if
/// the block landed now, and succeeds with probability
/// `mining_power / expected_difficulty`. The speculative adjustment is never
/// committed; the run applies the controller separately once a block is found.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterativeRetrySampler;

impl BlockTimeSampler for IterativeRetrySampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        mining_power: f64,
        difficulty: f64,
        controller: &DifficultyController,
        rng: &mut R,
    ) -> Result<f64, SamplingError> {
        check_inputs(mining_power, difficulty)?;

        let mut time_elapsed = BLOCK_INTERVAL;
        loop {
            let adjfac = controller.adjustment_factor(time_elapsed);
            let expected_difficulty = difficulty * (1.0 + adjfac);
            let mining_probability = mining_power / expected_difficulty;

            if rng.gen::<f64>() < mining_probability {
                return Ok(time_elapsed);
            }

            time_elapsed += BLOCK_INTERVAL;
        }
    }
}

impl BlockTimeSampler for SamplerKind {
    fn sample<R: Rng + ?Sized>(
        &self,
        mining_power: f64,
        difficulty: f64,
        controller: &DifficultyController,
        rng: &mut R,
    ) -> Result<f64, SamplingError> {
        match self {
            SamplerKind::Exponential => {
                ExponentialSampler.sample(mining_power, difficulty, controller, rng)
            }
            SamplerKind::IterativeRetry => {
                IterativeRetrySampler.sample(mining_power, difficulty, controller, rng)
            }
        }
    }
}
