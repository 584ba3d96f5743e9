//! Random sources
//!
//! Runs never share a generator. Each run draws from its own ChaCha8 stream,
//! so a run is reproducible from its seed alone and runs can execute on
//! different threads without correlating.

use rand::{Error, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generator used for simulation runs
pub type SimRng = ChaCha8Rng;

/// Create a generator for one run
pub fn seeded_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Seed of run `index` within an experiment seeded with `base_seed`
pub fn run_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index)
}

/// Largest f64 strictly below 1.0
const MAX_UNIFORM: f64 = 1.0 - f64::EPSILON / 2.0;

/// Uniform source replaying a fixed script of draws
///
/// `rng.gen::<f64>()` yields the scripted values in order (at 53 bits of
/// precision), wrapping around at the end of the script. Values are clamped
/// into `[0, 1)`. An empty script yields `0.0` forever.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedRng {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, next: 0 }
    }

    /// Number of 64-bit words handed out so far
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let u = if self.draws.is_empty() {
            0.0
        } else {
            self.draws[self.next % self.draws.len()]
        };
        self.next += 1;

        // Inverse of the 53-bit multiply conversion rand uses for f64
        let u = u.clamp(0.0, MAX_UNIFORM);
        ((u * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
