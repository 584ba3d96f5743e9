//! Mining module - stochastic block discovery models

mod sampler;

pub use sampler::*;
