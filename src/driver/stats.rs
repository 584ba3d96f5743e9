//! Summary statistics over run outcomes

use serde::Serialize;

/// Sample statistics of a set of observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample variance (n - 1 denominator)
    pub variance: f64,
    pub std_dev: f64,
    /// `std_dev / mean`, undefined for a zero mean
    pub coefficient_of_variation: Option<f64>,
}

impl Summary {
    /// Summarize `samples`; `None` with fewer than two observations
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let count = samples.len();
        if count < 2 {
            return None;
        }

        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        let std_dev = variance.sqrt();
        let coefficient_of_variation = if mean != 0.0 {
            Some(std_dev / mean)
        } else {
            None
        };

        Some(Self {
            count,
            mean,
            variance,
            std_dev,
            coefficient_of_variation,
        })
    }
}
