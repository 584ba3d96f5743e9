//! Text histograms of run outcomes

use std::fmt::Write;

/// Bins used for completion-time histograms
pub const DEFAULT_BINS: usize = 50;

/// Equal-width histogram over `[min, max]`
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bin `samples` into `bins` equal-width buckets
    ///
    /// The last bucket is closed so the maximum lands in it. Returns `None`
    /// for no samples, no bins, or non-finite samples.
    pub fn new(samples: &[f64], bins: usize) -> Option<Self> {
        if samples.is_empty() || bins == 0 || samples.iter().any(|x| !x.is_finite()) {
            return None;
        }

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bins as f64;

        let mut counts = vec![0; bins];
        for &x in samples {
            let bin = if width > 0.0 {
                (((x - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }

        Some(Self { min, max, counts })
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Lower and upper edge of bin `index`
    pub fn bin_range(&self, index: usize) -> (f64, f64) {
        let width = self.bin_width();
        let lower = self.min + width * index as f64;
        (lower, lower + width)
    }

    /// Render one line per bin with a bar scaled to `bar_width` characters
    pub fn render(&self, bar_width: usize) -> String {
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();
        for (index, &count) in self.counts.iter().enumerate() {
            let (lower, upper) = self.bin_range(index);
            let bar = "#".repeat(count * bar_width / peak);
            // Writing to a String cannot fail
            let _ = writeln!(out, "{:>10.2} - {:<10.2} {:>6} {}", lower, upper, count, bar);
        }
        out
    }
}
