//! Summary statistics over usage samples
//!
//! A single streaming pass using Welford's update keeps the variance stable
//! for large byte counts, where the naive sum-of-squares form loses precision.
//!
//! Only finite floating-point samples count; every other cell is skipped
//! silently. The standard deviation uses Bessel's correction and is defined
//! as 0 below two samples.

use crate::storage::Sample;

/// Bytes per megabyte (MiB)
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Count, mean, sample standard deviation and maximum of a column
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// Number of valid samples
    pub count: usize,
    /// Arithmetic mean, unscaled
    pub mean: f64,
    /// Sample standard deviation, divided by the scale
    pub sigma: f64,
    /// Maximum, divided by the scale
    pub max: f64,
}

/// Online accumulator for mean, variance and maximum
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    max: Option<f64>,
}

impl RunningStats {
    /// Create an empty accumulator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            max: None,
        }
    }

    /// Fold one sample in
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Number of samples seen
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Mean, 0 when empty
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (n - 1), 0 below two samples
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).sqrt()
    }

    /// Maximum, 0 when empty
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max.unwrap_or(0.0)
    }

    /// Finish with sigma and max divided by `scale`
    #[must_use]
    pub fn finish(&self, scale: f64) -> Summary {
        Summary {
            count: self.count,
            mean: self.mean,
            sigma: self.sample_std_dev() / scale,
            max: self.max() / scale,
        }
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

/// Summarise a memory column: sigma and max come back in megabytes
#[must_use]
pub fn summarize(values: &[Sample]) -> Summary {
    summarize_scaled(values, BYTES_PER_MB)
}

/// Summarise a column, dividing sigma and max by `scale`
///
/// The mean is always returned unscaled.
#[must_use]
pub fn summarize_scaled(values: &[Sample], scale: f64) -> Summary {
    let mut stats = RunningStats::new();
    stats.extend(values.iter().filter_map(Sample::as_valid_float));
    stats.finish(scale)
}

/// Round to two decimal places for display
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
