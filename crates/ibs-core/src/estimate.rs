//! Estimator outputs.

use serde::Serialize;

/// Result of one estimator call.
///
/// Non-finite values serialize as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    /// Sum over trials of per-trial log-probability contributions.
    pub log_likelihood: f64,
    /// Estimated variance of `log_likelihood`.
    pub variance: f64,
    /// Every simulator call made to produce the estimate.
    pub total_samples: u64,
}

impl Estimate {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Distance from `truth` in units of the estimate's own standard deviation.
    pub fn z_score(&self, truth: f64) -> f64 {
        (self.log_likelihood - truth) / self.std_dev()
    }
}

/// Exact mean and variance of an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub mean: f64,
    pub variance: f64,
}

impl Moments {
    pub const ZERO: Moments = Moments {
        mean: 0.0,
        variance: 0.0,
    };

    /// Moments of the sum of two independent estimators.
    pub fn add_independent(self, other: Moments) -> Moments {
        Moments {
            mean: self.mean + other.mean,
            variance: self.variance + other.variance,
        }
    }
}
