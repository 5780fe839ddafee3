//! Special functions used to de-bias hitting-time counts.
//!
//! Only the integer-argument restrictions of digamma and trigamma are
//! supported, which is all inverse binomial sampling needs:
//!
//! - `digamma(n) = -γ + Σ_{k=1}^{n-1} 1/k`
//! - `trigamma(n) = π²/6 - Σ_{k=1}^{n-1} 1/k²`
//!
//! Anything else (fractional, non-positive, non-finite arguments or a
//! polygamma order other than 1) is rejected with [`SpecialFunctionError`].
//!
//! The dilogarithm is evaluated through its power series and is used for the
//! closed-form variance of the IBS estimator.

use std::f64::consts::PI;

use thiserror::Error;

/// Euler–Mascheroni constant γ.
#[allow(clippy::excessive_precision)]
pub const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_860_6;

/// trigamma(1) = ζ(2) = π²/6.
pub const TRIGAMMA_ONE: f64 = PI * PI / 6.0;

/// Largest integer that round-trips exactly through an f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Default stopping tolerance for the dilogarithm series.
pub const DILOG_TOLERANCE: f64 = 1e-12;

/// Default term budget for the dilogarithm series.
pub const DILOG_MAX_TERMS: u32 = 100_000;

/// Errors raised for arguments outside the supported domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecialFunctionError {
    #[error("{function} is only defined here for positive integers (got {value})")]
    NotPositiveInteger { function: &'static str, value: f64 },

    #[error("polygamma of order {order} is not supported (only order 1)")]
    UnsupportedOrder { order: u32 },

    #[error("{function} series requires |x| <= 1 (got {value})")]
    OutOfDomain { function: &'static str, value: f64 },
}

/// Validate that `x` is a positive integer and return it as `u64`.
pub fn positive_integer(function: &'static str, x: f64) -> Result<u64, SpecialFunctionError> {
    if !x.is_finite() || x < 1.0 || x.fract() != 0.0 || x > MAX_EXACT_INTEGER {
        return Err(SpecialFunctionError::NotPositiveInteger { function, value: x });
    }
    Ok(x as u64)
}

/// Digamma at a positive integer, by its defining harmonic sum.
pub fn digamma(x: f64) -> Result<f64, SpecialFunctionError> {
    let n = positive_integer("digamma", x)?;
    Ok(harmonic_digamma(n))
}

/// Trigamma at a positive integer, by its defining series remainder.
pub fn trigamma(x: f64) -> Result<f64, SpecialFunctionError> {
    let n = positive_integer("trigamma", x)?;
    Ok(harmonic_trigamma(n))
}

/// Polygamma of the given order. Only order 1 (trigamma) is supported.
pub fn polygamma(order: u32, x: f64) -> Result<f64, SpecialFunctionError> {
    if order != 1 {
        return Err(SpecialFunctionError::UnsupportedOrder { order });
    }
    trigamma(x)
}

/// `-γ + Σ_{k=1}^{n-1} 1/k`. Caller guarantees `n >= 1`.
pub(crate) fn harmonic_digamma(n: u64) -> f64 {
    let mut result = -EULER_MASCHERONI;
    for k in 1..n {
        result += 1.0 / k as f64;
    }
    result
}

/// `π²/6 - Σ_{k=1}^{n-1} 1/k²`. Caller guarantees `n >= 1`.
pub(crate) fn harmonic_trigamma(n: u64) -> f64 {
    let mut result = TRIGAMMA_ONE;
    for k in 1..n {
        let k = k as f64;
        result -= 1.0 / (k * k);
    }
    result
}

/// Asymptotic (Stirling-type) expansion of digamma, accurate for x >= 32.
pub(crate) fn asymptotic_digamma(x: f64) -> f64 {
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    // Bernoulli-number tail: 1/12, -1/120, 1/252, -1/240, 1/132
    let tail = inv2
        * (1.0 / 12.0
            - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0 - inv2 * (1.0 / 240.0 - inv2 / 132.0))));
    x.ln() - 0.5 * inv - tail
}

/// Asymptotic expansion of trigamma, accurate for x >= 32.
pub(crate) fn asymptotic_trigamma(x: f64) -> f64 {
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let tail = inv
        * inv2
        * (1.0 / 6.0
            - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 * (1.0 / 30.0 - inv2 * 5.0 / 66.0))));
    inv + 0.5 * inv2 + tail
}

/// Stopping rule for the dilogarithm power series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DilogSeries {
    /// Stop once a term's magnitude drops below this value.
    pub tolerance: f64,
    /// Hard cap on the number of summed terms.
    pub max_terms: u32,
}

impl Default for DilogSeries {
    fn default() -> Self {
        Self {
            tolerance: DILOG_TOLERANCE,
            max_terms: DILOG_MAX_TERMS,
        }
    }
}

/// Dilogarithm `Li₂(x) = Σ_{j≥1} x^j / j²` with the default stopping rule.
pub fn dilogarithm(x: f64) -> Result<f64, SpecialFunctionError> {
    dilogarithm_with(x, &DilogSeries::default())
}

/// Dilogarithm with an explicit stopping rule.
///
/// Convergence slows as `x → 1`; at `x = 1` the series is truncated by
/// `max_terms` and undershoots π²/6 by roughly `1 / max_terms`.
pub fn dilogarithm_with(x: f64, series: &DilogSeries) -> Result<f64, SpecialFunctionError> {
    if x.is_nan() || x.abs() > 1.0 {
        return Err(SpecialFunctionError::OutOfDomain {
            function: "dilogarithm",
            value: x,
        });
    }
    let mut sum = 0.0;
    let mut power = 1.0;
    for j in 1..=series.max_terms {
        power *= x;
        let j = j as f64;
        let term = power / (j * j);
        if term.abs() < series.tolerance {
            break;
        }
        sum += term;
    }
    Ok(sum)
}
