//! Injectable numeric backends.
//!
//! Estimators never call special functions directly; they are handed a
//! [`NumericBackend`] at construction time. Two backends ship with the crate:
//!
//! - [`AsymptoticBackend`] (default): exact harmonic sums for small arguments,
//!   asymptotic expansions beyond [`ASYMPTOTIC_THRESHOLD`]. Constant cost per
//!   call, which matters when hitting times run into the thousands.
//! - [`SeriesBackend`]: the literal finite-sum definitions for every argument.
//!   Linear cost; useful as a reference implementation.
//!
//! Both agree for integer arguments within floating-point tolerance.

use serde::{Deserialize, Serialize};

use super::special::{
    asymptotic_digamma, asymptotic_trigamma, harmonic_digamma, harmonic_trigamma,
    positive_integer, SpecialFunctionError,
};
use super::stable::neumaier_sum;

/// Arguments at or above this use the asymptotic expansions.
pub const ASYMPTOTIC_THRESHOLD: u64 = 32;

/// Provider of the special functions and reductions the estimators need.
pub trait NumericBackend: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Digamma at a positive integer.
    fn digamma(&self, x: f64) -> Result<f64, SpecialFunctionError>;

    /// Polygamma of `order` at a positive integer. Only order 1 is required.
    fn polygamma(&self, order: u32, x: f64) -> Result<f64, SpecialFunctionError>;

    /// Sum of an array of values.
    fn sum(&self, values: &[f64]) -> f64 {
        neumaier_sum(values)
    }

    /// Arithmetic mean; 0 for an empty slice.
    fn mean(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        self.sum(values) / values.len() as f64
    }
}

/// Harmonic sums below the threshold, asymptotic expansions above.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsymptoticBackend;

impl NumericBackend for AsymptoticBackend {
    fn name(&self) -> &'static str {
        "asymptotic"
    }

    fn digamma(&self, x: f64) -> Result<f64, SpecialFunctionError> {
        let n = positive_integer("digamma", x)?;
        if n < ASYMPTOTIC_THRESHOLD {
            Ok(harmonic_digamma(n))
        } else {
            Ok(asymptotic_digamma(x))
        }
    }

    fn polygamma(&self, order: u32, x: f64) -> Result<f64, SpecialFunctionError> {
        if order != 1 {
            return Err(SpecialFunctionError::UnsupportedOrder { order });
        }
        let n = positive_integer("polygamma", x)?;
        if n < ASYMPTOTIC_THRESHOLD {
            Ok(harmonic_trigamma(n))
        } else {
            Ok(asymptotic_trigamma(x))
        }
    }
}

/// Literal finite-sum definitions, no approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesBackend;

impl NumericBackend for SeriesBackend {
    fn name(&self) -> &'static str {
        "series"
    }

    fn digamma(&self, x: f64) -> Result<f64, SpecialFunctionError> {
        let n = positive_integer("digamma", x)?;
        Ok(harmonic_digamma(n))
    }

    fn polygamma(&self, order: u32, x: f64) -> Result<f64, SpecialFunctionError> {
        if order != 1 {
            return Err(SpecialFunctionError::UnsupportedOrder { order });
        }
        let n = positive_integer("polygamma", x)?;
        Ok(harmonic_trigamma(n))
    }
}

static ASYMPTOTIC: AsymptoticBackend = AsymptoticBackend;
static SERIES: SeriesBackend = SeriesBackend;

/// Backend selector, as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Asymptotic,
    Series,
}

impl BackendKind {
    /// Resolve the selector to a shared backend instance.
    pub fn backend(self) -> &'static dyn NumericBackend {
        match self {
            BackendKind::Asymptotic => &ASYMPTOTIC,
            BackendKind::Series => &SERIES,
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asymptotic" => Ok(BackendKind::Asymptotic),
            "series" => Ok(BackendKind::Series),
            _ => Err(format!("unknown numeric backend: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Asymptotic => write!(f, "asymptotic"),
            BackendKind::Series => write!(f, "series"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::special::{EULER_MASCHERONI, TRIGAMMA_ONE};

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn backends_agree_across_threshold() {
        let fast = BackendKind::Asymptotic.backend();
        let reference = BackendKind::Series.backend();
        for n in [1_u64, 2, 5, 31, 32, 33, 64, 500, 5_000] {
            let x = n as f64;
            assert!(approx_eq(
                fast.digamma(x).unwrap(),
                reference.digamma(x).unwrap(),
                1e-12
            ));
            assert!(approx_eq(
                fast.polygamma(1, x).unwrap(),
                reference.polygamma(1, x).unwrap(),
                1e-12
            ));
        }
    }

    #[test]
    fn backends_reject_unsupported_input() {
        for backend in [BackendKind::Asymptotic.backend(), BackendKind::Series.backend()] {
            assert!(backend.digamma(0.0).is_err());
            assert!(backend.digamma(1.5).is_err());
            assert!(backend.polygamma(1, -3.0).is_err());
            assert!(backend.polygamma(2, 3.0).is_err());
        }
    }

    #[test]
    fn backend_values_at_one() {
        let backend = AsymptoticBackend;
        assert_eq!(backend.digamma(1.0).unwrap(), -EULER_MASCHERONI);
        assert_eq!(backend.polygamma(1, 1.0).unwrap(), TRIGAMMA_ONE);
    }

    #[test]
    fn reductions() {
        let backend = SeriesBackend;
        assert_eq!(backend.sum(&[1.0, 2.0, 3.5]), 6.5);
        assert_eq!(backend.mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(backend.mean(&[]), 0.0);
    }

    #[test]
    fn backend_kind_parse_and_display() {
        assert_eq!("series".parse::<BackendKind>().unwrap(), BackendKind::Series);
        assert_eq!(
            "asymptotic".parse::<BackendKind>().unwrap(),
            BackendKind::Asymptotic
        );
        assert!("scipy".parse::<BackendKind>().is_err());
        // same names as the settings file accepts
        for name in ["Series", "ASYMPTOTIC", "default", "reference"] {
            assert!(name.parse::<BackendKind>().is_err(), "{name}");
            assert!(serde_json::from_str::<BackendKind>(&format!("\"{name}\"")).is_err());
        }
        for kind in [BackendKind::Asymptotic, BackendKind::Series] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
        assert_eq!(BackendKind::Series.to_string(), "series");
        assert_eq!(BackendKind::default().backend().name(), "asymptotic");
    }
}
