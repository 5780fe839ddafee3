//! Additive smoothing of empirical match rates.
//!
//! A smoothing scheme turns `matches` out of `samples` simulator draws into a
//! log-probability estimate `log((matches + α) / (samples + β))`, trading bias
//! for never returning `-inf`. The `clipped` scheme instead clamps the raw
//! ratio to `[ε, 1-ε]` before taking the logarithm.
//!
//! | scheme   | α   | β | notes                                   |
//! |----------|-----|---|-----------------------------------------|
//! | naive    | 0   | 0 | `-inf` when there are no matches        |
//! | fixed    | 1   | 1 | add-one on both counts                  |
//! | laplace  | 1   | 2 | posterior mean under a Beta(1,1) prior  |
//! | jeffreys | 0.5 | 1 | posterior mean under Beta(0.5,0.5)      |
//! | clipped  | –   | – | raw ratio clamped to `[1e-12, 1-1e-12]` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clamp bound used by [`SmoothingScheme::Clipped`].
pub const CLIP_EPSILON: f64 = 1e-12;

/// Pseudo-counts added to matched and total counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PseudoCounts {
    /// Prior successes added to the match count.
    pub alpha: f64,
    /// Prior trials added to the sample count.
    pub beta: f64,
}

/// Errors from evaluating a smoothing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmoothingError {
    #[error("unknown smoothing scheme '{name}' (expected one of naive, fixed, laplace, jeffreys, clipped)")]
    UnknownScheme { name: String },

    #[error("{scheme} smoothing requires at least one sample per trial")]
    NoSamples { scheme: SmoothingScheme },

    #[error("match count {matches} exceeds sample count {samples}")]
    MatchesExceedSamples { matches: u64, samples: u64 },
}

/// The recognized smoothing schemes, keyed by exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingScheme {
    Naive,
    Fixed,
    Laplace,
    Jeffreys,
    Clipped,
}

impl SmoothingScheme {
    /// Every scheme, in display order.
    pub const ALL: [SmoothingScheme; 5] = [
        SmoothingScheme::Naive,
        SmoothingScheme::Fixed,
        SmoothingScheme::Laplace,
        SmoothingScheme::Jeffreys,
        SmoothingScheme::Clipped,
    ];

    /// Registry name of the scheme.
    pub fn name(self) -> &'static str {
        match self {
            SmoothingScheme::Naive => "naive",
            SmoothingScheme::Fixed => "fixed",
            SmoothingScheme::Laplace => "laplace",
            SmoothingScheme::Jeffreys => "jeffreys",
            SmoothingScheme::Clipped => "clipped",
        }
    }

    /// Pseudo-counts `(α, β)`; `None` for the clipped scheme.
    pub fn pseudo_counts(self) -> Option<PseudoCounts> {
        let (alpha, beta) = match self {
            SmoothingScheme::Naive => (0.0, 0.0),
            SmoothingScheme::Fixed => (1.0, 1.0),
            SmoothingScheme::Laplace => (1.0, 2.0),
            SmoothingScheme::Jeffreys => (0.5, 1.0),
            SmoothingScheme::Clipped => return None,
        };
        Some(PseudoCounts { alpha, beta })
    }

    /// Whether the scheme divides by the raw sample count.
    pub fn requires_samples(self) -> bool {
        matches!(self, SmoothingScheme::Naive | SmoothingScheme::Clipped)
    }

    /// Smoothed log-probability of `matches` hits out of `samples` draws.
    ///
    /// The naive scheme returns `-inf` for zero matches; that is a value,
    /// not an error.
    pub fn log_prob(self, matches: u64, samples: u64) -> Result<f64, SmoothingError> {
        if matches > samples {
            return Err(SmoothingError::MatchesExceedSamples { matches, samples });
        }
        if samples == 0 && self.requires_samples() {
            return Err(SmoothingError::NoSamples { scheme: self });
        }
        let m = matches as f64;
        let n = samples as f64;
        match self.pseudo_counts() {
            Some(PseudoCounts { alpha, beta }) => Ok(((m + alpha) / (n + beta)).ln()),
            None => Ok((m / n).clamp(CLIP_EPSILON, 1.0 - CLIP_EPSILON).ln()),
        }
    }
}

impl std::str::FromStr for SmoothingScheme {
    type Err = SmoothingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SmoothingScheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| SmoothingError::UnknownScheme { name: s.to_string() })
    }
}

impl std::fmt::Display for SmoothingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn half_matched_values() {
        let (m, n) = (5, 10);
        let half = 0.5f64.ln();
        assert!(approx_eq(SmoothingScheme::Naive.log_prob(m, n).unwrap(), half, 1e-12));
        assert!(approx_eq(
            SmoothingScheme::Fixed.log_prob(m, n).unwrap(),
            (6.0f64 / 11.0).ln(),
            1e-12
        ));
        assert!(approx_eq(SmoothingScheme::Laplace.log_prob(m, n).unwrap(), half, 1e-12));
        assert!(approx_eq(SmoothingScheme::Jeffreys.log_prob(m, n).unwrap(), half, 1e-12));
        assert!(approx_eq(SmoothingScheme::Clipped.log_prob(m, n).unwrap(), half, 1e-12));
    }

    #[test]
    fn zero_matched_values() {
        let naive = SmoothingScheme::Naive.log_prob(0, 10).unwrap();
        assert!(naive.is_infinite() && naive.is_sign_negative());
        assert!(approx_eq(
            SmoothingScheme::Fixed.log_prob(0, 10).unwrap(),
            (1.0f64 / 11.0).ln(),
            1e-12
        ));
        assert!(approx_eq(
            SmoothingScheme::Laplace.log_prob(0, 10).unwrap(),
            (1.0f64 / 12.0).ln(),
            1e-12
        ));
        assert!(approx_eq(
            SmoothingScheme::Jeffreys.log_prob(0, 10).unwrap(),
            -3.091_042_453_358_316,
            1e-9
        ));
        assert!(approx_eq(
            SmoothingScheme::Clipped.log_prob(0, 10).unwrap(),
            -27.631_021_115_928_547,
            1e-9
        ));
    }

    #[test]
    fn clipped_all_matches_stays_below_zero() {
        let v = SmoothingScheme::Clipped.log_prob(10, 10).unwrap();
        assert!(v < 0.0 && v > -1e-11);
    }

    #[test]
    fn zero_samples_domain() {
        assert_eq!(
            SmoothingScheme::Naive.log_prob(0, 0),
            Err(SmoothingError::NoSamples {
                scheme: SmoothingScheme::Naive
            })
        );
        assert!(SmoothingScheme::Clipped.log_prob(0, 0).is_err());
        assert_eq!(SmoothingScheme::Fixed.log_prob(0, 0).unwrap(), 0.0);
        assert!(approx_eq(
            SmoothingScheme::Laplace.log_prob(0, 0).unwrap(),
            0.5f64.ln(),
            1e-15
        ));
    }

    #[test]
    fn matches_cannot_exceed_samples() {
        assert!(SmoothingScheme::Laplace.log_prob(4, 3).is_err());
    }

    #[test]
    fn pseudo_count_invariants() {
        for scheme in SmoothingScheme::ALL {
            if let Some(pc) = scheme.pseudo_counts() {
                assert!(pc.alpha >= 0.0);
                assert!(pc.beta >= pc.alpha);
            }
        }
        assert!(SmoothingScheme::Clipped.pseudo_counts().is_none());
    }

    #[test]
    fn parse_exact_names_only() {
        for scheme in SmoothingScheme::ALL {
            assert_eq!(scheme.name().parse::<SmoothingScheme>().unwrap(), scheme);
        }
        assert_eq!(
            "fixed_2".parse::<SmoothingScheme>(),
            Err(SmoothingError::UnknownScheme {
                name: "fixed_2".to_string()
            })
        );
        assert!("Laplace".parse::<SmoothingScheme>().is_err());
    }
}
