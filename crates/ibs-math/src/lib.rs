//! Numerical building blocks for inverse binomial sampling.
//!
//! - Special functions at integer arguments (digamma, trigamma) and the
//!   dilogarithm series
//! - Injectable [`NumericBackend`] implementations
//! - Binomial support enumeration for exact fixed-sample moments
//! - The smoothing-scheme registry for fixed-sample estimators
//! - Log-domain primitives (log Gamma, log binomial, compensated sums)

pub mod math;

pub use math::backend::{
    AsymptoticBackend, BackendKind, NumericBackend, SeriesBackend, ASYMPTOTIC_THRESHOLD,
};
pub use math::binomial;
pub use math::smoothing::{PseudoCounts, SmoothingError, SmoothingScheme, CLIP_EPSILON};
pub use math::special::*;
pub use math::stable::*;
