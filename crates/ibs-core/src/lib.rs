//! Log-likelihood estimation for simulator models.
//!
//! This library provides:
//! - The inverse binomial sampling (IBS) estimator and its analytical moments
//! - Fixed-sample smoothed estimators and their exact binomial moments
//! - The simulator capability and a seeded Bernoulli simulator
//! - A sampling-efficiency comparison between the two families
//! - Error taxonomy, exit codes and structured logging for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod error;
pub mod estimate;
pub mod exit_codes;
pub mod experiment;
pub mod fixed;
pub mod ibs;
pub mod logging;
pub mod palette;
pub mod simulator;

pub use error::{Error, ErrorCategory, Result};
pub use estimate::{Estimate, Moments};
pub use fixed::{
    fixed_analytical_mean, fixed_analytical_moments, fixed_analytical_moments_all,
    fixed_analytical_variance, fixed_loglikelihood, fixed_sample_path,
    log_prob_from_observations, parse_scheme, FixedEstimator,
};
pub use ibs::{
    ibs_analytical_mean, ibs_analytical_moments, ibs_analytical_variance,
    ibs_analytical_variance_with, ibs_loglikelihood, ibs_sample_path, IbsEstimator, IbsOptions,
};
pub use palette::Method;
pub use simulator::{derive_seed, BernoulliSimulator, Simulator};
