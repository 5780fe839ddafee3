//! Fixed-sample estimators.
//!
//! Each trial gets exactly `M` simulator draws. The number of draws matching
//! the observed response is turned into a log-probability by a
//! [`SmoothingScheme`]. Unlike IBS these estimators are biased; the exact
//! bias and variance follow from enumerating the binomial support, which is
//! what the `fixed_analytical_*` functions do.

use ibs_math::binomial::binomial_support;
use ibs_math::{neumaier_sum, SmoothingScheme};

use crate::error::{Error, Result};
use crate::estimate::{Estimate, Moments};
use crate::ibs::{check_parallel, check_probability};
use crate::logging::event_names;
use crate::simulator::Simulator;

/// Resolve a scheme name, failing with an unknown-key error.
pub fn parse_scheme(name: &str) -> Result<SmoothingScheme> {
    Ok(name.parse::<SmoothingScheme>()?)
}

fn check_samples(scheme: SmoothingScheme, samples: u64) -> Result<()> {
    if samples == 0 && scheme.requires_samples() {
        return Err(Error::invalid(format!(
            "{} smoothing requires at least one sample per trial",
            scheme
        )));
    }
    Ok(())
}

/// A per-trial sample budget paired with a smoothing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEstimator {
    samples: u64,
    scheme: SmoothingScheme,
}

impl FixedEstimator {
    /// Fails when the scheme divides by a zero sample count.
    pub fn new(samples: u64, scheme: SmoothingScheme) -> Result<Self> {
        check_samples(scheme, samples)?;
        Ok(FixedEstimator { samples, scheme })
    }

    /// Like [`FixedEstimator::new`] with the scheme given by name.
    pub fn from_name(samples: u64, scheme: &str) -> Result<Self> {
        Self::new(samples, parse_scheme(scheme)?)
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn scheme(&self) -> SmoothingScheme {
        self.scheme
    }

    /// Estimate the log-likelihood of `responses` given `stimuli`.
    ///
    /// The variance is the plug-in binomial variance of each trial's
    /// estimator at the empirical match rate, summed over trials. It is
    /// `+inf` for naive smoothing whenever a trial could have produced zero
    /// matches.
    pub fn estimate<P, S, R, Sim>(
        &self,
        stimuli: &[S],
        responses: &[R],
        simulator: &mut Sim,
        params: &P,
    ) -> Result<Estimate>
    where
        P: ?Sized,
        R: PartialEq,
        Sim: Simulator<P, S, Response = R> + ?Sized,
    {
        check_parallel(stimuli.len(), responses.len())?;

        let mut log_likelihood = 0.0;
        let mut variance = 0.0;
        for (stimulus, observed) in stimuli.iter().zip(responses) {
            let matches = (0..self.samples)
                .filter(|_| simulator.simulate(params, stimulus) == *observed)
                .count() as u64;
            log_likelihood += self.scheme.log_prob(matches, self.samples)?;
            variance += self.plug_in_variance(matches)?;
        }

        let total_samples = self.samples.saturating_mul(stimuli.len() as u64);
        tracing::debug!(
            target: event_names::FIXED_FINISHED,
            scheme = %self.scheme,
            samples = self.samples,
            trials = stimuli.len(),
            log_likelihood,
            message = "fixed-sample estimate finished"
        );
        Ok(Estimate {
            log_likelihood,
            variance,
            total_samples,
        })
    }

    fn plug_in_variance(&self, matches: u64) -> Result<f64> {
        if self.samples == 0 {
            return Ok(0.0);
        }
        let rate = matches as f64 / self.samples as f64;
        Ok(fixed_analytical_moments(rate, self.samples, self.scheme)?.variance)
    }
}

/// Estimate with `samples` draws per trial and the scheme named `scheme`.
pub fn fixed_loglikelihood<P, S, R, Sim>(
    stimuli: &[S],
    responses: &[R],
    simulator: &mut Sim,
    params: &P,
    samples: u64,
    scheme: &str,
) -> Result<Estimate>
where
    P: ?Sized,
    R: PartialEq,
    Sim: Simulator<P, S, Response = R> + ?Sized,
{
    FixedEstimator::from_name(samples, scheme)?.estimate(stimuli, responses, simulator, params)
}

/// Smoothed log-probability of a vector of Bernoulli observations.
pub fn log_prob_from_observations(observations: &[bool], scheme: SmoothingScheme) -> Result<f64> {
    if observations.is_empty() {
        return Err(Error::invalid("observations must be non-empty"));
    }
    let matches = observations.iter().filter(|&&hit| hit).count() as u64;
    Ok(scheme.log_prob(matches, observations.len() as u64)?)
}

/// Record exactly `samples` draws for one stimulus.
pub fn fixed_sample_path<P, S, Sim>(
    simulator: &mut Sim,
    params: &P,
    stimulus: &S,
    samples: u64,
) -> Vec<Sim::Response>
where
    P: ?Sized,
    S: ?Sized,
    Sim: Simulator<P, S> + ?Sized,
{
    (0..samples)
        .map(|_| simulator.simulate(params, stimulus))
        .collect()
}

/// Exact mean and variance of one trial's estimator when the true match
/// probability is `p`.
///
/// Outcomes with zero probability mass are skipped. If a reachable outcome
/// evaluates to `-inf` (naive smoothing, zero matches) the mean is `-inf`
/// and the variance `+inf`, or `0` when that outcome is certain.
pub fn fixed_analytical_moments(p: f64, samples: u64, scheme: SmoothingScheme) -> Result<Moments> {
    check_probability(p)?;
    check_samples(scheme, samples)?;

    let mut outcomes = Vec::new();
    if p == 0.0 || p == 1.0 {
        // one certain outcome; no need to walk the support
        let k = if p == 0.0 { 0 } else { samples };
        outcomes.push((1.0, scheme.log_prob(k, samples)?));
    } else {
        for (k, mass) in binomial_support(samples, p) {
            if mass > 0.0 {
                outcomes.push((mass, scheme.log_prob(k, samples)?));
            }
        }
    }

    if outcomes.iter().any(|&(_, value)| value.is_infinite()) {
        let variance = if outcomes.len() == 1 { 0.0 } else { f64::INFINITY };
        return Ok(Moments {
            mean: f64::NEG_INFINITY,
            variance,
        });
    }

    let weighted: Vec<f64> = outcomes.iter().map(|&(mass, value)| mass * value).collect();
    let mean = neumaier_sum(&weighted);
    let squared: Vec<f64> = outcomes
        .iter()
        .map(|&(mass, value)| mass * (value - mean) * (value - mean))
        .collect();
    Ok(Moments {
        mean,
        variance: neumaier_sum(&squared),
    })
}

pub fn fixed_analytical_mean(p: f64, samples: u64, scheme: SmoothingScheme) -> Result<f64> {
    Ok(fixed_analytical_moments(p, samples, scheme)?.mean)
}

pub fn fixed_analytical_variance(p: f64, samples: u64, scheme: SmoothingScheme) -> Result<f64> {
    Ok(fixed_analytical_moments(p, samples, scheme)?.variance)
}

/// Moments summed over independent trials with probabilities `probabilities`.
pub fn fixed_analytical_moments_all(
    probabilities: &[f64],
    samples: u64,
    scheme: SmoothingScheme,
) -> Result<Moments> {
    probabilities.iter().try_fold(Moments::ZERO, |acc, &p| {
        Ok(acc.add_independent(fixed_analytical_moments(p, samples, scheme)?))
    })
}
