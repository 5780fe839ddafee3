//! Inverse binomial sampling.
//!
//! For each trial the simulator is called until it reproduces the observed
//! response. With `k` calls, `ψ(1) - ψ(k)` is an unbiased estimate of the
//! trial's log-probability and `ψ₁(1) - ψ₁(k)` an unbiased estimate of its
//! variance. Trials are summed; independent repeats are averaged.
//!
//! The hitting-time loop has no bound by default. If the simulator puts zero
//! mass on an observed response it never returns; set
//! [`IbsOptions::max_attempts`] to fail with
//! [`Error::AttemptLimitExceeded`] instead.

use ibs_config::settings::IbsSettings;
use ibs_math::{dilogarithm_with, neumaier_sum, BackendKind, DilogSeries, NumericBackend};

use crate::error::{Error, Result};
use crate::estimate::{Estimate, Moments};
use crate::logging::event_names;
use crate::simulator::Simulator;

/// Repeat count and optional attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IbsOptions {
    /// Independent repeats to average (at least 1).
    pub repeats: u32,
    /// Maximum simulator calls per trial; `None` is unbounded.
    pub max_attempts: Option<u64>,
}

impl Default for IbsOptions {
    fn default() -> Self {
        IbsOptions {
            repeats: 1,
            max_attempts: None,
        }
    }
}

impl IbsOptions {
    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.repeats < 1 {
            return Err(Error::invalid("repeats must be a positive integer"));
        }
        if self.max_attempts == Some(0) {
            return Err(Error::invalid("max_attempts must be at least 1 when set"));
        }
        Ok(())
    }
}

impl From<&IbsSettings> for IbsOptions {
    fn from(settings: &IbsSettings) -> Self {
        IbsOptions {
            repeats: settings.repeats,
            max_attempts: settings.max_attempts,
        }
    }
}

/// IBS estimator bound to a numeric backend.
#[derive(Clone, Copy)]
pub struct IbsEstimator<'b> {
    backend: &'b dyn NumericBackend,
    options: IbsOptions,
}

impl std::fmt::Debug for IbsEstimator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbsEstimator")
            .field("backend", &self.backend.name())
            .field("options", &self.options)
            .finish()
    }
}

impl<'b> IbsEstimator<'b> {
    /// Create an estimator. Fails on `repeats < 1` or a zero attempt cap.
    pub fn new(backend: &'b dyn NumericBackend, options: IbsOptions) -> Result<Self> {
        options.validate()?;
        Ok(IbsEstimator { backend, options })
    }

    pub fn options(&self) -> IbsOptions {
        self.options
    }

    pub fn backend(&self) -> &'b dyn NumericBackend {
        self.backend
    }

    /// Estimate the log-likelihood of `responses` given `stimuli`.
    ///
    /// `stimuli` and `responses` are parallel sequences and must have equal
    /// length. The returned variance is `Σ v_r / R²` over the `R` repeats.
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

        let repeats = self.options.repeats;
        let mut log_likelihoods = Vec::new();
        let mut variances = Vec::new();
        let mut total_samples = 0_u64;

        for repeat in 0..repeats {
            let pass = self.single_pass(stimuli, responses, simulator, params)?;
            tracing::debug!(
                target: event_names::IBS_REPEAT_DONE,
                repeat,
                log_likelihood = pass.log_likelihood,
                variance = pass.variance,
                samples = pass.total_samples,
                message = "IBS repeat finished"
            );
            log_likelihoods.push(pass.log_likelihood);
            variances.push(pass.variance);
            total_samples = total_samples.saturating_add(pass.total_samples);
        }

        let r = f64::from(repeats);
        Ok(Estimate {
            log_likelihood: self.backend.mean(&log_likelihoods),
            variance: self.backend.sum(&variances) / (r * r),
            total_samples,
        })
    }

    /// One pass over every trial.
    fn single_pass<P, S, R, Sim>(
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
        let mut log_likelihood = 0.0;
        let mut variance = 0.0;
        let mut total_samples = 0_u64;

        for (trial, (stimulus, observed)) in stimuli.iter().zip(responses).enumerate() {
            let k = hitting_time(
                simulator,
                params,
                stimulus,
                observed,
                trial,
                self.options.max_attempts,
            )?;
            let (ll, var) = self.trial_contribution(k)?;
            tracing::trace!(target: event_names::IBS_TRIAL_DONE, trial, k, message = "hit");
            log_likelihood += ll;
            variance += var;
            total_samples = total_samples.saturating_add(k);
        }

        Ok(Estimate {
            log_likelihood,
            variance,
            total_samples,
        })
    }

    /// `(ψ(1) - ψ(k), ψ₁(1) - ψ₁(k))` for a hitting time `k ≥ 1`.
    pub fn trial_contribution(&self, k: u64) -> Result<(f64, f64)> {
        let k = k as f64;
        let ll = self.backend.digamma(1.0)? - self.backend.digamma(k)?;
        let var = self.backend.polygamma(1, 1.0)? - self.backend.polygamma(1, k)?;
        Ok((ll, var))
    }

    /// Single-trial estimate from an observed hitting time.
    pub fn estimate_from_hitting_time(&self, k: u64) -> Result<Estimate> {
        let (log_likelihood, variance) = self.trial_contribution(k)?;
        Ok(Estimate {
            log_likelihood,
            variance,
            total_samples: k,
        })
    }
}

pub(crate) fn check_parallel(stimuli: usize, responses: usize) -> Result<()> {
    if stimuli != responses {
        return Err(Error::invalid(format!(
            "stimuli and responses must have the same length ({} vs {})",
            stimuli, responses
        )));
    }
    Ok(())
}

/// Call the simulator until it reproduces `observed`; returns the call count.
fn hitting_time<P, S, R, Sim>(
    simulator: &mut Sim,
    params: &P,
    stimulus: &S,
    observed: &R,
    trial: usize,
    max_attempts: Option<u64>,
) -> Result<u64>
where
    P: ?Sized,
    R: PartialEq,
    Sim: Simulator<P, S, Response = R> + ?Sized,
{
    let mut k = 1_u64;
    loop {
        if simulator.simulate(params, stimulus) == *observed {
            return Ok(k);
        }
        if max_attempts.is_some_and(|cap| k >= cap) {
            return Err(Error::AttemptLimitExceeded { trial, attempts: k });
        }
        k += 1;
    }
}

/// Estimate with the default backend.
pub fn ibs_loglikelihood<P, S, R, Sim>(
    stimuli: &[S],
    responses: &[R],
    simulator: &mut Sim,
    params: &P,
    repeats: u32,
) -> Result<Estimate>
where
    P: ?Sized,
    R: PartialEq,
    Sim: Simulator<P, S, Response = R> + ?Sized,
{
    let options = IbsOptions::default().with_repeats(repeats);
    IbsEstimator::new(BackendKind::default().backend(), options)?
        .estimate(stimuli, responses, simulator, params)
}

/// Record every draw of one IBS trial, up to and including the first match.
pub fn ibs_sample_path<P, S, R, Sim>(
    simulator: &mut Sim,
    params: &P,
    stimulus: &S,
    observed: &R,
    max_attempts: Option<u64>,
) -> Result<Vec<R>>
where
    P: ?Sized,
    R: PartialEq,
    Sim: Simulator<P, S, Response = R> + ?Sized,
{
    if max_attempts == Some(0) {
        return Err(Error::invalid("max_attempts must be at least 1 when set"));
    }
    let mut path = Vec::new();
    loop {
        let response = simulator.simulate(params, stimulus);
        let hit = response == *observed;
        path.push(response);
        if hit {
            return Ok(path);
        }
        let attempts = path.len() as u64;
        if max_attempts.is_some_and(|cap| attempts >= cap) {
            return Err(Error::AttemptLimitExceeded { trial: 0, attempts });
        }
    }
}

pub(crate) fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::invalid(format!(
            "probability must be in [0, 1] (got {})",
            p
        )));
    }
    Ok(())
}

/// Expected IBS log-likelihood: `Σ log p_i`.
///
/// A zero probability yields `-inf`.
pub fn ibs_analytical_mean(probabilities: &[f64]) -> Result<f64> {
    let mut logs = Vec::with_capacity(probabilities.len());
    for &p in probabilities {
        check_probability(p)?;
        logs.push(p.ln());
    }
    Ok(neumaier_sum(&logs))
}

/// Variance of the IBS estimator: `Σ Li₂(1 - p_i)`, default series rule.
pub fn ibs_analytical_variance(probabilities: &[f64]) -> Result<f64> {
    ibs_analytical_variance_with(probabilities, &DilogSeries::default())
}

/// Variance of the IBS estimator with an explicit dilogarithm stopping rule.
///
/// Convergence of the series slows as `p → 0`.
pub fn ibs_analytical_variance_with(probabilities: &[f64], series: &DilogSeries) -> Result<f64> {
    let mut terms = Vec::with_capacity(probabilities.len());
    for &p in probabilities {
        check_probability(p)?;
        terms.push(dilogarithm_with(1.0 - p, series)?);
    }
    Ok(neumaier_sum(&terms))
}

pub fn ibs_analytical_moments(probabilities: &[f64], series: &DilogSeries) -> Result<Moments> {
    Ok(Moments {
        mean: ibs_analytical_mean(probabilities)?,
        variance: ibs_analytical_variance_with(probabilities, series)?,
    })
}
