//! Sampling-efficiency comparison of IBS against fixed sampling.
//!
//! A Bernoulli dataset is drawn once from the base seed. Each budget (a
//! per-trial sample count `M` for the fixed estimator, a repeat count `R`
//! for IBS) is then evaluated over independent seeded runs, and the spread
//! of the resulting log-likelihoods is reported against the average number
//! of simulator calls spent.

use ibs_config::settings::ExperimentSettings;
use ibs_config::validate::parse_scheme as parse_config_scheme;
use ibs_math::{neumaier_sum, NumericBackend, SmoothingScheme};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::estimate::Estimate;
use crate::fixed::FixedEstimator;
use crate::ibs::{IbsEstimator, IbsOptions};
use crate::logging::event_names;
use crate::palette::Method;
use crate::simulator::{derive_seed, BernoulliSimulator};

/// Parameters of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub probability: f64,
    pub trials: u32,
    pub repetitions: u32,
    pub fixed_samples: Vec<u64>,
    pub ibs_repeats: Vec<u32>,
    pub seed: u64,
    pub scheme: SmoothingScheme,
}

impl ExperimentConfig {
    pub fn from_settings(settings: &ExperimentSettings) -> Result<Self> {
        Ok(ExperimentConfig {
            probability: settings.probability,
            trials: settings.trials,
            repetitions: settings.repetitions,
            fixed_samples: settings.fixed_samples.clone(),
            ibs_repeats: settings.ibs_repeats.clone(),
            seed: settings.seed,
            scheme: parse_config_scheme("experiment.scheme", &settings.scheme)?,
        })
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.probability > 0.0 && self.probability <= 1.0) {
            return Err(Error::invalid(format!(
                "experiment probability must be in (0, 1] (got {})",
                self.probability
            )));
        }
        if self.repetitions == 0 {
            return Err(Error::invalid("repetitions must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            probability: 0.3,
            trials: 20,
            repetitions: 100,
            fixed_samples: vec![1, 2, 3, 5, 8, 10],
            ibs_repeats: vec![1, 2, 3, 4, 5],
            seed: 123,
            scheme: SmoothingScheme::Clipped,
        }
    }
}

/// One point of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyRow {
    pub method: Method,
    /// `M` for fixed rows, `R` for IBS rows.
    pub setting: u64,
    pub avg_samples: f64,
    pub mean_log_likelihood: f64,
    /// Sample standard deviation across runs; 0 for a single run.
    pub std_log_likelihood: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyReport {
    pub probability: f64,
    pub trials: u32,
    pub repetitions: u32,
    pub seed: u64,
    /// Exact log-likelihood of the drawn dataset.
    pub true_log_likelihood: f64,
    pub fixed: Vec<EfficiencyRow>,
    pub ibs: Vec<EfficiencyRow>,
}

/// Run the comparison.
pub fn run_sampling_efficiency(
    config: &ExperimentConfig,
    backend: &dyn NumericBackend,
) -> Result<EfficiencyReport> {
    config.validate()?;
    let p = config.probability;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let stimuli = vec![(); config.trials as usize];
    let responses: Vec<bool> = (0..config.trials).map(|_| rng.random::<f64>() < p).collect();
    let hits = responses.iter().filter(|&&r| r).count() as f64;
    let true_log_likelihood = hits * p.ln() + (responses.len() as f64 - hits) * (-p).ln_1p();

    tracing::info!(
        target: event_names::EXPERIMENT_STARTED,
        probability = p,
        trials = config.trials,
        repetitions = config.repetitions,
        message = "sampling-efficiency comparison started"
    );

    let mut fixed = Vec::with_capacity(config.fixed_samples.len());
    for &samples in &config.fixed_samples {
        let estimator = FixedEstimator::new(samples, config.scheme)?;
        let row = summarize(
            Method::Smoothed(config.scheme),
            samples,
            config,
            |sim| estimator.estimate(&stimuli, &responses, sim, &p),
        )?;
        fixed.push(row);
    }

    let mut ibs = Vec::with_capacity(config.ibs_repeats.len());
    for &repeats in &config.ibs_repeats {
        let estimator = IbsEstimator::new(backend, IbsOptions::default().with_repeats(repeats))?;
        let row = summarize(Method::Ibs, u64::from(repeats), config, |sim| {
            estimator.estimate(&stimuli, &responses, sim, &p)
        })?;
        ibs.push(row);
    }

    tracing::info!(
        target: event_names::EXPERIMENT_FINISHED,
        rows = fixed.len() + ibs.len(),
        message = "sampling-efficiency comparison finished"
    );

    Ok(EfficiencyReport {
        probability: p,
        trials: config.trials,
        repetitions: config.repetitions,
        seed: config.seed,
        true_log_likelihood,
        fixed,
        ibs,
    })
}

/// Evaluate one budget over every seeded run.
fn summarize<F>(
    method: Method,
    setting: u64,
    config: &ExperimentConfig,
    mut run: F,
) -> Result<EfficiencyRow>
where
    F: FnMut(&mut BernoulliSimulator) -> Result<Estimate>,
{
    let mut estimates = Vec::new();
    let mut samples = Vec::new();
    for rep in 0..config.repetitions {
        let mut sim = BernoulliSimulator::new(derive_seed(config.seed, u64::from(rep)));
        let est = run(&mut sim)?;
        estimates.push(est.log_likelihood);
        samples.push(est.total_samples as f64);
    }

    let (mean_log_likelihood, std_log_likelihood) = mean_and_std(&estimates);
    let row = EfficiencyRow {
        method,
        setting,
        avg_samples: neumaier_sum(&samples) / samples.len() as f64,
        mean_log_likelihood,
        std_log_likelihood,
    };
    tracing::debug!(
        target: event_names::EXPERIMENT_ROW,
        method = %method,
        setting,
        avg_samples = row.avg_samples,
        mean = row.mean_log_likelihood,
        std = row.std_log_likelihood,
        message = "budget evaluated"
    );
    Ok(row)
}

/// Mean and sample standard deviation; the deviation is 0 for one value.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = neumaier_sum(values) / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let squares: Vec<f64> = values.iter().map(|v| (v - mean) * (v - mean)).collect();
    (mean, (neumaier_sum(&squares) / (n - 1.0)).sqrt())
}
