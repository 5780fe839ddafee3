//! Estimator settings types.
//!
//! Every field has a default, so `{}` is a valid settings file and a missing
//! file yields [`Settings::default`].

use ibs_math::{BackendKind, DILOG_MAX_TERMS, DILOG_TOLERANCE};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Complete settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub numeric: NumericSettings,

    #[serde(default)]
    pub ibs: IbsSettings,

    #[serde(default)]
    pub fixed: FixedSettings,

    #[serde(default)]
    pub analytic: AnalyticSettings,

    #[serde(default)]
    pub experiment: ExperimentSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            schema_version: default_schema_version(),
            description: None,
            numeric: NumericSettings::default(),
            ibs: IbsSettings::default(),
            fixed: FixedSettings::default(),
            analytic: AnalyticSettings::default(),
            experiment: ExperimentSettings::default(),
        }
    }
}

/// Numeric backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericSettings {
    #[serde(default)]
    pub backend: BackendKind,
}

/// Inverse binomial sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IbsSettings {
    /// Independent repeats averaged per estimate.
    #[serde(default = "default_repeats")]
    pub repeats: u32,

    /// Optional cap on simulator calls per trial; `null` means unbounded.
    #[serde(default)]
    pub max_attempts: Option<u64>,
}

impl Default for IbsSettings {
    fn default() -> Self {
        IbsSettings {
            repeats: default_repeats(),
            max_attempts: None,
        }
    }
}

/// Fixed-sample estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSettings {
    #[serde(default = "default_samples_per_trial")]
    pub samples_per_trial: u64,

    #[serde(default = "default_fixed_scheme")]
    pub scheme: String,
}

impl Default for FixedSettings {
    fn default() -> Self {
        FixedSettings {
            samples_per_trial: default_samples_per_trial(),
            scheme: default_fixed_scheme(),
        }
    }
}

/// Analytical moment settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticSettings {
    #[serde(default = "default_dilog_tolerance")]
    pub dilog_tolerance: f64,

    #[serde(default = "default_dilog_max_terms")]
    pub dilog_max_terms: u32,
}

impl Default for AnalyticSettings {
    fn default() -> Self {
        AnalyticSettings {
            dilog_tolerance: default_dilog_tolerance(),
            dilog_max_terms: default_dilog_max_terms(),
        }
    }
}

/// Sampling-efficiency comparison settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSettings {
    /// Bernoulli success probability of the synthetic model.
    #[serde(default = "default_probability")]
    pub probability: f64,

    /// Trials per dataset.
    #[serde(default = "default_trials")]
    pub trials: u32,

    /// Independent seeded runs per budget.
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    /// Per-trial sample budgets for the fixed estimator.
    #[serde(default = "default_fixed_samples")]
    pub fixed_samples: Vec<u64>,

    /// Repeat counts for the IBS estimator.
    #[serde(default = "default_ibs_repeats")]
    pub ibs_repeats: Vec<u32>,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Smoothing scheme for the fixed-sample rows.
    #[serde(default = "default_experiment_scheme")]
    pub scheme: String,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        ExperimentSettings {
            probability: default_probability(),
            trials: default_trials(),
            repetitions: default_repetitions(),
            fixed_samples: default_fixed_samples(),
            ibs_repeats: default_ibs_repeats(),
            seed: default_seed(),
            scheme: default_experiment_scheme(),
        }
    }
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_repeats() -> u32 {
    1
}

fn default_samples_per_trial() -> u64 {
    10
}

fn default_fixed_scheme() -> String {
    "laplace".to_string()
}

fn default_dilog_tolerance() -> f64 {
    DILOG_TOLERANCE
}

fn default_dilog_max_terms() -> u32 {
    DILOG_MAX_TERMS
}

fn default_probability() -> f64 {
    0.3
}

fn default_trials() -> u32 {
    20
}

fn default_repetitions() -> u32 {
    100
}

fn default_fixed_samples() -> Vec<u64> {
    vec![1, 2, 3, 5, 8, 10]
}

fn default_ibs_repeats() -> Vec<u32> {
    vec![1, 2, 3, 4, 5]
}

fn default_seed() -> u64 {
    123
}

fn default_experiment_scheme() -> String {
    "clipped".to_string()
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
