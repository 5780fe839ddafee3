//! Configuration validation errors and semantic validation.

use ibs_math::SmoothingScheme;
use thiserror::Error;

use crate::settings::Settings;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown smoothing scheme for {field}: '{name}'")]
    UnknownScheme { field: String, name: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::UnknownScheme { .. } => 62,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Parse a scheme name, reporting which field held it.
pub fn parse_scheme(field: &str, name: &str) -> ValidationResult<SmoothingScheme> {
    name.parse::<SmoothingScheme>()
        .map_err(|_| ValidationError::UnknownScheme {
            field: field.to_string(),
            name: name.to_string(),
        })
}

/// Validate settings semantically.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    if settings.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: settings.schema_version.clone(),
        });
    }

    // IBS
    if settings.ibs.repeats == 0 {
        return Err(invalid("ibs.repeats", "must be at least 1"));
    }
    if settings.ibs.max_attempts == Some(0) {
        return Err(invalid("ibs.max_attempts", "must be at least 1 when set"));
    }

    // Fixed sampling
    let scheme = parse_scheme("fixed.scheme", &settings.fixed.scheme)?;
    if settings.fixed.samples_per_trial == 0 && scheme.requires_samples() {
        return Err(invalid(
            "fixed.samples_per_trial",
            format!("{} smoothing requires at least one sample", scheme),
        ));
    }

    // Analytic
    let tol = settings.analytic.dilog_tolerance;
    if !tol.is_finite() || tol <= 0.0 {
        return Err(invalid(
            "analytic.dilog_tolerance",
            format!("must be positive and finite (got {})", tol),
        ));
    }
    if settings.analytic.dilog_max_terms == 0 {
        return Err(invalid("analytic.dilog_max_terms", "must be at least 1"));
    }

    validate_experiment(settings)
}

fn validate_experiment(settings: &Settings) -> ValidationResult<()> {
    let exp = &settings.experiment;
    if exp.probability.is_nan() || exp.probability <= 0.0 || exp.probability > 1.0 {
        return Err(invalid(
            "experiment.probability",
            format!("must be in (0, 1] (got {})", exp.probability),
        ));
    }
    if exp.trials == 0 {
        return Err(invalid("experiment.trials", "must be at least 1"));
    }
    if exp.repetitions == 0 {
        return Err(invalid("experiment.repetitions", "must be at least 1"));
    }
    if exp.fixed_samples.is_empty() {
        return Err(invalid("experiment.fixed_samples", "must not be empty"));
    }
    if exp.ibs_repeats.is_empty() {
        return Err(invalid("experiment.ibs_repeats", "must not be empty"));
    }
    if exp.ibs_repeats.contains(&0) {
        return Err(invalid("experiment.ibs_repeats", "repeat counts must be at least 1"));
    }
    let scheme = parse_scheme("experiment.scheme", &exp.scheme)?;
    if scheme.requires_samples() && exp.fixed_samples.contains(&0) {
        return Err(invalid(
            "experiment.fixed_samples",
            format!("{} smoothing requires budgets of at least one sample", scheme),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        validate_settings(&Settings::default()).unwrap();
    }

    #[test]
    fn test_zero_repeats_rejected() {
        let mut settings = Settings::default();
        settings.ibs.repeats = 0;
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "ibs.repeats"));
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let mut settings = Settings::default();
        settings.fixed.scheme = "fixed_2".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownScheme { ref name, .. } if name == "fixed_2"));
    }

    #[test]
    fn test_zero_samples_depends_on_scheme() {
        let mut settings = Settings::default();
        settings.fixed.samples_per_trial = 0;
        settings.fixed.scheme = "laplace".to_string();
        validate_settings(&settings).unwrap();

        settings.fixed.scheme = "naive".to_string();
        assert!(validate_settings(&settings).is_err());

        settings.fixed.scheme = "clipped".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_experiment_probability_range() {
        let mut settings = Settings::default();
        settings.experiment.probability = 0.0;
        assert!(validate_settings(&settings).is_err());
        settings.experiment.probability = 1.0;
        validate_settings(&settings).unwrap();
        settings.experiment.probability = f64::NAN;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_experiment_budgets() {
        let mut settings = Settings::default();
        settings.experiment.ibs_repeats = vec![1, 0];
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.experiment.fixed_samples = vec![];
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.experiment.fixed_samples = vec![0, 5];
        assert!(validate_settings(&settings).is_err());
        settings.experiment.scheme = "jeffreys".to_string();
        validate_settings(&settings).unwrap();
    }

    #[test]
    fn test_version_mismatch() {
        let mut settings = Settings::default();
        settings.schema_version = "0.9.0".to_string();
        assert!(matches!(
            validate_settings(&settings),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_dilog_settings() {
        let mut settings = Settings::default();
        settings.analytic.dilog_tolerance = 0.0;
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.analytic.dilog_max_terms = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
