//! Error types for the estimators and the CLI.
//!
//! Every error is raised at the point of detection. No estimator returns a
//! partial result alongside an error, and nothing is retried.

use ibs_config::ValidationError;
use ibs_math::{SmoothingError, SpecialFunctionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Result type alias for estimator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller supplied an argument outside its domain.
    Argument,
    /// A name did not resolve to a known scheme or method.
    Lookup,
    /// Special-function input outside the supported domain.
    Numeric,
    /// The simulator did not produce a match within the attempt cap.
    Sampling,
    /// Settings could not be loaded or validated.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Argument => write!(f, "argument"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Numeric => write!(f, "numeric"),
            ErrorCategory::Sampling => write!(f, "sampling"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Errors raised by the estimators.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown {kind} '{name}'")]
    UnknownKey { kind: &'static str, name: String },

    #[error("unsupported input: {0}")]
    Unsupported(#[from] SpecialFunctionError),

    #[error("trial {trial} produced no match after {attempts} attempts")]
    AttemptLimitExceeded { trial: usize, attempts: u64 },

    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an invalid-argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) => ErrorCategory::Argument,
            Error::UnknownKey { .. } => ErrorCategory::Lookup,
            Error::Unsupported(_) => ErrorCategory::Numeric,
            Error::AttemptLimitExceeded { .. } => ErrorCategory::Sampling,
            Error::Config(_) => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::InvalidArgument(_) => ExitCode::ArgsError,
            Error::UnknownKey { .. } => ExitCode::UnknownKey,
            Error::Unsupported(_) => ExitCode::InternalError,
            Error::AttemptLimitExceeded { .. } => ExitCode::AttemptLimit,
            Error::Config(_) => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

impl From<SmoothingError> for Error {
    fn from(err: SmoothingError) -> Self {
        match err {
            SmoothingError::UnknownScheme { name } => Error::UnknownKey {
                kind: "smoothing scheme",
                name,
            },
            other => Error::InvalidArgument(other.to_string()),
        }
    }
}
