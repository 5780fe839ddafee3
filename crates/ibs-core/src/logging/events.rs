//! Structured event definitions for logging.
//!
//! Every event carries the run ID and a stage; the config ID ties an event
//! to the settings snapshot it was produced under.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of a CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and settings resolution.
    Init,
    /// Drawing simulator responses.
    Simulate,
    /// Running an estimator.
    Estimate,
    /// Closed-form moments.
    Analyze,
    /// Writing the payload.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Simulate => "simulate",
            Stage::Estimate => "estimate",
            Stage::Analyze => "analyze",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names, used as tracing targets.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Estimators
    pub const IBS_STARTED: &str = "ibs.started";
    pub const IBS_TRIAL_DONE: &str = "ibs.trial_done";
    pub const IBS_REPEAT_DONE: &str = "ibs.repeat_done";
    pub const IBS_FINISHED: &str = "ibs.finished";
    pub const FIXED_FINISHED: &str = "fixed.finished";
    pub const ANALYTIC_COMPUTED: &str = "analytic.computed";

    // Comparison
    pub const EXPERIMENT_STARTED: &str = "experiment.started";
    pub const EXPERIMENT_ROW: &str = "experiment.row";
    pub const EXPERIMENT_FINISHED: &str = "experiment.finished";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation IDs shared by every event of a run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub config_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            config_id: None,
        }
    }

    pub fn with_config_id(mut self, config_id: impl Into<String>) -> Self {
        self.config_id = Some(config_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc");
        assert!(ctx.config_id.is_none());
        let ctx = ctx.with_config_id("cafe");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.config_id.as_deref(), Some("cafe"));
    }

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in [
            Stage::Init,
            Stage::Simulate,
            Stage::Estimate,
            Stage::Analyze,
            Stage::Report,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }
}
