//! Exit codes for the ibs-core CLI.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: user/environment errors (fixable by changing the invocation or config)
//! - 20-29: internal and runtime errors

/// Exit codes for ibs-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Success (0)
    // ========================================================================
    /// Command completed
    Clean = 0,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Settings file missing, unparsable or invalid
    ConfigError = 11,

    /// Unknown smoothing scheme or method name
    UnknownKey = 12,

    // ========================================================================
    // Internal / Runtime Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,

    /// IBS attempt cap reached without a match
    AttemptLimit = 22,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::UnknownKey => "ERR_UNKNOWN_KEY",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
            ExitCode::AttemptLimit => "ERR_ATTEMPT_LIMIT",
        }
    }
}
