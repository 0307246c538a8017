//! Error mapping guide:
//! - Every failure of a smoketest run exits with status 1; the variants only
//!   choose how the message is rendered.
//! - Check failures are the single "response did not carry the success marker"
//!   outcome. Network errors, HTTP error statuses and malformed bodies all
//!   collapse into it.
//! - Internal plumbing (exec, db init) uses anyhow and is wrapped into Setup
//!   at the module boundary.
use std::fmt;

/// Failure outcome of a smoketest run.
#[derive(Debug)]
pub enum SmokeError {
    /// Unsupported command-line argument.
    Usage(String),
    /// Invalid environment or `.env` configuration.
    Config(String),
    /// A prerequisite (database initialization, HTTP client) could not be set up.
    Setup(anyhow::Error),
    /// An endpoint response did not contain the success marker.
    Check { step: String, detail: String },
}

impl SmokeError {
    pub fn check(step: impl Into<String>, detail: impl Into<String>) -> Self {
        SmokeError::Check {
            step: step.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SmokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_for_smoke_error(self))
    }
}

impl std::error::Error for SmokeError {}

impl From<anyhow::Error> for SmokeError {
    fn from(e: anyhow::Error) -> Self {
        SmokeError::Setup(e)
    }
}

/// Convert a SmokeError to the process exit code.
pub fn exit_code_for_smoke_error(e: &SmokeError) -> u8 {
    match e {
        SmokeError::Usage(_)
        | SmokeError::Config(_)
        | SmokeError::Setup(_)
        | SmokeError::Check { .. } => 1,
    }
}

/// Render the user-facing line for a SmokeError.
pub fn display_for_smoke_error(e: &SmokeError) -> String {
    match e {
        SmokeError::Usage(s) => s.clone(),
        SmokeError::Config(s) => format!("Invalid configuration: {s}"),
        SmokeError::Setup(err) => format!("{err:#}"),
        SmokeError::Check { step, detail } if detail.is_empty() => format!("Failed to {step}."),
        SmokeError::Check { step, detail } => format!("Failed to {step}: {detail}"),
    }
}
