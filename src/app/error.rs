//! Errors surfaced by the workflow layer.

use thiserror::Error;

use crate::app::gate::ThresholdViolation;
use crate::error::MobsfError;

/// Anything a CLI command can fail with.
///
/// Every variant ends the process with exit status 1; the message is
/// printed as `Error: <message>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A MobSF API call failed.
    #[error(transparent)]
    Service(#[from] MobsfError),

    /// The scan finished but did not pass the CI gate.
    #[error(transparent)]
    Threshold(#[from] ThresholdViolation),

    /// The client could not be built from the given settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing command output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Serializing `--json` output failed.
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type alias for workflow operations.
pub type AppResult<T> = core::result::Result<T, AppError>;
