//! CLI error types.

use std::path::PathBuf;

use pricer_core::types::PricingError;
use pricer_models::analytical::AnalyticalError;
use pricer_pinn::PinnError;
use thiserror::Error;

/// Errors surfaced by `bs-pinn` commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Analytic pricing or PINN training failure
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// JSON serialisation failure
    #[error("Serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Training worker panicked or was aborted
    #[error("Training task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<AnalyticalError> for CliError {
    fn from(err: AnalyticalError) -> Self {
        CliError::Pricing(err.into())
    }
}

impl From<PinnError> for CliError {
    fn from(err: PinnError) -> Self {
        CliError::Pricing(err.into())
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
