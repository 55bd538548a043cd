//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Categorised errors surfaced by every pricing and training operation
//!
//! Crate-specific error enums (`AnalyticalError`, `PinnError`) convert into
//! `PricingError` so callers that mix the analytic and neural pricers can
//! handle a single type.

use thiserror::Error;

/// Categorised pricing errors.
///
/// Provides structured error handling for pricing operations with
/// descriptive context for each failure mode.
///
/// # Variants
/// - `InvalidInput`: Invalid option parameters or configuration
/// - `NumericalInstability`: Computation produced non-finite or degenerate values
/// - `ModelFailure`: Model could not produce a valid result (e.g. training diverged)
/// - `Cancelled`: A long-running operation was cancelled by its caller
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("Negative spot price".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: Negative spot price");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Invalid input data or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Numerical instability during computation
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Model failed to produce valid result
    #[error("Model failure: {0}")]
    ModelFailure(String),

    /// Operation cancelled before completion
    #[error("Cancelled: {0}")]
    Cancelled(String),
}
