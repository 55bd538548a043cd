//! Error types for the neural pricer.
//!
//! This module provides:
//! - `PinnError`: Errors from network construction, the autodiff tape,
//!   training and prediction

use pricer_core::types::PricingError;
use pricer_models::analytical::AnalyticalError;
use thiserror::Error;

/// Neural pricer errors.
///
/// # Variants
/// - `InvalidParameter`: Option or domain parameter out of range
/// - `InvalidConfig`: Training configuration rejected by validation
/// - `ShapeMismatch`: Input arrays or matrices of the wrong size
/// - `TrainingDivergence`: Total loss became NaN or infinite
/// - `Cancelled`: Training stopped by its progress sink
/// - `Graph`: Inconsistent autodiff program
/// - `Analytical`: Error from the closed-form reference pricer
///
/// # Examples
/// ```
/// use pricer_pinn::PinnError;
///
/// let err = PinnError::TrainingDivergence { epoch: 12, loss: f64::NAN };
/// assert_eq!(err.to_string(), "Training diverged at epoch 12: loss = NaN");
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PinnError {
    /// A problem parameter failed validation.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A configuration field failed validation.
    #[error("Invalid configuration '{name}': {message}")]
    InvalidConfig {
        /// Configuration field
        name: &'static str,
        /// Why it was rejected
        message: String,
    },

    /// Shapes of inputs do not agree.
    #[error("Shape mismatch in {context}: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    ShapeMismatch {
        /// Where the mismatch was detected
        context: String,
        /// Expected (rows, cols)
        expected: (usize, usize),
        /// Actual (rows, cols)
        actual: (usize, usize),
    },

    /// Total loss was not finite.
    #[error("Training diverged at epoch {epoch}: loss = {loss}")]
    TrainingDivergence {
        /// Epoch at which the non-finite loss was observed
        epoch: usize,
        /// The offending loss value
        loss: f64,
    },

    /// Training was cancelled between epochs.
    #[error("Training cancelled before epoch {epoch}")]
    Cancelled {
        /// First epoch that was not run
        epoch: usize,
    },

    /// Autodiff program is internally inconsistent.
    #[error("Graph evaluation failed: {message}")]
    Graph {
        /// Description of the inconsistency
        message: String,
    },

    /// Error from the analytic pricer.
    #[error(transparent)]
    Analytical(#[from] AnalyticalError),
}

impl From<PinnError> for PricingError {
    fn from(err: PinnError) -> Self {
        match err {
            PinnError::InvalidParameter { .. }
            | PinnError::InvalidConfig { .. }
            | PinnError::ShapeMismatch { .. } => PricingError::InvalidInput(err.to_string()),
            PinnError::TrainingDivergence { .. } => PricingError::NumericalInstability(err.to_string()),
            PinnError::Cancelled { .. } => PricingError::Cancelled(err.to_string()),
            PinnError::Graph { .. } => PricingError::ModelFailure(err.to_string()),
            PinnError::Analytical(inner) => inner.into(),
        }
    }
}
