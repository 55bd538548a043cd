//! Error types for analytical pricing operations.
//!
//! This module provides:
//! - `AnalyticalError`: Errors specific to the closed-form Black-Scholes pricer

use pricer_core::types::PricingError;
use thiserror::Error;

/// Analytical pricing errors.
///
/// # Variants
/// - `InvalidParameter`: A model input is out of range (S, K, T, σ ≤ 0 or non-finite r)
/// - `NumericalInstability`: Degenerate σ√T or a non-finite intermediate result
/// - `InvalidGrid`: Empty or invalid spot/maturity grid for a surface
///
/// # Examples
/// ```
/// use pricer_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidParameter { name: "volatility", value: -0.2 };
/// assert_eq!(format!("{}", err), "Invalid parameter: volatility = -0.2");
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// A model parameter failed validation.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// Parameter name (`spot`, `strike`, `expiry`, `rate`, `volatility`)
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
    },

    /// Invalid evaluation grid.
    #[error("Invalid grid: {message}")]
    InvalidGrid {
        /// Description of the grid problem
        message: String,
    },
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        match err {
            AnalyticalError::InvalidParameter { .. } | AnalyticalError::InvalidGrid { .. } => {
                PricingError::InvalidInput(err.to_string())
            }
            AnalyticalError::NumericalInstability { .. } => {
                PricingError::NumericalInstability(err.to_string())
            }
        }
    }
}
