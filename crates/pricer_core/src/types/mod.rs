//! Core numeric and error types.
//!
//! This module provides:
//! - `dual`: num-dual aliases for forward-mode automatic differentiation (when `num-dual-mode` feature is enabled)
//! - `error`: Structured top-level error type for pricing and training operations
//!
//! # Re-exports
//!
//! - [`PricingError`] from `error`

#[cfg(feature = "num-dual-mode")]
pub mod dual;
pub mod error;

pub use error::PricingError;
