//! Dual number type integration for automatic differentiation.
//!
//! The neural pricer differentiates its network twice: exactly, in reverse
//! mode, on the training tape, and in forward mode through these num-dual
//! types when greeks are requested at a single point. The forward-mode path
//! is also the reference the reverse-mode tape is verified against.
//!
//! ## Usage
//!
//! ```
//! use pricer_core::types::dual::{DualNumber, SecondOrderDual};
//!
//! // f(x) = x³ at x = 2
//! let x = DualNumber::new(2.0, 1.0);
//! let y = x * x * x;
//! assert_eq!(y.re, 8.0);
//! assert_eq!(y.eps, 12.0);
//!
//! let x = SecondOrderDual::new(2.0, 1.0, 0.0);
//! let y = x * x * x;
//! assert_eq!(y.v1, 12.0);
//! assert_eq!(y.v2, 12.0);
//! ```

/// Type alias for num-dual's Dual64 (first-order, f64-based dual numbers).
///
/// - `re`: Real part (function value)
/// - `eps`: Dual part (first derivative)
#[cfg(feature = "num-dual-mode")]
pub type DualNumber = num_dual::Dual64;

/// Type alias for num-dual's Dual2_64 (second-order dual numbers).
///
/// - `re`: function value
/// - `v1`: first derivative
/// - `v2`: second derivative
#[cfg(feature = "num-dual-mode")]
pub type SecondOrderDual = num_dual::Dual2_64;
