//! # pricer_core: Mathematical Foundation for the Black-Scholes PINN Pricer
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Smooth activation functions (`math::smoothing`)
//! - Dual number type aliases for forward-mode AD (`types::dual`)
//! - The categorised top-level error type `PricingError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - num-dual: Dual number types and automatic differentiation (optional)
//! - thiserror: Error derivation
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::smoothing::{sigmoid, softplus};
//!
//! // softplus(x) = ln(1 + e^x)
//! let sp = softplus(1.5_f64);
//! assert!((sp - 1.5_f64.exp().ln_1p()).abs() < 1e-12);
//!
//! // sigmoid is the derivative of softplus
//! assert!((sigmoid(0.0_f64) - 0.5).abs() < 1e-15);
//! ```
//!
//! ## Feature Flags
//!
//! - `num-dual-mode` (default): Export num-dual aliases used for forward-mode verification

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
