//! # Pricer Models (L2: Business Logic)
//!
//! European option definitions and the closed-form Black-Scholes pricer.
//!
//! This crate provides:
//! - Validated option parameters and call/put payoffs (`instruments`)
//! - Black-Scholes prices, greeks, put-call parity and summaries (`analytical`)
//! - Parallel price surfaces and greek profiles over spot/maturity grids
//!
//! The analytic prices are the reference the neural pricer in `pricer_pinn`
//! is trained against and compared with.
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_models::analytical::BlackScholes;
//! use pricer_models::instruments::{OptionParameters, OptionType};
//!
//! let params = OptionParameters::new(100.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
//! let bs = BlackScholes::from_params(&params).unwrap();
//!
//! let call = bs.price(OptionType::Call).unwrap();
//! let greeks = bs.greeks(OptionType::Call).unwrap();
//! assert!((call - 10.4506).abs() < 1e-3);
//! assert!((greeks.delta - 0.6368).abs() < 1e-3);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
