//! European option definitions.
//!
//! - [`OptionParameters`]: validated `{S, K, T, r, σ}` value type
//! - [`OptionType`]: call/put selector with exact and smoothed payoffs
//!
//! # Examples
//!
//! ```
//! use pricer_models::instruments::{OptionParameters, OptionType};
//!
//! let params = OptionParameters::new(110.0_f64, 100.0, 1.0, 0.05, 0.2).unwrap();
//! assert_eq!(OptionType::Call.payoff(params.spot(), params.strike()), 10.0);
//!
//! // "Modified" parameters are fresh, re-validated values
//! let shifted = params.with_spot(90.0).unwrap();
//! assert_eq!(OptionType::Call.payoff(shifted.spot(), shifted.strike()), 0.0);
//! assert_eq!(params.spot(), 110.0);
//! ```

mod params;
mod payoff;

pub use params::OptionParameters;
pub use payoff::{OptionType, ParseOptionTypeError};
