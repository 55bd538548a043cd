//! Analytical pricing formulas for European options.
//!
//! - [`BlackScholes`]: closed-form prices, greeks and put-call parity
//! - [`price_surface`] / [`greek_profile`]: parallel grid evaluation
//! - [`norm_cdf`] / [`norm_pdf`]: standard normal distribution
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`**: the closed forms run on `f64` and `f32`
//! - **Pure**: a model is an immutable value; surfaces price each cell from
//!   a fresh parameter value
//! - **Numerical Stability**: erfc-based CDF with exact reflection

pub mod black_scholes;
pub mod distributions;
pub mod error;
pub mod greeks;
pub mod surface;

pub use black_scholes::{call_price, put_price, BlackScholes, MIN_TOTAL_VOLATILITY};
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use greeks::{Greeks, PricingResult};
pub use surface::{greek_profile, linspace, price_surface, PriceSurface};
