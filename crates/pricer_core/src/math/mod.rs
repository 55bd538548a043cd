//! Mathematical utilities shared by the analytic and neural pricers.
//!
//! - [`smoothing`]: the smooth network activations `softplus` and
//!   `sigmoid`

pub mod smoothing;
