//! # pricer_pinn: Physics-Informed Neural Network Pricer
//!
//! ## Layer 3 (Learning) Role
//!
//! pricer_pinn trains a neural approximation V(S, t) of a European call
//! price by penalising violation of the Black-Scholes PDE together with the
//! terminal payoff and spot boundary conditions:
//! - Reverse-mode autodiff over dense matrices with nested gradients (`autodiff`)
//! - The tanh/softplus approximator and its three forward passes (`network`)
//! - Exact input derivatives V_t, V_S, V_SS (`derivatives`)
//! - Sampled point sets and the composite loss (`dataset`, `loss`)
//! - Adam and momentum optimisers (`optimiser`)
//! - The epoch loop with progress and cancellation (`training`)
//! - Prediction, point greeks and comparison with the closed form
//!   (`predictor`, `comparison`)
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use pricer_pinn::training::{PinnTrainer, TrainingConfig};
//! use pricer_pinn::{compare_with_analytic, TimeQuery};
//!
//! let config = TrainingConfig::builder()
//!     .layers(vec![2, 20, 20, 1])
//!     .epochs(2000)
//!     .build()
//!     .unwrap();
//!
//! let trainer = PinnTrainer::new(100.0, 1.0, 0.05, 0.2, config).unwrap();
//! let model = trainer
//!     .train(&mut |fraction: f64, message: &str| println!("{:>5.1}% {}", 100.0 * fraction, message))
//!     .unwrap();
//!
//! let at_money = model.predict(&[100.0], TimeQuery::Fixed(0.0)).unwrap();
//! let report = compare_with_analytic(&model, &[80.0, 100.0, 120.0], 0.0).unwrap();
//! println!("V(100, 0) = {:.4}, max error {:.4}", at_money[0], report.max_abs_error);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialisation of configuration, history and reports

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod autodiff;
pub mod comparison;
pub mod dataset;
pub mod derivatives;
pub mod error;
pub mod loss;
pub mod network;
pub mod optimiser;
pub mod predictor;
pub mod problem;
pub mod rng;
pub mod training;

pub use comparison::{compare_with_analytic, ComparisonReport};
pub use error::PinnError;
pub use predictor::{PinnGreeks, TimeQuery, TrainedPinn};
pub use problem::PinnProblem;
