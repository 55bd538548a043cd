//! Training of the approximator.
//!
//! This module provides:
//! - [`TrainingConfig`]: validated hyperparameters, built with
//!   [`TrainingConfigBuilder`]
//! - [`PinnTrainer`]: the epoch loop, moving through [`TrainingPhase`]s
//! - [`ProgressSink`]: synchronous progress callback, with
//!   [`CancellationToken`] for stopping between epochs
//! - [`TrainingHistory`]: loss records at the logging cadence

mod config;
mod history;
mod progress;
mod trainer;

pub use config::{
    TrainingConfig, TrainingConfigBuilder, DEFAULT_CONSOLE_EVERY, DEFAULT_DOMAIN_MULTIPLIER, DEFAULT_EPOCHS,
    DEFAULT_LEARNING_RATE, DEFAULT_LOG_EVERY, DEFAULT_SEED,
};
pub use history::{TrainingHistory, TrainingRecord};
pub use progress::{Cancellable, CancellationToken, NoProgress, ProgressSink};
pub use trainer::{PinnTrainer, TrainingPhase};
