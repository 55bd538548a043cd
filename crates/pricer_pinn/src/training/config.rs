//! Training configuration.
//!
//! This module provides [`TrainingConfig`] and its builder. Every field has
//! a default; `build()` validates the combination.

use crate::dataset::SamplingPlan;
use crate::error::PinnError;
use crate::loss::LossWeights;
use crate::network::{Architecture, DEFAULT_LAYERS};
use crate::optimiser::OptimiserKind;

/// Default optimiser step size.
pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;

/// Default number of epochs.
pub const DEFAULT_EPOCHS: usize = 1000;

/// Default history and progress cadence, in epochs.
pub const DEFAULT_LOG_EVERY: usize = 10;

/// Default console logging cadence, in epochs.
pub const DEFAULT_CONSOLE_EVERY: usize = 500;

/// Default seed for initialisation and sampling.
pub const DEFAULT_SEED: u64 = 42;

/// Default ratio S_max / K.
pub const DEFAULT_DOMAIN_MULTIPLIER: f64 = 4.0;

/// Configuration of one training run.
///
/// Immutable once built. Use [`TrainingConfigBuilder`] to construct.
///
/// # Examples
///
/// ```rust
/// use pricer_pinn::training::TrainingConfig;
///
/// let config = TrainingConfig::builder()
///     .layers(vec![2, 20, 20, 1])
///     .epochs(500)
///     .learning_rate(0.01)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.architecture().layers(), &[2, 20, 20, 1]);
/// assert_eq!(config.log_every(), 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrainingConfig {
    architecture: Architecture,
    learning_rate: f64,
    epochs: usize,
    sampling: SamplingPlan,
    log_every: usize,
    console_every: usize,
    weights: LossWeights,
    seed: u64,
    domain_multiplier: f64,
    optimiser: OptimiserKind,
}

impl TrainingConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Layer widths.
    #[inline]
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Optimiser step size.
    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Number of epochs; the only stopping criterion.
    #[inline]
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Point set sizes and lower spot bound.
    #[inline]
    pub fn sampling(&self) -> &SamplingPlan {
        &self.sampling
    }

    /// Epoch cadence of history records and progress callbacks.
    #[inline]
    pub fn log_every(&self) -> usize {
        self.log_every
    }

    /// Epoch cadence of `info` log lines.
    #[inline]
    pub fn console_every(&self) -> usize {
        self.console_every
    }

    /// Terminal and boundary loss weights.
    #[inline]
    pub fn weights(&self) -> LossWeights {
        self.weights
    }

    /// Seed for initialisation and sampling.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ratio S_max / K used when a trainer builds its own problem.
    #[inline]
    pub fn domain_multiplier(&self) -> f64 {
        self.domain_multiplier
    }

    /// Optimiser.
    #[inline]
    pub fn optimiser(&self) -> OptimiserKind {
        self.optimiser
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PinnError::InvalidConfig` if:
    /// - `learning_rate` is not positive and finite
    /// - `epochs`, `n_collocation`, `n_boundary`, `log_every` or
    ///   `console_every` is 0
    /// - `min_spot` is negative or not finite
    /// - `domain_multiplier` is not greater than 1
    /// - a loss weight is negative or not finite
    pub fn validate(&self) -> Result<(), PinnError> {
        let invalid = |name, message: &str| {
            Err(PinnError::InvalidConfig {
                name,
                message: message.to_string(),
            })
        };
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid("learning_rate", "must be positive and finite");
        }
        for (name, value) in [
            ("epochs", self.epochs),
            ("n_collocation", self.sampling.n_collocation),
            ("n_boundary", self.sampling.n_boundary),
            ("log_every", self.log_every),
            ("console_every", self.console_every),
        ] {
            if value == 0 {
                return invalid(name, "must be positive");
            }
        }
        if !(self.sampling.min_spot.is_finite() && self.sampling.min_spot >= 0.0) {
            return invalid("min_spot", "must be non-negative and finite");
        }
        if !(self.domain_multiplier.is_finite() && self.domain_multiplier > 1.0) {
            return invalid("domain_multiplier", "must be greater than 1");
        }
        self.weights.validate()
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            architecture: Architecture::default(),
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
            sampling: SamplingPlan::default(),
            log_every: DEFAULT_LOG_EVERY,
            console_every: DEFAULT_CONSOLE_EVERY,
            weights: LossWeights::default(),
            seed: DEFAULT_SEED,
            domain_multiplier: DEFAULT_DOMAIN_MULTIPLIER,
            optimiser: OptimiserKind::default(),
        }
    }
}

/// Builder for [`TrainingConfig`].
///
/// Unset fields take the defaults of [`TrainingConfig::default`].
///
/// # Examples
///
/// ```rust
/// use pricer_pinn::optimiser::OptimiserKind;
/// use pricer_pinn::training::TrainingConfig;
///
/// let config = TrainingConfig::builder()
///     .n_collocation(2000)
///     .n_boundary(200)
///     .loss_weights(5.0, 20.0)
///     .optimiser(OptimiserKind::GradientDescent)
///     .seed(7)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.weights().boundary, 20.0);
///
/// assert!(TrainingConfig::builder().layers(vec![2, 10, 2]).build().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TrainingConfigBuilder {
    layers: Option<Vec<usize>>,
    learning_rate: Option<f64>,
    epochs: Option<usize>,
    n_collocation: Option<usize>,
    n_boundary: Option<usize>,
    min_spot: Option<f64>,
    log_every: Option<usize>,
    console_every: Option<usize>,
    weights: Option<LossWeights>,
    seed: Option<u64>,
    domain_multiplier: Option<f64>,
    optimiser: Option<OptimiserKind>,
}

impl TrainingConfigBuilder {
    /// Sets the layer widths, inputs first. Must start with 2 and end with 1.
    #[inline]
    pub fn layers(mut self, layers: Vec<usize>) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Sets the optimiser step size.
    #[inline]
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = Some(learning_rate);
        self
    }

    /// Sets the number of epochs.
    #[inline]
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = Some(epochs);
        self
    }

    /// Sets the number of interior collocation points.
    #[inline]
    pub fn n_collocation(mut self, n: usize) -> Self {
        self.n_collocation = Some(n);
        self
    }

    /// Sets the number of points in each terminal and boundary set.
    #[inline]
    pub fn n_boundary(mut self, n: usize) -> Self {
        self.n_boundary = Some(n);
        self
    }

    /// Sets the smallest interior spot.
    #[inline]
    pub fn min_spot(mut self, min_spot: f64) -> Self {
        self.min_spot = Some(min_spot);
        self
    }

    /// Sets the history and progress cadence.
    #[inline]
    pub fn log_every(mut self, epochs: usize) -> Self {
        self.log_every = Some(epochs);
        self
    }

    /// Sets the console logging cadence.
    #[inline]
    pub fn console_every(mut self, epochs: usize) -> Self {
        self.console_every = Some(epochs);
        self
    }

    /// Sets λ_ic and λ_bc.
    #[inline]
    pub fn loss_weights(mut self, terminal: f64, boundary: f64) -> Self {
        self.weights = Some(LossWeights { terminal, boundary });
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets S_max / K.
    #[inline]
    pub fn domain_multiplier(mut self, multiplier: f64) -> Self {
        self.domain_multiplier = Some(multiplier);
        self
    }

    /// Sets the optimiser.
    #[inline]
    pub fn optimiser(mut self, kind: OptimiserKind) -> Self {
        self.optimiser = Some(kind);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PinnError::InvalidConfig` if the layer widths or any other
    /// field fail validation (see [`TrainingConfig::validate`]).
    pub fn build(self) -> Result<TrainingConfig, PinnError> {
        let defaults = SamplingPlan::default();
        let config = TrainingConfig {
            architecture: Architecture::new(self.layers.unwrap_or_else(|| DEFAULT_LAYERS.to_vec()))?,
            learning_rate: self.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
            epochs: self.epochs.unwrap_or(DEFAULT_EPOCHS),
            sampling: SamplingPlan {
                n_collocation: self.n_collocation.unwrap_or(defaults.n_collocation),
                n_boundary: self.n_boundary.unwrap_or(defaults.n_boundary),
                min_spot: self.min_spot.unwrap_or(defaults.min_spot),
            },
            log_every: self.log_every.unwrap_or(DEFAULT_LOG_EVERY),
            console_every: self.console_every.unwrap_or(DEFAULT_CONSOLE_EVERY),
            weights: self.weights.unwrap_or_default(),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            domain_multiplier: self.domain_multiplier.unwrap_or(DEFAULT_DOMAIN_MULTIPLIER),
            optimiser: self.optimiser.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
