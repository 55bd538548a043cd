//! Training loop.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::config::TrainingConfig;
use super::history::{TrainingHistory, TrainingRecord};
use super::progress::ProgressSink;
use crate::dataset::TrainingData;
use crate::error::PinnError;
use crate::loss::{LossBreakdown, LossComposer, LossEvaluation, LossShapes};
use crate::network::PinnNetwork;
use crate::optimiser::Optimiser;
use crate::predictor::TrainedPinn;
use crate::problem::PinnProblem;
use crate::rng::PinnRng;

/// Lifecycle of a [`PinnTrainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    /// Network initialised, no data yet.
    Created,
    /// Point sets sampled and fixed.
    DataGenerated,
    /// Running the given epoch.
    Training {
        /// Current zero-based epoch.
        epoch: usize,
    },
    /// Finished; the trainer has become a [`TrainedPinn`].
    Trained,
}

/// Trains a [`PinnNetwork`] for one option problem.
///
/// A single seeded generator initialises the network and then samples the
/// data, so the configuration's seed reproduces a run exactly. The dataset
/// is sampled once and reused by every epoch; the epoch count is the only
/// stopping criterion.
///
/// # Examples
/// ```
/// use pricer_pinn::training::{NoProgress, PinnTrainer, TrainingConfig};
///
/// let config = TrainingConfig::builder()
///     .layers(vec![2, 8, 1])
///     .epochs(5)
///     .n_collocation(32)
///     .n_boundary(8)
///     .build()
///     .unwrap();
///
/// let trainer = PinnTrainer::new(100.0, 1.0, 0.05, 0.2, config).unwrap();
/// let model = trainer.train(&mut NoProgress).unwrap();
/// assert_eq!(model.history().len(), 1);
/// ```
#[derive(Debug)]
pub struct PinnTrainer {
    config: TrainingConfig,
    network: PinnNetwork,
    rng: PinnRng,
    data: Option<TrainingData>,
    phase: TrainingPhase,
}

impl PinnTrainer {
    /// Trainer for a call with strike K, expiry T, rate r and volatility σ
    /// on `[0, multiplier·K]`, the multiplier coming from `config`.
    ///
    /// # Errors
    /// `PinnError::InvalidParameter` if the option parameters are invalid.
    pub fn new(
        strike: f64,
        expiry: f64,
        rate: f64,
        volatility: f64,
        config: TrainingConfig,
    ) -> Result<Self, PinnError> {
        let problem =
            PinnProblem::with_domain_multiplier(strike, expiry, rate, volatility, config.domain_multiplier())?;
        Ok(Self::with_problem(problem, config))
    }

    /// Trainer for an explicit problem.
    pub fn with_problem(problem: PinnProblem, config: TrainingConfig) -> Self {
        let mut rng = PinnRng::from_seed(config.seed());
        let network = PinnNetwork::new(config.architecture().clone(), problem, &mut rng);
        debug!(
            layers = ?config.architecture().layers(),
            parameters = config.architecture().num_parameters(),
            "initialised network"
        );
        Self {
            config,
            network,
            rng,
            data: None,
            phase: TrainingPhase::Created,
        }
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// Configuration of the run.
    #[inline]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Problem being trained for.
    #[inline]
    pub fn problem(&self) -> &PinnProblem {
        self.network.problem()
    }

    /// Network in its current state.
    #[inline]
    pub fn network(&self) -> &PinnNetwork {
        &self.network
    }

    /// Sampled data, once generated.
    #[inline]
    pub fn data(&self) -> Option<&TrainingData> {
        self.data.as_ref()
    }

    /// Samples the training points. Later calls return the existing sets.
    ///
    /// # Errors
    /// `PinnError::InvalidConfig` if the sampling plan does not fit the
    /// problem domain.
    pub fn generate_data(&mut self) -> Result<&TrainingData, PinnError> {
        if self.data.is_none() {
            let data = TrainingData::generate(self.network.problem(), self.config.sampling(), &mut self.rng)?;
            self.phase = TrainingPhase::DataGenerated;
            self.data = Some(data);
        }
        self.data.as_ref().ok_or_else(|| PinnError::Graph {
            message: "training data missing after generation".to_string(),
        })
    }

    /// Runs every epoch and returns the trained model.
    ///
    /// Generates the data first if needed. `sink` receives a progress call
    /// every `log_every` epochs and a final `(1.0, "Training complete")`.
    ///
    /// # Errors
    /// - `PinnError::TrainingDivergence` as soon as the total loss is NaN
    ///   or infinite; the offending record is not logged
    /// - `PinnError::Cancelled` if `sink` reports cancellation
    pub fn train<S>(mut self, sink: &mut S) -> Result<TrainedPinn, PinnError>
    where
        S: ProgressSink + ?Sized,
    {
        let started = Instant::now();
        self.generate_data()?;
        let data = match self.data.take() {
            Some(data) => data,
            None => {
                return Err(PinnError::Graph {
                    message: "training data missing".to_string(),
                })
            }
        };

        let composer = LossComposer::compile(&self.network, self.network.problem(), self.config.weights(), LossShapes::of(&data), true)?;
        let mut optimiser = Optimiser::new(
            self.config.optimiser(),
            self.config.learning_rate(),
            &self.config.architecture().parameter_shapes(),
        );

        let epochs = self.config.epochs();
        let log_every = self.config.log_every();
        let console_every = self.config.console_every();
        let mut history = TrainingHistory::with_capacity(epochs / log_every + 1);

        info!(
            strike = self.problem().strike(),
            expiry = self.problem().expiry(),
            rate = self.problem().rate(),
            volatility = self.problem().volatility(),
            epochs,
            optimiser = %self.config.optimiser(),
            "starting training"
        );

        for epoch in 0..epochs {
            if sink.is_cancelled() {
                warn!(epoch, "training cancelled");
                return Err(PinnError::Cancelled { epoch });
            }
            self.phase = TrainingPhase::Training { epoch };

            let LossEvaluation { breakdown, gradients } = composer.evaluate(&self.network, &data)?;
            ensure_finite(epoch, &breakdown)?;
            optimiser.step(self.network.parameters_mut(), &gradients)?;

            if epoch % log_every == 0 {
                history.push(TrainingRecord::new(epoch, breakdown));
                let message = format!("Epoch {}/{} - Loss: {:.6}", epoch, epochs, breakdown.total);
                sink.on_progress((epoch + 1) as f64 / epochs as f64, &message);
            }
            if epoch % console_every == 0 {
                info!(
                    epoch,
                    total = breakdown.total,
                    pde = breakdown.pde,
                    terminal = breakdown.terminal,
                    boundary = breakdown.boundary,
                    "training loss"
                );
            }
        }

        sink.on_progress(1.0, "Training complete");
        let elapsed = started.elapsed();
        info!(
            elapsed_secs = elapsed.as_secs_f64(),
            final_loss = history.last().map(|r| r.total),
            "training complete"
        );

        self.phase = TrainingPhase::Trained;
        Ok(TrainedPinn::new(self.network, history, self.config, elapsed))
    }
}

fn ensure_finite(epoch: usize, breakdown: &LossBreakdown) -> Result<(), PinnError> {
    if breakdown.is_finite() {
        Ok(())
    } else {
        warn!(epoch, loss = breakdown.total, "loss is not finite");
        Err(PinnError::TrainingDivergence {
            epoch,
            loss: breakdown.total,
        })
    }
}
