//! Inference with a trained approximator.

use std::borrow::Cow;
use std::time::Duration;

use pricer_core::types::dual::{DualNumber, SecondOrderDual};
use rayon::prelude::*;

use crate::error::PinnError;
use crate::network::PinnNetwork;
use crate::problem::PinnProblem;
use crate::training::{TrainingConfig, TrainingHistory};

/// Points per parallel chunk in [`TrainedPinn::predict`].
pub const PREDICT_CHUNK: usize = 2048;

/// Times at which to evaluate a batch of spots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeQuery<'a> {
    /// One time for every spot.
    Fixed(f64),
    /// One time per spot. A single-element slice applies to every spot.
    PerPoint(&'a [f64]),
}

impl<'a> TimeQuery<'a> {
    fn resolve(self, n: usize) -> Result<Cow<'a, [f64]>, PinnError> {
        match self {
            TimeQuery::Fixed(t) => Ok(Cow::Owned(vec![t; n])),
            TimeQuery::PerPoint(times) if times.len() == n => Ok(Cow::Borrowed(times)),
            TimeQuery::PerPoint(&[t]) => Ok(Cow::Owned(vec![t; n])),
            TimeQuery::PerPoint(times) => Err(PinnError::ShapeMismatch {
                context: "predict times".to_string(),
                expected: (n, 1),
                actual: (times.len(), 1),
            }),
        }
    }
}

/// Value and sensitivities of the approximator at one point.
///
/// Computed by forward-mode AD through the network. `theta` is ∂V/∂t per
/// year of calendar time; divide by 365 for the per-day convention of
/// [`Greeks`](pricer_models::analytical::Greeks).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PinnGreeks {
    /// V(S, t)
    pub value: f64,
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂t
    pub theta: f64,
}

/// A trained network with its training record.
///
/// Read-only, `Send + Sync`; safe to share across threads for prediction.
#[derive(Debug, Clone)]
pub struct TrainedPinn {
    network: PinnNetwork,
    history: TrainingHistory,
    config: TrainingConfig,
    training_time: Duration,
}

impl TrainedPinn {
    pub(crate) fn new(
        network: PinnNetwork,
        history: TrainingHistory,
        config: TrainingConfig,
        training_time: Duration,
    ) -> Self {
        Self {
            network,
            history,
            config,
            training_time,
        }
    }

    /// Predicted option values at each spot.
    ///
    /// Batches larger than [`PREDICT_CHUNK`] are split and evaluated in
    /// parallel.
    ///
    /// # Errors
    /// `PinnError::ShapeMismatch` if a `PerPoint` query has neither one time
    /// nor one time per spot.
    pub fn predict(&self, spots: &[f64], times: TimeQuery<'_>) -> Result<Vec<f64>, PinnError> {
        let times = times.resolve(spots.len())?;
        if spots.len() <= PREDICT_CHUNK {
            return self.network.forward(spots, &times);
        }

        let chunks = spots
            .par_chunks(PREDICT_CHUNK)
            .zip(times.par_chunks(PREDICT_CHUNK))
            .map(|(s, t)| self.network.forward(s, t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks.concat())
    }

    /// Predicted value at a single point.
    pub fn predict_point(&self, spot: f64, t: f64) -> f64 {
        self.network.forward_point(spot, t)
    }

    /// Value, delta, gamma and theta at a single point.
    pub fn point_greeks(&self, spot: f64, t: f64) -> PinnGreeks {
        let in_spot = self
            .network
            .forward_point(SecondOrderDual::new(spot, 1.0, 0.0), SecondOrderDual::from(t));
        let in_time = self.network.forward_point(DualNumber::from(spot), DualNumber::new(t, 1.0));
        PinnGreeks {
            value: in_spot.re,
            delta: in_spot.v1,
            gamma: in_spot.v2,
            theta: in_time.eps,
        }
    }

    /// Loss history of the training run.
    #[inline]
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Problem the network was trained for.
    #[inline]
    pub fn problem(&self) -> &PinnProblem {
        self.network.problem()
    }

    /// Trained network.
    #[inline]
    pub fn network(&self) -> &PinnNetwork {
        &self.network
    }

    /// Configuration of the training run.
    #[inline]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Wall-clock duration of training.
    #[inline]
    pub fn training_time(&self) -> Duration {
        self.training_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Architecture;
    use crate::rng::PinnRng;
    use approx::assert_relative_eq;

    fn model() -> TrainedPinn {
        let config = TrainingConfig::builder().layers(vec![2, 8, 8, 1]).build().unwrap();
        let problem = PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.2, 4.0).unwrap();
        let network = PinnNetwork::new(
            Architecture::new(vec![2, 8, 8, 1]).unwrap(),
            problem,
            &mut PinnRng::from_seed(17),
        );
        TrainedPinn::new(network, TrainingHistory::new(), config, Duration::ZERO)
    }

    #[test]
    fn test_fixed_time_broadcasts() {
        let m = model();
        let spots = [80.0, 100.0, 120.0];
        let fixed = m.predict(&spots, TimeQuery::Fixed(0.25)).unwrap();
        let paired = m.predict(&spots, TimeQuery::PerPoint(&[0.25, 0.25, 0.25])).unwrap();
        let single = m.predict(&spots, TimeQuery::PerPoint(&[0.25])).unwrap();
        assert_eq!(fixed, paired);
        assert_eq!(fixed, single);
        assert_relative_eq!(fixed[1], m.predict_point(100.0, 0.25), epsilon = 1e-12);
    }

    #[test]
    fn test_time_length_mismatch() {
        let m = model();
        let err = m.predict(&[1.0, 2.0, 3.0], TimeQuery::PerPoint(&[0.1, 0.2])).unwrap_err();
        assert_eq!(
            err,
            PinnError::ShapeMismatch {
                context: "predict times".to_string(),
                expected: (3, 1),
                actual: (2, 1),
            }
        );
    }

    #[test]
    fn test_chunked_prediction_matches_single_batch() {
        let m = model();
        let n = 2 * PREDICT_CHUNK + 17;
        let spots: Vec<f64> = (0..n).map(|i| 400.0 * i as f64 / n as f64).collect();
        let times: Vec<f64> = (0..n).map(|i| (i % 100) as f64 / 100.0).collect();

        let chunked = m.predict(&spots, TimeQuery::PerPoint(&times)).unwrap();
        let direct = m.network().forward(&spots, &times).unwrap();
        assert_eq!(chunked.len(), n);
        for (a, b) in chunked.iter().zip(&direct) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_query() {
        let m = model();
        assert!(m.predict(&[], TimeQuery::Fixed(0.0)).unwrap().is_empty());
    }

    #[test]
    fn test_point_greeks_value_matches_predict() {
        let m = model();
        let g = m.point_greeks(110.0, 0.3);
        assert_relative_eq!(g.value, m.predict_point(110.0, 0.3), epsilon = 1e-12);
        let h = 1e-4;
        let fd = (m.predict_point(110.0 + h, 0.3) - m.predict_point(110.0 - h, 0.3)) / (2.0 * h);
        assert_relative_eq!(g.delta, fd, epsilon = 1e-6);
    }

    #[test]
    fn test_trained_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrainedPinn>();
    }
}
