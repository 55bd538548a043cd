//! Accuracy of a trained model against the closed-form price.

use crate::error::PinnError;
use crate::predictor::{TimeQuery, TrainedPinn};

/// PINN and Black-Scholes call values along a spot grid at one time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonReport {
    /// Calendar time of the slice.
    pub time: f64,
    /// Spot grid.
    pub spots: Vec<f64>,
    /// Network prediction at each spot.
    pub pinn: Vec<f64>,
    /// Closed-form value at each spot.
    pub analytic: Vec<f64>,
    /// |pinn - analytic| at each spot.
    pub abs_error: Vec<f64>,
    /// Largest absolute error.
    pub max_abs_error: f64,
    /// Mean absolute error.
    pub mean_abs_error: f64,
    /// Root-mean-square error.
    pub rmse: f64,
}

/// Compares `model` with the closed-form call at calendar time `t`.
///
/// The closed form is priced with `T - t` to expiry; at `t >= T` it is the
/// payoff.
///
/// # Errors
/// - `PinnError::ShapeMismatch` if `spots` is empty
/// - `PinnError::Analytical` if a spot is rejected by the closed form
pub fn compare_with_analytic(model: &TrainedPinn, spots: &[f64], t: f64) -> Result<ComparisonReport, PinnError> {
    if spots.is_empty() {
        return Err(PinnError::ShapeMismatch {
            context: "comparison spots".to_string(),
            expected: (1, 1),
            actual: (0, 1),
        });
    }

    let problem = model.problem();
    let pinn = model.predict(spots, TimeQuery::Fixed(t))?;
    let analytic = spots
        .iter()
        .map(|&s| problem.analytic_call(s, t))
        .collect::<Result<Vec<_>, _>>()?;
    let abs_error: Vec<f64> = pinn.iter().zip(&analytic).map(|(p, a)| (p - a).abs()).collect();

    let n = abs_error.len() as f64;
    let max_abs_error = abs_error.iter().copied().fold(0.0, f64::max);
    let mean_abs_error = abs_error.iter().sum::<f64>() / n;
    let rmse = (abs_error.iter().map(|e| e * e).sum::<f64>() / n).sqrt();

    Ok(ComparisonReport {
        time: t,
        spots: spots.to_vec(),
        pinn,
        analytic,
        abs_error,
        max_abs_error,
        mean_abs_error,
        rmse,
    })
}
