//! Fixed training point sets.
//!
//! Points are sampled once per training run from the seeded generator and
//! held for every epoch.

use crate::autodiff::Matrix;
use crate::error::PinnError;
use crate::problem::PinnProblem;
use crate::rng::PinnRng;

/// Sizes and lower spot bound of the sampled sets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SamplingPlan {
    /// Interior points for the PDE residual.
    pub n_collocation: usize,
    /// Points in each of the terminal, lower and upper boundary sets.
    pub n_boundary: usize,
    /// Smallest interior spot; keeps collocation away from S = 0.
    pub min_spot: f64,
}

impl Default for SamplingPlan {
    fn default() -> Self {
        Self {
            n_collocation: 5000,
            n_boundary: 500,
            min_spot: 0.1,
        }
    }
}

/// Column vectors of sampled points and their targets.
///
/// - collocation: S in `[min_spot, s_max)`, t in `[0, T)`
/// - terminal: S in `[0, s_max)` at t = T, target max(S - K, 0)
/// - lower boundary: S = 0, t in `[0, T)`, target 0
/// - upper boundary: S = s_max, t in `[0, T)`, target s_max - K·e^(-r(T-t))
#[derive(Debug, Clone)]
pub struct TrainingData {
    collocation_spots: Matrix,
    collocation_times: Matrix,
    terminal_spots: Matrix,
    terminal_times: Matrix,
    terminal_targets: Matrix,
    lower_spots: Matrix,
    lower_times: Matrix,
    upper_spots: Matrix,
    upper_times: Matrix,
    upper_targets: Matrix,
}

fn column(values: Vec<f64>) -> Matrix {
    Matrix::from_vec(values.len(), 1, values)
}

impl TrainingData {
    /// Samples every point set for `problem`.
    ///
    /// # Errors
    /// `PinnError::InvalidConfig` if a set would be empty or `min_spot` lies
    /// outside `[0, s_max)`.
    pub fn generate(problem: &PinnProblem, plan: &SamplingPlan, rng: &mut PinnRng) -> Result<Self, PinnError> {
        if plan.n_collocation == 0 {
            return Err(PinnError::InvalidConfig {
                name: "n_collocation",
                message: "must be positive".to_string(),
            });
        }
        if plan.n_boundary == 0 {
            return Err(PinnError::InvalidConfig {
                name: "n_boundary",
                message: "must be positive".to_string(),
            });
        }
        if !(plan.min_spot >= 0.0 && plan.min_spot < problem.s_max()) {
            return Err(PinnError::InvalidConfig {
                name: "min_spot",
                message: format!("{} is outside [0, {})", plan.min_spot, problem.s_max()),
            });
        }

        let (s_max, expiry) = (problem.s_max(), problem.expiry());
        let (nc, nb) = (plan.n_collocation, plan.n_boundary);

        let collocation_spots = rng.uniform_vec(nc, plan.min_spot, s_max);
        let collocation_times = rng.uniform_vec(nc, 0.0, expiry);

        let terminal_spots = rng.uniform_vec(nb, 0.0, s_max);
        let terminal_targets = terminal_spots.iter().map(|&s| problem.terminal_value(s)).collect();

        let lower_times = rng.uniform_vec(nb, 0.0, expiry);
        let upper_times = rng.uniform_vec(nb, 0.0, expiry);
        let upper_targets = upper_times.iter().map(|&t| problem.upper_boundary_value(t)).collect();

        tracing::debug!(
            collocation = nc,
            boundary = nb,
            s_max,
            "sampled training points"
        );

        Ok(Self {
            collocation_spots: column(collocation_spots),
            collocation_times: column(collocation_times),
            terminal_spots: column(terminal_spots),
            terminal_times: Matrix::from_element(nb, 1, expiry),
            terminal_targets: column(terminal_targets),
            lower_spots: Matrix::zeros(nb, 1),
            lower_times: column(lower_times),
            upper_spots: Matrix::from_element(nb, 1, s_max),
            upper_times: column(upper_times),
            upper_targets: column(upper_targets),
        })
    }

    /// Number of collocation points.
    pub fn n_collocation(&self) -> usize {
        self.collocation_spots.nrows()
    }

    /// Number of points in each terminal and boundary set.
    pub fn n_boundary(&self) -> usize {
        self.terminal_spots.nrows()
    }

    /// Collocation spots and times.
    pub fn collocation(&self) -> (&[f64], &[f64]) {
        (self.collocation_spots.as_slice(), self.collocation_times.as_slice())
    }

    /// Terminal spots and payoffs.
    pub fn terminal(&self) -> (&[f64], &[f64]) {
        (self.terminal_spots.as_slice(), self.terminal_targets.as_slice())
    }

    /// Lower boundary times.
    pub fn lower_boundary_times(&self) -> &[f64] {
        self.lower_times.as_slice()
    }

    /// Upper boundary times and targets.
    pub fn upper_boundary(&self) -> (&[f64], &[f64]) {
        (self.upper_times.as_slice(), self.upper_targets.as_slice())
    }

    /// Data inputs of the loss program, in declaration order.
    pub(crate) fn loss_inputs(&self) -> [&Matrix; 10] {
        [
            &self.collocation_spots,
            &self.collocation_times,
            &self.terminal_spots,
            &self.terminal_times,
            &self.terminal_targets,
            &self.lower_spots,
            &self.lower_times,
            &self.upper_spots,
            &self.upper_times,
            &self.upper_targets,
        ]
    }
}
