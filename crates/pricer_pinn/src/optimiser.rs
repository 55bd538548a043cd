//! First-order parameter updates.
//!
//! Both optimisers hold per-tensor state shaped like the parameters and
//! update in place.

use std::fmt;
use std::str::FromStr;

use crate::autodiff::Matrix;
use crate::error::PinnError;

/// Exponential decay of the first moment.
pub const ADAM_BETA1: f64 = 0.9;
/// Exponential decay of the second moment.
pub const ADAM_BETA2: f64 = 0.999;
/// Denominator guard.
pub const ADAM_EPSILON: f64 = 1e-7;
/// Momentum of [`GradientDescent`] unless overridden.
pub const DEFAULT_MOMENTUM: f64 = 0.9;

/// Optimiser selection for configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OptimiserKind {
    /// Bias-corrected Adam.
    #[default]
    Adam,
    /// Gradient descent with momentum.
    GradientDescent,
}

impl fmt::Display for OptimiserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimiserKind::Adam => write!(f, "adam"),
            OptimiserKind::GradientDescent => write!(f, "gradient_descent"),
        }
    }
}

impl FromStr for OptimiserKind {
    type Err = PinnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adam" => Ok(OptimiserKind::Adam),
            "gradient_descent" | "gd" | "sgd" => Ok(OptimiserKind::GradientDescent),
            other => Err(PinnError::InvalidConfig {
                name: "optimiser",
                message: format!("unknown optimiser '{}'", other),
            }),
        }
    }
}

fn check_shapes(params: &[Matrix], grads: &[Matrix], state: &[Matrix]) -> Result<(), PinnError> {
    if params.len() != state.len() || grads.len() != state.len() {
        return Err(PinnError::ShapeMismatch {
            context: "optimiser tensor count".to_string(),
            expected: (state.len(), 1),
            actual: (params.len().min(grads.len()), 1),
        });
    }
    for (i, ((p, g), s)) in params.iter().zip(grads).zip(state).enumerate() {
        for m in [p, g] {
            if m.shape() != s.shape() {
                return Err(PinnError::ShapeMismatch {
                    context: format!("optimiser tensor {}", i),
                    expected: s.shape(),
                    actual: m.shape(),
                });
            }
        }
    }
    Ok(())
}

/// Adam with bias correction.
///
/// ```text
/// m ← β1·m + (1-β1)·g
/// v ← β2·v + (1-β2)·g²
/// θ ← θ - lr · m̂ / (√v̂ + ε),  m̂ = m/(1-β1ᵗ), v̂ = v/(1-β2ᵗ)
/// ```
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    step: i32,
    first: Vec<Matrix>,
    second: Vec<Matrix>,
}

impl Adam {
    /// Zero moments for tensors of the given shapes.
    pub fn new(learning_rate: f64, shapes: &[(usize, usize)]) -> Self {
        let zeros = || shapes.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect();
        Self {
            learning_rate,
            step: 0,
            first: zeros(),
            second: zeros(),
        }
    }

    fn step(&mut self, params: &mut [Matrix], grads: &[Matrix]) -> Result<(), PinnError> {
        check_shapes(params, grads, &self.first)?;
        self.step = self.step.saturating_add(1);
        let correction1 = 1.0 - ADAM_BETA1.powi(self.step);
        let correction2 = 1.0 - ADAM_BETA2.powi(self.step);
        let lr = self.learning_rate;

        for (((p, g), m), v) in params.iter_mut().zip(grads).zip(&mut self.first).zip(&mut self.second) {
            m.zip_apply(g, |m, g| *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g);
            v.zip_apply(g, |v, g| *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g);
            p.zip_zip_apply(m, v, |p, m, v| {
                *p -= lr * (m / correction1) / ((v / correction2).sqrt() + ADAM_EPSILON);
            });
        }
        Ok(())
    }
}

/// Gradient descent with heavy-ball momentum.
///
/// ```text
/// u ← μ·u - lr·g
/// θ ← θ + u
/// ```
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f64,
    momentum: f64,
    velocity: Vec<Matrix>,
}

impl GradientDescent {
    /// Zero velocity for tensors of the given shapes, momentum 0.9.
    pub fn new(learning_rate: f64, shapes: &[(usize, usize)]) -> Self {
        Self {
            learning_rate,
            momentum: DEFAULT_MOMENTUM,
            velocity: shapes.iter().map(|&(r, c)| Matrix::zeros(r, c)).collect(),
        }
    }

    /// Overrides the momentum coefficient; 0 gives plain gradient descent.
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    fn step(&mut self, params: &mut [Matrix], grads: &[Matrix]) -> Result<(), PinnError> {
        check_shapes(params, grads, &self.velocity)?;
        let (lr, mu) = (self.learning_rate, self.momentum);
        for ((p, g), u) in params.iter_mut().zip(grads).zip(&mut self.velocity) {
            u.zip_apply(g, |u, g| *u = mu * *u - lr * g);
            *p += &*u;
        }
        Ok(())
    }
}

/// Optimiser with its state.
#[derive(Debug, Clone)]
pub enum Optimiser {
    /// See [`Adam`].
    Adam(Adam),
    /// See [`GradientDescent`].
    GradientDescent(GradientDescent),
}

impl Optimiser {
    /// Creates an optimiser of the given kind with zero state.
    pub fn new(kind: OptimiserKind, learning_rate: f64, shapes: &[(usize, usize)]) -> Self {
        match kind {
            OptimiserKind::Adam => Optimiser::Adam(Adam::new(learning_rate, shapes)),
            OptimiserKind::GradientDescent => {
                Optimiser::GradientDescent(GradientDescent::new(learning_rate, shapes))
            }
        }
    }

    /// Which optimiser this is.
    pub fn kind(&self) -> OptimiserKind {
        match self {
            Optimiser::Adam(_) => OptimiserKind::Adam,
            Optimiser::GradientDescent(_) => OptimiserKind::GradientDescent,
        }
    }

    /// Applies one update to `params` using `grads`.
    ///
    /// # Errors
    /// `PinnError::ShapeMismatch` if the tensors do not match the shapes the
    /// optimiser was created for. Parameters are untouched in that case.
    pub fn step(&mut self, params: &mut [Matrix], grads: &[Matrix]) -> Result<(), PinnError> {
        match self {
            Optimiser::Adam(adam) => adam.step(params, grads),
            Optimiser::GradientDescent(gd) => gd.step(params, grads),
        }
    }
}
