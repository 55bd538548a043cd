//! Physics-informed training objective.
//!
//! The objective is the sum of the mean-square Black-Scholes residual over
//! interior points and weighted mean-square misfits to the terminal payoff
//! and the two spot boundaries:
//!
//! ```text
//! total = pde + λ_ic · terminal + λ_bc · (lower + upper)
//! ```

use crate::autodiff::{CompiledGraph, Graph, Matrix, NodeId};
use crate::dataset::TrainingData;
use crate::derivatives::trace_derivatives;
use crate::error::PinnError;
use crate::network::PinnNetwork;
use crate::problem::PinnProblem;

/// Black-Scholes residual V_t + ½σ²S²V_SS + rSV_S - rV.
///
/// Zero for any exact solution of the pricing PDE.
///
/// # Examples
/// ```
/// use pricer_pinn::loss::pde_residual;
///
/// // V = S solves the PDE: V_t = 0, V_S = 1, V_SS = 0
/// assert_eq!(pde_residual(120.0, 0.0, 1.0, 0.0, 120.0, 0.05, 0.2), 0.0);
/// ```
#[inline]
pub fn pde_residual(value: f64, dv_dt: f64, dv_ds: f64, d2v_ds2: f64, spot: f64, rate: f64, volatility: f64) -> f64 {
    dv_dt + 0.5 * volatility * volatility * spot * spot * d2v_ds2 + rate * spot * dv_ds - rate * value
}

/// Weights of the terminal and boundary terms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossWeights {
    /// λ_ic, weight of the terminal payoff misfit.
    pub terminal: f64,
    /// λ_bc, weight of the spot boundary misfit.
    pub boundary: f64,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self {
            terminal: 10.0,
            boundary: 10.0,
        }
    }
}

impl LossWeights {
    /// Checks that both weights are finite and non-negative.
    ///
    /// # Errors
    /// `PinnError::InvalidConfig` naming the offending weight.
    pub fn validate(&self) -> Result<(), PinnError> {
        for (name, w) in [("terminal_weight", self.terminal), ("boundary_weight", self.boundary)] {
            if !(w.is_finite() && w >= 0.0) {
                return Err(PinnError::InvalidConfig {
                    name,
                    message: format!("must be finite and non-negative, got {}", w),
                });
            }
        }
        Ok(())
    }
}

/// Batch sizes the loss program is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LossShapes {
    /// Interior points.
    pub n_collocation: usize,
    /// Terminal points.
    pub n_terminal: usize,
    /// Points on each spot boundary.
    pub n_boundary: usize,
}

impl LossShapes {
    /// Shapes of an existing dataset.
    pub fn of(data: &TrainingData) -> Self {
        Self {
            n_collocation: data.n_collocation(),
            n_terminal: data.n_boundary(),
            n_boundary: data.n_boundary(),
        }
    }
}

/// Loss components of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LossBreakdown {
    /// Weighted total.
    pub total: f64,
    /// Mean-square PDE residual.
    pub pde: f64,
    /// Mean-square terminal misfit.
    pub terminal: f64,
    /// Sum of the two mean-square boundary misfits.
    pub boundary: f64,
}

impl LossBreakdown {
    /// Returns `true` if the total is neither NaN nor infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.total.is_finite()
    }
}

/// Loss components plus, when compiled for training, the gradient of the
/// total with respect to every parameter tensor.
#[derive(Debug, Clone)]
pub struct LossEvaluation {
    /// Loss components.
    pub breakdown: LossBreakdown,
    /// Gradients in parameter order; empty without gradients.
    pub gradients: Vec<Matrix>,
}

const NUM_COMPONENTS: usize = 4;

/// Compiled training objective for one network shape, one problem and one
/// dataset shape.
///
/// σ and r are baked into the program, so it only evaluates networks bound
/// to the problem it was compiled for.
#[derive(Debug, Clone)]
pub struct LossComposer {
    program: CompiledGraph,
    problem: PinnProblem,
    shapes: LossShapes,
    weights: LossWeights,
    with_gradients: bool,
}

impl LossComposer {
    /// Traces and compiles the objective.
    ///
    /// With `with_gradients` the program also returns d(total)/dθ for each
    /// parameter tensor.
    ///
    /// # Errors
    /// `PinnError::InvalidConfig` if a batch size is zero, a weight is
    /// invalid, or `network` is bound to a problem other than `problem`.
    pub fn compile(
        network: &PinnNetwork,
        problem: &PinnProblem,
        weights: LossWeights,
        shapes: LossShapes,
        with_gradients: bool,
    ) -> Result<Self, PinnError> {
        ensure_bound(network, problem)?;
        weights.validate()?;
        for (name, n) in [
            ("n_collocation", shapes.n_collocation),
            ("n_terminal", shapes.n_terminal),
            ("n_boundary", shapes.n_boundary),
        ] {
            if n == 0 {
                return Err(PinnError::InvalidConfig {
                    name,
                    message: "must be positive".to_string(),
                });
            }
        }

        let (rate, vol) = (problem.rate(), problem.volatility());
        let (nc, nt, nb) = (shapes.n_collocation, shapes.n_terminal, shapes.n_boundary);

        let mut g = Graph::new();
        let params = network.parameter_inputs(&mut g);
        let c_s = g.input(nc, 1);
        let c_t = g.input(nc, 1);
        let term_s = g.input(nt, 1);
        let term_t = g.input(nt, 1);
        let term_target = g.input(nt, 1);
        let lo_s = g.input(nb, 1);
        let lo_t = g.input(nb, 1);
        let hi_s = g.input(nb, 1);
        let hi_t = g.input(nb, 1);
        let hi_target = g.input(nb, 1);

        let d = trace_derivatives(&mut g, network, &params, c_s, c_t);
        let s2 = g.mul(c_s, c_s);
        let diffusion = g.mul(s2, d.d2v_ds2);
        let diffusion = g.scale(diffusion, 0.5 * vol * vol);
        let drift = g.mul(c_s, d.dv_ds);
        let drift = g.scale(drift, rate);
        let discount = g.scale(d.value, rate);
        let residual = g.add(d.dv_dt, diffusion);
        let residual = g.add(residual, drift);
        let residual = g.sub(residual, discount);
        let pde = mean_square(&mut g, residual);

        let term_v = network.trace(&mut g, &params, term_s, term_t);
        let term_err = g.sub(term_v, term_target);
        let terminal = mean_square(&mut g, term_err);

        let lo_v = network.trace(&mut g, &params, lo_s, lo_t);
        let lower = mean_square(&mut g, lo_v);
        let hi_v = network.trace(&mut g, &params, hi_s, hi_t);
        let hi_err = g.sub(hi_v, hi_target);
        let upper = mean_square(&mut g, hi_err);
        let boundary = g.add(lower, upper);

        let weighted_terminal = g.scale(terminal, weights.terminal);
        let weighted_boundary = g.scale(boundary, weights.boundary);
        let total = g.add(pde, weighted_terminal);
        let total = g.add(total, weighted_boundary);

        let mut outputs = vec![total, pde, terminal, boundary];
        if with_gradients {
            outputs.extend(g.grad(total, &params));
        }

        let program = CompiledGraph::compile(&g, &outputs);
        tracing::debug!(
            nodes = g.len(),
            steps = program.len(),
            with_gradients,
            "compiled loss program"
        );

        Ok(Self {
            program,
            problem: *problem,
            shapes,
            weights,
            with_gradients,
        })
    }

    /// Problem whose coefficients are baked into the program.
    #[inline]
    pub fn problem(&self) -> &PinnProblem {
        &self.problem
    }

    /// Batch sizes the program accepts.
    #[inline]
    pub fn shapes(&self) -> LossShapes {
        self.shapes
    }

    /// Term weights baked into the program.
    #[inline]
    pub fn weights(&self) -> LossWeights {
        self.weights
    }

    /// Whether parameter gradients are produced.
    #[inline]
    pub fn with_gradients(&self) -> bool {
        self.with_gradients
    }

    /// Evaluates the objective for the network's current parameters.
    ///
    /// # Errors
    /// - `PinnError::InvalidConfig` if `network` is bound to a different
    ///   problem
    /// - `PinnError::ShapeMismatch` if `data` or the network parameters do
    ///   not have the shapes the program was compiled for
    pub fn evaluate(&self, network: &PinnNetwork, data: &TrainingData) -> Result<LossEvaluation, PinnError> {
        ensure_bound(network, &self.problem)?;
        let mut inputs: Vec<&Matrix> = network.parameters().iter().collect();
        inputs.extend(data.loss_inputs());

        let mut out = self.program.evaluate(&inputs)?;
        if out.len() < NUM_COMPONENTS {
            return Err(PinnError::Graph {
                message: format!("loss program returned {} outputs", out.len()),
            });
        }
        let gradients = out.split_off(NUM_COMPONENTS);
        let scalar = |m: &Matrix| m[(0, 0)];

        Ok(LossEvaluation {
            breakdown: LossBreakdown {
                total: scalar(&out[0]),
                pde: scalar(&out[1]),
                terminal: scalar(&out[2]),
                boundary: scalar(&out[3]),
            },
            gradients,
        })
    }
}

fn ensure_bound(network: &PinnNetwork, problem: &PinnProblem) -> Result<(), PinnError> {
    if network.problem() == problem {
        Ok(())
    } else {
        Err(PinnError::InvalidConfig {
            name: "problem",
            message: format!(
                "network is bound to {:?}, expected {:?}",
                network.problem(),
                problem
            ),
        })
    }
}

fn mean_square(g: &mut Graph, x: NodeId) -> NodeId {
    let sq = g.mul(x, x);
    g.mean(sq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SamplingPlan;
    use crate::network::Architecture;
    use crate::problem::PinnProblem;
    use crate::rng::PinnRng;
    use approx::assert_relative_eq;

    fn setup(seed: u64) -> (PinnNetwork, TrainingData) {
        let problem = PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.2, 4.0).unwrap();
        let mut rng = PinnRng::from_seed(seed);
        let network = PinnNetwork::new(Architecture::new(vec![2, 6, 6, 1]).unwrap(), problem, &mut rng);
        let plan = SamplingPlan {
            n_collocation: 40,
            n_boundary: 15,
            min_spot: 0.1,
        };
        let data = TrainingData::generate(&problem, &plan, &mut rng).unwrap();
        (network, data)
    }

    /// Loss recomputed point by point with forward-mode derivatives.
    fn reference(network: &PinnNetwork, data: &TrainingData, weights: LossWeights) -> LossBreakdown {
        use num_dual::{Dual2_64, Dual64};
        let p = network.problem();

        let (cs, ct) = data.collocation();
        let pde = cs
            .iter()
            .zip(ct)
            .map(|(&s, &t)| {
                let d = network.forward_point(Dual2_64::new(s, 1.0, 0.0), Dual2_64::from(t));
                let dt = network.forward_point(Dual64::from(s), Dual64::new(t, 1.0)).eps;
                pde_residual(d.re, dt, d.v1, d.v2, s, p.rate(), p.volatility()).powi(2)
            })
            .sum::<f64>()
            / cs.len() as f64;

        let (ts, payoff) = data.terminal();
        let terminal = ts
            .iter()
            .zip(payoff)
            .map(|(&s, &y)| (network.forward_point(s, p.expiry()) - y).powi(2))
            .sum::<f64>()
            / ts.len() as f64;

        let lt = data.lower_boundary_times();
        let lower = lt.iter().map(|&t| network.forward_point(0.0, t).powi(2)).sum::<f64>() / lt.len() as f64;
        let (ut, target) = data.upper_boundary();
        let upper = ut
            .iter()
            .zip(target)
            .map(|(&t, &y)| (network.forward_point(p.s_max(), t) - y).powi(2))
            .sum::<f64>()
            / ut.len() as f64;

        let boundary = lower + upper;
        LossBreakdown {
            total: pde + weights.terminal * terminal + weights.boundary * boundary,
            pde,
            terminal,
            boundary,
        }
    }

    #[test]
    fn test_matches_pointwise_reference() {
        let (network, data) = setup(3);
        let weights = LossWeights {
            terminal: 2.0,
            boundary: 5.0,
        };
        let composer = LossComposer::compile(&network, network.problem(), weights, LossShapes::of(&data), false).unwrap();
        let eval = composer.evaluate(&network, &data).unwrap();
        let expected = reference(&network, &data, weights);

        assert!(eval.gradients.is_empty());
        assert_relative_eq!(eval.breakdown.pde, expected.pde, max_relative = 1e-9);
        assert_relative_eq!(eval.breakdown.terminal, expected.terminal, max_relative = 1e-9);
        assert_relative_eq!(eval.breakdown.boundary, expected.boundary, max_relative = 1e-9);
        assert_relative_eq!(eval.breakdown.total, expected.total, max_relative = 1e-9);
    }

    #[test]
    fn test_parameter_gradient_matches_finite_difference() {
        let (mut network, data) = setup(7);
        let weights = LossWeights::default();
        let composer = LossComposer::compile(&network, network.problem(), weights, LossShapes::of(&data), true).unwrap();
        let eval = composer.evaluate(&network, &data).unwrap();
        assert_eq!(eval.gradients.len(), network.parameters().len());

        let h = 1e-6;
        // One weight of every tensor, including the output bias
        for (k, (i, j)) in [(0, (1, 2)), (1, (0, 3)), (2, (4, 5)), (3, (0, 0)), (4, (2, 0)), (5, (0, 0))] {
            let base = network.parameters()[k][(i, j)];
            network.parameters_mut()[k][(i, j)] = base + h;
            let up = composer.evaluate(&network, &data).unwrap().breakdown.total;
            network.parameters_mut()[k][(i, j)] = base - h;
            let down = composer.evaluate(&network, &data).unwrap().breakdown.total;
            network.parameters_mut()[k][(i, j)] = base;

            let fd = (up - down) / (2.0 * h);
            assert_relative_eq!(eval.gradients[k][(i, j)], fd, max_relative = 1e-4, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_components_are_non_negative() {
        for seed in [0, 1, 2, 3, 4] {
            let (network, data) = setup(seed);
            let composer = LossComposer::compile(&network, network.problem(), LossWeights::default(), LossShapes::of(&data), false).unwrap();
            let b = composer.evaluate(&network, &data).unwrap().breakdown;
            assert!(b.pde >= 0.0 && b.terminal >= 0.0 && b.boundary >= 0.0 && b.total >= 0.0);
            assert!(b.is_finite());
        }
    }

    #[test]
    fn test_wrong_dataset_shape_is_rejected() {
        let (network, data) = setup(1);
        let shapes = LossShapes {
            n_collocation: 41,
            ..LossShapes::of(&data)
        };
        let composer = LossComposer::compile(&network, network.problem(), LossWeights::default(), shapes, false).unwrap();
        assert!(matches!(
            composer.evaluate(&network, &data),
            Err(PinnError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_weights_and_shapes() {
        let (network, data) = setup(1);
        let bad = LossWeights {
            terminal: -1.0,
            boundary: 10.0,
        };
        assert!(LossComposer::compile(&network, network.problem(), bad, LossShapes::of(&data), false).is_err());

        let empty = LossShapes {
            n_boundary: 0,
            ..LossShapes::of(&data)
        };
        let err = LossComposer::compile(&network, network.problem(), LossWeights::default(), empty, false).unwrap_err();
        assert!(matches!(err, PinnError::InvalidConfig { name: "n_boundary", .. }));
    }

    #[test]
    fn test_network_of_another_problem_is_rejected() {
        let (network, data) = setup(2);
        let composer = LossComposer::compile(&network, network.problem(), LossWeights::default(), LossShapes::of(&data), false).unwrap();
        assert_eq!(composer.problem(), network.problem());

        // Same shapes, different volatility
        let other = PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.35, 4.0).unwrap();
        let mut rng = PinnRng::from_seed(2);
        let rebound = PinnNetwork::new(network.architecture().clone(), other, &mut rng);

        let err = composer.evaluate(&rebound, &data).unwrap_err();
        assert!(matches!(err, PinnError::InvalidConfig { name: "problem", .. }));

        let err = LossComposer::compile(&network, &other, LossWeights::default(), LossShapes::of(&data), false).unwrap_err();
        assert!(matches!(err, PinnError::InvalidConfig { name: "problem", .. }));
    }

    #[test]
    fn test_pde_residual_of_discounted_strike() {
        // V = K e^{-r(T-t)}: V_t = rV, V_S = V_SS = 0
        let (k, r, tau) = (100.0_f64, 0.05_f64, 0.7_f64);
        let v = k * (-r * tau).exp();
        assert_relative_eq!(pde_residual(v, r * v, 0.0, 0.0, 80.0, r, 0.3), 0.0, epsilon = 1e-12);
    }
}
