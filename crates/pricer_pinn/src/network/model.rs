//! Feed-forward approximator V(S, t; θ).

use num_dual::DualNum;
use pricer_core::math::smoothing::softplus;

use super::architecture::Architecture;
use crate::autodiff::{Graph, Matrix, NodeId};
use crate::error::PinnError;
use crate::problem::PinnProblem;
use crate::rng::PinnRng;

/// Dense tanh network with a softplus output scaled by the strike.
///
/// Inputs are normalised onto `[-1, 1]` over the problem domain before the
/// first layer, so the parameters work in units independent of K and T.
/// The softplus output keeps every predicted value non-negative.
///
/// Parameters are stored as `[W0, b0, W1, b1, ...]` where `Wl` is
/// fan_in × fan_out and `bl` is 1 × fan_out.
///
/// The network offers three forward passes over the same parameters:
/// [`forward`](Self::forward) for numeric batches, [`trace`](Self::trace)
/// onto an autodiff graph, and [`forward_point`](Self::forward_point) over
/// dual numbers.
#[derive(Debug, Clone)]
pub struct PinnNetwork {
    architecture: Architecture,
    problem: PinnProblem,
    params: Vec<Matrix>,
}

fn softplus_dual<D: DualNum<f64> + Copy>(z: D) -> D {
    if z.re() > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

impl PinnNetwork {
    /// Glorot-normal initialisation with zero biases.
    ///
    /// Weights of a layer are drawn from N(0, 2 / (fan_in + fan_out)).
    pub fn new(architecture: Architecture, problem: PinnProblem, rng: &mut PinnRng) -> Self {
        let params = architecture
            .fans()
            .flat_map(|(fan_in, fan_out)| {
                let std = (2.0 / (fan_in + fan_out) as f64).sqrt();
                [rng.normal_matrix(fan_in, fan_out, std), Matrix::zeros(1, fan_out)]
            })
            .collect();
        Self {
            architecture,
            problem,
            params,
        }
    }

    /// Builds a network from explicit parameter tensors.
    ///
    /// # Errors
    /// `PinnError::ShapeMismatch` if the tensors do not match the
    /// architecture's parameter shapes.
    pub fn from_parameters(
        architecture: Architecture,
        problem: PinnProblem,
        params: Vec<Matrix>,
    ) -> Result<Self, PinnError> {
        let shapes = architecture.parameter_shapes();
        if params.len() != shapes.len() {
            return Err(PinnError::ShapeMismatch {
                context: "parameter count".to_string(),
                expected: (shapes.len(), 1),
                actual: (params.len(), 1),
            });
        }
        for (i, (p, &expected)) in params.iter().zip(&shapes).enumerate() {
            if p.shape() != expected {
                return Err(PinnError::ShapeMismatch {
                    context: format!("parameter {}", i),
                    expected,
                    actual: p.shape(),
                });
            }
        }
        Ok(Self {
            architecture,
            problem,
            params,
        })
    }

    /// Layer widths.
    #[inline]
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Problem the network is bound to.
    #[inline]
    pub fn problem(&self) -> &PinnProblem {
        &self.problem
    }

    /// Parameter tensors `[W0, b0, W1, b1, ...]`.
    #[inline]
    pub fn parameters(&self) -> &[Matrix] {
        &self.params
    }

    #[inline]
    pub(crate) fn parameters_mut(&mut self) -> &mut [Matrix] {
        &mut self.params
    }

    #[inline]
    fn weight(&self, layer: usize) -> &Matrix {
        &self.params[2 * layer]
    }

    #[inline]
    fn bias(&self, layer: usize) -> &Matrix {
        &self.params[2 * layer + 1]
    }

    /// Evaluates V at paired points.
    ///
    /// # Errors
    /// `PinnError::ShapeMismatch` if `spots` and `times` differ in length.
    pub fn forward(&self, spots: &[f64], times: &[f64]) -> Result<Vec<f64>, PinnError> {
        if spots.len() != times.len() {
            return Err(PinnError::ShapeMismatch {
                context: "forward times".to_string(),
                expected: (spots.len(), 1),
                actual: (times.len(), 1),
            });
        }

        let n = spots.len();
        let mut h = Matrix::from_fn(n, 2, |i, j| match j {
            0 => self.problem.normalise_spot(spots[i]),
            _ => self.problem.normalise_time(times[i]),
        });

        let last = self.architecture.num_dense_layers() - 1;
        for layer in 0..=last {
            let mut z = &h * self.weight(layer);
            for (mut column, &b) in z.column_iter_mut().zip(self.bias(layer).iter()) {
                column.add_scalar_mut(b);
            }
            if layer < last {
                z.apply(|v| *v = v.tanh());
            }
            h = z;
        }

        let strike = self.problem.strike();
        Ok(h.iter().map(|&z| strike * softplus(z)).collect())
    }

    /// Registers one graph input per parameter tensor, in parameter order.
    ///
    /// Call this before declaring any data inputs so that parameter slots
    /// come first when the compiled graph is evaluated.
    pub fn parameter_inputs(&self, graph: &mut Graph) -> Vec<NodeId> {
        self.params
            .iter()
            .map(|p| graph.input(p.nrows(), p.ncols()))
            .collect()
    }

    /// Traces the forward pass onto `graph`.
    ///
    /// `spots` and `times` are n×1 nodes of raw (unnormalised) inputs and
    /// `params` the nodes returned by [`parameter_inputs`](Self::parameter_inputs).
    /// Returns the n×1 value node.
    ///
    /// The first layer is split into one rank-one product per input column,
    /// which keeps `spots` and `times` separate graph inputs that can be
    /// differentiated independently.
    pub fn trace(&self, graph: &mut Graph, params: &[NodeId], spots: NodeId, times: NodeId) -> NodeId {
        debug_assert_eq!(params.len(), self.params.len());
        let n = graph.shape(spots).0;
        let s_max = self.problem.s_max();
        let expiry = self.problem.expiry();

        let s_scaled = graph.scale(spots, 2.0 / s_max);
        let s_n = graph.offset(s_scaled, -1.0);
        let t_scaled = graph.scale(times, 2.0 / expiry);
        let t_n = graph.offset(t_scaled, -1.0);

        let last = self.architecture.num_dense_layers() - 1;
        let mut h = s_n;
        for layer in 0..=last {
            let (w, b) = (params[2 * layer], params[2 * layer + 1]);
            let fan_out = graph.shape(w).1;

            let product = if layer == 0 {
                let w_s = graph.select_row(w, 0);
                let w_t = graph.select_row(w, 1);
                let from_s = graph.matmul(s_n, w_s);
                let from_t = graph.matmul(t_n, w_t);
                graph.add(from_s, from_t)
            } else {
                graph.matmul(h, w)
            };
            let bias = graph.expand(b, n, fan_out);
            let z = graph.add(product, bias);

            h = if layer < last { graph.tanh(z) } else { z };
        }

        let value = graph.softplus(h);
        graph.scale(value, self.problem.strike())
    }

    /// Evaluates V at a single point over any dual number type.
    ///
    /// Seeding `spot` or `time` with unit derivative parts yields exact
    /// sensitivities by forward-mode AD.
    pub fn forward_point<D: DualNum<f64> + Copy>(&self, spot: D, time: D) -> D {
        let s_n = spot * (2.0 / self.problem.s_max()) - 1.0;
        let t_n = time * (2.0 / self.problem.expiry()) - 1.0;

        let last = self.architecture.num_dense_layers() - 1;
        let mut h = vec![s_n, t_n];
        for layer in 0..=last {
            let (w, b) = (self.weight(layer), self.bias(layer));
            let mut z: Vec<D> = (0..w.ncols())
                .map(|j| {
                    h.iter()
                        .enumerate()
                        .fold(D::from(b[(0, j)]), |acc, (i, &x)| acc + x * w[(i, j)])
                })
                .collect();
            if layer < last {
                z.iter_mut().for_each(|v| *v = v.tanh());
            }
            h = z;
        }

        softplus_dual(h[0]) * self.problem.strike()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::CompiledGraph;
    use approx::assert_relative_eq;
    use num_dual::{Dual2_64, Dual64};

    fn problem() -> PinnProblem {
        PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.2, 4.0).unwrap()
    }

    fn network(layers: Vec<usize>, seed: u64) -> PinnNetwork {
        let mut rng = PinnRng::from_seed(seed);
        PinnNetwork::new(Architecture::new(layers).unwrap(), problem(), &mut rng)
    }

    #[test]
    fn test_initialisation_shapes_and_biases() {
        let net = network(vec![2, 8, 4, 1], 1);
        let shapes: Vec<_> = net.parameters().iter().map(|p| p.shape()).collect();
        assert_eq!(shapes, net.architecture().parameter_shapes());
        for layer in 0..3 {
            assert!(net.bias(layer).iter().all(|&b| b == 0.0));
        }
    }

    #[test]
    fn test_glorot_scale() {
        let net = network(vec![2, 200, 200, 1], 3);
        let w = net.weight(1);
        let var = w.iter().map(|x| x * x).sum::<f64>() / w.len() as f64;
        assert_relative_eq!(var, 2.0 / 400.0, max_relative = 0.05);
    }

    #[test]
    fn test_same_seed_same_network() {
        let a = network(vec![2, 5, 1], 9);
        let b = network(vec![2, 5, 1], 9);
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn test_forward_is_non_negative() {
        let net = network(vec![2, 16, 16, 1], 5);
        let spots: Vec<f64> = (0..50).map(|i| i as f64 * 8.0).collect();
        let times = vec![0.5; 50];
        let values = net.forward(&spots, &times).unwrap();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_forward_rejects_unpaired_inputs() {
        let net = network(vec![2, 4, 1], 0);
        let err = net.forward(&[1.0, 2.0], &[0.5]).unwrap_err();
        assert!(matches!(err, PinnError::ShapeMismatch { expected: (2, 1), actual: (1, 1), .. }));
    }

    #[test]
    fn test_three_forward_passes_agree() {
        let net = network(vec![2, 6, 6, 1], 11);
        let spots = [20.0, 95.0, 140.0, 310.0];
        let times = [0.0, 0.3, 0.75, 1.0];
        let numeric = net.forward(&spots, &times).unwrap();

        let mut g = Graph::new();
        let params = net.parameter_inputs(&mut g);
        let s = g.input(4, 1);
        let t = g.input(4, 1);
        let v = net.trace(&mut g, &params, s, t);
        let program = CompiledGraph::compile(&g, &[v]);

        let s_val = Matrix::from_column_slice(4, 1, &spots);
        let t_val = Matrix::from_column_slice(4, 1, &times);
        let mut inputs: Vec<&Matrix> = net.parameters().iter().collect();
        inputs.push(&s_val);
        inputs.push(&t_val);
        let traced = program.evaluate(&inputs).unwrap();

        for i in 0..4 {
            let point = net.forward_point(spots[i], times[i]);
            assert_relative_eq!(traced[0][(i, 0)], numeric[i], epsilon = 1e-12);
            assert_relative_eq!(point, numeric[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dual_point_derivatives_match_finite_differences() {
        let net = network(vec![2, 8, 1], 21);
        let (s, t) = (105.0, 0.4);

        let d = net.forward_point(Dual2_64::new(s, 1.0, 0.0), Dual2_64::from(t));
        let theta = net.forward_point(Dual64::from(s), Dual64::new(t, 1.0));

        let h = 1e-3;
        let f = |s: f64, t: f64| net.forward_point(s, t);
        let fd_delta = (f(s + h, t) - f(s - h, t)) / (2.0 * h);
        let fd_gamma = (f(s + h, t) - 2.0 * f(s, t) + f(s - h, t)) / (h * h);
        let fd_theta = (f(s, t + h) - f(s, t - h)) / (2.0 * h);

        assert_relative_eq!(d.v1, fd_delta, epsilon = 1e-6);
        assert_relative_eq!(d.v2, fd_gamma, epsilon = 1e-4);
        assert_relative_eq!(theta.eps, fd_theta, epsilon = 1e-5);
    }

    #[test]
    fn test_from_parameters_validates_shapes() {
        let arch = Architecture::new(vec![2, 3, 1]).unwrap();
        let good = vec![
            Matrix::zeros(2, 3),
            Matrix::zeros(1, 3),
            Matrix::zeros(3, 1),
            Matrix::zeros(1, 1),
        ];
        let net = PinnNetwork::from_parameters(arch.clone(), problem(), good).unwrap();
        // All-zero parameters give softplus(0) · K everywhere
        let v = net.forward(&[50.0], &[0.2]).unwrap();
        assert_relative_eq!(v[0], 100.0 * 2.0_f64.ln(), epsilon = 1e-12);

        let bad = vec![Matrix::zeros(2, 3), Matrix::zeros(3, 1)];
        assert!(PinnNetwork::from_parameters(arch, problem(), bad).is_err());
    }
}
