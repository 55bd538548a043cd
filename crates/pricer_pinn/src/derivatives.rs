//! Exact derivatives of the approximator with respect to its inputs.
//!
//! V_t and V_S come from one reverse pass over the traced network; V_SS
//! from a second pass over the V_S nodes. Each point's value depends only on
//! its own row of inputs, so the gradient of the batch sum yields the
//! per-point derivatives.

use std::collections::HashMap;

use crate::autodiff::{CompiledGraph, Graph, Matrix, NodeId};
use crate::error::PinnError;
use crate::network::{Architecture, PinnNetwork};
use crate::problem::PinnProblem;

/// Graph nodes of V and its input derivatives for one traced batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativeNodes {
    /// V
    pub value: NodeId,
    /// ∂V/∂t
    pub dv_dt: NodeId,
    /// ∂V/∂S
    pub dv_ds: NodeId,
    /// ∂²V/∂S²
    pub d2v_ds2: NodeId,
}

/// Traces V and its derivatives at the batch `(spots, times)` onto `graph`.
pub fn trace_derivatives(
    graph: &mut Graph,
    network: &PinnNetwork,
    params: &[NodeId],
    spots: NodeId,
    times: NodeId,
) -> DerivativeNodes {
    let value = network.trace(graph, params, spots, times);
    let total = graph.sum(value);
    let first = graph.grad(total, &[spots, times]);
    let (dv_ds, dv_dt) = (first[0], first[1]);

    let delta_total = graph.sum(dv_ds);
    let d2v_ds2 = graph.grad(delta_total, &[spots])[0];

    DerivativeNodes {
        value,
        dv_dt,
        dv_ds,
        d2v_ds2,
    }
}

/// V and its input derivatives at a batch of points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Derivatives {
    /// V(S, t)
    pub value: Vec<f64>,
    /// ∂V/∂t
    pub dv_dt: Vec<f64>,
    /// ∂V/∂S
    pub dv_ds: Vec<f64>,
    /// ∂²V/∂S²
    pub d2v_ds2: Vec<f64>,
}

/// Evaluates [`Derivatives`] with programs cached per batch length.
///
/// The first call for a given length traces and compiles the program;
/// later calls only replay it with the current parameters. The cache is
/// discarded when a network with a different architecture or problem is
/// passed in.
///
/// # Examples
/// ```
/// use pricer_pinn::derivatives::DerivativeEngine;
/// use pricer_pinn::network::{Architecture, PinnNetwork};
/// use pricer_pinn::rng::PinnRng;
/// use pricer_pinn::PinnProblem;
///
/// let problem = PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.2, 4.0).unwrap();
/// let arch = Architecture::new(vec![2, 8, 1]).unwrap();
/// let network = PinnNetwork::new(arch, problem, &mut PinnRng::from_seed(1));
///
/// let mut engine = DerivativeEngine::new();
/// let d = engine.compute(&network, &[90.0, 110.0], &[0.5, 0.5]).unwrap();
/// assert_eq!(d.dv_ds.len(), 2);
/// assert_eq!(engine.cached_programs(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DerivativeEngine {
    bound_to: Option<(Architecture, PinnProblem)>,
    programs: HashMap<usize, CompiledGraph>,
}

impl DerivativeEngine {
    /// Creates an engine with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compiled programs held.
    pub fn cached_programs(&self) -> usize {
        self.programs.len()
    }

    fn program(&mut self, network: &PinnNetwork, n: usize) -> &CompiledGraph {
        let key = (network.architecture().clone(), *network.problem());
        if self.bound_to.as_ref() != Some(&key) {
            self.programs.clear();
            self.bound_to = Some(key);
        }
        self.programs.entry(n).or_insert_with(|| {
            tracing::debug!(batch = n, "compiling derivative program");
            let mut graph = Graph::new();
            let params = network.parameter_inputs(&mut graph);
            let spots = graph.input(n, 1);
            let times = graph.input(n, 1);
            let nodes = trace_derivatives(&mut graph, network, &params, spots, times);
            CompiledGraph::compile(
                &graph,
                &[nodes.value, nodes.dv_dt, nodes.dv_ds, nodes.d2v_ds2],
            )
        })
    }

    /// Computes V, V_t, V_S and V_SS at paired points.
    ///
    /// # Errors
    /// `PinnError::ShapeMismatch` if `spots` and `times` differ in length.
    pub fn compute(
        &mut self,
        network: &PinnNetwork,
        spots: &[f64],
        times: &[f64],
    ) -> Result<Derivatives, PinnError> {
        if spots.len() != times.len() {
            return Err(PinnError::ShapeMismatch {
                context: "derivative times".to_string(),
                expected: (spots.len(), 1),
                actual: (times.len(), 1),
            });
        }
        let n = spots.len();
        if n == 0 {
            return Ok(Derivatives {
                value: Vec::new(),
                dv_dt: Vec::new(),
                dv_ds: Vec::new(),
                d2v_ds2: Vec::new(),
            });
        }

        let s = Matrix::from_column_slice(n, 1, spots);
        let t = Matrix::from_column_slice(n, 1, times);
        let mut inputs: Vec<&Matrix> = network.parameters().iter().collect();
        inputs.push(&s);
        inputs.push(&t);

        let mut out = self.program(network, n).evaluate(&inputs)?.into_iter();
        let mut next = || {
            out.next()
                .map(|m| m.as_slice().to_vec())
                .ok_or_else(|| PinnError::Graph {
                    message: "derivative program returned too few outputs".to_string(),
                })
        };
        Ok(Derivatives {
            value: next()?,
            dv_dt: next()?,
            dv_ds: next()?,
            d2v_ds2: next()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PinnRng;
    use approx::assert_relative_eq;
    use pricer_core::types::dual::{DualNumber, SecondOrderDual};

    fn network(seed: u64) -> PinnNetwork {
        let problem = PinnProblem::with_domain_multiplier(100.0, 1.0, 0.05, 0.2, 4.0).unwrap();
        let arch = Architecture::new(vec![2, 10, 10, 1]).unwrap();
        PinnNetwork::new(arch, problem, &mut PinnRng::from_seed(seed))
    }

    #[test]
    fn test_matches_forward_mode() {
        let net = network(4);
        let spots = [10.0, 80.0, 100.0, 125.0, 390.0];
        let times = [0.1, 0.9, 0.5, 0.0, 1.0];

        let mut engine = DerivativeEngine::new();
        let d = engine.compute(&net, &spots, &times).unwrap();

        for i in 0..spots.len() {
            let in_s = net.forward_point(SecondOrderDual::new(spots[i], 1.0, 0.0), SecondOrderDual::from(times[i]));
            let in_t = net.forward_point(DualNumber::from(spots[i]), DualNumber::new(times[i], 1.0));
            assert_relative_eq!(d.value[i], in_s.re, epsilon = 1e-11);
            assert_relative_eq!(d.dv_ds[i], in_s.v1, epsilon = 1e-11);
            assert_relative_eq!(d.d2v_ds2[i], in_s.v2, epsilon = 1e-11);
            assert_relative_eq!(d.dv_dt[i], in_t.eps, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_programs_are_cached_per_length() {
        let net = network(1);
        let mut engine = DerivativeEngine::new();
        engine.compute(&net, &[100.0], &[0.5]).unwrap();
        engine.compute(&net, &[90.0], &[0.2]).unwrap();
        assert_eq!(engine.cached_programs(), 1);
        engine.compute(&net, &[90.0, 95.0], &[0.2, 0.3]).unwrap();
        assert_eq!(engine.cached_programs(), 2);
    }

    #[test]
    fn test_cache_follows_parameter_updates() {
        let mut net = network(2);
        let mut engine = DerivativeEngine::new();
        let before = engine.compute(&net, &[100.0], &[0.5]).unwrap();

        for p in net.parameters_mut() {
            p.apply(|x| *x *= 0.5);
        }
        let after = engine.compute(&net, &[100.0], &[0.5]).unwrap();
        assert_eq!(engine.cached_programs(), 1);
        assert_ne!(before.value, after.value);
        assert_relative_eq!(after.value[0], net.forward(&[100.0], &[0.5]).unwrap()[0], epsilon = 1e-12);
    }

    #[test]
    fn test_cache_is_reset_for_another_network() {
        let net = network(3);
        let other = PinnNetwork::new(
            Architecture::new(vec![2, 4, 1]).unwrap(),
            *net.problem(),
            &mut PinnRng::from_seed(3),
        );
        let mut engine = DerivativeEngine::new();
        engine.compute(&net, &[100.0, 101.0], &[0.5, 0.5]).unwrap();
        engine.compute(&net, &[100.0], &[0.5]).unwrap();
        assert_eq!(engine.cached_programs(), 2);

        let d = engine.compute(&other, &[100.0], &[0.5]).unwrap();
        assert_eq!(engine.cached_programs(), 1);
        assert_relative_eq!(d.value[0], other.forward(&[100.0], &[0.5]).unwrap()[0], epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch_and_empty_batch() {
        let net = network(5);
        let mut engine = DerivativeEngine::new();
        assert!(matches!(
            engine.compute(&net, &[1.0, 2.0], &[0.5]),
            Err(PinnError::ShapeMismatch { .. })
        ));
        let empty = engine.compute(&net, &[], &[]).unwrap();
        assert!(empty.value.is_empty());
        assert_eq!(engine.cached_programs(), 0);
    }
}
