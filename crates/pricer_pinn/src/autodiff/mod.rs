//! Reverse-mode automatic differentiation over dense matrices.
//!
//! Differentiation is symbolic: [`Graph::grad`] extends the graph with the
//! nodes computing a gradient, so higher derivatives come from calling it
//! again on the result. A [`CompiledGraph`] prunes a graph to the outputs
//! of interest and evaluates it for concrete inputs.
//!
//! The training loop builds its program once per batch shape and then only
//! evaluates, which keeps the per-epoch cost to the arithmetic itself.

mod compiled;
mod graph;

pub use compiled::{CompiledGraph, Matrix};
pub use graph::{Graph, Node, NodeId, Op};
