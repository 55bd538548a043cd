//! Executable form of a [`Graph`].
//!
//! Compilation keeps only the nodes the requested outputs depend on,
//! renumbers them densely and records, for every step, which buffers can be
//! released once the step has run. Evaluation then holds at most the live
//! intermediates of the current step in memory.

use nalgebra::DMatrix;
use pricer_core::math::smoothing::{sigmoid, softplus};

use super::graph::{Graph, NodeId, Op};
use crate::error::PinnError;

/// Dense `f64` matrix used for every graph value.
pub type Matrix = DMatrix<f64>;

#[derive(Debug, Clone)]
struct Step {
    op: Op,
    shape: (usize, usize),
    release: Vec<usize>,
}

/// A graph pruned to a set of outputs, ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    steps: Vec<Step>,
    outputs: Vec<usize>,
    input_shapes: Vec<(usize, usize)>,
}

impl CompiledGraph {
    /// Compiles `graph` for the given outputs.
    ///
    /// Outputs may repeat; each occurrence yields its own value.
    pub fn compile(graph: &Graph, outputs: &[NodeId]) -> Self {
        let nodes = graph.nodes();

        let mut live = vec![false; nodes.len()];
        for &o in outputs {
            live[o.index()] = true;
        }
        for i in (0..nodes.len()).rev() {
            if live[i] {
                for operand in nodes[i].op.operands() {
                    live[operand.index()] = true;
                }
            }
        }

        let mut remap = vec![usize::MAX; nodes.len()];
        let mut steps = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            if !live[i] {
                continue;
            }
            remap[i] = steps.len();
            steps.push(Step {
                op: node.op.map_operands(|o| NodeId(remap[o.index()])),
                shape: node.shape,
                release: Vec::new(),
            });
        }

        let outputs: Vec<usize> = outputs.iter().map(|o| remap[o.index()]).collect();
        let mut is_output = vec![false; steps.len()];
        for &o in &outputs {
            is_output[o] = true;
        }

        let mut last_use = vec![None; steps.len()];
        for (i, step) in steps.iter().enumerate() {
            for operand in step.op.operands() {
                last_use[operand.index()] = Some(i);
            }
        }
        for (value, used) in last_use.into_iter().enumerate() {
            if let Some(step) = used {
                if !is_output[value] {
                    steps[step].release.push(value);
                }
            }
        }

        Self {
            steps,
            outputs,
            input_shapes: graph.input_shapes().to_vec(),
        }
    }

    /// Number of steps after pruning.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no step survived pruning.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of requested outputs.
    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Expected shapes of the inputs, by slot.
    #[inline]
    pub fn input_shapes(&self) -> &[(usize, usize)] {
        &self.input_shapes
    }

    /// Evaluates the program.
    ///
    /// `inputs` must supply every input slot of the source graph, in slot
    /// order, with the shape it was declared with.
    ///
    /// # Errors
    /// - `PinnError::ShapeMismatch` if the number or shape of inputs is wrong
    /// - `PinnError::Graph` if a step reads a released value
    pub fn evaluate(&self, inputs: &[&Matrix]) -> Result<Vec<Matrix>, PinnError> {
        if inputs.len() != self.input_shapes.len() {
            return Err(PinnError::ShapeMismatch {
                context: "graph input count".to_string(),
                expected: (self.input_shapes.len(), 1),
                actual: (inputs.len(), 1),
            });
        }
        for (slot, (value, &expected)) in inputs.iter().zip(&self.input_shapes).enumerate() {
            if value.shape() != expected {
                return Err(PinnError::ShapeMismatch {
                    context: format!("graph input {}", slot),
                    expected,
                    actual: value.shape(),
                });
            }
        }

        let mut values: Vec<Option<Matrix>> = vec![None; self.steps.len()];
        for (i, step) in self.steps.iter().enumerate() {
            let value = apply(step, inputs, &values)?;
            debug_assert_eq!(value.shape(), step.shape);
            values[i] = Some(value);
            for &released in &step.release {
                values[released] = None;
            }
        }

        self.outputs
            .iter()
            .map(|&o| {
                values[o].clone().ok_or_else(|| PinnError::Graph {
                    message: format!("output %{} was never computed", o),
                })
            })
            .collect()
    }
}

fn operand(values: &[Option<Matrix>], id: NodeId) -> Result<&Matrix, PinnError> {
    values[id.index()].as_ref().ok_or_else(|| PinnError::Graph {
        message: format!("value {} read after release", id),
    })
}

fn apply(step: &Step, inputs: &[&Matrix], values: &[Option<Matrix>]) -> Result<Matrix, PinnError> {
    let (rows, cols) = step.shape;
    let get = |id: NodeId| operand(values, id);

    let value = match step.op {
        Op::Input(slot) => inputs[slot].clone(),
        Op::Constant(c) => Matrix::from_element(rows, cols, c),
        Op::Add(a, b) => get(a)? + get(b)?,
        Op::Sub(a, b) => get(a)? - get(b)?,
        Op::Mul(a, b) => get(a)?.component_mul(get(b)?),
        Op::MatMul(a, b) => get(a)? * get(b)?,
        Op::Transpose(a) => get(a)?.transpose(),
        Op::Scale(a, c) => get(a)? * c,
        Op::Offset(a, c) => get(a)?.add_scalar(c),
        Op::Tanh(a) => get(a)?.map(f64::tanh),
        Op::Sigmoid(a) => get(a)?.map(sigmoid),
        Op::Softplus(a) => get(a)?.map(softplus),
        Op::Expand(a) => {
            let a = get(a)?;
            if a.nrows() == 1 && a.ncols() == 1 {
                Matrix::from_element(rows, cols, a[(0, 0)])
            } else {
                Matrix::from_fn(rows, cols, |_, j| a[(0, j)])
            }
        }
        Op::SumRows(a) => {
            let a = get(a)?;
            Matrix::from_fn(1, cols, |_, j| a.column(j).sum())
        }
        Op::Sum(a) => Matrix::from_element(1, 1, get(a)?.sum()),
        Op::SelectRow(a, k) => {
            let a = get(a)?;
            Matrix::from_fn(1, cols, |_, j| a[(k, j)])
        }
        Op::EmbedRow(a, k) => {
            let a = get(a)?;
            Matrix::from_fn(rows, cols, |i, j| if i == k { a[(0, j)] } else { 0.0 })
        }
    };
    Ok(value)
}
