//! Symbolic graph of matrix-valued operations.
//!
//! A [`Graph`] records operations and their shapes, never values. Values are
//! supplied later through [`Op::Input`] slots when the graph is compiled and
//! evaluated, so one graph serves every batch of the same shape.
//!
//! [`Graph::grad`] appends the vector-Jacobian products of an output as new
//! nodes. Because gradients are ordinary nodes they can be differentiated
//! again, which is how second derivatives are obtained.

use std::fmt;

/// Handle to a node in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its graph.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Graph operation.
///
/// Binary elementwise operations require operands of identical shape;
/// broadcasting is explicit through [`Op::Expand`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// Value supplied at evaluation time, by slot.
    Input(usize),
    /// Matrix filled with one value.
    Constant(f64),
    /// a + b
    Add(NodeId, NodeId),
    /// a - b
    Sub(NodeId, NodeId),
    /// Elementwise a ⊙ b
    Mul(NodeId, NodeId),
    /// Matrix product a · b
    MatMul(NodeId, NodeId),
    /// aᵀ
    Transpose(NodeId),
    /// c · a
    Scale(NodeId, f64),
    /// a + c
    Offset(NodeId, f64),
    /// Elementwise tanh
    Tanh(NodeId),
    /// Elementwise logistic sigmoid
    Sigmoid(NodeId),
    /// Elementwise softplus
    Softplus(NodeId),
    /// Broadcast a 1×1 or 1×m operand to the node shape
    Expand(NodeId),
    /// Column sums, n×m → 1×m
    SumRows(NodeId),
    /// Sum of all entries, → 1×1
    Sum(NodeId),
    /// Row k of the operand, n×m → 1×m
    SelectRow(NodeId, usize),
    /// 1×m operand placed in row k of a zero matrix of the node shape
    EmbedRow(NodeId, usize),
}

impl Op {
    /// Operands of the operation, in order.
    pub fn operands(&self) -> impl Iterator<Item = NodeId> {
        let (a, b) = match *self {
            Op::Input(_) | Op::Constant(_) => (None, None),
            Op::Add(a, b) | Op::Sub(a, b) | Op::Mul(a, b) | Op::MatMul(a, b) => (Some(a), Some(b)),
            Op::Transpose(a)
            | Op::Scale(a, _)
            | Op::Offset(a, _)
            | Op::Tanh(a)
            | Op::Sigmoid(a)
            | Op::Softplus(a)
            | Op::Expand(a)
            | Op::SumRows(a)
            | Op::Sum(a)
            | Op::SelectRow(a, _)
            | Op::EmbedRow(a, _) => (Some(a), None),
        };
        a.into_iter().chain(b)
    }

    /// Rewrites every operand through `f`.
    pub(crate) fn map_operands(self, mut f: impl FnMut(NodeId) -> NodeId) -> Op {
        match self {
            Op::Input(_) | Op::Constant(_) => self,
            Op::Add(a, b) => Op::Add(f(a), f(b)),
            Op::Sub(a, b) => Op::Sub(f(a), f(b)),
            Op::Mul(a, b) => Op::Mul(f(a), f(b)),
            Op::MatMul(a, b) => Op::MatMul(f(a), f(b)),
            Op::Transpose(a) => Op::Transpose(f(a)),
            Op::Scale(a, c) => Op::Scale(f(a), c),
            Op::Offset(a, c) => Op::Offset(f(a), c),
            Op::Tanh(a) => Op::Tanh(f(a)),
            Op::Sigmoid(a) => Op::Sigmoid(f(a)),
            Op::Softplus(a) => Op::Softplus(f(a)),
            Op::Expand(a) => Op::Expand(f(a)),
            Op::SumRows(a) => Op::SumRows(f(a)),
            Op::Sum(a) => Op::Sum(f(a)),
            Op::SelectRow(a, k) => Op::SelectRow(f(a), k),
            Op::EmbedRow(a, k) => Op::EmbedRow(f(a), k),
        }
    }
}

/// A node: operation plus output shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Operation producing the node.
    pub op: Op,
    /// Output shape as (rows, cols).
    pub shape: (usize, usize),
}

/// Symbolic computation graph.
///
/// Node ids are only meaningful for the graph that issued them. Builder
/// methods assert shape agreement: a mismatch is a bug in the code tracing
/// the graph, not a runtime input error.
///
/// # Examples
/// ```
/// use pricer_pinn::autodiff::{CompiledGraph, Graph};
/// use nalgebra::DMatrix;
///
/// // f(x) = sum(tanh(x)), df/dx = 1 - tanh²(x)
/// let mut g = Graph::new();
/// let x = g.input(3, 1);
/// let y = g.tanh(x);
/// let f = g.sum(y);
/// let dx = g.grad(f, &[x])[0];
///
/// let program = CompiledGraph::compile(&g, &[f, dx]);
/// let xs = DMatrix::from_column_slice(3, 1, &[-1.0, 0.0, 0.5]);
/// let out = program.evaluate(&[&xs]).unwrap();
/// assert!((out[1][(1, 0)] - 1.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    input_shapes: Vec<(usize, usize)>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All nodes in insertion (topological) order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Shapes of the input slots, by slot.
    #[inline]
    pub fn input_shapes(&self) -> &[(usize, usize)] {
        &self.input_shapes
    }

    /// Output shape of a node.
    #[inline]
    pub fn shape(&self, id: NodeId) -> (usize, usize) {
        self.nodes[id.0].shape
    }

    fn push(&mut self, op: Op, shape: (usize, usize)) -> NodeId {
        self.nodes.push(Node { op, shape });
        NodeId(self.nodes.len() - 1)
    }

    fn same_shape(&self, op: &str, a: NodeId, b: NodeId) -> (usize, usize) {
        let (sa, sb) = (self.shape(a), self.shape(b));
        assert_eq!(sa, sb, "{}: operand shapes differ ({} vs {})", op, a, b);
        sa
    }

    /// New input slot of the given shape.
    pub fn input(&mut self, rows: usize, cols: usize) -> NodeId {
        self.input_shapes.push((rows, cols));
        self.push(Op::Input(self.input_shapes.len() - 1), (rows, cols))
    }

    /// Constant matrix.
    pub fn constant(&mut self, value: f64, rows: usize, cols: usize) -> NodeId {
        self.push(Op::Constant(value), (rows, cols))
    }

    /// Returns the value of a constant node.
    pub fn constant_value(&self, id: NodeId) -> Option<f64> {
        match self.nodes[id.0].op {
            Op::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// a + b
    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let shape = self.same_shape("add", a, b);
        self.push(Op::Add(a, b), shape)
    }

    /// a - b
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let shape = self.same_shape("sub", a, b);
        self.push(Op::Sub(a, b), shape)
    }

    /// Elementwise product. Multiplying by a constant one returns the other operand.
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let shape = self.same_shape("mul", a, b);
        if self.constant_value(b) == Some(1.0) {
            return a;
        }
        if self.constant_value(a) == Some(1.0) {
            return b;
        }
        self.push(Op::Mul(a, b), shape)
    }

    /// Matrix product.
    pub fn matmul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let ((m, k1), (k2, n)) = (self.shape(a), self.shape(b));
        assert_eq!(k1, k2, "matmul: inner dimensions differ ({} vs {})", a, b);
        self.push(Op::MatMul(a, b), (m, n))
    }

    /// Transpose.
    pub fn transpose(&mut self, a: NodeId) -> NodeId {
        let (r, c) = self.shape(a);
        self.push(Op::Transpose(a), (c, r))
    }

    /// c · a. Scaling by one returns `a`.
    pub fn scale(&mut self, a: NodeId, c: f64) -> NodeId {
        if c == 1.0 {
            return a;
        }
        let shape = self.shape(a);
        self.push(Op::Scale(a, c), shape)
    }

    /// a + c elementwise.
    pub fn offset(&mut self, a: NodeId, c: f64) -> NodeId {
        let shape = self.shape(a);
        self.push(Op::Offset(a, c), shape)
    }

    /// Elementwise tanh.
    pub fn tanh(&mut self, a: NodeId) -> NodeId {
        let shape = self.shape(a);
        self.push(Op::Tanh(a), shape)
    }

    /// Elementwise logistic sigmoid.
    pub fn sigmoid(&mut self, a: NodeId) -> NodeId {
        let shape = self.shape(a);
        self.push(Op::Sigmoid(a), shape)
    }

    /// Elementwise softplus.
    pub fn softplus(&mut self, a: NodeId) -> NodeId {
        let shape = self.shape(a);
        self.push(Op::Softplus(a), shape)
    }

    /// Broadcasts a 1×1 or 1×cols operand to rows×cols. An operand that
    /// already has the target shape is returned unchanged.
    pub fn expand(&mut self, a: NodeId, rows: usize, cols: usize) -> NodeId {
        let shape = self.shape(a);
        if shape == (rows, cols) {
            return a;
        }
        assert!(
            shape == (1, 1) || shape == (1, cols),
            "expand: cannot broadcast {}x{} to {}x{}",
            shape.0,
            shape.1,
            rows,
            cols
        );
        self.push(Op::Expand(a), (rows, cols))
    }

    /// Column sums.
    pub fn sum_rows(&mut self, a: NodeId) -> NodeId {
        let (_, c) = self.shape(a);
        self.push(Op::SumRows(a), (1, c))
    }

    /// Sum of all entries.
    pub fn sum(&mut self, a: NodeId) -> NodeId {
        self.push(Op::Sum(a), (1, 1))
    }

    /// Mean of all entries.
    pub fn mean(&mut self, a: NodeId) -> NodeId {
        let (r, c) = self.shape(a);
        let total = self.sum(a);
        self.scale(total, 1.0 / (r * c) as f64)
    }

    /// Row `k` as a 1×cols matrix.
    pub fn select_row(&mut self, a: NodeId, k: usize) -> NodeId {
        let (r, c) = self.shape(a);
        assert!(k < r, "select_row: row {} out of range for {} rows", k, r);
        self.push(Op::SelectRow(a, k), (1, c))
    }

    /// Places a 1×cols operand in row `k` of a rows×cols zero matrix.
    pub fn embed_row(&mut self, a: NodeId, k: usize, rows: usize) -> NodeId {
        let (r, c) = self.shape(a);
        assert!(r == 1 && k < rows, "embed_row: cannot place {}x{} at row {} of {}", r, c, k, rows);
        self.push(Op::EmbedRow(a, k), (rows, c))
    }

    fn accumulate(&mut self, adjoints: &mut [Option<NodeId>], target: NodeId, contribution: NodeId) {
        adjoints[target.0] = Some(match adjoints[target.0] {
            Some(existing) => self.add(existing, contribution),
            None => contribution,
        });
    }

    /// Reverse-mode gradient of `output` with respect to each node in `wrt`.
    ///
    /// The output is seeded with ones of its own shape, so for a non-scalar
    /// output this is the gradient of the sum of its entries. Only nodes on a
    /// path from some `wrt` node to the output are visited. Nodes the output
    /// does not depend on receive a zero gradient.
    ///
    /// The returned nodes are part of this graph and can themselves be
    /// differentiated.
    pub fn grad(&mut self, output: NodeId, wrt: &[NodeId]) -> Vec<NodeId> {
        let end = output.0 + 1;

        let mut depends = vec![false; end];
        for &w in wrt {
            if w.0 < end {
                depends[w.0] = true;
            }
        }
        for i in 0..end {
            if !depends[i] {
                depends[i] = self.nodes[i].op.operands().any(|o| depends[o.0]);
            }
        }

        let mut adjoints: Vec<Option<NodeId>> = vec![None; end];
        let (rows, cols) = self.shape(output);
        adjoints[output.0] = Some(self.constant(1.0, rows, cols));

        for i in (0..end).rev() {
            if !depends[i] {
                continue;
            }
            let Some(g) = adjoints[i] else { continue };
            let node = NodeId(i);
            let op = self.nodes[i].op;

            match op {
                Op::Input(_) | Op::Constant(_) => {}
                Op::Add(a, b) => {
                    if depends[a.0] {
                        self.accumulate(&mut adjoints, a, g);
                    }
                    if depends[b.0] {
                        self.accumulate(&mut adjoints, b, g);
                    }
                }
                Op::Sub(a, b) => {
                    if depends[a.0] {
                        self.accumulate(&mut adjoints, a, g);
                    }
                    if depends[b.0] {
                        let neg = self.scale(g, -1.0);
                        self.accumulate(&mut adjoints, b, neg);
                    }
                }
                Op::Mul(a, b) => {
                    if depends[a.0] {
                        let da = self.mul(g, b);
                        self.accumulate(&mut adjoints, a, da);
                    }
                    if depends[b.0] {
                        let db = self.mul(g, a);
                        self.accumulate(&mut adjoints, b, db);
                    }
                }
                Op::MatMul(a, b) => {
                    if depends[a.0] {
                        let bt = self.transpose(b);
                        let da = self.matmul(g, bt);
                        self.accumulate(&mut adjoints, a, da);
                    }
                    if depends[b.0] {
                        let at = self.transpose(a);
                        let db = self.matmul(at, g);
                        self.accumulate(&mut adjoints, b, db);
                    }
                }
                Op::Transpose(a) => {
                    let da = self.transpose(g);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::Scale(a, c) => {
                    let da = self.scale(g, c);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::Offset(a, _) => self.accumulate(&mut adjoints, a, g),
                Op::Tanh(a) => {
                    // 1 - y²
                    let y2 = self.mul(node, node);
                    let neg = self.scale(y2, -1.0);
                    let dy = self.offset(neg, 1.0);
                    let da = self.mul(g, dy);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::Sigmoid(a) => {
                    // y (1 - y)
                    let neg = self.scale(node, -1.0);
                    let one_minus = self.offset(neg, 1.0);
                    let dy = self.mul(node, one_minus);
                    let da = self.mul(g, dy);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::Softplus(a) => {
                    let s = self.sigmoid(a);
                    let da = self.mul(g, s);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::Expand(a) => {
                    let da = if self.shape(a) == (1, 1) {
                        self.sum(g)
                    } else {
                        self.sum_rows(g)
                    };
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::SumRows(a) | Op::Sum(a) => {
                    let (r, c) = self.shape(a);
                    let da = self.expand(g, r, c);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::SelectRow(a, k) => {
                    let rows = self.shape(a).0;
                    let da = self.embed_row(g, k, rows);
                    self.accumulate(&mut adjoints, a, da);
                }
                Op::EmbedRow(a, k) => {
                    let da = self.select_row(g, k);
                    self.accumulate(&mut adjoints, a, da);
                }
            }
        }

        wrt.iter()
            .map(|&w| match adjoints.get(w.0).copied().flatten() {
                Some(g) => g,
                None => {
                    let (r, c) = self.shape(w);
                    self.constant(0.0, r, c)
                }
            })
            .collect()
    }
}
