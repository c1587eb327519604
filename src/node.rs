//! Computation graph nodes.
//!
//! A [`Node`] is a reference-counted handle: cloning it is cheap and every
//! clone refers to the same graph node, so one tracked value can feed any
//! number of downstream expressions. A node holds
//!
//! - its forward value, fixed at construction,
//! - a `requires_grad` flag, fixed at construction,
//! - a gradient accumulator, allocated by the first `backward` that reaches it,
//! - an optional [`Edge`] to the parent node(s) it was computed from.
//!
//! ## Lifecycle
//!
//! ```text
//! Leaf / Intermediate --backward--> GradAccumulated --zero_grad--> leaf-like
//!                                        ^    |
//!                                        +----+ backward (accumulates)
//! ```
//!
//! `zero_grad` clears the accumulator and drops the edge, releasing parent
//! references. In an optimization loop this is what keeps the graph from
//! growing across iterations.
//!
//! ## Example
//!
//! ```rust
//! use vecgrad::{vector, Node};
//!
//! let a = Node::new(vector![1.0, 2.0, 3.0], true);
//! let b = Node::new(vector![2.0, 2.0, 2.0], true);
//! let r = &a * &b;
//! assert_eq!(r.get_value(), &vector![2.0, 4.0, 6.0]);
//!
//! r.backward_with(vector![-1.0, 1.0, 2.0]).unwrap();
//! assert_eq!(a.get_grad().unwrap(), vector![-2.0, 2.0, 4.0]);
//! assert_eq!(b.get_grad().unwrap(), vector![-1.0, 2.0, 6.0]);
//! ```

use crate::backend::use_parallel;
use crate::backprop;
use crate::error::{GradError, Result};
use crate::grad_fn::{BinaryOp, Edge, OpKind, Operand};
use crate::vector::Vector;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};
use core::sync::atomic::{AtomicU64, Ordering};
use log::{debug, trace};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> NodeId {
    NodeId(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Unique, creation-ordered identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Inner {
    id: NodeId,
    value: Vector,
    requires_grad: bool,
    grad: Mutex<Option<Vector>>,
    edge: Mutex<Option<Edge>>,
}

// Unlinks ancestors iteratively. Letting each `Edge` drop its parents in
// turn recurses once per node and overflows the stack on long chains.
impl Drop for Inner {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        push_parents(take_edge(&mut self.edge), &mut pending);
        while let Some(node) = pending.pop() {
            if let Some(mut inner) = Arc::into_inner(node.0) {
                push_parents(take_edge(&mut inner.edge), &mut pending);
            }
        }
    }
}

fn take_edge(edge: &mut Mutex<Option<Edge>>) -> Option<Edge> {
    edge.get_mut().unwrap_or_else(PoisonError::into_inner).take()
}

fn push_parents(edge: Option<Edge>, pending: &mut Vec<Node>) {
    match edge {
        Some(Edge::Unary { parent, .. }) => pending.push(parent),
        Some(Edge::Binary { lhs, rhs, .. }) => {
            pending.push(lhs);
            pending.push(rhs);
        }
        None => {}
    }
}

// Each critical section is a single read or assignment, so a poisoned
// lock still guards consistent data.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a node of the computation graph.
#[derive(Clone)]
pub struct Node(Arc<Inner>);

impl Node {
    /// Creates a leaf node from raw values.
    pub fn new(values: impl Into<Vector>, requires_grad: bool) -> Self {
        Self::build(values.into(), requires_grad, None)
    }

    /// Creates a tracked leaf (`requires_grad = true`).
    pub fn tracked(values: impl Into<Vector>) -> Self {
        Self::new(values, true)
    }

    /// Creates an untracked leaf (`requires_grad = false`).
    pub fn constant(values: impl Into<Vector>) -> Self {
        Self::new(values, false)
    }

    /// Creates a tracked length-1 leaf.
    pub fn scalar(value: f64) -> Self {
        Self::new(Vector::scalar(value), true)
    }

    pub(crate) fn build(value: Vector, requires_grad: bool, edge: Option<Edge>) -> Self {
        // an edge is only worth keeping if something upstream wants gradients
        let edge = edge.filter(|_| requires_grad);
        Self(Arc::new(Inner {
            id: next_node_id(),
            value,
            requires_grad,
            grad: Mutex::new(None),
            edge: Mutex::new(edge),
        }))
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// The forward value.
    pub fn get_value(&self) -> &Vector {
        &self.0.value
    }

    pub fn len(&self) -> usize {
        self.0.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.value.is_empty()
    }

    pub fn requires_grad(&self) -> bool {
        self.0.requires_grad
    }

    /// Whether the node currently has no dependency edge.
    pub fn is_leaf(&self) -> bool {
        lock(&self.0.edge).is_none()
    }

    /// Kind of the operation that produced this node, if it still has an edge.
    pub fn edge_kind(&self) -> Option<OpKind> {
        lock(&self.0.edge).as_ref().map(Edge::kind)
    }

    /// A copy of the dependency edge, if any.
    pub fn edge(&self) -> Option<Edge> {
        lock(&self.0.edge).clone()
    }

    /// Whether `self` and `other` are handles to the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The accumulated gradient.
    ///
    /// # Errors
    /// [`GradError::InvalidOperation`] if no backward pass has reached this
    /// node since it was created or last zeroed.
    pub fn get_grad(&self) -> Result<Vector> {
        lock(&self.0.grad).clone().ok_or_else(|| {
            GradError::invalid(
                "get_grad",
                format!("node {} has no gradient; run backward first", self.id()),
            )
        })
    }

    /// Clears the gradient and detaches the dependency edge.
    ///
    /// Afterwards the node behaves like a fresh leaf holding the same value:
    /// a new `backward` produces exactly what it would on a brand-new node.
    pub fn zero_grad(&self) {
        let had_edge = lock(&self.0.edge).take().is_some();
        *lock(&self.0.grad) = None;
        debug!("zero_grad on node {} (detached edge: {had_edge})", self.id());
    }

    /// Backward pass seeded with ones shaped like this node's value.
    ///
    /// For a length-1 (reduced) output the seed is `{1}`.
    ///
    /// # Errors
    /// See [`backward_with`](Self::backward_with).
    pub fn backward(&self) -> Result<()> {
        self.backward_with(Vector::ones(self.len()))
    }

    /// Backward pass from this node with an explicit upstream gradient.
    ///
    /// The seed is accumulated into this node's gradient, then pushed
    /// through the dependency edges, scaled by each operation's local
    /// derivative, into every ancestor that requires grad. Gradients always
    /// accumulate; use [`zero_grad`](Self::zero_grad) to reset.
    ///
    /// A seed of length 1 is broadcast to the node's length.
    ///
    /// # Errors
    /// - [`GradError::InvalidOperation`] if the node does not require grad
    ///   or its value is empty.
    /// - [`GradError::ShapeMismatch`] if the seed's length is neither the
    ///   node's length nor 1.
    ///
    /// Errors are detected before any gradient is touched.
    pub fn backward_with(&self, seed: impl Into<Vector>) -> Result<()> {
        if !self.requires_grad() {
            return Err(GradError::invalid(
                "backward",
                format!("node {} does not require grad", self.id()),
            ));
        }
        if self.is_empty() {
            return Err(GradError::invalid(
                "backward",
                format!("node {} has an empty value", self.id()),
            ));
        }
        let seed = seed.into();
        let seed = seed
            .broadcast_to(self.len())
            .map_err(|_| GradError::shape("backward", self.len(), seed.len()))?;

        debug!("backward from node {} (len {})", self.id(), self.len());
        self.propagate(seed)?;
        debug!("backward from node {} done", self.id());
        Ok(())
    }

    /// Accumulates `seed` and recurses into the parents.
    ///
    /// `seed` always has this node's length here.
    fn propagate(&self, seed: Vector) -> Result<()> {
        {
            let mut grad = lock(&self.0.grad);
            match grad.as_mut() {
                Some(acc) => acc.try_add_assign(&seed)?,
                None => {
                    let mut acc = Vector::zeros(seed.len());
                    acc.try_add_assign(&seed)?;
                    *grad = Some(acc);
                }
            }
        }

        // clone the edge out so no lock is held while recursing
        let Some(edge) = self.edge() else {
            return Ok(());
        };
        trace!("node {}: {} edge, seed len {}", self.id(), edge.kind(), seed.len());

        match &edge {
            Edge::Unary { parent, .. } => {
                if parent.requires_grad() {
                    let parent_seed = edge.chain(Operand::Lhs, &seed)?;
                    parent.propagate(parent_seed)?;
                }
                Ok(())
            }
            Edge::Binary { lhs, rhs, .. } => {
                let into = |side: Operand, parent: &Node| -> Result<()> {
                    if !parent.requires_grad() {
                        return Ok(());
                    }
                    let parent_seed = edge.chain(side, &seed)?;
                    parent.propagate(parent_seed)
                };

                if lhs.requires_grad() && rhs.requires_grad() && use_parallel(seed.len()) {
                    trace!("node {}: forking backward into {} and {}", self.id(), lhs.id(), rhs.id());
                    let (l, r) = rayon::join(|| into(Operand::Lhs, lhs), || into(Operand::Rhs, rhs));
                    l.and(r)
                } else {
                    into(Operand::Lhs, lhs)?;
                    into(Operand::Rhs, rhs)
                }
            }
        }
    }

    /// `self + other`. See [`backprop::add`].
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        backprop::add(self, other)
    }

    /// `self - other`. See [`backprop::sub`].
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        backprop::sub(self, other)
    }

    /// `self * other`. See [`backprop::mul`].
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        backprop::mul(self, other)
    }

    /// `self / other`. See [`backprop::div`].
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_div(&self, other: &Self) -> Result<Self> {
        backprop::div(self, other)
    }

    /// Sum of all elements as a length-1 node.
    #[must_use]
    pub fn sum(&self) -> Self {
        backprop::sum(self)
    }

    #[must_use]
    pub fn sin(&self) -> Self {
        backprop::sin(self)
    }

    #[must_use]
    pub fn cos(&self) -> Self {
        backprop::cos(self)
    }

    #[must_use]
    pub fn tan(&self) -> Self {
        backprop::tan(self)
    }

    #[must_use]
    pub fn exp(&self) -> Self {
        backprop::exp(self)
    }

    /// Natural logarithm.
    #[must_use]
    pub fn log(&self) -> Self {
        backprop::log(self)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("value", self.get_value())
            .field("requires_grad", &self.requires_grad())
            .field("grad", &*lock(&self.0.grad))
            .field("edge", &self.edge_kind())
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get_value(), f)
    }
}

/// Nodes compare by forward value, elementwise.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.get_value() == other.get_value()
    }
}

impl PartialEq<Vector> for Node {
    fn eq(&self, other: &Vector) -> bool {
        self.get_value() == other
    }
}

macro_rules! impl_node_binop {
    ($trait:ident, $method:ident, $build:path, $op:expr) => {
        /// # Panics
        /// Panics if the lengths are not broadcastable; use the `try_*`
        /// methods or [`crate::backprop`] to get a `Result` instead.
        impl $trait<&Node> for &Node {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                match $build(self, rhs) {
                    Ok(n) => n,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait<Node> for Node {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $trait::$method(&self, &rhs)
            }
        }

        impl $trait<&Node> for Node {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<Node> for &Node {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $trait::$method(self, &rhs)
            }
        }

        /// The constant becomes an untracked leaf shaped like `self`.
        impl $trait<f64> for &Node {
            type Output = Node;

            fn $method(self, rhs: f64) -> Node {
                match backprop::with_scalar($op, self, rhs) {
                    Ok(n) => n,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait<f64> for Node {
            type Output = Node;

            fn $method(self, rhs: f64) -> Node {
                $trait::$method(&self, rhs)
            }
        }

        /// The constant becomes an untracked leaf shaped like `rhs`.
        impl $trait<&Node> for f64 {
            type Output = Node;

            fn $method(self, rhs: &Node) -> Node {
                match backprop::scalar_with($op, self, rhs) {
                    Ok(n) => n,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait<Node> for f64 {
            type Output = Node;

            fn $method(self, rhs: Node) -> Node {
                $trait::$method(self, &rhs)
            }
        }
    };
}

impl_node_binop!(Add, add, backprop::add, BinaryOp::Add);
impl_node_binop!(Sub, sub, backprop::sub, BinaryOp::Sub);
impl_node_binop!(Mul, mul, backprop::mul, BinaryOp::Mul);
impl_node_binop!(Div, div, backprop::div, BinaryOp::Div);

impl Neg for &Node {
    type Output = Node;

    fn neg(self) -> Node {
        backprop::neg(self)
    }
}

impl Neg for Node {
    type Output = Node;

    fn neg(self) -> Node {
        backprop::neg(&self)
    }
}
