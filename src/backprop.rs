//! Differentiable operations on graph nodes.
//!
//! # Operation Builders
//!
//! Every function here takes existing [`Node`]s and returns a new one:
//!
//! 1. **Forward pass**: the output value is computed from the operand
//!    value(s) with [`Vector`] arithmetic.
//! 2. **Flag**: the output requires grad if any operand does.
//! 3. **Edge**: when it requires grad, the output records an [`Edge`] of the
//!    matching kind holding handles to the operands, so that
//!    [`Node::backward`] can later apply the right local derivative.
//!
//! Operands are only borrowed; the new node keeps its own handles.
//!
//! ## Usage Guidelines
//!
//! - Binary builders return [`Result`] and fail with
//!   [`GradError::ShapeMismatch`](crate::error::GradError::ShapeMismatch) on
//!   non-broadcastable lengths. The operator overloads on [`Node`] call these
//!   and panic instead.
//! - To combine a node with a constant, wrap the constant in
//!   [`Node::constant`]; the `f64` operator overloads do exactly that.
//! - Numeric edge cases (`x / 0`, `log` of a non-positive value) are not
//!   trapped; `inf` and `NaN` flow through values and gradients.
//!
//! # Example
//! ```rust
//! use vecgrad::{backprop, vector, Node};
//!
//! let x = Node::tracked(vector![1.0, 2.0]);
//! let y = backprop::mul(&x, &x).unwrap();
//! let loss = backprop::sum(&y);
//! loss.backward().unwrap();
//! assert_eq!(x.get_grad().unwrap(), vector![2.0, 4.0]);
//! ```

use crate::error::Result;
use crate::grad_fn::{BinaryOp, Edge, UnaryOp};
use crate::node::Node;
use crate::vector::Vector;

fn unary(op: UnaryOp, v: &Node) -> Node {
    let value = op.apply(v.get_value());
    let requires_grad = v.requires_grad();
    let edge = requires_grad.then(|| Edge::Unary {
        op,
        parent: v.clone(),
    });
    Node::build(value, requires_grad, edge)
}

fn binary(op: BinaryOp, lhs: &Node, rhs: &Node) -> Result<Node> {
    let value = op.apply(lhs.get_value(), rhs.get_value())?;
    let requires_grad = lhs.requires_grad() || rhs.requires_grad();
    let edge = requires_grad.then(|| Edge::Binary {
        op,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    });
    Ok(Node::build(value, requires_grad, edge))
}

/// Elementwise `lhs + rhs`.
///
/// # Errors
/// Shape mismatch if the lengths are not broadcastable.
pub fn add(lhs: &Node, rhs: &Node) -> Result<Node> {
    binary(BinaryOp::Add, lhs, rhs)
}

/// Elementwise `lhs - rhs`.
///
/// # Errors
/// Shape mismatch if the lengths are not broadcastable.
pub fn sub(lhs: &Node, rhs: &Node) -> Result<Node> {
    binary(BinaryOp::Sub, lhs, rhs)
}

/// Elementwise `lhs * rhs`. Each operand's gradient is scaled by the other
/// operand's value.
///
/// # Errors
/// Shape mismatch if the lengths are not broadcastable.
pub fn mul(lhs: &Node, rhs: &Node) -> Result<Node> {
    binary(BinaryOp::Mul, lhs, rhs)
}

/// Elementwise `lhs / rhs`.
///
/// # Errors
/// Shape mismatch if the lengths are not broadcastable.
pub fn div(lhs: &Node, rhs: &Node) -> Result<Node> {
    binary(BinaryOp::Div, lhs, rhs)
}

/// Elementwise negation.
pub fn neg(v: &Node) -> Node {
    unary(UnaryOp::Neg, v)
}

/// Sum of all elements, as a length-1 node.
pub fn sum(v: &Node) -> Node {
    unary(UnaryOp::Sum, v)
}

pub fn sin(v: &Node) -> Node {
    unary(UnaryOp::Sin, v)
}

pub fn cos(v: &Node) -> Node {
    unary(UnaryOp::Cos, v)
}

pub fn tan(v: &Node) -> Node {
    unary(UnaryOp::Tan, v)
}

pub fn exp(v: &Node) -> Node {
    unary(UnaryOp::Exp, v)
}

/// Natural logarithm.
pub fn log(v: &Node) -> Node {
    unary(UnaryOp::Log, v)
}

/// `node op scalar`, with the scalar promoted to an untracked leaf shaped
/// like `node`.
///
/// # Errors
/// Never fails for the shapes it builds; the `Result` is the binary builder's.
pub fn with_scalar(op: BinaryOp, node: &Node, scalar: f64) -> Result<Node> {
    let c = Node::constant(Vector::filled(node.len(), scalar));
    binary(op, node, &c)
}

/// `scalar op node`, with the scalar promoted to an untracked leaf shaped
/// like `node`.
///
/// # Errors
/// Never fails for the shapes it builds; the `Result` is the binary builder's.
pub fn scalar_with(op: BinaryOp, scalar: f64, node: &Node) -> Result<Node> {
    let c = Node::constant(Vector::filled(node.len(), scalar));
    binary(op, &c, node)
}
