//! Dependency edges and their local derivatives.
//!
//! An [`Edge`] records how a node was produced: which operation, applied to
//! which parent node(s). Given the parents' recorded forward values, it can
//! produce the partial derivative of the output with respect to either
//! operand, which is all the chain-rule step in
//! [`Node::backward`](crate::node::Node::backward) needs.
//!
//! | Operation | d/d(operand) |
//! |---|---|
//! | `Sum` | ones, shaped like the operand |
//! | `Neg` | -1 |
//! | `Add` | 1, 1 |
//! | `Sub` | 1, -1 |
//! | `Mul` | the other operand |
//! | `Div` | `1/rhs`, `-lhs/rhs²` |
//! | `Sin` | `cos(v)` |
//! | `Cos` | `-sin(v)` |
//! | `Tan` | `1/cos(v)²` |
//! | `Exp` | `exp(v)` |
//! | `Log` | `1/v` |

use crate::error::{GradError, Result};
use crate::node::Node;
use crate::vector::Vector;
use core::fmt;

/// Single-operand operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Sum,
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
}

/// Two-operand elementwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Operation kind of an edge, without its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

/// Which operand a derivative is taken with respect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The only operand of a unary edge, or the left one of a binary edge.
    Lhs,
    /// The right operand of a binary edge.
    Rhs,
}

impl UnaryOp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Neg => "neg",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Exp => "exp",
            Self::Log => "log",
        }
    }

    /// Forward value of the operation.
    pub fn apply(self, v: &Vector) -> Vector {
        match self {
            Self::Sum => v.sum(),
            Self::Neg => -v,
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Tan => v.tan(),
            Self::Exp => v.exp(),
            Self::Log => v.ln(),
        }
    }

    /// d(op(v))/dv, shaped like `v`.
    pub fn derivative(self, v: &Vector) -> Vector {
        match self {
            Self::Sum => Vector::ones(v.len()),
            Self::Neg => Vector::filled(v.len(), -1.0),
            Self::Sin => v.cos(),
            Self::Cos => v.map(|x| -x.sin()),
            Self::Tan => v.map(|x| {
                let c = x.cos();
                1.0 / (c * c)
            }),
            Self::Exp => v.exp(),
            Self::Log => v.recip(),
        }
    }
}

impl BinaryOp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
        }
    }

    /// Forward value of the operation.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the operands are not broadcastable.
    pub fn apply(self, lhs: &Vector, rhs: &Vector) -> Result<Vector> {
        match self {
            Self::Add => lhs.try_add(rhs),
            Self::Sub => lhs.try_sub(rhs),
            Self::Mul => lhs.try_mul(rhs),
            Self::Div => lhs.try_div(rhs),
        }
    }

    /// Partial derivative with respect to `side`, at the broadcast length of
    /// the two operands.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the operands are not broadcastable.
    pub fn derivative(self, side: Operand, lhs: &Vector, rhs: &Vector) -> Result<Vector> {
        let len = crate::ops::dispatch::broadcast_len(self.name(), lhs.len(), rhs.len())?;
        match (self, side) {
            (Self::Add, _) | (Self::Sub, Operand::Lhs) => Ok(Vector::ones(len)),
            (Self::Sub, Operand::Rhs) => Ok(Vector::filled(len, -1.0)),
            (Self::Mul, Operand::Lhs) => rhs.broadcast_to(len),
            (Self::Mul, Operand::Rhs) => lhs.broadcast_to(len),
            (Self::Div, Operand::Lhs) => rhs.recip().broadcast_to(len),
            (Self::Div, Operand::Rhs) => {
                // -lhs / rhs²
                let rhs_sq = rhs.try_mul(rhs)?;
                (-lhs).try_div(&rhs_sq)
            }
        }
    }
}

impl OpKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unary(op) => op.name(),
            Self::Binary(op) => op.name(),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a node was produced, holding shared handles to its parent node(s).
///
/// Parents are always nodes that were fully built before the edge, so the
/// graph cannot contain cycles.
#[derive(Clone)]
pub enum Edge {
    Unary { op: UnaryOp, parent: Node },
    Binary { op: BinaryOp, lhs: Node, rhs: Node },
}

impl Edge {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Unary { op, .. } => OpKind::Unary(*op),
            Self::Binary { op, .. } => OpKind::Binary(*op),
        }
    }

    /// The unary parent, or the left parent of a binary edge.
    pub fn parent(&self) -> &Node {
        match self {
            Self::Unary { parent, .. } => parent,
            Self::Binary { lhs, .. } => lhs,
        }
    }

    /// The right parent of a binary edge.
    ///
    /// # Errors
    /// [`GradError::UnsupportedGraphStructure`] on a unary edge.
    pub fn other_parent(&self) -> Result<&Node> {
        match self {
            Self::Binary { rhs, .. } => Ok(rhs),
            Self::Unary { .. } => Err(GradError::UnsupportedGraphStructure {
                op: self.kind(),
                why: "unary edges have no second parent",
            }),
        }
    }

    /// Parent on the given side.
    ///
    /// # Errors
    /// [`GradError::UnsupportedGraphStructure`] for [`Operand::Rhs`] on a unary edge.
    pub fn operand(&self, side: Operand) -> Result<&Node> {
        match side {
            Operand::Lhs => Ok(self.parent()),
            Operand::Rhs => self.other_parent(),
        }
    }

    /// Local derivative of the edge's output with respect to the parent on
    /// `side`, evaluated at the parents' recorded values.
    ///
    /// # Errors
    /// [`GradError::UnsupportedGraphStructure`] for [`Operand::Rhs`] on a unary edge.
    pub fn local_derivative(&self, side: Operand) -> Result<Vector> {
        match self {
            Self::Unary { op, parent } => match side {
                Operand::Lhs => Ok(op.derivative(parent.get_value())),
                Operand::Rhs => Err(GradError::UnsupportedGraphStructure {
                    op: self.kind(),
                    why: "unary edges have no right operand",
                }),
            },
            Self::Binary { op, lhs, rhs } => {
                op.derivative(side, lhs.get_value(), rhs.get_value())
            }
        }
    }

    /// Contribution to the gradient of the parent on `side`, given the
    /// gradient `seed` arriving at this edge's output.
    ///
    /// The result is reduced back to the parent's length when the parent
    /// was broadcast in the forward pass.
    ///
    /// # Errors
    /// Propagates [`local_derivative`](Self::local_derivative) and shape errors.
    pub fn chain(&self, side: Operand, seed: &Vector) -> Result<Vector> {
        let parent = self.operand(side)?;
        let local = self.local_derivative(side)?;
        seed.try_mul(&local)?.reduce_to(parent.len())
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary { op, parent } => f
                .debug_struct("Unary")
                .field("op", op)
                .field("parent", &parent.id())
                .finish(),
            Self::Binary { op, lhs, rhs } => f
                .debug_struct("Binary")
                .field("op", op)
                .field("lhs", &lhs.id())
                .field("rhs", &rhs.id())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector;

    fn leaf(v: Vector) -> Node {
        Node::new(v, true)
    }

    #[test]
    fn unary_formulas() {
        let v = vector![0.5, 1.0, 2.0];
        assert_eq!(UnaryOp::Sum.derivative(&v), Vector::ones(3));
        assert_eq!(UnaryOp::Neg.derivative(&v), Vector::filled(3, -1.0));
        assert_eq!(UnaryOp::Sin.derivative(&v), v.cos());
        assert_eq!(UnaryOp::Cos.derivative(&v), -v.sin());
        assert_eq!(UnaryOp::Exp.derivative(&v), v.exp());
        assert_eq!(UnaryOp::Log.derivative(&v), vector![2.0, 1.0, 0.5]);

        let tan = UnaryOp::Tan.derivative(&v);
        for i in 0..3 {
            let c = v[i].cos();
            assert!((tan[i] - 1.0 / (c * c)).abs() < 1e-12);
        }
    }

    #[test]
    fn binary_formulas() {
        let a = vector![1.0, 2.0, 3.0];
        let b = vector![2.0, 4.0, 8.0];
        let d = |op: BinaryOp, side| op.derivative(side, &a, &b).unwrap();

        assert_eq!(d(BinaryOp::Add, Operand::Lhs), Vector::ones(3));
        assert_eq!(d(BinaryOp::Add, Operand::Rhs), Vector::ones(3));
        assert_eq!(d(BinaryOp::Sub, Operand::Rhs), Vector::filled(3, -1.0));
        assert_eq!(d(BinaryOp::Mul, Operand::Lhs), b);
        assert_eq!(d(BinaryOp::Mul, Operand::Rhs), a);
        assert_eq!(d(BinaryOp::Div, Operand::Lhs), vector![0.5, 0.25, 0.125]);
        assert_eq!(
            d(BinaryOp::Div, Operand::Rhs),
            vector![-0.25, -0.125, -3.0 / 64.0]
        );
    }

    #[test]
    fn broadcast_operand_derivatives_have_output_length() {
        let s = Vector::scalar(3.0);
        let v = vector![1.0, 2.0];
        assert_eq!(
            BinaryOp::Mul.derivative(Operand::Lhs, &s, &v).unwrap(),
            vector![1.0, 2.0]
        );
        assert_eq!(
            BinaryOp::Mul.derivative(Operand::Rhs, &s, &v).unwrap(),
            vector![3.0, 3.0]
        );
        assert_eq!(
            BinaryOp::Add.derivative(Operand::Lhs, &s, &v).unwrap(),
            Vector::ones(2)
        );
    }

    #[test]
    fn unary_edge_has_no_other_parent() {
        let x = leaf(vector![1.0]);
        let edge = Edge::Unary {
            op: UnaryOp::Exp,
            parent: x.clone(),
        };
        assert_eq!(edge.parent().id(), x.id());
        assert!(matches!(
            edge.other_parent(),
            Err(GradError::UnsupportedGraphStructure {
                op: OpKind::Unary(UnaryOp::Exp),
                ..
            })
        ));
        assert!(matches!(
            edge.local_derivative(Operand::Rhs),
            Err(GradError::UnsupportedGraphStructure { .. })
        ));
    }

    #[test]
    fn chain_reduces_to_broadcast_parent() {
        let s = leaf(Vector::scalar(3.0));
        let v = leaf(vector![1.0, 2.0]);
        let edge = Edge::Binary {
            op: BinaryOp::Mul,
            lhs: s,
            rhs: v,
        };
        let seed = vector![1.0, 1.0];
        assert_eq!(edge.chain(Operand::Lhs, &seed).unwrap(), Vector::scalar(3.0));
        assert_eq!(edge.chain(Operand::Rhs, &seed).unwrap(), vector![3.0, 3.0]);
    }

    #[test]
    fn kinds_display_their_names() {
        assert_eq!(OpKind::Binary(BinaryOp::Div).to_string(), "div");
        assert_eq!(OpKind::Unary(UnaryOp::Log).to_string(), "log");
    }
}
