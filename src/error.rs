//! Error type shared by every fallible operation in the crate.

use crate::grad_fn::OpKind;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = GradError> = std::result::Result<T, E>;

/// Everything that can go wrong while building or differentiating a graph.
///
/// Numeric edge cases (division by zero, `ln` of a non-positive value) are
/// not errors: they flow through values and gradients as `inf`/`NaN`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradError {
    /// Operand lengths are neither equal nor broadcastable (one side of length 1).
    #[error("shape mismatch in {op}: lengths {lhs} and {rhs} are not broadcastable")]
    ShapeMismatch {
        /// Operation that rejected the operands.
        op: &'static str,
        /// Length of the left operand.
        lhs: usize,
        /// Length of the right operand.
        rhs: usize,
    },

    /// The call is not valid for the node's current state.
    #[error("invalid operation {op}: {why}")]
    InvalidOperation {
        /// Operation that was attempted.
        op: &'static str,
        /// Why it was refused.
        why: String,
    },

    /// An edge was queried for something its variant does not have.
    #[error("unsupported graph structure on {op} edge: {why}")]
    UnsupportedGraphStructure {
        /// Kind of the edge that was queried.
        op: OpKind,
        /// What was asked for.
        why: &'static str,
    },
}

impl GradError {
    pub(crate) fn shape(op: &'static str, lhs: usize, rhs: usize) -> Self {
        Self::ShapeMismatch { op, lhs, rhs }
    }

    pub(crate) fn invalid(op: &'static str, why: impl Into<String>) -> Self {
        Self::InvalidOperation {
            op,
            why: why.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grad_fn::UnaryOp;

    #[test]
    fn messages_name_the_operation() {
        let e = GradError::shape("add", 3, 2);
        assert_eq!(
            e.to_string(),
            "shape mismatch in add: lengths 3 and 2 are not broadcastable"
        );

        let e = GradError::invalid("get_grad", "no backward pass has run");
        assert_eq!(
            e.to_string(),
            "invalid operation get_grad: no backward pass has run"
        );

        let e = GradError::UnsupportedGraphStructure {
            op: OpKind::Unary(UnaryOp::Sin),
            why: "unary edges have a single parent",
        };
        assert_eq!(
            e.to_string(),
            "unsupported graph structure on sin edge: unary edges have a single parent"
        );
    }
}
