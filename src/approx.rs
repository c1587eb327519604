//! Approximate equality for values and gradients.
//!
//! Exact `==` is fine for arithmetic on small integers, but anything that
//! goes through `sin`, `exp` or division needs a tolerance. [`close`] is the
//! plain check; [`RelativeEq`] grades how close two values are.

use crate::node::Node;
use crate::vector::Vector;

/// Loosest accepted error.
pub const F64_MAX_ERROR: f64 = 1e-3;

/// Typical error after a few transcendental ops.
pub const F64_AVG_ERROR: f64 = 1e-6;

/// Error expected from pure arithmetic.
pub const F64_MIN_ERROR: f64 = 1e-13;

/// How close two values are, best first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApproxEquality {
    /// Within [`F64_MIN_ERROR`].
    Precise = 0,
    /// Within [`F64_AVG_ERROR`].
    Partial = 1,
    /// Within [`F64_MAX_ERROR`].
    Relative = 2,
    /// Not close, different lengths, or `NaN` involved.
    Scarce = 3,
}

impl ApproxEquality {
    fn of(diff: f64) -> Self {
        if diff < F64_MIN_ERROR {
            Self::Precise
        } else if diff < F64_AVG_ERROR {
            Self::Partial
        } else if diff < F64_MAX_ERROR {
            Self::Relative
        } else {
            // also catches NaN, which fails every comparison above
            Self::Scarce
        }
    }
}

/// Grades the distance between `self` and `rhs`.
pub trait RelativeEq<Rhs: ?Sized = Self> {
    /// The worst grade over all elements.
    fn approx_eq(&self, rhs: &Rhs) -> ApproxEquality;
}

impl RelativeEq for f64 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        ApproxEquality::of(max_abs_diff(&[*self], &[*rhs]))
    }
}

impl RelativeEq for [f64] {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self.len() != rhs.len() {
            return ApproxEquality::Scarce;
        }
        ApproxEquality::of(max_abs_diff(self, rhs))
    }
}

impl RelativeEq for Vector {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        self.as_slice().approx_eq(rhs.as_slice())
    }
}

impl RelativeEq<Vector> for Node {
    fn approx_eq(&self, rhs: &Vector) -> ApproxEquality {
        self.get_value().approx_eq(rhs)
    }
}

/// Largest elementwise `|a - b|`; `NaN` if any pair involves `NaN`.
///
/// Slices are compared over their common prefix.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, |acc: f64, d| if d.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(d) })
}

/// Whether `a` and `b` have the same length and every pair is within `eps`.
pub fn close(a: &Vector, b: &Vector, eps: f64) -> bool {
    a.len() == b.len() && max_abs_diff(a.as_slice(), b.as_slice()) < eps
}

/// [`RelativeEq`] shortcut: true only for [`ApproxEquality::Precise`].
pub fn approx_eq<A: RelativeEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    a.approx_eq(b) == ApproxEquality::Precise
}
