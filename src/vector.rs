//! Core numeric vector type and its elementwise arithmetic.
//!
//! # Vector Utilities
//!
//! [`Vector`] is a fixed-length sequence of `f64` with value semantics. It is
//! the forward value and the gradient of every graph node, but knows nothing
//! about graphs itself.
//!
//! It supports:
//! - Elementwise `+ - * /` and negation with size-1 broadcasting
//! - Scalar arithmetic on either side (`v * 2.0`, `1.0 / v`)
//! - A `sum` reduction to a length-1 vector
//! - Elementwise `sin cos tan exp ln abs`
//! - Parsing from `[1, 2, 3]` text and a `vector!` literal macro
//!
//! ## Broadcasting
//!
//! Binary operations require equal lengths, or one operand of length 1,
//! which is then repeated to the other operand's length. Anything else is a
//! [`GradError::ShapeMismatch`].
//!
//! The fallible `try_*` methods report that error; the `std::ops` operators
//! panic with the same message instead.
//!
//! ## Example
//!
//! ```rust
//! use vecgrad::vector::Vector;
//! let v = Vector::new(vec![1.0, 2.0, 3.0]);
//! let w = &v * 2.0 + &Vector::scalar(1.0);
//! assert_eq!(w, Vector::new(vec![3.0, 5.0, 7.0]));
//! assert_eq!(w.sum(), Vector::scalar(15.0));
//! ```

use crate::error::{GradError, Result};
use crate::ops::dispatch;
use core::fmt;
use core::ops::{Add, Div, Index, Mul, Neg, Sub};
use core::str::FromStr;
use thiserror::Error;

/// An ordered, fixed-length sequence of real numbers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Creates a vector holding `data`.
    pub fn new(data: impl Into<Vec<f64>>) -> Self {
        Self { data: data.into() }
    }

    /// A vector of `len` copies of `value`.
    #[must_use]
    pub fn filled(len: usize, value: f64) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self::filled(len, 0.0)
    }

    #[must_use]
    pub fn ones(len: usize) -> Self {
        Self::filled(len, 1.0)
    }

    /// A length-1 vector.
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        Self { data: vec![value] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> core::slice::Iter<'_, f64> {
        self.data.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Resizes in place, zero-filling new slots.
    ///
    /// This is the only way a vector changes length after construction.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len, 0.0);
    }

    /// Elementwise sum, broadcasting a length-1 side.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        dispatch::binary("add", &self.data, &rhs.data, |a, b| a + b).map(Self::new)
    }

    /// Elementwise difference, broadcasting a length-1 side.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_sub(&self, rhs: &Self) -> Result<Self> {
        dispatch::binary("sub", &self.data, &rhs.data, |a, b| a - b).map(Self::new)
    }

    /// Elementwise product, broadcasting a length-1 side.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_mul(&self, rhs: &Self) -> Result<Self> {
        dispatch::binary("mul", &self.data, &rhs.data, |a, b| a * b).map(Self::new)
    }

    /// Elementwise quotient, broadcasting a length-1 side.
    ///
    /// Division by zero yields `inf`/`NaN` rather than an error.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] if the lengths are not broadcastable.
    pub fn try_div(&self, rhs: &Self) -> Result<Self> {
        dispatch::binary("div", &self.data, &rhs.data, |a, b| a / b).map(Self::new)
    }

    /// Adds `rhs` into `self` without changing `self`'s length.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] unless `rhs` has `self`'s length or length 1.
    pub fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        dispatch::accumulate(&mut self.data, &rhs.data)
    }

    /// Repeats a length-1 vector to `len` elements; same-length vectors are cloned.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] for any other length.
    pub fn broadcast_to(&self, len: usize) -> Result<Self> {
        match self.len() {
            n if n == len => Ok(self.clone()),
            1 => Ok(Self::filled(len, self.data[0])),
            n => Err(GradError::shape("broadcast", n, len)),
        }
    }

    /// Inverse of [`broadcast_to`](Self::broadcast_to): sums down to length 1
    /// when `len` is 1, clones when the length already matches.
    ///
    /// # Errors
    /// [`GradError::ShapeMismatch`] for any other length.
    pub fn reduce_to(&self, len: usize) -> Result<Self> {
        match (self.len(), len) {
            (n, l) if n == l => Ok(self.clone()),
            (_, 1) => Ok(self.sum()),
            (n, l) => Err(GradError::shape("reduce", n, l)),
        }
    }

    /// Sum of all elements as a length-1 vector.
    #[must_use]
    pub fn sum(&self) -> Self {
        Self::scalar(dispatch::sum(&self.data))
    }

    /// Applies `f` to every element.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64 + Sync + Send) -> Self {
        Self::new(dispatch::unary(&self.data, f))
    }

    /// Multiplies every element by `k`.
    #[must_use]
    pub fn scale(&self, k: f64) -> Self {
        self.map(|x| x * k)
    }

    #[must_use]
    pub fn sin(&self) -> Self {
        self.map(f64::sin)
    }

    #[must_use]
    pub fn cos(&self) -> Self {
        self.map(f64::cos)
    }

    #[must_use]
    pub fn tan(&self) -> Self {
        self.map(f64::tan)
    }

    #[must_use]
    pub fn exp(&self) -> Self {
        self.map(f64::exp)
    }

    /// Natural logarithm. Non-positive inputs give `-inf`/`NaN`.
    #[must_use]
    pub fn ln(&self) -> Self {
        self.map(f64::ln)
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Elementwise `1 / x`.
    #[must_use]
    pub fn recip(&self) -> Self {
        self.map(f64::recip)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self { data }
    }
}

impl From<&[f64]> for Vector {
    fn from(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(data: [f64; N]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl From<f64> for Vector {
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a f64;
    type IntoIter = core::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("]")
    }
}

macro_rules! impl_vector_binop {
    ($trait:ident, $method:ident, $try:ident) => {
        /// # Panics
        /// Panics if the lengths are not broadcastable.
        impl $trait<&Vector> for &Vector {
            type Output = Vector;

            fn $method(self, rhs: &Vector) -> Vector {
                match self.$try(rhs) {
                    Ok(v) => v,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait<Vector> for Vector {
            type Output = Vector;

            fn $method(self, rhs: Vector) -> Vector {
                $trait::$method(&self, &rhs)
            }
        }

        impl $trait<&Vector> for Vector {
            type Output = Vector;

            fn $method(self, rhs: &Vector) -> Vector {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<Vector> for &Vector {
            type Output = Vector;

            fn $method(self, rhs: Vector) -> Vector {
                $trait::$method(self, &rhs)
            }
        }

        impl $trait<f64> for &Vector {
            type Output = Vector;

            fn $method(self, rhs: f64) -> Vector {
                self.map(move |x| $trait::$method(x, rhs))
            }
        }

        impl $trait<f64> for Vector {
            type Output = Vector;

            fn $method(self, rhs: f64) -> Vector {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<&Vector> for f64 {
            type Output = Vector;

            fn $method(self, rhs: &Vector) -> Vector {
                rhs.map(move |x| $trait::$method(self, x))
            }
        }

        impl $trait<Vector> for f64 {
            type Output = Vector;

            fn $method(self, rhs: Vector) -> Vector {
                $trait::$method(self, &rhs)
            }
        }
    };
}

impl_vector_binop!(Add, add, try_add);
impl_vector_binop!(Sub, sub, try_sub);
impl_vector_binop!(Mul, mul, try_mul);
impl_vector_binop!(Div, div, try_div);

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.map(|x| -x)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        -&self
    }
}

/// Why a string could not be read as a [`Vector`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVectorError {
    /// Input is not wrapped in `[` and `]`.
    #[error("expected a bracketed list like [1, 2, 3]")]
    MissingBrackets,
    /// Two commas in a row, or a trailing comma.
    #[error("empty element at position {0}")]
    EmptyElement(usize),
    /// An element is not a number.
    #[error("bad number {0:?}")]
    BadNumber(String),
}

/// Parses `[1, 2.5, -3e2]`. A bare number parses as a length-1 vector and
/// `[]` as an empty one.
impl FromStr for Vector {
    type Err = ParseVectorError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(x) = s.parse::<f64>() {
            return Ok(Self::scalar(x));
        }

        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or(ParseVectorError::MissingBrackets)?;
        if inner.trim().is_empty() {
            return Ok(Self::default());
        }

        inner
            .split(',')
            .enumerate()
            .map(|(i, tok)| {
                let tok = tok.trim();
                if tok.is_empty() {
                    return Err(ParseVectorError::EmptyElement(i));
                }
                tok.parse::<f64>()
                    .map_err(|_| ParseVectorError::BadNumber(tok.to_string()))
            })
            .collect()
    }
}

/// Builds a [`Vector`] from a literal list, or `value; len` for a filled one.
///
/// # Example
/// ```
/// use vecgrad::vector;
/// let v = vector![1.0, 2.0, 3.0];
/// assert_eq!(v.len(), 3);
/// assert_eq!(vector![0.5; 4], vecgrad::vector::Vector::filled(4, 0.5));
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::vector::Vector::default()
    };
    ($value:expr; $len:expr) => {
        $crate::vector::Vector::filled($len, $value)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::vector::Vector::new(vec![$(f64::from($x)),+])
    };
}
