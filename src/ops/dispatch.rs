//! Kernel dispatch.
//!
//! Selects the serial or the rayon kernel for each elementwise operation,
//! based on the global [`Backend`](crate::backend::Backend) and the length of
//! the work. Shape validation lives here too, so the kernels only ever see
//! broadcastable operands.

use super::cpu;
use crate::backend::use_parallel;
use crate::error::{GradError, Result};

/// Length of the result of broadcasting `lhs` against `rhs`.
///
/// # Errors
/// [`GradError::ShapeMismatch`] unless the lengths are equal or one is 1.
pub fn broadcast_len(op: &'static str, lhs: usize, rhs: usize) -> Result<usize> {
    match (lhs, rhs) {
        (l, r) if l == r => Ok(l),
        (1, r) => Ok(r),
        (l, 1) => Ok(l),
        (l, r) => Err(GradError::shape(op, l, r)),
    }
}

/// Validated, broadcasting binary kernel.
pub fn binary(
    op: &'static str,
    lhs: &[f64],
    rhs: &[f64],
    f: impl Fn(f64, f64) -> f64 + Sync + Send,
) -> Result<Vec<f64>> {
    let len = broadcast_len(op, lhs.len(), rhs.len())?;
    if use_parallel(len) {
        Ok(cpu::par_zip_with(lhs, rhs, f))
    } else {
        Ok(cpu::zip_with(lhs, rhs, f))
    }
}

/// Unary elementwise kernel.
pub fn unary(data: &[f64], f: impl Fn(f64) -> f64 + Sync + Send) -> Vec<f64> {
    if use_parallel(data.len()) {
        cpu::par_map(data, f)
    } else {
        cpu::map(data, f)
    }
}

/// In-place accumulation of `src` into `acc`.
///
/// `src` must have `acc`'s length or length 1; `acc` never grows.
pub fn accumulate(acc: &mut [f64], src: &[f64]) -> Result<()> {
    if src.len() != acc.len() && src.len() != 1 {
        return Err(GradError::shape("accumulate", acc.len(), src.len()));
    }
    if use_parallel(acc.len()) {
        cpu::par_accumulate(acc, src);
    } else {
        cpu::accumulate(acc, src);
    }
    Ok(())
}

/// Sum reduction.
pub fn sum(data: &[f64]) -> f64 {
    if use_parallel(data.len()) {
        cpu::par_sum(data)
    } else {
        cpu::sum(data)
    }
}
