//! CPU kernels for elementwise vector arithmetic.
//!
//! Every kernel exists twice: a plain loop and a rayon variant. The rayon
//! variants are picked by [`super::dispatch`] for long vectors when the
//! [`Rayon`](crate::backend::Backend::Rayon) backend is active.
//!
//! Binary kernels take already-validated operands: equal lengths, or one of
//! them of length 1 (broadcast against the other).

use rayon::prelude::*;

/// Applies `f` pairwise, broadcasting a length-1 side.
pub fn zip_with(lhs: &[f64], rhs: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    match (lhs.len(), rhs.len()) {
        (1, n) if n != 1 => {
            let l = lhs[0];
            rhs.iter().map(|&r| f(l, r)).collect()
        }
        (n, 1) if n != 1 => {
            let r = rhs[0];
            lhs.iter().map(|&l| f(l, r)).collect()
        }
        _ => lhs.iter().zip(rhs).map(|(&l, &r)| f(l, r)).collect(),
    }
}

/// Rayon variant of [`zip_with`].
pub fn par_zip_with(
    lhs: &[f64],
    rhs: &[f64],
    f: impl Fn(f64, f64) -> f64 + Sync + Send,
) -> Vec<f64> {
    match (lhs.len(), rhs.len()) {
        (1, n) if n != 1 => {
            let l = lhs[0];
            rhs.par_iter().map(|&r| f(l, r)).collect()
        }
        (n, 1) if n != 1 => {
            let r = rhs[0];
            lhs.par_iter().map(|&l| f(l, r)).collect()
        }
        _ => lhs
            .par_iter()
            .zip(rhs.par_iter())
            .map(|(&l, &r)| f(l, r))
            .collect(),
    }
}

/// Applies `f` to every element.
pub fn map(data: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    data.iter().map(|&x| f(x)).collect()
}

/// Rayon variant of [`map`].
pub fn par_map(data: &[f64], f: impl Fn(f64) -> f64 + Sync + Send) -> Vec<f64> {
    data.par_iter().map(|&x| f(x)).collect()
}

/// In-place `acc[i] += src[i]`, broadcasting a length-1 `src`.
pub fn accumulate(acc: &mut [f64], src: &[f64]) {
    if src.len() == 1 && acc.len() != 1 {
        let s = src[0];
        acc.iter_mut().for_each(|a| *a += s);
    } else {
        acc.iter_mut().zip(src).for_each(|(a, &s)| *a += s);
    }
}

/// Rayon variant of [`accumulate`].
pub fn par_accumulate(acc: &mut [f64], src: &[f64]) {
    if src.len() == 1 && acc.len() != 1 {
        let s = src[0];
        acc.par_iter_mut().for_each(|a| *a += s);
    } else {
        acc.par_iter_mut()
            .zip(src.par_iter())
            .for_each(|(a, &s)| *a += s);
    }
}

/// Sum of all elements.
pub fn sum(data: &[f64]) -> f64 {
    data.iter().sum()
}

/// Rayon variant of [`sum`]. Summation order differs from the serial loop.
pub fn par_sum(data: &[f64]) -> f64 {
    data.par_iter().sum()
}
