//! Finite-difference gradients for checking backward passes.

use crate::vector::Vector;

/// Central finite-difference gradient of a scalar function of a vector.
///
/// `f` receives the perturbed point and returns the scalar output.
///
/// # Example
/// ```
/// use vecgrad::{finite_diff::finite_diff_grad, vector};
///
/// // f(x, y) = x^2 + y^2
/// let g = finite_diff_grad(|v| v[0] * v[0] + v[1] * v[1], &vector![3.0, 4.0], 1e-6);
/// assert!((g[0] - 6.0).abs() < 1e-5);
/// assert!((g[1] - 8.0).abs() < 1e-5);
/// ```
pub fn finite_diff_grad<F>(f: F, point: &Vector, eps: f64) -> Vector
where
    F: Fn(&Vector) -> f64,
{
    let mut perturbed = point.as_slice().to_vec();
    (0..point.len())
        .map(|i| {
            let x = perturbed[i];

            perturbed[i] = x + eps;
            let f_plus = f(&Vector::from(perturbed.as_slice()));
            perturbed[i] = x - eps;
            let f_minus = f(&Vector::from(perturbed.as_slice()));
            perturbed[i] = x;

            (f_plus - f_minus) / (2.0 * eps)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector;

    #[test]
    fn quadratic() {
        // f = x^2 + 2xy + y^2, grad = (2x + 2y, 2x + 2y)
        let f = |v: &Vector| v[0] * v[0] + 2.0 * v[0] * v[1] + v[1] * v[1];
        let g = finite_diff_grad(f, &vector![1.0, 2.0], 1e-6);
        assert!((g[0] - 6.0).abs() < 1e-5);
        assert!((g[1] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn transcendental() {
        let f = |v: &Vector| v[0].sin() * v[0].exp();
        let g = finite_diff_grad(f, &vector![1.0], 1e-6);
        let expected = (1.0_f64.cos() + 1.0_f64.sin()) * 1.0_f64.exp();
        assert!((g[0] - expected).abs() < 1e-5);
    }
}
