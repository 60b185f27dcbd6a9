//! Orthonormal modal (Legendre) basis on `[-1, 1]`: `L_n(x) * sqrt((2n+1)/2)`,
//! normalized so that `integral_{-1}^{1} phi_i phi_j dx = delta_ij`.

use nalgebra::DMatrix;

/// Value and derivative of the (un-normalized) Legendre polynomial of degree
/// `n` at `x`, via simultaneous three-term recurrence.
fn legendre_and_deriv(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    if n == 1 {
        return (x, 1.0);
    }
    let (mut p0, mut d0) = (1.0, 0.0);
    let (mut p1, mut d1) = (x, 1.0);
    for k in 1..n {
        let kf = k as f64;
        let p2 = ((2.0 * kf + 1.0) * x * p1 - kf * p0) / (kf + 1.0);
        let d2 = ((2.0 * kf + 1.0) * (p1 + x * d1) - kf * d0) / (kf + 1.0);
        p0 = p1;
        d0 = d1;
        p1 = p2;
        d1 = d2;
    }
    (p1, d1)
}

fn norm(n: usize) -> f64 {
    ((2 * n + 1) as f64 / 2.0).sqrt()
}

/// `values[q][j] = phi_j(pts[q])` for orthonormal modes `j = 0..=p`.
pub fn values_1d(p: usize, pts: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(pts.len(), p + 1, |q, j| legendre_and_deriv(j, pts[q]).0 * norm(j))
}

pub fn grads_1d(p: usize, pts: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(pts.len(), p + 1, |q, j| legendre_and_deriv(j, pts[q]).1 * norm(j))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrature::gauss::gauss_legendre;
    use approx::assert_relative_eq;

    #[test]
    fn modes_are_orthonormal_under_gauss_quadrature() {
        let p = 4;
        let (x, w) = gauss_legendre(p + 2);
        let vals = values_1d(p, &x);
        for i in 0..=p {
            for j in 0..=p {
                let inner: f64 = (0..x.len()).map(|q| vals[(q, i)] * vals[(q, j)] * w[q]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(inner, expected, epsilon = 1e-8);
            }
        }
    }
}
