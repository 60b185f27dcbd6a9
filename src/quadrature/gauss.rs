//! 1D Gauss-Legendre and Gauss-Legendre-Lobatto rules via the Golub-Welsch
//! eigenvalue method: the quadrature nodes are the eigenvalues of the
//! symmetric tridiagonal Jacobi matrix of the orthogonal polynomial family,
//! and the weights follow from the first components of its eigenvectors.

use nalgebra::{DMatrix, SymmetricEigen};

/// Legendre polynomial of degree `n` evaluated at `x`, via the three-term
/// recurrence `(k+1) P_{k+1} = (2k+1) x P_k - k P_{k-1}`.
fn legendre(n: usize, x: f64) -> f64 {
    if n == 0 {
        return 1.0;
    }
    if n == 1 {
        return x;
    }
    let (mut p0, mut p1) = (1.0, x);
    for k in 1..n {
        let p2 = ((2 * k + 1) as f64 * x * p1 - k as f64 * p0) / (k + 1) as f64;
        p0 = p1;
        p1 = p2;
    }
    p1
}

fn tridiagonal_eigen(betas: &[f64]) -> (Vec<f64>, DMatrix<f64>) {
    let n = betas.len() + 1;
    let mat = DMatrix::from_fn(n, n, |r, c| {
        if r == c + 1 {
            betas[r - 1]
        } else if c == r + 1 {
            betas[c - 1]
        } else {
            0.0
        }
    });
    let eigen = SymmetricEigen::new(mat);
    (eigen.eigenvalues.iter().copied().collect(), eigen.eigenvectors)
}

/// `n`-point Gauss-Legendre rule on `[-1, 1]`, exact for polynomials up to
/// degree `2n - 1`.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n >= 1, "a quadrature rule needs at least one point");
    if n == 1 {
        return (vec![0.0], vec![2.0]);
    }
    let betas: Vec<f64> = (1..n)
        .map(|i| 0.5 / (1.0 - (2.0 * i as f64).powi(-2)).sqrt())
        .collect();
    let (eigenvalues, eigenvectors) = tridiagonal_eigen(&betas);

    let mut xw: Vec<(f64, f64)> = eigenvalues
        .into_iter()
        .zip(eigenvectors.row(0).iter().map(|w| w.powi(2) * 2.0))
        .collect();
    xw.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    xw.into_iter().unzip()
}

/// Roots of the Jacobi(1, 1) polynomial of degree `n`; these are the interior
/// nodes of the `n + 2`-point Gauss-Legendre-Lobatto rule, since `P'_{n+1}`
/// is proportional to the degree-`n` Jacobi(1, 1) polynomial.
fn jacobi_11_roots(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let betas: Vec<f64> = (1..=n)
        .map(|i| {
            let k = i as f64;
            (k * (k + 2.0) / ((2.0 * k + 1.0) * (2.0 * k + 3.0))).sqrt()
        })
        .collect();
    let (mut eigenvalues, _) = tridiagonal_eigen(&betas);
    eigenvalues.sort_by(|a, b| a.partial_cmp(b).unwrap());
    eigenvalues
}

/// `n`-point Gauss-Legendre-Lobatto rule on `[-1, 1]` (`n >= 2`): includes
/// both endpoints, exact for polynomials up to degree `2n - 3`. Required for
/// colocated (nodal-quadrature) DG schemes (`spec.md` §4.2, §6).
pub fn gauss_lobatto(n: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n >= 2, "a Lobatto rule needs at least the two endpoints");
    let mut nodes = Vec::with_capacity(n);
    nodes.push(-1.0);
    nodes.extend(jacobi_11_roots(n - 2));
    nodes.push(1.0);

    let weights = nodes
        .iter()
        .map(|&x| 2.0 / ((n * (n - 1)) as f64 * legendre(n - 1, x).powi(2)))
        .collect();
    (nodes, weights)
}

/// Rescales a rule from the reference interval `[-1, 1]` to `[min, max]`,
/// returning the Jacobian scale factor and the rescaled points; weights must
/// separately be multiplied by the returned scale factor.
pub fn rescale(points: &[f64], min: f64, max: f64) -> (f64, Vec<f64>) {
    let scale = (max - min) / 2.0;
    let offset = (max + min) / 2.0;
    (scale, points.iter().map(|x| x * scale + offset).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrate(points: &[f64], weights: &[f64], f: impl Fn(f64) -> f64) -> f64 {
        points.iter().zip(weights).map(|(&x, &w)| f(x) * w).sum()
    }

    #[test]
    fn gauss_legendre_weights_sum_to_measure_of_interval() {
        for n in 1..8 {
            let (_, w) = gauss_legendre(n);
            assert_relative_eq!(w.iter().sum::<f64>(), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn gauss_legendre_is_exact_to_degree_2n_minus_1() {
        for n in 1..6 {
            let (x, w) = gauss_legendre(n);
            let degree = 2 * n - 1;
            let integral = integrate(&x, &w, |x| x.powi(degree as i32));
            let exact = if degree % 2 == 0 { 2.0 / (degree as f64 + 1.0) } else { 0.0 };
            assert_relative_eq!(integral, exact, epsilon = 1e-9);
        }
    }

    #[test]
    fn gauss_lobatto_includes_endpoints() {
        for n in 2..8 {
            let (x, _) = gauss_lobatto(n);
            assert_relative_eq!(x[0], -1.0, epsilon = 1e-12);
            assert_relative_eq!(x[n - 1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn gauss_lobatto_weights_sum_to_measure_of_interval() {
        for n in 2..8 {
            let (_, w) = gauss_lobatto(n);
            assert_relative_eq!(w.iter().sum::<f64>(), 2.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn gauss_lobatto_is_exact_to_degree_2n_minus_3() {
        for n in 3..7 {
            let (x, w) = gauss_lobatto(n);
            let degree = 2 * n - 3;
            let integral = integrate(&x, &w, |x| x.powi(degree as i32));
            let exact = if degree % 2 == 0 { 2.0 / (degree as f64 + 1.0) } else { 0.0 };
            assert_relative_eq!(integral, exact, epsilon = 1e-8);
        }
    }

    #[test]
    fn rescale_preserves_interval_measure_in_scale_factor() {
        let (x, _) = gauss_legendre(3);
        let (scale, scaled) = rescale(&x, 2.0, 5.0);
        assert_relative_eq!(scale, 1.5);
        assert!(scaled.iter().all(|&p| p >= 2.0 && p <= 5.0));
    }
}
