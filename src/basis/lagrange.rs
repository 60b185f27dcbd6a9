//! Nodal (Lagrange) basis evaluation: 1D barycentric interpolation, tensor
//! product for quadrilaterals, and a Vandermonde solve for triangles.

use nalgebra::DMatrix;

use crate::shape::TriangleShape;
use crate::spatial::Point;

/// Barycentric weights for 1D Lagrange interpolation at `nodes`.
fn barycentric_weights(nodes: &[f64]) -> Vec<f64> {
    let n = nodes.len();
    (0..n)
        .map(|j| {
            let prod: f64 = (0..n).filter(|&k| k != j).map(|k| nodes[j] - nodes[k]).product();
            1.0 / prod
        })
        .collect()
}

/// `values[q][j] = L_j(pts[q])`, the 1D Lagrange cardinal functions at `nodes`
/// evaluated at `pts`, via the barycentric formula.
pub fn values_1d(nodes: &[f64], pts: &[f64]) -> DMatrix<f64> {
    let weights = barycentric_weights(nodes);
    let n = nodes.len();
    DMatrix::from_fn(pts.len(), n, |q, j| {
        let x = pts[q];
        if let Some(k) = nodes.iter().position(|&xn| (xn - x).abs() < 1e-13) {
            return if k == j { 1.0 } else { 0.0 };
        }
        let num = weights[j] / (x - nodes[j]);
        let denom: f64 = (0..n).map(|k| weights[k] / (x - nodes[k])).sum();
        num / denom
    })
}

/// Derivative of the 1D Lagrange cardinal functions at `nodes`, evaluated at
/// `pts`, via the barycentric derivative formula.
pub fn grads_1d(nodes: &[f64], pts: &[f64]) -> DMatrix<f64> {
    let weights = barycentric_weights(nodes);
    let n = nodes.len();
    DMatrix::from_fn(pts.len(), n, |q, j| {
        let x = pts[q];
        if let Some(k) = nodes.iter().position(|&xn| (xn - x).abs() < 1e-13) {
            if k == j {
                // derivative of cardinal function at its own node
                return (0..n)
                    .filter(|&m| m != j)
                    .map(|m| 1.0 / (nodes[j] - nodes[m]))
                    .sum();
            }
            return (weights[j] / weights[k]) / (nodes[k] - nodes[j]);
        }
        // quotient rule on L_j(x) = N(x) / D(x), N = w_j / (x - x_j), D = sum_k w_k / (x - x_k)
        let num = weights[j] / (x - nodes[j]);
        let num_d = -weights[j] / (x - nodes[j]).powi(2);
        let den: f64 = (0..n).map(|k| weights[k] / (x - nodes[k])).sum();
        let den_d: f64 = (0..n).map(|k| -weights[k] / (x - nodes[k]).powi(2)).sum();
        (num_d * den - num * den_d) / den.powi(2)
    })
}

/// Monomial basis `x^a y^b`, `a + b <= p`, enumerated by ascending total
/// degree, one degree "shell" at a time.
fn monomial_exponents(p: usize) -> Vec<(usize, usize)> {
    let mut exps = Vec::new();
    for deg in 0..=p {
        for a in 0..=deg {
            exps.push((a, deg - a));
        }
    }
    exps
}

fn monomials(exps: &[(usize, usize)], x: f64, y: f64) -> Vec<f64> {
    exps.iter().map(|&(a, b)| x.powi(a as i32) * y.powi(b as i32)).collect()
}

fn monomial_grad(exps: &[(usize, usize)], x: f64, y: f64) -> (Vec<f64>, Vec<f64>) {
    let dx = exps
        .iter()
        .map(|&(a, b)| if a == 0 { 0.0 } else { a as f64 * x.powi(a as i32 - 1) * y.powi(b as i32) })
        .collect();
    let dy = exps
        .iter()
        .map(|&(a, b)| if b == 0 { 0.0 } else { b as f64 * x.powi(a as i32) * y.powi(b as i32 - 1) })
        .collect();
    (dx, dy)
}

/// Coefficient matrix `C` such that `Phi(x) = monomials(x)^T C` reproduces the
/// Kronecker-delta property at the triangle's order-`p` equispaced nodes.
pub fn triangle_vandermonde_inverse(p: usize) -> DMatrix<f64> {
    let exps = monomial_exponents(p);
    let nodes = TriangleShape.equidistant_nodes(p);
    let nb = nodes.len();
    let v = DMatrix::from_fn(nb, nb, |i, j| monomials(&exps, nodes[i].x, nodes[i].y)[j]);
    v.try_inverse().expect("triangle nodal Vandermonde matrix is singular")
}

pub fn triangle_values(p: usize, vinv: &DMatrix<f64>, pts: &[Point]) -> DMatrix<f64> {
    let exps = monomial_exponents(p);
    let nb = exps.len();
    let mono = DMatrix::from_fn(pts.len(), nb, |q, j| monomials(&exps, pts[q].x, pts[q].y)[j]);
    mono * vinv
}

pub fn triangle_grads(p: usize, vinv: &DMatrix<f64>, pts: &[Point]) -> (DMatrix<f64>, DMatrix<f64>) {
    let exps = monomial_exponents(p);
    let nb = exps.len();
    let mut dmono_x = DMatrix::zeros(pts.len(), nb);
    let mut dmono_y = DMatrix::zeros(pts.len(), nb);
    for (q, pt) in pts.iter().enumerate() {
        let (dx, dy) = monomial_grad(&exps, pt.x, pt.y);
        for j in 0..nb {
            dmono_x[(q, j)] = dx[j];
            dmono_y[(q, j)] = dy[j];
        }
    }
    (dmono_x * vinv, dmono_y * vinv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cardinal_functions_satisfy_kronecker_delta_at_own_nodes() {
        let nodes = vec![-1.0, -0.3, 0.4, 1.0];
        let vals = values_1d(&nodes, &nodes);
        for i in 0..nodes.len() {
            for j in 0..nodes.len() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(vals[(i, j)], expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn cardinal_functions_form_partition_of_unity() {
        let nodes = vec![-1.0, -0.2, 0.5, 1.0];
        let pts = vec![-0.9, -0.1, 0.3, 0.95];
        let vals = values_1d(&nodes, &pts);
        for q in 0..pts.len() {
            let row_sum: f64 = vals.row(q).iter().sum();
            assert_relative_eq!(row_sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn triangle_nodal_basis_satisfies_kronecker_delta() {
        let p = 2;
        let vinv = triangle_vandermonde_inverse(p);
        let nodes = TriangleShape.equidistant_nodes(p);
        let vals = triangle_values(p, &vinv, &nodes);
        for i in 0..nodes.len() {
            for j in 0..nodes.len() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(vals[(i, j)], expected, epsilon = 1e-8);
            }
        }
    }
}
