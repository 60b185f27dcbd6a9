//! Hierarchical-H¹ triangle basis: affine vertex functions, Kern-type edge
//! modes built from Legendre polynomials of the edge-tangential barycentric
//! difference, and monomial interior bubbles. Modes of order `<= p-1` are a
//! strict subset of the order-`p` set (hierarchical refinement).

use nalgebra::DMatrix;

use crate::spatial::Point;

/// `(i, j)` index pairs with `i + j <= n`, ascending by total degree.
fn pairs_up_to(n: i64) -> Vec<(usize, usize)> {
    if n < 0 {
        return Vec::new();
    }
    let n = n as usize;
    let mut out = Vec::new();
    for deg in 0..=n {
        for i in 0..=deg {
            out.push((i, deg - i));
        }
    }
    out
}

/// Number of basis functions at order `p`: 3 vertex + `3(p-1)` edge +
/// `(p-1)(p-2)/2` interior bubble modes, matching `(p+1)(p+2)/2`.
pub fn nb(p: usize) -> usize {
    (p + 1) * (p + 2) / 2
}

fn legendre(n: usize, x: f64) -> (f64, f64) {
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

/// Barycentric coordinates `(L0, L1, L2)` and their reference gradients
/// (constant over the element: `dL0 = (-1,-1)`, `dL1 = (1,0)`, `dL2 = (0,1)`).
fn barycentric(pt: Point) -> [f64; 3] {
    [1.0 - pt.x - pt.y, pt.x, pt.y]
}

const DL: [[f64; 2]; 3] = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];

/// One basis function's value and gradient at `pt`; `mode` enumerates
/// vertex (0..3), then edge (3..3+3(p-1)), then bubble modes. Gradients carry
/// a factor of 2 to convert from barycentric derivatives to reference ones.
fn eval_mode(mode: usize, p: usize, pt: Point) -> (f64, [f64; 2]) {
    let l = barycentric(pt);
    if mode < 3 {
        return (l[mode], [2.0 * DL[mode][0], 2.0 * DL[mode][1]]);
    }
    let edges: [(usize, usize); 3] = [(1, 2), (2, 0), (0, 1)];
    let n_edge_modes = 3 * p.saturating_sub(1);
    if mode < 3 + n_edge_modes {
        let local = mode - 3;
        let edge = local / p.saturating_sub(1).max(1);
        let order_in_edge = local % p.saturating_sub(1).max(1);
        let m = order_in_edge + 2; // Legendre degree m - 2, m = 2..=p
        let (i, j) = edges[edge];
        let s = l[j] - l[i];
        let (leg, dleg) = legendre(m - 2, s);
        let ds = [DL[j][0] - DL[i][0], DL[j][1] - DL[i][1]];
        let value = l[i] * l[j] * leg;
        let dx = DL[i][0] * l[j] * leg + l[i] * DL[j][0] * leg + l[i] * l[j] * dleg * ds[0];
        let dy = DL[i][1] * l[j] * leg + l[i] * DL[j][1] * leg + l[i] * l[j] * dleg * ds[1];
        return (value, [2.0 * dx, 2.0 * dy]);
    }
    let bubble_local = mode - 3 - n_edge_modes;
    let bubbles = pairs_up_to(p as i64 - 3);
    let (bi, bj) = bubbles[bubble_local];
    let (l0, l1, l2) = (l[0], l[1], l[2]);
    let value = l0 * l1.powi(bi as i32 + 1) * l2.powi(bj as i32 + 1);
    let dx = -l1.powi(bi as i32 + 1) * l2.powi(bj as i32 + 1)
        + l0 * (bi as f64 + 1.0) * l1.powi(bi as i32) * l2.powi(bj as i32 + 1);
    let dy = -l1.powi(bi as i32 + 1) * l2.powi(bj as i32 + 1)
        + l0 * l1.powi(bi as i32 + 1) * (bj as f64 + 1.0) * l2.powi(bj as i32);
    (value, [2.0 * dx, 2.0 * dy])
}

pub fn values(p: usize, pts: &[Point]) -> DMatrix<f64> {
    let n = nb(p);
    DMatrix::from_fn(pts.len(), n, |q, j| eval_mode(j, p, pts[q]).0)
}

pub fn grads(p: usize, pts: &[Point]) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = nb(p);
    let mut dx = DMatrix::zeros(pts.len(), n);
    let mut dy = DMatrix::zeros(pts.len(), n);
    for (q, pt) in pts.iter().enumerate() {
        for j in 0..n {
            let (_, g) = eval_mode(j, p, *pt);
            dx[(q, j)] = g[0];
            dy[(q, j)] = g[1];
        }
    }
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mode_count_matches_triangle_basis_cardinality() {
        for p in 1..7 {
            assert_eq!(nb(p), (p + 1) * (p + 2) / 2);
        }
    }

    #[test]
    fn vertex_and_edge_modes_partition_unity_at_degree_one() {
        // at p=1, the basis is just the three affine vertex functions
        let pts = [Point::new(0.2, 0.3), Point::new(0.5, 0.1), Point::new(0.1, 0.1)];
        let v = values(1, &pts);
        for q in 0..pts.len() {
            let row_sum: f64 = v.row(q).iter().sum();
            assert_relative_eq!(row_sum, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn modes_vanish_on_opposite_edges() {
        // p=3 so edge and bubble modes exist
        let p = 3;
        // a point on the bottom edge (L2 = 0, i.e. y = 0): edge mode for edge (1,2) and
        // bubble modes (which carry a factor of L1*L2) must vanish there.
        let pt = Point::new(0.4, 0.0);
        let v = values(p, &[pt]);
        // mode 3 is the first edge mode, for edge (1,2); it has factor L1*L2 and L2=0 here.
        assert_relative_eq!(v[(0, 3)], 0.0, epsilon = 1e-10);
    }
}
