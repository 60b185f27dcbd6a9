//! Positivity-preserving limiters (`spec.md` §4.8): an affine shrink of the
//! element state around its mean, applied pointwise at the volume quadrature
//! points and then reprojected onto the trial space (so the operation is
//! well defined for both nodal and modal bases, unlike a coefficient-space
//! shrink, which is only exact when the basis is a nodal partition of
//! unity). Conservation holds because the shrink is affine about the mean.

use nalgebra::DMatrix;

use crate::geometry::{project_quadrature_values, ElemGeom};
use crate::physics::{Physics, StateVec};

#[derive(Clone, Copy, Debug)]
pub enum Limiter {
    /// Single-field positivity limiter for scalar conservation laws.
    Scalar,
    /// Two-pass density/pressure limiter for Euler and Navier-Stokes.
    Euler { p_floor: f64 },
}

impl Limiter {
    pub fn apply(&self, physics: &Physics, geom: &ElemGeom, u_e: &mut DMatrix<f64>) {
        match self {
            Limiter::Scalar => scalar_limit(geom, u_e),
            Limiter::Euler { p_floor } => euler_limit(physics, geom, u_e, *p_floor),
        }
    }
}

/// `U_q` at every volume quadrature point, and the element mean of each
/// state variable under the volume quadrature (equal to the mean under the
/// mass matrix, since both use the same quadrature rule).
fn quad_values_and_mean(geom: &ElemGeom, u_e: &DMatrix<f64>) -> (DMatrix<f64>, Vec<f64>, f64) {
    let u_q = &geom.phi * u_e;
    let ns = u_q.ncols();
    let nq = geom.quad.num_points();
    let mut volume = 0.0;
    let mut mean = vec![0.0; ns];
    for q in 0..nq {
        let w = geom.detj_w[q];
        volume += w;
        for s in 0..ns {
            mean[s] += w * u_q[(q, s)];
        }
    }
    for m in &mut mean {
        *m /= volume;
    }
    (u_q, mean, volume)
}

fn shrink(u_q: &DMatrix<f64>, mean: &[f64], theta: f64) -> DMatrix<f64> {
    let (nq, ns) = u_q.shape();
    let mut out = DMatrix::zeros(nq, ns);
    for q in 0..nq {
        for s in 0..ns {
            out[(q, s)] = mean[s] + theta * (u_q[(q, s)] - mean[s]);
        }
    }
    out
}

fn scalar_limit(geom: &ElemGeom, u_e: &mut DMatrix<f64>) {
    let (u_q, mean, _) = quad_values_and_mean(geom, u_e);
    let ubar = mean[0];
    let u_min = (0..u_q.nrows()).map(|q| u_q[(q, 0)]).fold(f64::INFINITY, f64::min);
    if u_min >= 0.0 {
        return;
    }
    let theta = (ubar / (ubar - u_min)).clamp(0.0, 1.0);
    if theta >= 1.0 {
        return;
    }
    let shrunk = shrink(&u_q, &mean, theta);
    *u_e = project_quadrature_values(geom, &shrunk);
}

fn euler_limit(physics: &Physics, geom: &ElemGeom, u_e: &mut DMatrix<f64>, p_floor: f64) {
    density_pass(geom, u_e);
    pressure_pass(physics, geom, u_e, p_floor);
}

fn density_pass(geom: &ElemGeom, u_e: &mut DMatrix<f64>) {
    let (u_q, mean, _) = quad_values_and_mean(geom, u_e);
    let rho_min = (0..u_q.nrows()).map(|q| u_q[(q, 0)]).fold(f64::INFINITY, f64::min);
    let ubar_rho = mean[0];
    if rho_min >= 0.0 {
        return;
    }
    let theta = (ubar_rho / (ubar_rho - rho_min)).clamp(0.0, 1.0);
    if theta >= 1.0 {
        return;
    }
    let shrunk = shrink(&u_q, &mean, theta);
    *u_e = project_quadrature_values(geom, &shrunk);
}

/// Bisects for the largest `theta` such that pressure stays above
/// `p_floor` at every quadrature point of `ubar + theta(U - ubar)`,
/// assuming (as is standard for this scheme) that the element mean itself
/// is physical. Best-effort: if even the mean fails the floor, the state is
/// left as-is and `check_physical` downstream reports it.
fn pressure_pass(physics: &Physics, geom: &ElemGeom, u_e: &mut DMatrix<f64>, p_floor: f64) {
    let (u_q, mean, _) = quad_values_and_mean(geom, u_e);
    let ns = u_q.ncols();
    let nq = u_q.nrows();

    let row_pressure = |theta: f64, q: usize| -> Option<f64> {
        let row: StateVec = (0..ns).map(|s| mean[s] + theta * (u_q[(q, s)] - mean[s])).collect();
        physics.compute_scalar("pressure", &row)
    };
    let feasible = |theta: f64| -> bool { (0..nq).all(|q| row_pressure(theta, q).is_some_and(|p| p >= p_floor)) };

    if feasible(1.0) {
        return;
    }
    if !feasible(0.0) {
        return;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..40 {
        let mid = 0.5 * (lo + hi);
        if feasible(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let shrunk = shrink(&u_q, &mean, lo);
    *u_e = project_quadrature_values(geom, &shrunk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{Basis, BasisKind, Node1dKind};
    use crate::mesh::{generate, BuiltinMeshSpec};
    use crate::physics::euler::{self, EulerParams};
    use crate::quadrature::QuadratureKind;
    use crate::shape::ShapeKind;
    use crate::spatial::Dim;
    use approx::assert_relative_eq;

    fn unit_quad_elem_geom(order: usize) -> ElemGeom {
        let mesh = generate(&BuiltinMeshSpec {
            shape: ShapeKind::Quad,
            num_elems_x: 1,
            num_elems_y: Some(1),
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 1.0,
            periodic_x: false,
            periodic_y: false,
        })
        .unwrap();
        let basis = Basis::new(ShapeKind::Quad, order, BasisKind::Lagrange, Node1dKind::GaussLobatto).unwrap();
        ElemGeom::build(&mesh, &mesh.elements[0], &basis, QuadratureKind::GaussLegendre, None).unwrap()
    }

    #[test]
    fn scalar_limiter_leaves_a_positive_constant_field_untouched() {
        let geom = unit_quad_elem_geom(1);
        let nb = geom.phi.ncols();
        let mut u_e = DMatrix::from_element(nb, 1, 2.0);
        // a constant-1 coefficient vector under a Lagrange nodal basis is the constant field 2.0
        scalar_limit(&geom, &mut u_e);
        let u_q = &geom.phi * &u_e;
        for q in 0..u_q.nrows() {
            assert_relative_eq!(u_q[(q, 0)], 2.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn scalar_limiter_rescales_a_negative_dip_toward_the_mean() {
        let geom = unit_quad_elem_geom(1);
        let nb = geom.phi.ncols();
        let mut u_e = DMatrix::from_element(nb, 1, 1.0);
        u_e[(0, 0)] = -0.5;
        scalar_limit(&geom, &mut u_e);
        let u_q = &geom.phi * &u_e;
        for q in 0..u_q.nrows() {
            assert!(u_q[(q, 0)] >= -1e-8);
        }
    }

    #[test]
    fn euler_limiter_restores_positive_density() {
        let geom = unit_quad_elem_geom(1);
        let nb = geom.phi.ncols();
        let p = EulerParams { dim: Dim::Two, gamma: 1.4, r: 287.0 };
        let physics = Physics::Euler(p);
        let good = euler::from_primitive(p, 1.0, 0.1, 0.0, 101325.0);
        let mut u_e = DMatrix::zeros(nb, 4);
        for i in 0..nb {
            for s in 0..4 {
                u_e[(i, s)] = good[s];
            }
        }
        u_e[(0, 0)] = -0.2;
        euler_limit(&physics, &geom, &mut u_e, 1.0);
        let u_q = &geom.phi * &u_e;
        for q in 0..u_q.nrows() {
            assert!(u_q[(q, 0)] >= -1e-8);
        }
    }
}
