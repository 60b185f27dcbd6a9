//! Roe's approximate Riemann solver (`spec.md` §4.6): trivial for a scalar
//! conservation law (reduces to the upwind flux driven by the Roe-averaged
//! characteristic speed) and the classical rotated-frame construction for
//! 1D/2D Euler (`spec.md` §4.5 "rotate state momentum into (n̂, t̂) frame,
//! solve, rotate back").

use crate::error::NumericError;
use crate::physics::euler::{self, EulerParams};
use crate::physics::navier_stokes::NsParams;
use crate::physics::{Physics, StateVec};
use crate::spatial::{Dim, Point};

pub fn flux(physics: &Physics, u_l: &StateVec, u_r: &StateVec, normal: Point) -> Result<StateVec, NumericError> {
    match physics {
        Physics::Scalar { .. } => Ok(scalar_roe(physics, u_l, u_r, normal)),
        Physics::Euler(p) => euler_roe(*p, u_l, u_r, normal),
        Physics::NavierStokes(NsParams { euler: p, .. }) => euler_roe(*p, u_l, u_r, normal),
    }
}

/// Roe-averaged characteristic speed `(f(u_R) - f(u_L)) / (u_R - u_L)`,
/// falling back to a centered finite difference of the flux at `u_L` when
/// the jump vanishes. Pure upwinding on the sign of that speed is exactly
/// the Roe flux for a scalar law.
fn scalar_roe(physics: &Physics, u_l: &StateVec, u_r: &StateVec, normal: Point) -> StateVec {
    let f_l = physics.flux_interior(u_l);
    let f_r = physics.flux_interior(u_r);
    let fl_n = f_l[0][0] * normal.x + f_l[0][1] * normal.y;
    let fr_n = f_r[0][0] * normal.x + f_r[0][1] * normal.y;
    let du = u_r[0] - u_l[0];

    let a = if du.abs() > 1e-12 {
        (fr_n - fl_n) / du
    } else {
        let h = 1e-6;
        let mut up: StateVec = StateVec::new();
        up.push(u_l[0] + h);
        let mut down: StateVec = StateVec::new();
        down.push(u_l[0] - h);
        let fp = physics.flux_interior(&up);
        let fm = physics.flux_interior(&down);
        let fp_n = fp[0][0] * normal.x + fp[0][1] * normal.y;
        let fm_n = fm[0][0] * normal.x + fm[0][1] * normal.y;
        (fp_n - fm_n) / (2.0 * h)
    };

    let mut out = StateVec::new();
    out.push(if a >= 0.0 { fl_n } else { fr_n });
    out
}

fn euler_roe(p: EulerParams, u_l: &StateVec, u_r: &StateVec, normal: Point) -> Result<StateVec, NumericError> {
    let (nx, ny) = (normal.x, normal.y);
    let gamma = p.gamma;

    let rho_l = u_l[0];
    let rho_r = u_r[0];
    let (ul_x, ul_y) = euler::velocity(p, u_l);
    let (ur_x, ur_y) = euler::velocity(p, u_r);
    let pl = euler::pressure(p, u_l);
    let pr = euler::pressure(p, u_r);
    let hl = euler::total_enthalpy(p, u_l);
    let hr = euler::total_enthalpy(p, u_r);

    let vn_l = ul_x * nx + ul_y * ny;
    let vt_l = -ul_x * ny + ul_y * nx;
    let vn_r = ur_x * nx + ur_y * ny;
    let vt_r = -ur_x * ny + ur_y * nx;

    let rl = rho_l.sqrt();
    let rr = rho_r.sqrt();
    let denom = rl + rr;
    let vn_roe = (rl * vn_l + rr * vn_r) / denom;
    let vt_roe = (rl * vt_l + rr * vt_r) / denom;
    let h_roe = (rl * hl + rr * hr) / denom;
    let rho_roe = rl * rr;
    let a2 = (gamma - 1.0) * (h_roe - 0.5 * (vn_roe * vn_roe + vt_roe * vt_roe));
    if a2 <= 0.0 {
        return Err(NumericError::RoeRotationFailure([nx, ny]));
    }
    let a_roe = a2.sqrt();

    let drho = rho_r - rho_l;
    let dvn = vn_r - vn_l;
    let dvt = vt_r - vt_l;
    let dp = pr - pl;

    let dv1 = (dp - rho_roe * a_roe * dvn) / (2.0 * a2);
    let dv2 = drho - dp / a2;
    let dv3 = rho_roe * dvt;
    let dv4 = (dp + rho_roe * a_roe * dvn) / (2.0 * a2);

    let lam1 = (vn_roe - a_roe).abs();
    let lam2 = vn_roe.abs();
    let lam4 = (vn_roe + a_roe).abs();

    // right eigenvectors in rotated conservative variables [rho, rho*vn, rho*vt, rhoE]
    let k1 = [1.0, vn_roe - a_roe, vt_roe, h_roe - vn_roe * a_roe];
    let k2 = [1.0, vn_roe, vt_roe, 0.5 * (vn_roe * vn_roe + vt_roe * vt_roe)];
    let k3 = [0.0, 0.0, 1.0, vt_roe];
    let k4 = [1.0, vn_roe + a_roe, vt_roe, h_roe + vn_roe * a_roe];

    let rho_e_l = *u_l.last().unwrap();
    let rho_e_r = *u_r.last().unwrap();
    let f_rot_l = [rho_l * vn_l, rho_l * vn_l * vn_l + pl, rho_l * vn_l * vt_l, (rho_e_l + pl) * vn_l];
    let f_rot_r = [rho_r * vn_r, rho_r * vn_r * vn_r + pr, rho_r * vn_r * vt_r, (rho_e_r + pr) * vn_r];

    let mut f_rot = [0.0; 4];
    for i in 0..4 {
        f_rot[i] = 0.5 * (f_rot_l[i] + f_rot_r[i])
            - 0.5 * (lam1 * dv1 * k1[i] + lam2 * dv2 * k2[i] + lam2 * dv3 * k3[i] + lam4 * dv4 * k4[i]);
    }

    let mut out = StateVec::new();
    out.push(f_rot[0]);
    out.push(f_rot[1] * nx - f_rot[2] * ny);
    if p.dim == Dim::Two {
        out.push(f_rot[1] * ny + f_rot[2] * nx);
    }
    out.push(f_rot[3]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::scalar::ScalarKind;
    use approx::assert_relative_eq;

    #[test]
    fn scalar_roe_matches_constant_advection_upwind_direction() {
        let physics = Physics::Scalar { dim: Dim::One, kind: ScalarKind::ConstAdv1D { c: -1.0 } };
        let u_l: StateVec = [1.0].into_iter().collect();
        let u_r: StateVec = [2.0].into_iter().collect();
        let f = flux(&physics, &u_l, &u_r, Point::new(1.0, 0.0)).unwrap();
        assert_relative_eq!(f[0], -1.0 * 2.0, epsilon = 1e-8);
    }

    #[test]
    fn euler_roe_is_exact_for_equal_states() {
        let p = EulerParams { dim: Dim::Two, gamma: 1.4, r: 287.0 };
        let u = euler::from_primitive(p, 1.2, 3.0, -1.0, 101325.0);
        let physics = Physics::Euler(p);
        let f = flux(&physics, &u, &u, Point::new(0.0, 1.0)).unwrap();
        let expected = physics.flux_interior(&u);
        assert_relative_eq!(f[0], expected[0][1], epsilon = 1e-6);
    }
}
