//! HLLC approximate Riemann solver for 1D/2D Euler, following Toro's
//! formulation with Roe-averaged wave-speed estimates (`spec.md` §4.5).
//! Not defined for scalar physics — a three-wave contact-preserving solver
//! has no scalar analogue, so that combination is `Unsupported`.

use crate::error::Unsupported;
use crate::physics::euler::{self, EulerParams};
use crate::physics::navier_stokes::NsParams;
use crate::physics::{Physics, StateVec};
use crate::spatial::{Dim, Point};

pub fn flux(physics: &Physics, u_l: &StateVec, u_r: &StateVec, normal: Point) -> Result<StateVec, Unsupported> {
    let p = match physics {
        Physics::Euler(p) => *p,
        Physics::NavierStokes(NsParams { euler: p, .. }) => *p,
        Physics::Scalar { .. } => {
            return Err(Unsupported::ConvFluxPhysicsCombo {
                flux: "HLLC".into(),
                physics: physics.name().into(),
            })
        }
    };
    Ok(euler_hllc(p, u_l, u_r, normal))
}

fn euler_hllc(p: EulerParams, u_l: &StateVec, u_r: &StateVec, normal: Point) -> StateVec {
    let (nx, ny) = (normal.x, normal.y);
    let gamma = p.gamma;

    let rho_l = u_l[0];
    let rho_r = u_r[0];
    let (ul_x, ul_y) = euler::velocity(p, u_l);
    let (ur_x, ur_y) = euler::velocity(p, u_r);
    let pl = euler::pressure(p, u_l);
    let pr = euler::pressure(p, u_r);
    let al = euler::sound_speed(p, u_l);
    let ar = euler::sound_speed(p, u_r);
    let hl = euler::total_enthalpy(p, u_l);
    let hr = euler::total_enthalpy(p, u_r);

    let vn_l = ul_x * nx + ul_y * ny;
    let vt_l = -ul_x * ny + ul_y * nx;
    let vn_r = ur_x * nx + ur_y * ny;
    let vt_r = -ur_x * ny + ur_y * nx;

    let rl = rho_l.sqrt();
    let rr = rho_r.sqrt();
    let vn_roe = (rl * vn_l + rr * vn_r) / (rl + rr);
    let h_roe = (rl * hl + rr * hr) / (rl + rr);
    let vt_roe = (rl * vt_l + rr * vt_r) / (rl + rr);
    let a_roe = ((gamma - 1.0) * (h_roe - 0.5 * (vn_roe * vn_roe + vt_roe * vt_roe))).max(0.0).sqrt();

    let s_l = (vn_l - al).min(vn_roe - a_roe);
    let s_r = (vn_r + ar).max(vn_roe + a_roe);

    let rho_e_l = *u_l.last().unwrap();
    let rho_e_r = *u_r.last().unwrap();

    // rotated conservative state/flux [rho, rho*vn, rho*vt, rhoE]
    let ul_rot = [rho_l, rho_l * vn_l, rho_l * vt_l, rho_e_l];
    let ur_rot = [rho_r, rho_r * vn_r, rho_r * vt_r, rho_e_r];
    let fl_rot = [rho_l * vn_l, rho_l * vn_l * vn_l + pl, rho_l * vn_l * vt_l, (rho_e_l + pl) * vn_l];
    let fr_rot = [rho_r * vn_r, rho_r * vn_r * vn_r + pr, rho_r * vn_r * vt_r, (rho_e_r + pr) * vn_r];

    let f_rot = if s_l >= 0.0 {
        fl_rot
    } else if s_r <= 0.0 {
        fr_rot
    } else {
        let s_star = (pr - pl + rho_l * vn_l * (s_l - vn_l) - rho_r * vn_r * (s_r - vn_r))
            / (rho_l * (s_l - vn_l) - rho_r * (s_r - vn_r));

        let hllc_star = |s: f64, u_rot: &[f64; 4], f_k: &[f64; 4], rho: f64, vn: f64, vt: f64, pr_k: f64| -> [f64; 4] {
            let coeff = rho * (s - vn) / (s - s_star);
            let u_star = [
                coeff,
                coeff * s_star,
                coeff * vt,
                coeff * (u_rot[3] / rho + (s_star - vn) * (s_star + pr_k / (rho * (s - vn)))),
            ];
            let mut out = [0.0; 4];
            for i in 0..4 {
                out[i] = f_k[i] + s * (u_star[i] - u_rot[i]);
            }
            out
        };

        if s_star >= 0.0 {
            hllc_star(s_l, &ul_rot, &fl_rot, rho_l, vn_l, vt_l, pl)
        } else {
            hllc_star(s_r, &ur_rot, &fr_rot, rho_r, vn_r, vt_r, pr)
        }
    };

    let mut out = StateVec::new();
    out.push(f_rot[0]);
    out.push(f_rot[1] * nx - f_rot[2] * ny);
    if p.dim == Dim::Two {
        out.push(f_rot[1] * ny + f_rot[2] * nx);
    }
    out.push(f_rot[3]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::scalar::ScalarKind;
    use approx::assert_relative_eq;

    #[test]
    fn hllc_is_exact_for_equal_states() {
        let p = EulerParams { dim: Dim::One, gamma: 1.4, r: 287.0 };
        let u = euler::from_primitive(p, 1.2, 3.0, 0.0, 101325.0);
        let physics = Physics::Euler(p);
        let f = flux(&physics, &u, &u, Point::new(1.0, 0.0)).unwrap();
        let expected = physics.flux_interior(&u);
        assert_relative_eq!(f[0], expected[0][0], epsilon = 1e-6);
        assert_relative_eq!(f[1], expected[1][0], epsilon = 1e-6);
    }

    #[test]
    fn hllc_rejects_scalar_physics() {
        let physics = Physics::Scalar { dim: Dim::One, kind: ScalarKind::Burgers1D };
        let u_l: StateVec = [1.0].into_iter().collect();
        let u_r: StateVec = [2.0].into_iter().collect();
        assert!(flux(&physics, &u_l, &u_r, Point::new(1.0, 0.0)).is_err());
    }
}
