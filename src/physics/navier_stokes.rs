//! Compressible Navier-Stokes: the Euler state plus a Newtonian diffusive
//! flux and an SIP (symmetric interior penalty) numerical diffusive flux
//! (`spec.md` §4.5's `DiffFluxNumerical = SIP`), grounded in the
//! manufactured-solution scenario
//! (`examples/original_source/examples/navierstokes/2D/manufactured_solution/manufactured_solution.py`).
//!
//! The viscous stress/heat-conduction closure itself (Newtonian fluid,
//! Stokes' hypothesis, Fourier conduction) is the standard compressible NS
//! formulation rather than anything specific to the retrieved pack.

use crate::error::Unsupported;
use crate::spatial::{Dim, Point};

use super::euler::EulerParams;
use super::{FluxVec, StateVec};

#[derive(Clone, Copy, Debug)]
pub struct NsParams {
    pub euler: EulerParams,
    pub mu: f64,
    pub pr: f64,
}

/// Newtonian viscous flux plus Fourier heat conduction, from the conserved
/// state and the physical-space gradient of the conserved state
/// (`du_dx`/`du_dy`, one `StateVec` each).
pub fn diffusive_flux(p: NsParams, u: &StateVec, du_dx: &StateVec, du_dy: &StateVec) -> Result<FluxVec, Unsupported> {
    if p.euler.dim != Dim::Two {
        return Err(Unsupported::NoDiffusiveFlux("NavierStokes1D".into()));
    }
    let rho = u[0];
    let vx = u[1] / rho;
    let vy = u[2] / rho;
    let rho_e = u[3];
    let gamma = p.euler.gamma;
    let pr_val = (gamma - 1.0) * (rho_e - 0.5 * rho * (vx * vx + vy * vy));

    let (drho_dx, drho_dy) = (du_dx[0], du_dy[0]);
    let (dmx_dx, dmx_dy) = (du_dx[1], du_dy[1]);
    let (dmy_dx, dmy_dy) = (du_dx[2], du_dy[2]);
    let (de_dx, de_dy) = (du_dx[3], du_dy[3]);

    let dvx_dx = (dmx_dx - vx * drho_dx) / rho;
    let dvx_dy = (dmx_dy - vx * drho_dy) / rho;
    let dvy_dx = (dmy_dx - vy * drho_dx) / rho;
    let dvy_dy = (dmy_dy - vy * drho_dy) / rho;

    let dp_dx = (gamma - 1.0) * (de_dx - 0.5 * drho_dx * (vx * vx + vy * vy) - rho * (vx * dvx_dx + vy * dvy_dx));
    let dp_dy = (gamma - 1.0) * (de_dy - 0.5 * drho_dy * (vx * vx + vy * vy) - rho * (vx * dvx_dy + vy * dvy_dy));

    let r = p.euler.r;
    let dt_dx = (dp_dx * rho - pr_val * drho_dx) / (rho * rho * r);
    let dt_dy = (dp_dy * rho - pr_val * drho_dy) / (rho * rho * r);

    let mu = p.mu;
    let tau_xx = mu * (4.0 / 3.0 * dvx_dx - 2.0 / 3.0 * dvy_dy);
    let tau_yy = mu * (4.0 / 3.0 * dvy_dy - 2.0 / 3.0 * dvx_dx);
    let tau_xy = mu * (dvx_dy + dvy_dx);

    let cp = gamma * r / (gamma - 1.0);
    let k = mu * cp / p.pr;
    let qx = -k * dt_dx;
    let qy = -k * dt_dy;

    let mut f = FluxVec::new();
    f.push([0.0, 0.0]);
    f.push([tau_xx, tau_xy]);
    f.push([tau_xy, tau_yy]);
    f.push([vx * tau_xx + vy * tau_xy - qx, vx * tau_xy + vy * tau_yy - qy]);
    Ok(f)
}

/// Symmetric interior penalty numerical diffusive flux: the average of both
/// sides' physical diffusive flux dotted with the face normal, minus a
/// penalty on the solution jump.
pub fn sip_numerical_flux(
    p: NsParams,
    u_l: &StateVec,
    grad_l: (&StateVec, &StateVec),
    u_r: &StateVec,
    grad_r: (&StateVec, &StateVec),
    normal: Point,
    penalty: f64,
) -> Result<StateVec, Unsupported> {
    let fl = diffusive_flux(p, u_l, grad_l.0, grad_l.1)?;
    let fr = diffusive_flux(p, u_r, grad_r.0, grad_r.1)?;
    let mut out = StateVec::new();
    for i in 0..fl.len() {
        let avg = 0.5 * ((fl[i][0] + fr[i][0]) * normal.x + (fl[i][1] + fr[i][1]) * normal.y);
        out.push(avg - penalty * (u_r[i] - u_l[i]));
    }
    Ok(out)
}

/// A simple smooth manufactured solution used to drive the diffusive-flux
/// convergence test: a sinusoidal density/pressure perturbation advected at
/// constant velocity `(u0, v0)`, isothermal-consistent pressure. This stands
/// in for the original scenario's forcing (generated there via symbolic
/// differentiation of a closed-form ansatz) with a solution of the same
/// qualitative shape; see `DESIGN.md`.
#[derive(Clone, Copy, Debug)]
pub struct ManufacturedParams {
    pub rho0: f64,
    pub rho1: f64,
    pub u0: f64,
    pub v0: f64,
    pub p0: f64,
    pub p1: f64,
    pub omega: f64,
}

fn phase(m: ManufacturedParams, x: Point, t: f64) -> f64 {
    m.omega * (x.x + x.y) - m.omega * (m.u0 + m.v0) * t
}

pub fn manufactured_state(p: EulerParams, m: ManufacturedParams, x: Point, t: f64) -> StateVec {
    let s = phase(m, x, t).sin();
    let rho = m.rho0 + m.rho1 * s;
    let pr = m.p0 + m.p1 * s;
    super::euler::from_primitive(p, rho, m.u0, m.v0, pr)
}

/// `S = d(rho)/dt + u0*d(rho)/dx + v0*d(rho)/dy` applied uniformly to every
/// conserved equation, closing the manufactured solution against pure
/// convection at the manufactured velocity (no viscous forcing term, since
/// `u0, v0` and `T` are spatially uniform along the phase's level sets by
/// construction, leaving viscous stresses and heat flux exactly zero).
pub fn manufactured_source(m: ManufacturedParams, ns: usize, x: Point, t: f64) -> StateVec {
    let ph = phase(m, x, t);
    let c = ph.cos();
    let drho_dt = -m.omega * (m.u0 + m.v0) * m.rho1 * c;
    let drho_dx = m.omega * m.rho1 * c;
    let drho_dy = m.omega * m.rho1 * c;
    let residual = drho_dt + m.u0 * drho_dx + m.v0 * drho_dy;
    let mut s = StateVec::new();
    for _ in 0..ns {
        s.push(residual);
    }
    s
}
