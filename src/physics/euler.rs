//! Compressible Euler physics, 1D/2D (`spec.md` §4.6, grounded in
//! `examples/original_source/src/physics/euler/functions.py`).

use crate::error::NumericError;
use crate::spatial::{Dim, Point};

use super::{FluxVec, StateVec};

#[derive(Clone, Copy, Debug)]
pub struct EulerParams {
    pub dim: Dim,
    pub gamma: f64,
    pub r: f64,
}

pub fn num_state_vars(dim: Dim) -> usize {
    dim.as_usize() + 2
}

pub fn density(u: &StateVec) -> f64 {
    u[0]
}

pub fn velocity(p: EulerParams, u: &StateVec) -> (f64, f64) {
    match p.dim {
        Dim::One => (u[1] / u[0], 0.0),
        Dim::Two => (u[1] / u[0], u[2] / u[0]),
    }
}

pub fn pressure(p: EulerParams, u: &StateVec) -> f64 {
    let rho = u[0];
    let (vx, vy) = velocity(p, u);
    let rho_e = *u.last().unwrap();
    (p.gamma - 1.0) * (rho_e - 0.5 * rho * (vx * vx + vy * vy))
}

pub fn sound_speed(p: EulerParams, u: &StateVec) -> f64 {
    (p.gamma * pressure(p, u) / u[0]).sqrt()
}

pub fn temperature(p: EulerParams, u: &StateVec) -> f64 {
    pressure(p, u) / (u[0] * p.r)
}

pub fn total_enthalpy(p: EulerParams, u: &StateVec) -> f64 {
    let rho_e = *u.last().unwrap();
    (rho_e + pressure(p, u)) / u[0]
}

pub fn flux_interior(p: EulerParams, u: &StateVec) -> FluxVec {
    let rho = u[0];
    let (vx, vy) = velocity(p, u);
    let pr = pressure(p, u);
    let rho_e = *u.last().unwrap();
    let mut f = FluxVec::new();
    match p.dim {
        Dim::One => {
            f.push([rho * vx, 0.0]);
            f.push([rho * vx * vx + pr, 0.0]);
            f.push([(rho_e + pr) * vx, 0.0]);
        }
        Dim::Two => {
            f.push([rho * vx, rho * vy]);
            f.push([rho * vx * vx + pr, rho * vx * vy]);
            f.push([rho * vx * vy, rho * vy * vy + pr]);
            f.push([(rho_e + pr) * vx, (rho_e + pr) * vy]);
        }
    }
    f
}

pub fn max_wave_speed(p: EulerParams, u: &StateVec) -> f64 {
    let (vx, vy) = velocity(p, u);
    (vx * vx + vy * vy).sqrt() + sound_speed(p, u)
}

/// Conservative state from primitive `(rho, vx, vy, p)`.
pub fn from_primitive(p: EulerParams, rho: f64, vx: f64, vy: f64, pr: f64) -> StateVec {
    let rho_e = pr / (p.gamma - 1.0) + 0.5 * rho * (vx * vx + vy * vy);
    let mut u = StateVec::new();
    u.push(rho);
    u.push(rho * vx);
    if p.dim == Dim::Two {
        u.push(rho * vy);
    }
    u.push(rho_e);
    u
}

#[derive(Clone, Copy, Debug)]
pub enum EulerIcKind {
    RiemannProblem { rho_l: f64, u_l: f64, p_l: f64, rho_r: f64, u_r: f64, p_r: f64, x_interface: f64 },
    MovingShock { mach: f64, x_shock: f64 },
    IsentropicVortex { rho_b: f64, u_b: f64, v_b: f64, p_b: f64, vortex_strength: f64 },
    DensityWave { rho0: f64, amplitude: f64, u: f64, p: f64 },
    SmoothIsentropicFlow { a: f64 },
}

pub fn initial_state(p: EulerParams, kind: EulerIcKind, x: Point, t: f64) -> Result<StateVec, NumericError> {
    match kind {
        EulerIcKind::RiemannProblem { rho_l, u_l, p_l, rho_r, u_r, p_r, x_interface } => {
            if x.x < x_interface + u_l * t {
                Ok(from_primitive(p, rho_l, u_l, 0.0, p_l))
            } else {
                Ok(from_primitive(p, rho_r, u_r, 0.0, p_r))
            }
        }
        EulerIcKind::MovingShock { mach, x_shock } => {
            let gamma = p.gamma;
            let (rho1, p1, u1) = (1.0, 1.0e5, 0.0);
            let a1 = (gamma * p1 / rho1).sqrt();
            let w = mach * a1;
            let us = u1 + w;
            let shock_now = x_shock + us * t;
            let rho2 = (gamma + 1.0) * mach * mach / ((gamma - 1.0) * mach * mach + 2.0) * rho1;
            let p2 = (2.0 * gamma * mach * mach - (gamma - 1.0)) / (gamma + 1.0) * p1;
            let ux = w;
            let uy = ux * rho1 / rho2;
            let u2 = w + u1 - uy;
            if x.x <= shock_now {
                Ok(from_primitive(p, rho2, u2, 0.0, p2))
            } else {
                Ok(from_primitive(p, rho1, u1, 0.0, p1))
            }
        }
        EulerIcKind::IsentropicVortex { rho_b, u_b, v_b, p_b, vortex_strength } => {
            let gamma = p.gamma;
            let s = p_b / rho_b.powf(gamma);
            let xr = x.x - u_b * t;
            let yr = x.y - v_b * t;
            let r2 = xr * xr + yr * yr;
            let du_mag = vortex_strength / (2.0 * std::f64::consts::PI) * (0.5 * (1.0 - r2)).exp();
            let du = du_mag * -yr;
            let dv = du_mag * xr;
            let dt = -(gamma - 1.0) * vortex_strength * vortex_strength / (8.0 * gamma * std::f64::consts::PI.powi(2))
                * (1.0 - r2).exp();
            let tb = p_b / rho_b;
            let vu = u_b + du;
            let vv = v_b + dv;
            let temp = tb + dt;
            let rho = (temp / s).powf(1.0 / (gamma - 1.0));
            let pr = rho * temp;
            Ok(from_primitive(p, rho, vu, vv, pr))
        }
        EulerIcKind::DensityWave { rho0, amplitude, u, p: pr } => {
            let rho = rho0 + amplitude * (std::f64::consts::PI * (x.x - u * t)).sin();
            Ok(from_primitive(p, rho, u, 0.0, pr))
        }
        EulerIcKind::SmoothIsentropicFlow { a } => smooth_isentropic_flow(p, a, x.x, t),
    }
}

/// Newton solve of `f1(x1) = 0`, `f2(x2) = 0` for the characteristic feet of
/// `SmoothIsentropicFlow` (`functions.py::SmoothIsentropicFlow`, a Riemann
/// invariant construction solved there with `scipy.optimize.fsolve`).
fn smooth_isentropic_flow(p: EulerParams, a: f64, x: f64, t: f64) -> Result<StateVec, NumericError> {
    let gamma = p.gamma;
    let rho0 = |xi: f64| 1.0 + a * (std::f64::consts::PI * xi).sin();
    let drho0 = |xi: f64| a * std::f64::consts::PI * (std::f64::consts::PI * xi).cos();
    let sqrt3 = 3f64.sqrt();

    let solve = |sign: f64| -> Result<f64, NumericError> {
        let mut xi = 0.0;
        for iter in 0..50 {
            let f = x + sign * sqrt3 * rho0(xi) * t - xi;
            if f.abs() < 1e-12 {
                return Ok(xi);
            }
            let df = sign * sqrt3 * drho0(xi) * t - 1.0;
            if df.abs() < 1e-14 {
                return Err(NumericError::RootFindDidNotConverge { iters: iter, residual: f.abs() });
            }
            xi -= f / df;
        }
        Err(NumericError::RootFindDidNotConverge { iters: 50, residual: (x - xi).abs() })
    };

    let x1 = solve(1.0)?;
    let x2 = solve(-1.0)?;
    let rho = 0.5 * (rho0(x1) + rho0(x2));
    let vel = sqrt3 * (rho - rho0(x1));
    let pr = rho.powf(gamma);
    Ok(from_primitive(p, rho, vel, 0.0, pr))
}

#[derive(Clone, Copy, Debug)]
pub enum EulerBcKind {
    SlipWall,
    PressureOutlet { p_back: f64 },
}

/// Weak-prescribed boundary state (`spec.md` §4.6).
pub fn boundary_state(p: EulerParams, kind: EulerBcKind, u_i: &StateVec, normal: Point) -> StateVec {
    match kind {
        EulerBcKind::SlipWall => {
            let (vx, vy) = velocity(p, u_i);
            let vn = vx * normal.x + vy * normal.y;
            let vx_r = vx - 2.0 * vn * normal.x;
            let vy_r = vy - 2.0 * vn * normal.y;
            from_primitive(p, density(u_i), vx_r, vy_r, pressure(p, u_i))
        }
        EulerBcKind::PressureOutlet { p_back } => {
            let (vx, vy) = velocity(p, u_i);
            let a_i = sound_speed(p, u_i);
            let vn = vx * normal.x + vy * normal.y;
            if vn.abs() >= a_i {
                u_i.clone()
            } else {
                let gamma = p.gamma;
                let rho_i = density(u_i);
                let p_i = pressure(p, u_i);
                // outgoing Riemann invariant J_I = v_n + 2*c_I/(gamma-1), carried
                // from the interior state; the boundary density follows from the
                // isentropic relation at the prescribed back pressure, and the
                // boundary normal velocity is recovered from J_I nonlinearly
                // (`functions.py`'s `PressureOutlet`).
                let j_i = vn + 2.0 * a_i / (gamma - 1.0);
                let rho_b = rho_i * (p_back / p_i).powf(1.0 / gamma);
                let c_b = (gamma * p_back / rho_b).sqrt();
                let vn_b = j_i - 2.0 * c_b / (gamma - 1.0);
                let vx_b = vx + (vn_b - vn) * normal.x;
                let vy_b = vy + (vn_b - vn) * normal.y;
                from_primitive(p, rho_b, vx_b, vy_b, p_back)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum EulerSourceKind {
    /// Linear drag on momentum, `S_rhou = -nu * rho * v`.
    StiffFriction { nu: f64 },
}

pub fn source(p: EulerParams, kind: EulerSourceKind, u: &StateVec) -> StateVec {
    match kind {
        EulerSourceKind::StiffFriction { nu } => {
            let (vx, vy) = velocity(p, u);
            let rho = u[0];
            let mut s = StateVec::new();
            s.push(0.0);
            s.push(-nu * rho * vx);
            if p.dim == Dim::Two {
                s.push(-nu * rho * vy);
            }
            s.push(-nu * rho * (vx * vx + vy * vy));
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flux_reduces_to_uniform_advection_form_for_constant_pressure() {
        let p = EulerParams { dim: Dim::One, gamma: 1.4, r: 287.0 };
        let u = from_primitive(p, 1.2, 3.0, 0.0, 101325.0);
        let f = flux_interior(p, &u);
        assert_relative_eq!(f[0][0], 1.2 * 3.0, epsilon = 1e-8);
    }

    #[test]
    fn slip_wall_zeroes_normal_velocity_component() {
        let p = EulerParams { dim: Dim::Two, gamma: 1.4, r: 287.0 };
        let u = from_primitive(p, 1.0, 2.0, 0.0, 1.0);
        let reflected = boundary_state(p, EulerBcKind::SlipWall, &u, Point::new(1.0, 0.0));
        let (vx, vy) = velocity(p, &reflected);
        assert_relative_eq!(vx, -2.0, epsilon = 1e-10);
        assert_relative_eq!(vy, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn max_wave_speed_is_velocity_plus_sound_speed() {
        let p = EulerParams { dim: Dim::One, gamma: 1.4, r: 287.0 };
        let u = from_primitive(p, 1.0, 2.0, 0.0, 1.0);
        let a = sound_speed(p, &u);
        assert_relative_eq!(max_wave_speed(p, &u), 2.0 + a, epsilon = 1e-10);
    }
}
