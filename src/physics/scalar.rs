//! Scalar physics: constant-velocity advection, inviscid Burgers, and the 0D
//! partially-stirred-reactor model (`spec.md` §4.6, grounded in
//! `examples/original_source/src/physics/scalar/scalar.py`).

use crate::spatial::Point;

use super::{FluxVec, StateVec};

#[derive(Clone, Copy, Debug)]
pub enum ScalarKind {
    ConstAdv1D { c: f64 },
    ConstAdv2D { cx: f64, cy: f64 },
    Burgers1D,
    ModelPsr { t_ad: f64, t_in: f64, t_a: f64 },
}

/// Closed set of scalar initial/boundary/exact-solution state constructors
/// (`scalar.py`'s `IC_fcn_map`/`exact_fcn_map`), selected structurally rather
/// than by string key (`spec.md` §9).
#[derive(Clone, Copy, Debug)]
pub enum ScalarIcKind {
    Uniform { value: f64 },
    Sine { amplitude: f64, omega: f64 },
    DampingSine { amplitude: f64, omega: f64, nu: f64 },
    ShockBurgers { u_l: f64, u_r: f64, x_shock: f64 },
    Gaussian { amplitude: f64, x0: f64, y0: f64, sigma: f64 },
    Paraboloid,
}

#[derive(Clone, Copy, Debug)]
pub enum ScalarSourceKind {
    /// Linear damping `S(u) = nu * u` (`nu < 0` decays).
    SimpleSource { nu: f64 },
    /// One-step Arrhenius ignition, `S(T) = a * (T_ad - T) * exp(-T_a / T)`.
    ScalarArrhenius { a: f64, t_ad: f64, t_a: f64 },
    /// Relaxation toward the inlet temperature, `S(T) = (T_in - T) / tau_mix`.
    ScalarMixing { t_in: f64, tau_mix: f64 },
}

pub fn num_state_vars() -> usize {
    1
}

pub fn flux_interior(kind: ScalarKind, u: &StateVec) -> FluxVec {
    let u0 = u[0];
    let mut f = FluxVec::new();
    match kind {
        ScalarKind::ConstAdv1D { c } => f.push([c * u0, 0.0]),
        ScalarKind::ConstAdv2D { cx, cy } => f.push([cx * u0, cy * u0]),
        ScalarKind::Burgers1D => f.push([0.5 * u0 * u0, 0.0]),
        ScalarKind::ModelPsr { .. } => f.push([0.0, 0.0]),
    }
    f
}

pub fn max_wave_speed(kind: ScalarKind, u: &StateVec) -> f64 {
    match kind {
        ScalarKind::ConstAdv1D { c } => c.abs(),
        ScalarKind::ConstAdv2D { cx, cy } => (cx * cx + cy * cy).sqrt(),
        ScalarKind::Burgers1D => u[0].abs(),
        ScalarKind::ModelPsr { .. } => 0.0,
    }
}

pub fn source(kind: ScalarSourceKind, u: &StateVec) -> StateVec {
    let t = u[0];
    let mut s = StateVec::new();
    s.push(match kind {
        ScalarSourceKind::SimpleSource { nu } => nu * t,
        ScalarSourceKind::ScalarArrhenius { a, t_ad, t_a } => a * (t_ad - t) * (-t_a / t).exp(),
        ScalarSourceKind::ScalarMixing { t_in, tau_mix } => (t_in - t) / tau_mix,
    });
    s
}

pub fn initial_state(kind: ScalarIcKind, x: Point, t: f64) -> StateVec {
    let mut s = StateVec::new();
    s.push(match kind {
        ScalarIcKind::Uniform { value } => value,
        ScalarIcKind::Sine { amplitude, omega } => amplitude * (omega * (x.x - t)).sin(),
        ScalarIcKind::DampingSine { amplitude, omega, nu } => {
            amplitude * (nu * t).exp() * (omega * (x.x - t)).sin()
        }
        ScalarIcKind::ShockBurgers { u_l, u_r, x_shock } => {
            let shock_speed = 0.5 * (u_l + u_r);
            if x.x - shock_speed * t < x_shock {
                u_l
            } else {
                u_r
            }
        }
        ScalarIcKind::Gaussian { amplitude, x0, y0, sigma } => {
            let dx = x.x - x0;
            let dy = x.y - y0;
            amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
        }
        ScalarIcKind::Paraboloid => 1.0 - x.x * x.x - x.y * x.y,
    });
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// `examples/original_source/examples/scalar/1D_ADER/damping_sine_wave/damping_sine_wave.py`'s
    /// scenario: `nu = -1e5` should decay rapidly, not blow up.
    #[test]
    fn damping_sine_with_large_negative_nu_decays_rather_than_blows_up() {
        let nu = -1e5;
        let ic = ScalarIcKind::DampingSine { amplitude: 1.0, omega: 1.0, nu };
        let early = initial_state(ic, Point::new(0.0, 0.0), 0.0)[0];
        let later = initial_state(ic, Point::new(0.0, 0.0), 1e-4)[0];
        assert!(later.abs() < early.abs().max(1e-12));
        assert_relative_eq!(later, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn simple_source_matches_sign_convention_of_nu_times_u() {
        let s = source(ScalarSourceKind::SimpleSource { nu: -1e5 }, &StateVec::from_slice(&[1.0]));
        assert_relative_eq!(s[0], -1e5, epsilon = 1e-6);
    }
}
