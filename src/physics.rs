//! The physics contract the core numerics consume (`spec.md` §4.6): a closed
//! sum type per physical model rather than an open string-keyed registry
//! (`spec.md` §9), dispatching to [`scalar`], [`euler`] and [`navier_stokes`].

pub mod euler;
pub mod navier_stokes;
pub mod scalar;

use smallvec::SmallVec;

use crate::error::{NumericError, Unsupported};
use crate::spatial::{Dim, Point};

/// A per-node/per-quadrature-point conservative state vector. Inline
/// capacity 4 covers every model built here (2D Euler/Navier-Stokes is the
/// largest, at `rho, rho*u, rho*v, rho*E`).
pub type StateVec = SmallVec<[f64; 4]>;

/// One 2D physical-space flux vector `(F_x, F_y)` per state variable.
pub type FluxVec = SmallVec<[[f64; 2]; 4]>;

#[derive(Clone, Copy, Debug)]
pub enum Physics {
    Scalar { dim: Dim, kind: scalar::ScalarKind },
    Euler(euler::EulerParams),
    NavierStokes(navier_stokes::NsParams),
}

#[derive(Clone, Copy, Debug)]
pub enum IcKind {
    Scalar(scalar::ScalarIcKind),
    Euler(euler::EulerIcKind),
    Manufactured(navier_stokes::ManufacturedParams),
}

#[derive(Clone, Copy, Debug)]
pub enum BcKind {
    /// Weak-Riemann: the exterior state equals the interior state, and the
    /// numerical flux alone enforces the condition (periodic faces, and
    /// scalar inflow/outflow, use this).
    Transmissive,
    Euler(euler::EulerBcKind),
}

#[derive(Clone, Copy, Debug)]
pub enum SourceKind {
    Scalar(scalar::ScalarSourceKind),
    Euler(euler::EulerSourceKind),
    Manufactured(navier_stokes::ManufacturedParams),
}

impl Physics {
    pub fn dim(&self) -> Dim {
        match self {
            Physics::Scalar { dim, .. } => *dim,
            Physics::Euler(p) => p.dim,
            Physics::NavierStokes(p) => p.euler.dim,
        }
    }

    pub fn num_state_vars(&self) -> usize {
        match self {
            Physics::Scalar { .. } => scalar::num_state_vars(),
            Physics::Euler(p) => euler::num_state_vars(p.dim),
            Physics::NavierStokes(p) => euler::num_state_vars(p.euler.dim),
        }
    }

    pub fn flux_interior(&self, u: &StateVec) -> FluxVec {
        match self {
            Physics::Scalar { kind, .. } => scalar::flux_interior(*kind, u),
            Physics::Euler(p) => euler::flux_interior(*p, u),
            Physics::NavierStokes(p) => euler::flux_interior(p.euler, u),
        }
    }

    pub fn max_wave_speed(&self, u: &StateVec) -> f64 {
        match self {
            Physics::Scalar { kind, .. } => scalar::max_wave_speed(*kind, u),
            Physics::Euler(p) => euler::max_wave_speed(*p, u),
            Physics::NavierStokes(p) => euler::max_wave_speed(p.euler, u),
        }
    }

    /// Named derived scalar quantity, for diagnostics/output (`spec.md`
    /// §4.6's `compute_scalar(name, U)`).
    pub fn compute_scalar(&self, name: &str, u: &StateVec) -> Option<f64> {
        match self {
            Physics::Scalar { .. } => match name {
                "u" => Some(u[0]),
                _ => None,
            },
            Physics::Euler(p) | Physics::NavierStokes(navier_stokes::NsParams { euler: p, .. }) => match name {
                "density" => Some(euler::density(u)),
                "pressure" => Some(euler::pressure(*p, u)),
                "temperature" => Some(euler::temperature(*p, u)),
                "sound_speed" => Some(euler::sound_speed(*p, u)),
                "enthalpy" => Some(euler::total_enthalpy(*p, u)),
                "mach" => {
                    let (vx, vy) = euler::velocity(*p, u);
                    Some((vx * vx + vy * vy).sqrt() / euler::sound_speed(*p, u))
                }
                _ => None,
            },
        }
    }

    pub fn initial_state(&self, ic: IcKind, x: Point, t: f64) -> Result<StateVec, NumericError> {
        match (self, ic) {
            (Physics::Scalar { .. }, IcKind::Scalar(kind)) => Ok(scalar::initial_state(kind, x, t)),
            (Physics::Euler(p), IcKind::Euler(kind)) => euler::initial_state(*p, kind, x, t),
            (Physics::NavierStokes(p), IcKind::Manufactured(m)) => Ok(navier_stokes::manufactured_state(p.euler, m, x, t)),
            _ => panic!("initial condition kind does not match physics"),
        }
    }

    pub fn source(&self, kind: SourceKind, u: &StateVec, x: Point, t: f64) -> StateVec {
        match (self, kind) {
            (Physics::Scalar { .. }, SourceKind::Scalar(k)) => scalar::source(k, u),
            (Physics::Euler(p), SourceKind::Euler(k)) => euler::source(*p, k, u),
            (Physics::NavierStokes(_), SourceKind::Manufactured(m)) => {
                navier_stokes::manufactured_source(m, self.num_state_vars(), x, t)
            }
            _ => panic!("source kind does not match physics"),
        }
    }

    /// Weak-prescribed exterior state at a boundary face (`spec.md` §4.6).
    /// `Transmissive` boundaries hand the interior state straight back;
    /// enforcement happens entirely in the numerical flux there.
    pub fn boundary_state(&self, kind: BcKind, u_i: &StateVec, normal: Point) -> StateVec {
        match (self, kind) {
            (_, BcKind::Transmissive) => u_i.clone(),
            (Physics::Euler(p), BcKind::Euler(k)) | (Physics::NavierStokes(navier_stokes::NsParams { euler: p, .. }), BcKind::Euler(k)) => {
                euler::boundary_state(*p, k, u_i, normal)
            }
            _ => panic!("boundary condition kind does not match physics"),
        }
    }

    pub fn diffusive_flux(&self, u: &StateVec, du_dx: &StateVec, du_dy: &StateVec) -> Result<FluxVec, Unsupported> {
        match self {
            Physics::NavierStokes(p) => navier_stokes::diffusive_flux(*p, u, du_dx, du_dy),
            _ => Err(Unsupported::NoDiffusiveFlux(self.name().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Physics::Scalar { kind: scalar::ScalarKind::ConstAdv1D { .. }, .. } => "ConstAdvScalar1D",
            Physics::Scalar { kind: scalar::ScalarKind::ConstAdv2D { .. }, .. } => "ConstAdvScalar2D",
            Physics::Scalar { kind: scalar::ScalarKind::Burgers1D, .. } => "Burgers1D",
            Physics::Scalar { kind: scalar::ScalarKind::ModelPsr { .. }, .. } => "ModelPSRScalar",
            Physics::Euler(p) if p.dim == Dim::One => "Euler1D",
            Physics::Euler(_) => "Euler2D",
            Physics::NavierStokes(p) if p.euler.dim == Dim::One => "NavierStokes1D",
            Physics::NavierStokes(_) => "NavierStokes2D",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_physics_reports_one_state_variable() {
        let p = Physics::Scalar { dim: Dim::One, kind: scalar::ScalarKind::ConstAdv1D { c: 1.0 } };
        assert_eq!(p.num_state_vars(), 1);
    }

    #[test]
    fn euler_2d_reports_four_state_variables_and_a_density_scalar() {
        let p = Physics::Euler(euler::EulerParams { dim: Dim::Two, gamma: 1.4, r: 287.0 });
        assert_eq!(p.num_state_vars(), 4);
        let u = euler::from_primitive(euler::EulerParams { dim: Dim::Two, gamma: 1.4, r: 287.0 }, 1.0, 0.0, 0.0, 1.0);
        assert_eq!(p.compute_scalar("density", &u), Some(1.0));
        assert_eq!(p.compute_scalar("bogus", &u), None);
    }

    #[test]
    fn navier_stokes_without_diffusion_dim_reports_unsupported() {
        let euler = euler::EulerParams { dim: Dim::One, gamma: 1.4, r: 287.0 };
        let p = Physics::NavierStokes(navier_stokes::NsParams { euler, mu: 1.0e-5, pr: 0.72 });
        let u = euler::from_primitive(euler, 1.0, 0.0, 0.0, 1.0);
        assert!(p.diffusive_flux(&u, &u, &u).is_err());
    }
}
