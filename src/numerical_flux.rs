//! Numerical convective flux functors (`spec.md` §4.5/§4.6): a closed enum
//! selecting among Lax-Friedrichs, Roe, and HLLC, each consistent
//! (`F*(U,U,n) = F(U)·n`) and conservative by construction.
//!
//! All three operate on a *unit* normal; the face-area weight (`jac_mag` in
//! [`crate::geometry`]) and quadrature weight are applied by the caller
//! (`spec.md` §5's face-term assembly), not folded in here.

mod hllc;
mod lax_friedrichs;
mod roe;

use crate::error::SolverError;
use crate::physics::{Physics, StateVec};
use crate::spatial::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvFluxKind {
    LaxFriedrichs,
    Roe,
    Hllc,
}

pub fn numerical_flux(
    kind: ConvFluxKind,
    physics: &Physics,
    u_l: &StateVec,
    u_r: &StateVec,
    normal: Point,
) -> Result<StateVec, SolverError> {
    match kind {
        ConvFluxKind::LaxFriedrichs => Ok(lax_friedrichs::flux(physics, u_l, u_r, normal)),
        ConvFluxKind::Roe => Ok(roe::flux(physics, u_l, u_r, normal)?),
        ConvFluxKind::Hllc => Ok(hllc::flux(physics, u_l, u_r, normal)?),
    }
}
