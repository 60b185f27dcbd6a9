//! The DG spatial residual (`spec.md` §4.5): volume, face, and source
//! contributions assembled per element, then `M⁻¹` applied. Volume/source
//! assembly and per-face numerical-flux evaluation are embarrassingly
//! parallel over elements/faces (`spec.md` §5); the face-to-element scatter
//! that follows runs serially per that section's ordering rule ("face
//! contributions must be fully assembled before `M⁻¹` is applied on either
//! side").

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::{NotPhysical, SolverError};
use crate::geometry::{BoundaryFaceGeom, ElemGeom, InteriorFaceGeom};
use crate::mesh::Mesh;
use crate::numerical_flux::{self, ConvFluxKind};
use crate::physics::navier_stokes;
use crate::physics::{BcKind, Physics, SourceKind, StateVec};
use crate::spatial::Point;

/// Per-element modal/nodal coefficients, `nb x ns`.
pub type Coeffs = Vec<DMatrix<f64>>;

#[derive(Clone, Debug)]
pub struct OperatorSwitches {
    pub conv_flux: bool,
    pub source: bool,
    pub diff_flux: bool,
    /// `spec.md` §4.5's `InterpolateFlux`: valid only when the quadrature
    /// point set equals the basis node set (enforced by `config.rs` at
    /// construction, `ConfigError::InterpolateFluxNeedsColocation`).
    pub interpolate_flux: bool,
}

impl Default for OperatorSwitches {
    fn default() -> Self {
        Self { conv_flux: true, source: true, diff_flux: false, interpolate_flux: false }
    }
}

pub struct Operator {
    pub physics: Physics,
    pub conv_flux_kind: ConvFluxKind,
    pub switches: OperatorSwitches,
    /// Boundary condition per named boundary (`mesh.boundary_names` index).
    pub boundary_conditions: Vec<BcKind>,
    /// Source terms, applied additively (`spec.md` §6's `SourceTerms` map).
    pub sources: Vec<SourceKind>,
    /// SIP penalty coefficient (`spec.md` §6's `DiffFluxNumerical = SIP`);
    /// scaled per face by `1 / jac_mag` so it grows as elements shrink.
    pub sip_penalty: f64,
}

impl Operator {
    /// Computes `dU_e/dt` for every element.
    pub fn residual(
        &self,
        mesh: &Mesh,
        elem_geoms: &[ElemGeom],
        interior_face_geoms: &[InteriorFaceGeom],
        boundary_face_geoms: &[BoundaryFaceGeom],
        u: &Coeffs,
        t: f64,
    ) -> Result<Coeffs, SolverError> {
        let ns = self.physics.num_state_vars();

        let mut r: Coeffs = mesh
            .elements
            .par_iter()
            .zip(elem_geoms.par_iter())
            .zip(u.par_iter())
            .map(|((elem, geom), u_e)| self.volume_and_source(elem.id, geom, u_e, ns, t, true))
            .collect::<Result<Vec<_>, SolverError>>()?;

        if self.switches.conv_flux || self.switches.diff_flux {
            let interior_flux: Vec<DMatrix<f64>> = interior_face_geoms
                .par_iter()
                .zip(mesh.interior_faces.par_iter())
                .map(|(fg, face)| self.face_flux(fg, ns, &u[face.elem_l], &u[face.elem_r]))
                .collect::<Result<Vec<_>, SolverError>>()?;

            for (i, face) in mesh.interior_faces.iter().enumerate() {
                let fstar = &interior_flux[i];
                let contrib_l = interior_face_geoms[i].phi_l.transpose() * fstar;
                let contrib_r = interior_face_geoms[i].phi_r.transpose() * fstar;
                r[face.elem_l] -= &contrib_l;
                r[face.elem_r] += &contrib_r;
            }

            let boundary_flux: Vec<DMatrix<f64>> = boundary_face_geoms
                .par_iter()
                .zip(mesh.boundary_faces.par_iter())
                .map(|(fg, face)| {
                    let bc = self.boundary_conditions[face.boundary];
                    self.boundary_face_flux(fg, ns, &u[face.elem], bc)
                })
                .collect::<Result<Vec<_>, SolverError>>()?;

            for (i, face) in mesh.boundary_faces.iter().enumerate() {
                let fstar = &boundary_flux[i];
                let contrib = boundary_face_geoms[i].phi.transpose() * fstar;
                r[face.elem] -= &contrib;
            }
        }

        Ok(elem_geoms
            .par_iter()
            .zip(r.par_iter())
            .map(|(geom, r_e)| &geom.mass_inv * r_e)
            .collect())
    }

    /// Local (no face coupling) rate `M_e⁻¹ · (volume + source residual)`,
    /// used by the ADER predictor (`spec.md` §4.7): each element evolves
    /// independently of its neighbors before the corrector couples faces.
    pub(crate) fn local_rate(&self, elem_id: usize, geom: &ElemGeom, u_e: &DMatrix<f64>, ns: usize, t: f64, include_source: bool) -> Result<DMatrix<f64>, SolverError> {
        let r_e = self.volume_and_source(elem_id, geom, u_e, ns, t, include_source)?;
        Ok(&geom.mass_inv * r_e)
    }

    #[allow(clippy::too_many_arguments)]
    fn volume_and_source(
        &self,
        elem_id: usize,
        geom: &ElemGeom,
        u_e: &DMatrix<f64>,
        ns: usize,
        t: f64,
        include_source: bool,
    ) -> Result<DMatrix<f64>, SolverError> {
        let nb = geom.phi.ncols();
        let nq = geom.quad.num_points();
        let mut r_e = DMatrix::zeros(nb, ns);

        let u_q = if self.switches.interpolate_flux { u_e.clone() } else { &geom.phi * u_e };
        let dudx_q = &geom.grad_x * u_e;
        let dudy_q = &geom.grad_y * u_e;

        for q in 0..nq {
            let row: StateVec = (0..ns).map(|s| u_q[(q, s)]).collect();
            check_physical(&self.physics, &row, elem_id, q, geom.x_q[q])?;

            if self.switches.conv_flux {
                let f = self.physics.flux_interior(&row);
                let w = geom.detj_w[q];
                for b in 0..nb {
                    let gx = geom.grad_x[(q, b)];
                    let gy = geom.grad_y[(q, b)];
                    for s in 0..ns {
                        r_e[(b, s)] += (gx * f[s][0] + gy * f[s][1]) * w;
                    }
                }
            }

            if self.switches.diff_flux {
                let dudx_row: StateVec = (0..ns).map(|s| dudx_q[(q, s)]).collect();
                let dudy_row: StateVec = (0..ns).map(|s| dudy_q[(q, s)]).collect();
                let fv = self.physics.diffusive_flux(&row, &dudx_row, &dudy_row)?;
                let w = geom.detj_w[q];
                for b in 0..nb {
                    let gx = geom.grad_x[(q, b)];
                    let gy = geom.grad_y[(q, b)];
                    for s in 0..ns {
                        r_e[(b, s)] -= (gx * fv[s][0] + gy * fv[s][1]) * w;
                    }
                }
            }

            if include_source && self.switches.source && !self.sources.is_empty() {
                let w = geom.detj_w[q];
                let mut s_total = StateVec::from_elem(ns, 0.0);
                for kind in &self.sources {
                    let s_q = self.physics.source(*kind, &row, geom.x_q[q], t);
                    for s in 0..ns {
                        s_total[s] += s_q[s];
                    }
                }
                for b in 0..nb {
                    let phi_b = geom.phi[(q, b)];
                    if phi_b == 0.0 {
                        continue;
                    }
                    for s in 0..ns {
                        r_e[(b, s)] += phi_b * s_total[s] * w;
                    }
                }
            }
        }
        Ok(r_e)
    }

    fn face_flux(&self, fg: &InteriorFaceGeom, ns: usize, u_l_e: &DMatrix<f64>, u_r_e: &DMatrix<f64>) -> Result<DMatrix<f64>, SolverError> {
        let nq = fg.phi_l.nrows();
        let u_l_q = &fg.phi_l * u_l_e;
        let u_r_q = &fg.phi_r * u_r_e;
        let dudx_l_q = &fg.grad_x_l * u_l_e;
        let dudy_l_q = &fg.grad_y_l * u_l_e;
        let dudx_r_q = &fg.grad_x_r * u_r_e;
        let dudy_r_q = &fg.grad_y_r * u_r_e;
        let mut out = DMatrix::zeros(nq, ns);
        for q in 0..nq {
            let ul: StateVec = (0..ns).map(|s| u_l_q[(q, s)]).collect();
            let ur: StateVec = (0..ns).map(|s| u_r_q[(q, s)]).collect();
            let scale = fg.jac_mag[q] * fg.weights[q];

            if self.switches.conv_flux {
                let fstar = numerical_flux::numerical_flux(self.conv_flux_kind, &self.physics, &ul, &ur, fg.normal[q])?;
                for s in 0..ns {
                    out[(q, s)] += fstar[s] * scale;
                }
            }

            if self.switches.diff_flux {
                let grad_l = ((0..ns).map(|s| dudx_l_q[(q, s)]).collect(), (0..ns).map(|s| dudy_l_q[(q, s)]).collect());
                let grad_r = ((0..ns).map(|s| dudx_r_q[(q, s)]).collect(), (0..ns).map(|s| dudy_r_q[(q, s)]).collect());
                let penalty = self.sip_penalty / fg.jac_mag[q];
                if let Physics::NavierStokes(p) = self.physics {
                    let (gl0, gl1): (StateVec, StateVec) = grad_l;
                    let (gr0, gr1): (StateVec, StateVec) = grad_r;
                    let fstar = navier_stokes::sip_numerical_flux(p, &ul, (&gl0, &gl1), &ur, (&gr0, &gr1), fg.normal[q], penalty)?;
                    for s in 0..ns {
                        out[(q, s)] -= fstar[s] * scale;
                    }
                }
            }
        }
        Ok(out)
    }

    fn boundary_face_flux(&self, fg: &BoundaryFaceGeom, ns: usize, u_e: &DMatrix<f64>, bc: BcKind) -> Result<DMatrix<f64>, SolverError> {
        let nq = fg.phi.nrows();
        let u_q = &fg.phi * u_e;
        let dudx_q = &fg.grad_x * u_e;
        let dudy_q = &fg.grad_y * u_e;
        let mut out = DMatrix::zeros(nq, ns);
        for q in 0..nq {
            let ui: StateVec = (0..ns).map(|s| u_q[(q, s)]).collect();
            let ur = self.physics.boundary_state(bc, &ui, fg.normal[q]);
            let scale = fg.jac_mag[q] * fg.weights[q];
            if self.switches.conv_flux {
                let fstar = numerical_flux::numerical_flux(self.conv_flux_kind, &self.physics, &ui, &ur, fg.normal[q])?;
                for s in 0..ns {
                    out[(q, s)] += fstar[s] * scale;
                }
            }

            if self.switches.diff_flux {
                let grad_i: (StateVec, StateVec) = ((0..ns).map(|s| dudx_q[(q, s)]).collect(), (0..ns).map(|s| dudy_q[(q, s)]).collect());
                let penalty = self.sip_penalty / fg.jac_mag[q];
                if let Physics::NavierStokes(p) = self.physics {
                    let fstar = navier_stokes::sip_numerical_flux(p, &ui, (&grad_i.0, &grad_i.1), &ur, (&grad_i.0, &grad_i.1), fg.normal[q], penalty)?;
                    for s in 0..ns {
                        out[(q, s)] -= fstar[s] * scale;
                    }
                }
            }
        }
        Ok(out)
    }
}

fn check_physical(physics: &Physics, u: &StateVec, elem_id: usize, quad_point: usize, x: Point) -> Result<(), NotPhysical> {
    if u.iter().any(|v| v.is_nan()) {
        return Err(NotPhysical { elem_id, quad_point, x, reason: "NaN state".into() });
    }
    if let Some(rho) = physics.compute_scalar("density", u) {
        if rho <= 0.0 {
            return Err(NotPhysical { elem_id, quad_point, x, reason: format!("non-positive density {rho}") });
        }
    }
    if let Some(p) = physics.compute_scalar("pressure", u) {
        if p <= 0.0 {
            return Err(NotPhysical { elem_id, quad_point, x, reason: format!("non-positive pressure {p}") });
        }
    }
    Ok(())
}
