//! Time integration schemes (`spec.md` §4.7): Forward Euler, classical RK4,
//! Carpenter-Kennedy low-storage RK4, SSP-RK3, and a predictor-corrector
//! ADER scheme. The limiter, when enabled, runs at the cadence
//! `spec.md` §4.7's open question resolves: per-stage for SSPRK3 (required
//! for its SSP property), per-step otherwise.

use nalgebra::DMatrix;

use crate::error::{NumericError, SolverError};
use crate::geometry::{project_quadrature_values, BoundaryFaceGeom, ElemGeom, InteriorFaceGeom};
use crate::limiter::Limiter;
use crate::mesh::Mesh;
use crate::operator::{Coeffs, Operator};
use crate::physics::StateVec;
use crate::quadrature::{rescale, QuadratureKind, Quadrature};
use crate::shape::ShapeKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeStepper {
    Fe,
    Rk4,
    Lsrk4,
    Ssprk3,
    Ader,
}

impl TimeStepper {
    fn name(&self) -> &'static str {
        match self {
            TimeStepper::Fe => "FE",
            TimeStepper::Rk4 => "RK4",
            TimeStepper::Lsrk4 => "LSRK4",
            TimeStepper::Ssprk3 => "SSPRK3",
            TimeStepper::Ader => "ADER",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceTreatment {
    Explicit,
    Implicit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimiterCadence {
    PerStage,
    PerStep,
}

impl LimiterCadence {
    /// `spec.md` §4.7's resolved open question.
    pub fn for_scheme(scheme: TimeStepper) -> Self {
        match scheme {
            TimeStepper::Ssprk3 => LimiterCadence::PerStage,
            _ => LimiterCadence::PerStep,
        }
    }
}

pub struct Stepper {
    pub scheme: TimeStepper,
    pub source_treatment: SourceTreatment,
    /// Number of Picard sweeps and (minimum) time-quadrature nodes used by
    /// the ADER predictor; ignored by every other scheme. `spec.md` gives no
    /// closed-form node count, so this is driven by the solution order `p`
    /// (predictors of degree `p` converge in `p + 1` sweeps for smooth
    /// problems, the standard ADER-DG result).
    pub ader_order: usize,
}

impl Stepper {
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.source_treatment == SourceTreatment::Implicit && self.scheme != TimeStepper::Ader {
            return Err(crate::error::Unsupported::StepperSourceTreatment {
                stepper: self.scheme.name().into(),
                treatment: "Implicit".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Advances `u` from `t` to `t + dt`.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &self,
        op: &Operator,
        mesh: &Mesh,
        elem_geoms: &[ElemGeom],
        interior_face_geoms: &[InteriorFaceGeom],
        boundary_face_geoms: &[BoundaryFaceGeom],
        limiter: Option<&Limiter>,
        u: &Coeffs,
        t: f64,
        dt: f64,
    ) -> Result<Coeffs, SolverError> {
        let cadence = LimiterCadence::for_scheme(self.scheme);
        let residual = |u: &Coeffs, t: f64| -> Result<Coeffs, SolverError> {
            op.residual(mesh, elem_geoms, interior_face_geoms, boundary_face_geoms, u, t)
        };
        let limit_stage = |mut u: Coeffs| -> Coeffs {
            if cadence == LimiterCadence::PerStage {
                apply_limiter(limiter, op, elem_geoms, &mut u);
            }
            u
        };

        let mut out = match self.scheme {
            TimeStepper::Fe => {
                let r = residual(u, t)?;
                combine(&[(u, 1.0), (&r, dt)])
            }
            TimeStepper::Rk4 => {
                let k1 = residual(u, t)?;
                let u2 = limit_stage(combine(&[(u, 1.0), (&k1, 0.5 * dt)]));
                let k2 = residual(&u2, t + 0.5 * dt)?;
                let u3 = limit_stage(combine(&[(u, 1.0), (&k2, 0.5 * dt)]));
                let k3 = residual(&u3, t + 0.5 * dt)?;
                let u4 = limit_stage(combine(&[(u, 1.0), (&k3, dt)]));
                let k4 = residual(&u4, t + dt)?;
                combine(&[(u, 1.0), (&k1, dt / 6.0), (&k2, dt / 3.0), (&k3, dt / 3.0), (&k4, dt / 6.0)])
            }
            TimeStepper::Lsrk4 => lsrk4_step(&residual, limit_stage, u, t, dt)?,
            TimeStepper::Ssprk3 => {
                let r0 = residual(u, t)?;
                let u1 = limit_stage(combine(&[(u, 1.0), (&r0, dt)]));
                let r1 = residual(&u1, t + dt)?;
                let u2 = limit_stage(combine(&[(u, 0.75), (&u1, 0.25), (&r1, 0.25 * dt)]));
                let r2 = residual(&u2, t + 0.5 * dt)?;
                limit_stage(combine(&[(u, 1.0 / 3.0), (&u2, 2.0 / 3.0), (&r2, 2.0 / 3.0 * dt)]))
            }
            TimeStepper::Ader => self.ader_step(op, mesh, elem_geoms, interior_face_geoms, boundary_face_geoms, u, t, dt)?,
        };

        if cadence == LimiterCadence::PerStep {
            apply_limiter(limiter, op, elem_geoms, &mut out);
        }
        Ok(out)
    }

    /// Element-local predictor (Picard iteration on the convective/source
    /// volume operator alone, no face coupling) followed by a corrector
    /// that assembles the fully face-coupled DG residual at each predictor
    /// time node and integrates it over the slab (`spec.md` §4.7). This is
    /// a reduced form of full space-time-Galerkin ADER-DG: the predictor
    /// uses Picard sweeps over discrete time nodes rather than a space-time
    /// polynomial solved via local mass/stiffness operators; see DESIGN.md.
    #[allow(clippy::too_many_arguments)]
    fn ader_step(
        &self,
        op: &Operator,
        mesh: &Mesh,
        elem_geoms: &[ElemGeom],
        interior_face_geoms: &[InteriorFaceGeom],
        boundary_face_geoms: &[BoundaryFaceGeom],
        u: &Coeffs,
        t: f64,
        dt: f64,
    ) -> Result<Coeffs, SolverError> {
        let order = 2 * self.ader_order + 1;
        let q1d = Quadrature::new(ShapeKind::Segment, order, QuadratureKind::GaussLegendre);
        let xs: Vec<f64> = q1d.points.iter().map(|p| p.x).collect();
        let (scale, nodes) = rescale(&xs, 0.0, dt);
        let weights: Vec<f64> = q1d.weights.iter().map(|w| w * scale).collect();
        let n_nodes = nodes.len();

        // predictor: per-element Picard iteration using only the local
        // (no-face) volume+source operator.
        let mut predictor: Vec<Coeffs> = (0..n_nodes).map(|_| u.clone()).collect();
        for _ in 0..=self.ader_order {
            let mut prev_rate: Coeffs = local_rates(op, mesh, elem_geoms, u, t, self.source_treatment)?;
            let mut prev_t = 0.0;
            for m in 0..n_nodes {
                let node_rate = local_rates(op, mesh, elem_geoms, &predictor[m], t + nodes[m], self.source_treatment)?;
                let dt_seg = nodes[m] - prev_t;
                for e in 0..u.len() {
                    predictor[m][e] = &u[e] + (&prev_rate[e] + &node_rate[e]) * (0.5 * dt_seg);
                }
                if self.source_treatment == SourceTreatment::Implicit {
                    apply_implicit_source(op, elem_geoms, &mut predictor[m], t + nodes[m], dt_seg)?;
                }
                prev_rate = node_rate;
                prev_t = nodes[m];
            }
        }

        // corrector: assemble the fully face-coupled residual at each
        // predictor time node and integrate over the slab.
        let mut out = u.clone();
        for m in 0..n_nodes {
            let r = op.residual(mesh, elem_geoms, interior_face_geoms, boundary_face_geoms, &predictor[m], t + nodes[m])?;
            for e in 0..out.len() {
                out[e] += &r[e] * weights[m];
            }
        }
        Ok(out)
    }
}

fn local_rates(
    op: &Operator,
    mesh: &Mesh,
    elem_geoms: &[ElemGeom],
    u: &Coeffs,
    t: f64,
    treatment: SourceTreatment,
) -> Result<Coeffs, SolverError> {
    let ns = op.physics.num_state_vars();
    let include_source = treatment == SourceTreatment::Explicit;
    mesh.elements
        .iter()
        .zip(elem_geoms)
        .zip(u)
        .map(|((elem, geom), u_e)| op.local_rate(elem.id, geom, u_e, ns, t, include_source))
        .collect()
}

/// Per-element-per-quadrature-point backward-Euler correction for the
/// active source terms, solved with a decoupled Newton iteration per state
/// variable (the stiff scalar-damping scenario this targets has no
/// cross-variable coupling; a fully coupled Jacobian is unneeded here).
fn apply_implicit_source(op: &Operator, elem_geoms: &[ElemGeom], u: &mut Coeffs, t: f64, dt_sub: f64) -> Result<(), SolverError> {
    if dt_sub == 0.0 || op.sources.is_empty() {
        return Ok(());
    }
    let ns = op.physics.num_state_vars();
    for (geom, u_e) in elem_geoms.iter().zip(u.iter_mut()) {
        let u_q = &geom.phi * &*u_e;
        let nq = u_q.nrows();
        let mut u_q_new = u_q.clone();
        for q in 0..nq {
            let base: StateVec = (0..ns).map(|s| u_q[(q, s)]).collect();
            let x = geom.x_q[q];
            let solved = newton_implicit_source(op, &base, x, t, dt_sub)?;
            for s in 0..ns {
                u_q_new[(q, s)] = solved[s];
            }
        }
        *u_e = project_quadrature_values(geom, &u_q_new);
    }
    Ok(())
}

fn newton_implicit_source(op: &Operator, base: &StateVec, x: crate::spatial::Point, t: f64, dt_sub: f64) -> Result<StateVec, SolverError> {
    let ns = base.len();
    let mut q = base.clone();
    let eval_source = |q: &StateVec| -> StateVec {
        let mut total = StateVec::from_elem(ns, 0.0);
        for kind in &op.sources {
            let s = op.physics.source(*kind, q, x, t);
            for i in 0..ns {
                total[i] += s[i];
            }
        }
        total
    };

    for s in 0..ns {
        let f = |val: f64, q: &mut StateVec| -> f64 {
            q[s] = val;
            let stot = eval_source(q)[s];
            val - base[s] - dt_sub * stot
        };
        let mut val = base[s];
        let mut converged = false;
        let mut last_residual = 0.0;
        for _ in 0..50 {
            let mut trial = q.clone();
            let fv = f(val, &mut trial);
            last_residual = fv.abs();
            if last_residual < 1e-12 {
                converged = true;
                break;
            }
            let h = 1e-6 * (1.0 + val.abs());
            let mut trial_h = q.clone();
            let fvh = f(val + h, &mut trial_h);
            let dfv = (fvh - fv) / h;
            if dfv.abs() < 1e-14 {
                break;
            }
            val -= fv / dfv;
        }
        if !converged {
            return Err(NumericError::RootFindDidNotConverge { iters: 50, residual: last_residual }.into());
        }
        q[s] = val;
    }
    Ok(q)
}

fn lsrk4_step(
    residual: &dyn Fn(&Coeffs, f64) -> Result<Coeffs, SolverError>,
    limit_stage: impl Fn(Coeffs) -> Coeffs,
    u: &Coeffs,
    t: f64,
    dt: f64,
) -> Result<Coeffs, SolverError> {
    // Carpenter-Kennedy 5-stage low-storage RK4 (Williamson 2N form).
    const A: [f64; 5] = [
        0.0,
        -567301805773.0 / 1357537059087.0,
        -2404267990393.0 / 2016746695238.0,
        -3550918686646.0 / 2091501179385.0,
        -1275806237668.0 / 842570457699.0,
    ];
    const B: [f64; 5] = [
        1432997174477.0 / 9575080441755.0,
        5161836677717.0 / 13612068292357.0,
        1720146321549.0 / 2090206949498.0,
        3134564353537.0 / 4481467310338.0,
        2277821191437.0 / 14882151754819.0,
    ];
    const C: [f64; 5] = [
        0.0,
        1432997174477.0 / 9575080441755.0,
        2526269341429.0 / 6820363962896.0,
        2006345519317.0 / 3224310063776.0,
        2802321613138.0 / 2924317926251.0,
    ];

    let mut u_cur = u.clone();
    let mut s: Coeffs = u.iter().map(|u_e| DMatrix::zeros(u_e.nrows(), u_e.ncols())).collect();
    for i in 0..5 {
        let r = residual(&u_cur, t + C[i] * dt)?;
        for e in 0..u.len() {
            s[e] = &s[e] * A[i] + &r[e] * dt;
            u_cur[e] = &u_cur[e] + &s[e] * B[i];
        }
        u_cur = limit_stage(u_cur);
    }
    Ok(u_cur)
}

/// `Σ terms.0 * terms.1` as a fresh `Coeffs`, elementwise.
fn combine(terms: &[(&Coeffs, f64)]) -> Coeffs {
    let n = terms[0].0.len();
    (0..n)
        .map(|e| {
            let (first_u, first_w) = terms[0];
            let mut acc = &first_u[e] * first_w;
            for &(u, w) in &terms[1..] {
                acc += &u[e] * w;
            }
            acc
        })
        .collect()
}

fn apply_limiter(limiter: Option<&Limiter>, op: &Operator, elem_geoms: &[ElemGeom], u: &mut Coeffs) {
    if let Some(lim) = limiter {
        for (u_e, geom) in u.iter_mut().zip(elem_geoms) {
            lim.apply(&op.physics, geom, u_e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{generate, BuiltinMeshSpec};
    use crate::numerical_flux::ConvFluxKind;
    use crate::operator::OperatorSwitches;
    use crate::physics::scalar::ScalarKind;
    use crate::physics::Physics;
    use crate::spatial::Dim;
    use approx::assert_relative_eq;

    fn periodic_mesh() -> Mesh {
        generate(&BuiltinMeshSpec {
            shape: ShapeKind::Quad,
            num_elems_x: 4,
            num_elems_y: Some(1),
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 0.25,
            periodic_x: true,
            periodic_y: true,
        })
        .unwrap()
    }

    fn build_geoms(mesh: &Mesh) -> (Vec<ElemGeom>, Vec<InteriorFaceGeom>, Vec<BoundaryFaceGeom>) {
        let basis = crate::basis::Basis::new(ShapeKind::Quad, 1, crate::basis::BasisKind::Lagrange, crate::basis::Node1dKind::GaussLobatto).unwrap();
        let elem_geoms: Vec<_> = mesh
            .elements
            .iter()
            .map(|e| ElemGeom::build(mesh, e, &basis, QuadratureKind::GaussLegendre, None).unwrap())
            .collect();
        let interior: Vec<_> = mesh
            .interior_faces
            .iter()
            .map(|f| InteriorFaceGeom::build(mesh, &mesh.elements[f.elem_l], f.face_l, &mesh.elements[f.elem_r], f.face_r, &basis, QuadratureKind::GaussLegendre, None).unwrap())
            .collect();
        let boundary: Vec<_> = mesh
            .boundary_faces
            .iter()
            .map(|f| BoundaryFaceGeom::build(mesh, &mesh.elements[f.elem], f.face, &basis, QuadratureKind::GaussLegendre, None).unwrap())
            .collect();
        (elem_geoms, interior, boundary)
    }

    #[test]
    fn forward_euler_preserves_a_constant_field_under_pure_advection() {
        let mesh = periodic_mesh();
        let (elem_geoms, interior, boundary) = build_geoms(&mesh);
        let physics = Physics::Scalar { dim: Dim::Two, kind: ScalarKind::ConstAdv2D { cx: 1.0, cy: 0.0 } };
        let op = Operator {
            physics,
            conv_flux_kind: ConvFluxKind::LaxFriedrichs,
            switches: OperatorSwitches { conv_flux: true, source: false, diff_flux: false, interpolate_flux: false },
            boundary_conditions: vec![],
            sources: vec![],
            sip_penalty: 0.0,
        };
        let nb = elem_geoms[0].phi.ncols();
        let u: Coeffs = mesh.elements.iter().map(|_| DMatrix::from_element(nb, 1, 1.0)).collect();
        let stepper = Stepper { scheme: TimeStepper::Fe, source_treatment: SourceTreatment::Explicit, ader_order: 2 };
        let out = stepper.step(&op, &mesh, &elem_geoms, &interior, &boundary, None, &u, 0.0, 1e-3).unwrap();
        for u_e in &out {
            for v in u_e.iter() {
                assert_relative_eq!(*v, 1.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn rk4_also_preserves_a_constant_field() {
        let mesh = periodic_mesh();
        let (elem_geoms, interior, boundary) = build_geoms(&mesh);
        let physics = Physics::Scalar { dim: Dim::Two, kind: ScalarKind::ConstAdv2D { cx: 1.0, cy: 0.3 } };
        let op = Operator {
            physics,
            conv_flux_kind: ConvFluxKind::LaxFriedrichs,
            switches: OperatorSwitches { conv_flux: true, source: false, diff_flux: false, interpolate_flux: false },
            boundary_conditions: vec![],
            sources: vec![],
            sip_penalty: 0.0,
        };
        let nb = elem_geoms[0].phi.ncols();
        let u: Coeffs = mesh.elements.iter().map(|_| DMatrix::from_element(nb, 1, 2.0)).collect();
        let stepper = Stepper { scheme: TimeStepper::Rk4, source_treatment: SourceTreatment::Explicit, ader_order: 2 };
        let out = stepper.step(&op, &mesh, &elem_geoms, &interior, &boundary, None, &u, 0.0, 1e-3).unwrap();
        for u_e in &out {
            for v in u_e.iter() {
                assert_relative_eq!(*v, 2.0, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn validate_rejects_implicit_source_outside_ader() {
        let stepper = Stepper { scheme: TimeStepper::Rk4, source_treatment: SourceTreatment::Implicit, ader_order: 2 };
        assert!(stepper.validate().is_err());
    }
}
