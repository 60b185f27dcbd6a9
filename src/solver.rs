//! The solver driver (`spec.md` §2 item 10, §6): owns `U` and the cached
//! geometry helpers, resolves configuration into the numerical engine's
//! types, and orchestrates stepping, write intervals, and restart. File I/O
//! itself is an external collaborator (`spec.md` §1's out-of-scope list); the
//! driver only calls [`DriverHooks`] at the points where a caller would want
//! to write a checkpoint or report progress.

use tracing::{info, warn};

use crate::config::{Config, TimeStepPolicy};
use crate::error::{ConfigError, SolverError};
use crate::geometry::{BoundaryFaceGeom, ElemGeom, InteriorFaceGeom};
use crate::limiter::Limiter;
use crate::mesh::Mesh;
use crate::operator::{Coeffs, Operator};
use crate::physics::{IcKind, Physics};
use crate::projection;
use crate::stepper::{Stepper, TimeStepper};

/// Callbacks the driver invokes at points an external caller (CLI, test
/// harness) may want to act on; `spec.md` §1 excludes checkpoint I/O and
/// progress reporting from the core itself.
pub trait DriverHooks {
    /// Called once after the initial condition is projected, and again after
    /// every completed step whose index satisfies `WriteInterval`.
    fn on_write(&mut self, _step: usize, _t: f64, _u: &Coeffs) {}
    /// Called once per completed step, always (independent of `WriteInterval`).
    fn on_step(&mut self, _step: usize, _t: f64, _dt: f64) {}
}

/// A [`DriverHooks`] that does nothing; the default for callers that only
/// want the final state.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHooks;

impl DriverHooks for NullHooks {}

/// Everything needed to resume a run: the time already reached and the
/// coefficient state at that time (`spec.md` §6's persisted-state contract).
/// Reading/writing the binary artifact itself is external; this is the
/// in-memory shape the core hands to/accepts from that layer.
#[derive(Clone, Debug)]
pub struct RestartState {
    pub t: f64,
    pub u: Coeffs,
}

/// Owns the mesh, cached geometry, operator, stepper, and current state for
/// one run. Constructed once from a [`Config`]; `U` is the only field that
/// changes thereafter (`spec.md` §3 "Lifecycle").
pub struct Solver {
    pub mesh: Mesh,
    pub basis: crate::basis::Basis,
    pub elem_geoms: Vec<ElemGeom>,
    pub interior_face_geoms: Vec<InteriorFaceGeom>,
    pub boundary_face_geoms: Vec<BoundaryFaceGeom>,
    pub operator: Operator,
    pub stepper: Stepper,
    pub limiter: Option<Limiter>,
    pub ic: IcKind,
    pub initial_time: f64,
    pub final_time: f64,
    pub policy: TimeStepPolicy,
    pub l2_initial_condition: bool,
    pub t: f64,
    pub u: Coeffs,
}

/// Euler-variant limiters need a pressure floor the configuration has no
/// dedicated key for (`spec.md` §4.8 leaves `p_floor` as an implementation
/// constant, not a tabulated default); a small positive value keeps the
/// bisection well posed without meaningfully constraining physical solutions.
const DEFAULT_PRESSURE_FLOOR: f64 = 1e-6;

impl Solver {
    pub fn from_config(cfg: &Config) -> Result<Self, SolverError> {
        let dim = cfg.mesh.dim();
        let mesh = crate::mesh::generate(&cfg.mesh.builtin_spec()?)?;

        let (basis, element_quad, face_quad, forced_npts) = cfg.numerics.resolve_basis()?;
        let physics = cfg.physics.build(dim)?;

        if cfg.numerics.source_treatment == crate::config::SourceTreatmentSpec::Implicit
            && crate::stepper::TimeStepper::from(cfg.time_stepping.time_stepper) != TimeStepper::Ader
        {
            return Err(ConfigError::ImplicitSourceNeedsAder.into());
        }

        let elem_geoms: Vec<ElemGeom> = mesh
            .elements
            .iter()
            .map(|e| ElemGeom::build(&mesh, e, &basis, element_quad, forced_npts))
            .collect::<Result<_, _>>()?;

        let interior_face_geoms: Vec<InteriorFaceGeom> = mesh
            .interior_faces
            .iter()
            .map(|f| {
                InteriorFaceGeom::build(
                    &mesh,
                    &mesh.elements[f.elem_l],
                    f.face_l,
                    &mesh.elements[f.elem_r],
                    f.face_r,
                    &basis,
                    face_quad,
                    forced_npts,
                )
            })
            .collect::<Result<_, _>>()?;

        let boundary_conditions = mesh
            .boundary_names
            .iter()
            .map(|name| {
                cfg.boundary_conditions
                    .get(name)
                    .ok_or_else(|| ConfigError::MissingBoundaryCondition(name.clone()))
                    .and_then(|spec| spec.build(&physics))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let boundary_face_geoms: Vec<BoundaryFaceGeom> = mesh
            .boundary_faces
            .iter()
            .map(|f| BoundaryFaceGeom::build(&mesh, &mesh.elements[f.elem], f.face, &basis, face_quad, forced_npts))
            .collect::<Result<_, _>>()?;

        let sources = cfg.source_terms.values().map(|spec| spec.build(&physics)).collect::<Result<Vec<_>, _>>()?;

        let operator = Operator {
            physics,
            conv_flux_kind: cfg.physics.conv_flux_kind(),
            switches: cfg.numerics.switches(),
            boundary_conditions,
            sources,
            sip_penalty: cfg.physics.sip_penalty(),
        };

        let stepper = Stepper {
            scheme: cfg.time_stepping.time_stepper.into(),
            source_treatment: cfg.numerics.source_treatment.into(),
            ader_order: cfg.numerics.solution_order + 1,
        };
        stepper.validate()?;

        let limiter = cfg.numerics.apply_limiters.then(|| match physics {
            Physics::Scalar { .. } => Limiter::Scalar,
            Physics::Euler(_) | Physics::NavierStokes(_) => Limiter::Euler { p_floor: DEFAULT_PRESSURE_FLOOR },
        });

        let ic = cfg.initial_condition.build(&physics)?;
        let t0 = cfg.time_stepping.initial_time;
        let u: Coeffs = mesh
            .elements
            .iter()
            .zip(&elem_geoms)
            .map(|(elem, geom)| {
                projection::project_initial_condition(&physics, ic, &mesh, elem, geom, &basis, cfg.numerics.l2_initial_condition, t0)
            })
            .collect::<Result<_, ConfigError>>()?;

        let policy = cfg.time_stepping.policy()?;

        Ok(Self {
            mesh,
            basis,
            elem_geoms,
            interior_face_geoms,
            boundary_face_geoms,
            operator,
            stepper,
            limiter,
            ic,
            initial_time: t0,
            final_time: cfg.time_stepping.final_time,
            policy,
            l2_initial_condition: cfg.numerics.l2_initial_condition,
            t: t0,
            u,
        })
    }

    /// Replaces the current state from a restart artifact. If `restart.t`
    /// does not match the basis the restart was written with, the caller is
    /// expected to have already re-projected `u` onto this solver's basis
    /// (`spec.md` §6: "Restart may change the basis/order by L2-projecting
    /// the read U onto the new basis; this is the only allowed shape
    /// change.") — that re-projection needs the *old* basis, which this
    /// solver does not retain, so it is the restart reader's job, not this
    /// method's.
    pub fn apply_restart(&mut self, restart: RestartState, start_from_file_time: bool) {
        self.u = restart.u;
        if start_from_file_time {
            self.t = restart.t;
        }
    }

    /// Characteristic element length: the `d`-th root of the element's
    /// physical volume (area in 2D, length in 1D), minimized over all
    /// elements (`spec.md` §4.7's `h_min`).
    fn h_min(&self) -> f64 {
        let d = self.mesh.dim.as_usize() as f64;
        self.elem_geoms
            .iter()
            .map(|g| g.detj_w.iter().sum::<f64>().powf(1.0 / d))
            .fold(f64::INFINITY, f64::min)
    }

    /// Maximum wave speed over the current state, sampled at every element's
    /// volume quadrature points (`spec.md` §4.7's `λ_max`).
    fn max_wave_speed(&self) -> f64 {
        let ns = self.operator.physics.num_state_vars();
        self.elem_geoms
            .iter()
            .zip(&self.u)
            .flat_map(|(geom, u_e)| {
                let u_q = &geom.phi * u_e;
                (0..u_q.nrows())
                    .map(move |q| {
                        let row: crate::physics::StateVec = (0..ns).map(|s| u_q[(q, s)]).collect();
                        self.operator.physics.max_wave_speed(&row)
                    })
                    .collect::<Vec<_>>()
            })
            .fold(0.0_f64, f64::max)
    }

    /// Resolves `Δt` against the current state, per `spec.md` §4.7: a fixed
    /// step size, or `CFL · h_min / (λ_max · (2p+1))`.
    fn resolve_dt(&self) -> f64 {
        match self.policy {
            TimeStepPolicy::NumSteps(n) => (self.final_time - self.initial_time) / n as f64,
            TimeStepPolicy::FixedDt(dt) => dt,
            TimeStepPolicy::Cfl(cfl) => {
                let p = self.basis.order() as f64;
                let lambda_max = self.max_wave_speed().max(1e-14);
                cfl * self.h_min() / (lambda_max * (2.0 * p + 1.0))
            }
        }
    }

    /// Runs from `self.t` to `self.final_time`, calling `hooks` at the
    /// requested write interval (`spec.md` §6's `Output.WriteInterval`) and
    /// after every step. Returns the final coefficient state.
    ///
    /// On a [`SolverError::NotPhysical`], the last good state (`self.u`
    /// before the failing step) is left in place and the error is returned,
    /// matching `spec.md` §7's propagation policy: numerical errors during a
    /// step are fatal unless a limiter can recover, and the driver is
    /// expected to have the last good state available to persist.
    pub fn run(&mut self, write_interval: i64, hooks: &mut dyn DriverHooks) -> Result<(), SolverError> {
        if write_interval > 0 {
            hooks.on_write(0, self.t, &self.u);
        }

        let mut step = 0usize;
        while self.t < self.final_time - 1e-13 {
            let mut dt = self.resolve_dt();
            if self.t + dt > self.final_time {
                dt = self.final_time - self.t;
            }

            let result = self.stepper.step(
                &self.operator,
                &self.mesh,
                &self.elem_geoms,
                &self.interior_face_geoms,
                &self.boundary_face_geoms,
                self.limiter.as_ref(),
                &self.u,
                self.t,
                dt,
            );

            let next = match result {
                Ok(next) => next,
                Err(e) => {
                    if let SolverError::NotPhysical(ref np) = e {
                        warn!(%np, "non-physical state; stopping at last good state");
                    }
                    return Err(e);
                }
            };

            self.u = next;
            self.t += dt;
            step += 1;

            hooks.on_step(step, self.t, dt);
            if write_interval > 0 && step % write_interval as usize == 0 {
                hooks.on_write(step, self.t, &self.u);
            }
        }

        info!(t = self.t, steps = step, "run complete");
        Ok(())
    }

    /// Advances exactly one step of size `dt` (for callers driving their own
    /// loop, e.g. tests that need intermediate state).
    pub fn step(&mut self, dt: f64) -> Result<(), SolverError> {
        let next = self.stepper.step(
            &self.operator,
            &self.mesh,
            &self.elem_geoms,
            &self.interior_face_geoms,
            &self.boundary_face_geoms,
            self.limiter.as_ref(),
            &self.u,
            self.t,
            dt,
        )?;
        self.u = next;
        self.t += dt;
        Ok(())
    }
}

/// Total conserved quantity per state variable, `Σ_e ∫ U dx`, used by
/// conservation tests (`spec.md` §8 property 4).
pub fn total_conserved(elem_geoms: &[ElemGeom], u: &Coeffs) -> Vec<f64> {
    let ns = u.first().map(|u_e| u_e.ncols()).unwrap_or(0);
    let mut totals = vec![0.0; ns];
    for (geom, u_e) in elem_geoms.iter().zip(u) {
        let u_q = &geom.phi * u_e;
        for q in 0..u_q.nrows() {
            let w = geom.detj_w[q];
            for s in 0..ns {
                totals[s] += u_q[(q, s)] * w;
            }
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINE_ADVECTION_CONFIG: &str = r#"
    {
        "TimeStepping": { "FinalTime": 0.01, "NumTimeSteps": 4, "TimeStepper": "RK4" },
        "Numerics": {
            "SolutionOrder": 2,
            "SolutionBasis": "LagrangeQuad",
            "NodeType": "GaussLobatto",
            "L2InitialCondition": true
        },
        "Mesh": {
            "ElementShape": "Quadrilateral",
            "NumElemsX": 4,
            "NumElemsY": 1,
            "xmin": -1.0, "xmax": 1.0, "ymin": 0.0, "ymax": 0.25,
            "PeriodicBoundariesX": true,
            "PeriodicBoundariesY": true
        },
        "Physics": { "Type": "ConstAdvScalar", "ConstVelocity": { "Cx": 1.0, "Cy": 0.0 }, "ConvFluxNumerical": "LaxFriedrichs" },
        "InitialCondition": { "Function": "Sine", "Amplitude": 1.0, "Omega": 6.283185307179586 }
    }
    "#;

    #[test]
    fn solver_builds_from_config_and_runs_a_few_steps_without_crashing() {
        let cfg = Config::from_json(SINE_ADVECTION_CONFIG).unwrap();
        let mut solver = Solver::from_config(&cfg).unwrap();
        let mut hooks = NullHooks;
        solver.run(0, &mut hooks).unwrap();
        assert!(solver.t > 0.0099);
    }

    #[test]
    fn constant_field_is_conserved_under_one_step_of_periodic_advection() {
        let cfg = Config::from_json(SINE_ADVECTION_CONFIG).unwrap();
        let mut solver = Solver::from_config(&cfg).unwrap();
        for u_e in solver.u.iter_mut() {
            u_e.fill(2.0);
        }
        let before = total_conserved(&solver.elem_geoms, &solver.u);
        solver.step(1e-4).unwrap();
        let after = total_conserved(&solver.elem_geoms, &solver.u);
        for (b, a) in before.iter().zip(&after) {
            assert!((b - a).abs() < 1e-8, "before={b} after={a}");
        }
    }

    #[test]
    fn missing_boundary_condition_is_rejected_for_a_non_periodic_mesh() {
        let text = r#"
        {
            "TimeStepping": { "FinalTime": 1.0, "NumTimeSteps": 10, "TimeStepper": "FE" },
            "Numerics": { "SolutionOrder": 1, "SolutionBasis": "LagrangeSeg", "NodeType": "GaussLobatto", "L2InitialCondition": true },
            "Mesh": { "ElementShape": "Segment", "NumElemsX": 4, "xmin": 0.0, "xmax": 1.0 },
            "Physics": { "Type": "ConstAdvScalar", "ConstVelocity": 1.0, "ConvFluxNumerical": "LaxFriedrichs" },
            "InitialCondition": { "Function": "Uniform", "Value": 1.0 }
        }
        "#;
        let cfg = Config::from_json(text).unwrap();
        assert!(matches!(Solver::from_config(&cfg), Err(SolverError::Config(ConfigError::MissingBoundaryCondition(_)))));
    }
}
