//! Solver configuration (`spec.md` §6): a nested mapping with a fixed set of
//! recognized sections and keys, deserialized into sum-typed structs and
//! validated once at construction rather than consumed as an open key-value
//! registry (`spec.md` §9 "Runtime configuration dictionaries"). Unknown
//! keys are rejected via `#[serde(deny_unknown_fields)]` on every section.

use std::collections::HashMap;

use serde::Deserialize;

use crate::basis::{Basis, BasisKind, Node1dKind};
use crate::error::ConfigError;
use crate::mesh::BuiltinMeshSpec;
use crate::numerical_flux::ConvFluxKind;
use crate::operator::OperatorSwitches;
use crate::physics::euler::{EulerBcKind, EulerIcKind, EulerParams, EulerSourceKind};
use crate::physics::navier_stokes::{ManufacturedParams, NsParams};
use crate::physics::scalar::{ScalarIcKind, ScalarKind, ScalarSourceKind};
use crate::physics::{BcKind, IcKind, Physics, SourceKind};
use crate::quadrature::QuadratureKind;
use crate::shape::ShapeKind;
use crate::spatial::Dim;
use crate::stepper::{SourceTreatment, TimeStepper};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct Config {
    pub time_stepping: TimeSteppingConfig,
    pub numerics: NumericsConfig,
    pub mesh: MeshConfig,
    pub physics: PhysicsConfig,
    pub initial_condition: IcSpec,
    #[serde(default)]
    pub exact_solution: Option<IcSpec>,
    #[serde(default)]
    pub boundary_conditions: HashMap<String, BcSpec>,
    #[serde(default)]
    pub source_terms: HashMap<String, SourceSpec>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub restart: Option<RestartConfig>,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct TimeSteppingConfig {
    #[serde(default)]
    pub initial_time: f64,
    pub final_time: f64,
    #[serde(default)]
    pub num_time_steps: Option<usize>,
    #[serde(default)]
    pub time_step_size: Option<f64>,
    #[serde(default)]
    pub cfl: Option<f64>,
    #[serde(default)]
    pub time_stepper: TimeStepperSpec,
    #[serde(default)]
    pub operator_splitting_exp: Option<TimeStepperSpec>,
    #[serde(default)]
    pub operator_splitting_imp: Option<TimeStepperSpec>,
}

/// `spec.md` §4.7's three ways to specify `Δt`, resolved against mesh/physics
/// data by [`TimeStepPolicy::resolve`] once the mesh and basis exist.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStepPolicy {
    NumSteps(usize),
    FixedDt(f64),
    Cfl(f64),
}

impl TimeSteppingConfig {
    pub fn policy(&self) -> Result<TimeStepPolicy, ConfigError> {
        let found = [self.num_time_steps.is_some(), self.time_step_size.is_some(), self.cfl.is_some()]
            .iter()
            .filter(|b| **b)
            .count();
        if found != 1 {
            return Err(ConfigError::AmbiguousTimeStepSpec { found });
        }
        if let Some(n) = self.num_time_steps {
            Ok(TimeStepPolicy::NumSteps(n))
        } else if let Some(dt) = self.time_step_size {
            Ok(TimeStepPolicy::FixedDt(dt))
        } else {
            Ok(TimeStepPolicy::Cfl(self.cfl.unwrap()))
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum TimeStepperSpec {
    #[default]
    #[serde(rename = "FE")]
    Fe,
    #[serde(rename = "RK4")]
    Rk4,
    #[serde(rename = "LSRK4")]
    Lsrk4,
    #[serde(rename = "SSPRK3")]
    Ssprk3,
    #[serde(rename = "ADER")]
    Ader,
}

impl From<TimeStepperSpec> for TimeStepper {
    fn from(s: TimeStepperSpec) -> Self {
        match s {
            TimeStepperSpec::Fe => TimeStepper::Fe,
            TimeStepperSpec::Rk4 => TimeStepper::Rk4,
            TimeStepperSpec::Lsrk4 => TimeStepper::Lsrk4,
            TimeStepperSpec::Ssprk3 => TimeStepper::Ssprk3,
            TimeStepperSpec::Ader => TimeStepper::Ader,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum SolverKind {
    #[serde(rename = "DG")]
    Dg,
    #[serde(rename = "ADERDG")]
    AderDg,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum SourceTreatmentSpec {
    Explicit,
    Implicit,
}

impl From<SourceTreatmentSpec> for SourceTreatment {
    fn from(s: SourceTreatmentSpec) -> Self {
        match s {
            SourceTreatmentSpec::Explicit => SourceTreatment::Explicit,
            SourceTreatmentSpec::Implicit => SourceTreatment::Implicit,
        }
    }
}

/// `spec.md` §6's combined `SolutionBasis` enumeration: shape and basis kind
/// packed into one config key rather than two, since not every pairing is
/// meaningful (e.g. Legendre is never defined on triangles).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum SolutionBasisSpec {
    LagrangeSeg,
    LagrangeQuad,
    LagrangeTri,
    LegendreSeg,
    LegendreQuad,
    #[serde(rename = "HierarchicH1Tri")]
    HierarchicH1Tri,
}

impl SolutionBasisSpec {
    pub fn shape_and_kind(self) -> (ShapeKind, BasisKind) {
        match self {
            SolutionBasisSpec::LagrangeSeg => (ShapeKind::Segment, BasisKind::Lagrange),
            SolutionBasisSpec::LagrangeQuad => (ShapeKind::Quad, BasisKind::Lagrange),
            SolutionBasisSpec::LagrangeTri => (ShapeKind::Triangle, BasisKind::Lagrange),
            SolutionBasisSpec::LegendreSeg => (ShapeKind::Segment, BasisKind::Legendre),
            SolutionBasisSpec::LegendreQuad => (ShapeKind::Quad, BasisKind::Legendre),
            SolutionBasisSpec::HierarchicH1Tri => (ShapeKind::Triangle, BasisKind::Hierarchical),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum NodeTypeSpec {
    Equidistant,
    #[serde(rename = "GaussLegendre")]
    GaussLegendre,
    #[serde(rename = "GaussLobatto")]
    GaussLobatto,
}

impl From<NodeTypeSpec> for Node1dKind {
    fn from(s: NodeTypeSpec) -> Self {
        match s {
            NodeTypeSpec::Equidistant => Node1dKind::Equidistant,
            NodeTypeSpec::GaussLegendre => Node1dKind::GaussLegendre,
            NodeTypeSpec::GaussLobatto => Node1dKind::GaussLobatto,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum QuadratureSpec {
    #[serde(rename = "GaussLegendre")]
    GaussLegendre,
    #[serde(rename = "GaussLobatto")]
    GaussLobatto,
}

impl From<QuadratureSpec> for QuadratureKind {
    fn from(s: QuadratureSpec) -> Self {
        match s {
            QuadratureSpec::GaussLegendre => QuadratureKind::GaussLegendre,
            QuadratureSpec::GaussLobatto => QuadratureKind::GaussLobatto,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct NumericsConfig {
    pub solution_order: usize,
    pub solution_basis: SolutionBasisSpec,
    #[serde(default = "default_solver")]
    pub solver: SolverKind,
    #[serde(default)]
    pub element_quadrature: Option<QuadratureSpec>,
    #[serde(default)]
    pub face_quadrature: Option<QuadratureSpec>,
    pub node_type: NodeTypeSpec,
    #[serde(default)]
    pub colocated_points: bool,
    #[serde(default)]
    pub interpolate_flux: bool,
    #[serde(default)]
    pub apply_limiters: bool,
    #[serde(default = "default_explicit")]
    pub source_treatment: SourceTreatmentSpec,
    #[serde(default = "default_true")]
    pub conv_flux_switch: bool,
    #[serde(default = "default_true")]
    pub source_switch: bool,
    #[serde(default)]
    pub l2_initial_condition: bool,
    #[serde(default)]
    pub diff_flux_switch: bool,
    #[serde(default)]
    pub diff_flux_numerical: Option<DiffFluxSpec>,
}

fn default_solver() -> SolverKind {
    SolverKind::Dg
}

fn default_explicit() -> SourceTreatmentSpec {
    SourceTreatmentSpec::Explicit
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum DiffFluxSpec {
    #[serde(rename = "SIP")]
    Sip,
}

impl NumericsConfig {
    /// Resolves the basis/quadrature-kind/colocation trio, enforcing
    /// `spec.md` §4.5's `InterpolateFlux`/`ColocatedPoints` invariants.
    pub fn resolve_basis(&self) -> Result<(Basis, QuadratureKind, QuadratureKind, Option<usize>), ConfigError> {
        let (shape, basis_kind) = self.solution_basis.shape_and_kind();
        let node_kind: Node1dKind = self.node_type.into();

        if self.colocated_points && node_kind != Node1dKind::GaussLobatto {
            return Err(ConfigError::ColocationNeedsLobatto);
        }
        if self.interpolate_flux && !self.colocated_points {
            return Err(ConfigError::InterpolateFluxNeedsColocation);
        }

        let basis = Basis::new(shape, self.solution_order, basis_kind, node_kind)
            .map_err(|e| ConfigError::UnsupportedPhysicsBasis { physics: "n/a".into(), basis: format!("{e}") })?;

        let default_quad = if node_kind == Node1dKind::GaussLobatto {
            QuadratureKind::GaussLobatto
        } else {
            QuadratureKind::GaussLegendre
        };
        let element_quad = self.element_quadrature.map(Into::into).unwrap_or(default_quad);
        let face_quad = self.face_quadrature.map(Into::into).unwrap_or(default_quad);
        let forced_npts = self.colocated_points.then_some(self.solution_order + 1);

        Ok((basis, element_quad, face_quad, forced_npts))
    }

    pub fn switches(&self) -> OperatorSwitches {
        OperatorSwitches {
            conv_flux: self.conv_flux_switch,
            source: self.source_switch,
            diff_flux: self.diff_flux_switch,
            interpolate_flux: self.interpolate_flux,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct MeshConfig {
    #[serde(default)]
    pub element_shape: Option<ElementShapeSpec>,
    #[serde(default)]
    pub num_elems_x: Option<usize>,
    #[serde(default)]
    pub num_elems_y: Option<usize>,
    #[serde(default)]
    pub xmin: f64,
    #[serde(default)]
    pub xmax: f64,
    #[serde(default)]
    pub ymin: f64,
    #[serde(default)]
    pub ymax: f64,
    #[serde(default)]
    pub periodic_boundaries_x: bool,
    #[serde(default)]
    pub periodic_boundaries_y: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum ElementShapeSpec {
    Segment,
    Quadrilateral,
    Triangle,
}

impl MeshConfig {
    /// Builds the structured mesh spec. `File`-based meshes are not part of
    /// this core (`spec.md` §6 leaves external mesh I/O to the driver);
    /// only the built-in generator is wired here.
    pub fn builtin_spec(&self) -> Result<BuiltinMeshSpec, ConfigError> {
        let shape = match self.element_shape {
            Some(ElementShapeSpec::Segment) => ShapeKind::Segment,
            Some(ElementShapeSpec::Quadrilateral) => ShapeKind::Quad,
            Some(ElementShapeSpec::Triangle) => ShapeKind::Triangle,
            None => return Err(ConfigError::UnknownKey { section: "Mesh", key: "ElementShape".into() }),
        };
        let num_elems_x = self.num_elems_x.ok_or(ConfigError::UnknownKey { section: "Mesh", key: "NumElemsX".into() })?;
        Ok(BuiltinMeshSpec {
            shape,
            num_elems_x,
            num_elems_y: self.num_elems_y,
            xmin: self.xmin,
            xmax: self.xmax,
            ymin: self.ymin,
            ymax: self.ymax,
            periodic_x: self.periodic_boundaries_x,
            periodic_y: self.periodic_boundaries_y,
        })
    }

    pub fn dim(&self) -> Dim {
        match self.element_shape {
            Some(ElementShapeSpec::Segment) => Dim::One,
            _ => Dim::Two,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum ConvFluxSpec {
    LaxFriedrichs,
    Roe,
    #[serde(rename = "HLLC")]
    Hllc,
}

impl From<ConvFluxSpec> for ConvFluxKind {
    fn from(s: ConvFluxSpec) -> Self {
        match s {
            ConvFluxSpec::LaxFriedrichs => ConvFluxKind::LaxFriedrichs,
            ConvFluxSpec::Roe => ConvFluxKind::Roe,
            ConvFluxSpec::Hllc => ConvFluxKind::Hllc,
        }
    }
}

/// Either a single axial speed (1D) or an `(x, y)` pair (2D), matching
/// whichever arity the mesh's `ElementShape` implies.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged, rename_all = "PascalCase")]
pub enum ConstVelocitySpec {
    D1(f64),
    D2 { cx: f64, cy: f64 },
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "Type", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum PhysicsConfig {
    ConstAdvScalar { const_velocity: ConstVelocitySpec, conv_flux_numerical: ConvFluxSpec },
    Burgers { conv_flux_numerical: ConvFluxSpec },
    ModelPSRScalar { t_ad: f64, t_in: f64, t_a: f64, conv_flux_numerical: ConvFluxSpec },
    Euler { gas_constant: f64, specific_heat_ratio: f64, conv_flux_numerical: ConvFluxSpec },
    NavierStokes {
        gas_constant: f64,
        specific_heat_ratio: f64,
        viscosity: f64,
        prandtl_number: f64,
        conv_flux_numerical: ConvFluxSpec,
        #[serde(default = "default_sip_penalty")]
        sip_penalty: f64,
    },
}

fn default_sip_penalty() -> f64 {
    10.0
}

impl PhysicsConfig {
    pub fn conv_flux_kind(&self) -> ConvFluxKind {
        let spec = match self {
            PhysicsConfig::ConstAdvScalar { conv_flux_numerical, .. }
            | PhysicsConfig::Burgers { conv_flux_numerical, .. }
            | PhysicsConfig::ModelPSRScalar { conv_flux_numerical, .. }
            | PhysicsConfig::Euler { conv_flux_numerical, .. }
            | PhysicsConfig::NavierStokes { conv_flux_numerical, .. } => *conv_flux_numerical,
        };
        spec.into()
    }

    pub fn sip_penalty(&self) -> f64 {
        match self {
            PhysicsConfig::NavierStokes { sip_penalty, .. } => *sip_penalty,
            _ => 0.0,
        }
    }

    pub fn build(&self, dim: Dim) -> Result<Physics, ConfigError> {
        match self {
            PhysicsConfig::ConstAdvScalar { const_velocity, .. } => {
                let kind = match (dim, const_velocity) {
                    (Dim::One, ConstVelocitySpec::D1(c)) => ScalarKind::ConstAdv1D { c: *c },
                    (Dim::Two, ConstVelocitySpec::D2 { cx, cy }) => ScalarKind::ConstAdv2D { cx: *cx, cy: *cy },
                    _ => {
                        return Err(ConfigError::UnsupportedPhysicsBasis {
                            physics: "ConstAdvScalar".into(),
                            basis: "ConstVelocity arity does not match mesh dimension".into(),
                        })
                    }
                };
                Ok(Physics::Scalar { dim, kind })
            }
            PhysicsConfig::Burgers { .. } => Ok(Physics::Scalar { dim, kind: ScalarKind::Burgers1D }),
            PhysicsConfig::ModelPSRScalar { t_ad, t_in, t_a, .. } => {
                Ok(Physics::Scalar { dim, kind: ScalarKind::ModelPsr { t_ad: *t_ad, t_in: *t_in, t_a: *t_a } })
            }
            PhysicsConfig::Euler { gas_constant, specific_heat_ratio, .. } => {
                Ok(Physics::Euler(EulerParams { dim, gamma: *specific_heat_ratio, r: *gas_constant }))
            }
            PhysicsConfig::NavierStokes { gas_constant, specific_heat_ratio, viscosity, prandtl_number, .. } => {
                Ok(Physics::NavierStokes(NsParams {
                    euler: EulerParams { dim, gamma: *specific_heat_ratio, r: *gas_constant },
                    mu: *viscosity,
                    pr: *prandtl_number,
                }))
            }
        }
    }
}

/// `spec.md` §6's `InitialCondition`/`ExactSolution`/`SourceTerms.Function`
/// payloads, tagged by `Function` and matched against the built [`Physics`]
/// when converted.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "Function", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum IcSpec {
    Uniform { value: f64 },
    Sine { amplitude: f64, omega: f64 },
    DampingSine { amplitude: f64, omega: f64, nu: f64 },
    ShockBurgers { u_l: f64, u_r: f64, x_shock: f64 },
    Gaussian { amplitude: f64, x0: f64, y0: f64, sigma: f64 },
    Paraboloid,
    RiemannProblem { rho_l: f64, u_l: f64, p_l: f64, rho_r: f64, u_r: f64, p_r: f64, x_interface: f64 },
    MovingShock { mach: f64, x_shock: f64 },
    IsentropicVortex { rho_b: f64, u_b: f64, v_b: f64, p_b: f64, vortex_strength: f64 },
    DensityWave { rho0: f64, amplitude: f64, u: f64, p: f64 },
    SmoothIsentropicFlow { a: f64 },
    Manufactured { rho0: f64, rho1: f64, u0: f64, v0: f64, p0: f64, p1: f64, omega: f64 },
}

impl IcSpec {
    pub fn build(&self, physics: &Physics) -> Result<IcKind, ConfigError> {
        let mismatch = || ConfigError::UnsupportedPhysicsBasis {
            physics: physics.name().into(),
            basis: "InitialCondition.Function does not match Physics.Type".into(),
        };
        match (physics, self) {
            (Physics::Scalar { .. }, IcSpec::Uniform { value }) => Ok(IcKind::Scalar(ScalarIcKind::Uniform { value: *value })),
            (Physics::Scalar { .. }, IcSpec::Sine { amplitude, omega }) => {
                Ok(IcKind::Scalar(ScalarIcKind::Sine { amplitude: *amplitude, omega: *omega }))
            }
            (Physics::Scalar { .. }, IcSpec::DampingSine { amplitude, omega, nu }) => {
                Ok(IcKind::Scalar(ScalarIcKind::DampingSine { amplitude: *amplitude, omega: *omega, nu: *nu }))
            }
            (Physics::Scalar { .. }, IcSpec::ShockBurgers { u_l, u_r, x_shock }) => {
                Ok(IcKind::Scalar(ScalarIcKind::ShockBurgers { u_l: *u_l, u_r: *u_r, x_shock: *x_shock }))
            }
            (Physics::Scalar { .. }, IcSpec::Gaussian { amplitude, x0, y0, sigma }) => {
                Ok(IcKind::Scalar(ScalarIcKind::Gaussian { amplitude: *amplitude, x0: *x0, y0: *y0, sigma: *sigma }))
            }
            (Physics::Scalar { .. }, IcSpec::Paraboloid) => Ok(IcKind::Scalar(ScalarIcKind::Paraboloid)),
            (Physics::Euler(_), IcSpec::RiemannProblem { rho_l, u_l, p_l, rho_r, u_r, p_r, x_interface }) => {
                Ok(IcKind::Euler(EulerIcKind::RiemannProblem {
                    rho_l: *rho_l,
                    u_l: *u_l,
                    p_l: *p_l,
                    rho_r: *rho_r,
                    u_r: *u_r,
                    p_r: *p_r,
                    x_interface: *x_interface,
                }))
            }
            (Physics::Euler(_), IcSpec::MovingShock { mach, x_shock }) => {
                Ok(IcKind::Euler(EulerIcKind::MovingShock { mach: *mach, x_shock: *x_shock }))
            }
            (Physics::Euler(_), IcSpec::IsentropicVortex { rho_b, u_b, v_b, p_b, vortex_strength }) => {
                Ok(IcKind::Euler(EulerIcKind::IsentropicVortex {
                    rho_b: *rho_b,
                    u_b: *u_b,
                    v_b: *v_b,
                    p_b: *p_b,
                    vortex_strength: *vortex_strength,
                }))
            }
            (Physics::Euler(_), IcSpec::DensityWave { rho0, amplitude, u, p }) => {
                Ok(IcKind::Euler(EulerIcKind::DensityWave { rho0: *rho0, amplitude: *amplitude, u: *u, p: *p }))
            }
            (Physics::Euler(_), IcSpec::SmoothIsentropicFlow { a }) => {
                Ok(IcKind::Euler(EulerIcKind::SmoothIsentropicFlow { a: *a }))
            }
            (Physics::NavierStokes(_), IcSpec::Manufactured { rho0, rho1, u0, v0, p0, p1, omega }) => {
                Ok(IcKind::Manufactured(ManufacturedParams {
                    rho0: *rho0,
                    rho1: *rho1,
                    u0: *u0,
                    v0: *v0,
                    p0: *p0,
                    p1: *p1,
                    omega: *omega,
                }))
            }
            _ => Err(mismatch()),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "BCType", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum BcSpec {
    Transmissive,
    SlipWall,
    PressureOutlet { p_back: f64 },
}

impl BcSpec {
    pub fn build(&self, physics: &Physics) -> Result<BcKind, ConfigError> {
        match (physics, self) {
            (_, BcSpec::Transmissive) => Ok(BcKind::Transmissive),
            (Physics::Euler(_) | Physics::NavierStokes(_), BcSpec::SlipWall) => Ok(BcKind::Euler(EulerBcKind::SlipWall)),
            (Physics::Euler(_) | Physics::NavierStokes(_), BcSpec::PressureOutlet { p_back }) => {
                Ok(BcKind::Euler(EulerBcKind::PressureOutlet { p_back: *p_back }))
            }
            _ => Err(ConfigError::UnsupportedPhysicsBasis {
                physics: physics.name().into(),
                basis: "BoundaryConditions.BCType does not apply to this Physics.Type".into(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "Function", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum SourceSpec {
    SimpleSource { nu: f64 },
    ScalarArrhenius { a: f64, t_ad: f64, t_a: f64 },
    ScalarMixing { t_in: f64, tau_mix: f64 },
    StiffFriction { nu: f64 },
    Manufactured { rho0: f64, rho1: f64, u0: f64, v0: f64, p0: f64, p1: f64, omega: f64 },
}

impl SourceSpec {
    pub fn build(&self, physics: &Physics) -> Result<SourceKind, ConfigError> {
        let mismatch = || ConfigError::UnsupportedPhysicsBasis {
            physics: physics.name().into(),
            basis: "SourceTerms.Function does not match Physics.Type".into(),
        };
        match (physics, self) {
            (Physics::Scalar { .. }, SourceSpec::SimpleSource { nu }) => {
                Ok(SourceKind::Scalar(ScalarSourceKind::SimpleSource { nu: *nu }))
            }
            (Physics::Scalar { .. }, SourceSpec::ScalarArrhenius { a, t_ad, t_a }) => {
                Ok(SourceKind::Scalar(ScalarSourceKind::ScalarArrhenius { a: *a, t_ad: *t_ad, t_a: *t_a }))
            }
            (Physics::Scalar { .. }, SourceSpec::ScalarMixing { t_in, tau_mix }) => {
                Ok(SourceKind::Scalar(ScalarSourceKind::ScalarMixing { t_in: *t_in, tau_mix: *tau_mix }))
            }
            (Physics::Euler(_), SourceSpec::StiffFriction { nu }) => {
                Ok(SourceKind::Euler(EulerSourceKind::StiffFriction { nu: *nu }))
            }
            (Physics::NavierStokes(_), SourceSpec::Manufactured { rho0, rho1, u0, v0, p0, p1, omega }) => {
                Ok(SourceKind::Manufactured(ManufacturedParams {
                    rho0: *rho0,
                    rho1: *rho1,
                    u0: *u0,
                    v0: *v0,
                    p0: *p0,
                    p1: *p1,
                    omega: *omega,
                }))
            }
            _ => Err(mismatch()),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "PascalCase")]
pub struct OutputConfig {
    pub prefix: String,
    pub write_interval: i64,
    pub write_initial_solution: bool,
    pub write_final_solution: bool,
    pub auto_post_process: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct RestartConfig {
    pub file: String,
    #[serde(default)]
    pub start_from_file_time: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_of_the_time_step_specs_is_required() {
        let ts = TimeSteppingConfig {
            initial_time: 0.0,
            final_time: 1.0,
            num_time_steps: Some(10),
            time_step_size: Some(0.1),
            cfl: None,
            time_stepper: TimeStepperSpec::Rk4,
            operator_splitting_exp: None,
            operator_splitting_imp: None,
        };
        assert!(ts.policy().is_err());

        let ts_ok = TimeSteppingConfig { time_step_size: None, ..ts };
        assert_eq!(ts_ok.policy().unwrap(), TimeStepPolicy::NumSteps(10));
    }

    #[test]
    fn colocation_requires_lobatto_nodes() {
        let n = NumericsConfig {
            solution_order: 2,
            solution_basis: SolutionBasisSpec::LagrangeQuad,
            solver: SolverKind::Dg,
            element_quadrature: None,
            face_quadrature: None,
            node_type: NodeTypeSpec::Equidistant,
            colocated_points: true,
            interpolate_flux: false,
            apply_limiters: false,
            source_treatment: SourceTreatmentSpec::Explicit,
            conv_flux_switch: true,
            source_switch: true,
            l2_initial_condition: true,
            diff_flux_switch: false,
            diff_flux_numerical: None,
        };
        assert!(matches!(n.resolve_basis(), Err(ConfigError::ColocationNeedsLobatto)));
    }

    #[test]
    fn interpolate_flux_requires_colocation() {
        let n = NumericsConfig {
            solution_order: 2,
            solution_basis: SolutionBasisSpec::LagrangeQuad,
            solver: SolverKind::Dg,
            element_quadrature: None,
            face_quadrature: None,
            node_type: NodeTypeSpec::GaussLobatto,
            colocated_points: false,
            interpolate_flux: true,
            apply_limiters: false,
            source_treatment: SourceTreatmentSpec::Explicit,
            conv_flux_switch: true,
            source_switch: true,
            l2_initial_condition: true,
            diff_flux_switch: false,
            diff_flux_numerical: None,
        };
        assert!(matches!(n.resolve_basis(), Err(ConfigError::InterpolateFluxNeedsColocation)));
    }

    #[test]
    fn const_adv_scalar_builds_against_resolved_mesh_dimension() {
        let physics = PhysicsConfig::ConstAdvScalar {
            const_velocity: ConstVelocitySpec::D2 { cx: 1.0, cy: 2.0 },
            conv_flux_numerical: ConvFluxSpec::LaxFriedrichs,
        };
        let built = physics.build(Dim::Two).unwrap();
        assert!(matches!(built, Physics::Scalar { kind: ScalarKind::ConstAdv2D { cx, cy }, .. } if cx == 1.0 && cy == 2.0));
    }
}
