//! Error kinds recognized by the solver core.
//!
//! One enum per kind named in the specification (`ConfigError`, `MeshError`,
//! `NotPhysical`, `NumericError`, `Unsupported`), folded under [`SolverError`]
//! for the driver's top-level `Result`.

use thiserror::Error;

use crate::spatial::Point;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown configuration key `{section}.{key}`")]
    UnknownKey { section: &'static str, key: String },
    #[error("`TimeStepping` must specify exactly one of NumTimeSteps, TimeStepSize, or CFL (found {found})")]
    AmbiguousTimeStepSpec { found: usize },
    #[error("InterpolateFlux=true requires colocated quadrature (ColocatedPoints=true and Lobatto nodes)")]
    InterpolateFluxNeedsColocation,
    #[error("ColocatedPoints=true requires Gauss-Lobatto nodes")]
    ColocationNeedsLobatto,
    #[error("unsupported combination of Physics={physics} and SolutionBasis={basis}")]
    UnsupportedPhysicsBasis { physics: String, basis: String },
    #[error("boundary `{0}` is referenced by the mesh but has no BoundaryConditions entry")]
    MissingBoundaryCondition(String),
    #[error("SourceTreatment=Implicit is only valid with TimeStepper=ADER")]
    ImplicitSourceNeedsAder,
    #[error("L2InitialCondition=false requires a Lagrange (nodal) basis")]
    NodalInterpolationNeedsLagrangeBasis,
    #[error("failed to evaluate initial condition: {0}")]
    InitialConditionEvaluation(#[from] NumericError),
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("boundary name `{0}` is declared more than once")]
    DuplicateBoundaryName(String),
    #[error("face of element {elem} is not matched by any interior or boundary face (dangling face)")]
    DanglingFace { elem: usize },
    #[error("mesh is not watertight: {0}")]
    NotWatertight(String),
    #[error(
        "periodic face pairing between element {elem_l} face {face_l} and element {elem_r} face {face_r} is inconsistent: left maps to {left_pt:?}, right maps to {right_pt:?}"
    )]
    InconsistentPeriodicFace {
        elem_l: usize,
        face_l: usize,
        elem_r: usize,
        face_r: usize,
        left_pt: Point,
        right_pt: Point,
    },
    #[error("element {0} does not exist")]
    NoSuchElement(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("non-physical state in element {elem_id} at quadrature point {quad_point} (x = {x:?}): {reason}")]
pub struct NotPhysical {
    pub elem_id: usize,
    pub quad_point: usize,
    pub x: Point,
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("mass matrix of element {0} is singular; Cholesky factorization failed")]
    SingularMassMatrix(usize),
    #[error("Roe Riemann solver failed to find a consistent rotation for normal {0:?}")]
    RoeRotationFailure([f64; 2]),
    #[error("root-find for exact Riemann / implicit source did not converge after {iters} iterations (residual {residual:e})")]
    RootFindDidNotConverge { iters: usize, residual: f64 },
    #[error("NaN detected in element {0}")]
    NaNDetected(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Unsupported {
    #[error("basis {basis} is not implemented on shape {shape}")]
    BasisShapeCombo { basis: String, shape: String },
    #[error("physics {0} does not implement a diffusive flux")]
    NoDiffusiveFlux(String),
    #[error("stepper {stepper} does not support SourceTreatment={treatment}")]
    StepperSourceTreatment { stepper: String, treatment: String },
    #[error("3D meshes are not supported")]
    ThreeDimensional,
    #[error("numerical flux {flux} is not implemented for physics {physics}")]
    ConvFluxPhysicsCombo { flux: String, physics: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    NotPhysical(#[from] NotPhysical),
    #[error(transparent)]
    Numeric(#[from] NumericError),
    #[error(transparent)]
    Unsupported(#[from] Unsupported),
}
