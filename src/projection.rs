//! Initial-condition and restart projection onto the trial space
//! (`spec.md` §4.9): either an L2 projection of the pointwise IC onto the
//! basis, or direct nodal interpolation when the basis is a Lagrange nodal
//! basis (cheaper, but only well defined for nodal bases).

use nalgebra::DMatrix;

use crate::basis::Basis;
use crate::error::ConfigError;
use crate::geometry::{physical_points, project_quadrature_values, ElemGeom};
use crate::mesh::{Element, Mesh};
use crate::physics::{IcKind, Physics};

/// Builds the coefficient matrix (`nb x ns`) for `elem`'s initial state.
///
/// `l2` selects the method (`spec.md` line 119's `L2InitialCondition`
/// switch): `true` projects the pointwise IC by L2 onto the basis using
/// `geom`'s volume quadrature; `false` interpolates at the basis's nodes,
/// which requires a nodal (Lagrange) basis.
pub fn project_initial_condition(
    physics: &Physics,
    ic: IcKind,
    mesh: &Mesh,
    elem: &Element,
    geom: &ElemGeom,
    basis: &Basis,
    l2: bool,
    t0: f64,
) -> Result<DMatrix<f64>, ConfigError> {
    if l2 {
        l2_project(physics, ic, geom, t0)
    } else {
        nodal_interpolate(physics, ic, mesh, elem, basis, t0)
    }
}

fn l2_project(physics: &Physics, ic: IcKind, geom: &ElemGeom, t0: f64) -> Result<DMatrix<f64>, ConfigError> {
    let ns = physics.num_state_vars();
    let nq = geom.quad.num_points();
    let mut u_q = DMatrix::zeros(nq, ns);
    for q in 0..nq {
        let row = physics
            .initial_state(ic, geom.x_q[q], t0)
            .map_err(ConfigError::InitialConditionEvaluation)?;
        for s in 0..ns {
            u_q[(q, s)] = row[s];
        }
    }
    Ok(project_quadrature_values(geom, &u_q))
}

fn nodal_interpolate(
    physics: &Physics,
    ic: IcKind,
    mesh: &Mesh,
    elem: &Element,
    basis: &Basis,
    t0: f64,
) -> Result<DMatrix<f64>, ConfigError> {
    let nodes = basis.nodes().ok_or(ConfigError::NodalInterpolationNeedsLagrangeBasis)?;
    let x_nodes = physical_points(mesh, elem, &nodes);
    let ns = physics.num_state_vars();
    let nb = x_nodes.len();
    let mut u_e = DMatrix::zeros(nb, ns);
    for i in 0..nb {
        let row = physics
            .initial_state(ic, x_nodes[i], t0)
            .map_err(ConfigError::InitialConditionEvaluation)?;
        for s in 0..ns {
            u_e[(i, s)] = row[s];
        }
    }
    Ok(u_e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BasisKind, Node1dKind};
    use crate::mesh::{generate, BuiltinMeshSpec};
    use crate::physics::scalar::ScalarKind;
    use crate::quadrature::QuadratureKind;
    use crate::shape::ShapeKind;
    use crate::spatial::Dim;
    use approx::assert_relative_eq;

    fn unit_mesh() -> Mesh {
        generate(&BuiltinMeshSpec {
            shape: ShapeKind::Quad,
            num_elems_x: 1,
            num_elems_y: Some(1),
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 1.0,
            periodic_x: false,
            periodic_y: false,
        })
        .unwrap()
    }

    #[test]
    fn l2_and_nodal_projection_agree_on_a_constant_field() {
        let mesh = unit_mesh();
        let elem = &mesh.elements[0];
        let physics = Physics::Scalar { dim: Dim::Two, kind: ScalarKind::ConstAdv2D { cx: 1.0, cy: 0.0 } };
        let basis = Basis::new(ShapeKind::Quad, 2, BasisKind::Lagrange, Node1dKind::GaussLobatto).unwrap();
        let geom = ElemGeom::build(&mesh, elem, &basis, QuadratureKind::GaussLegendre, None).unwrap();
        let ic = IcKind::Scalar(crate::physics::scalar::ScalarIcKind::Uniform { value: 3.0 });

        let l2 = project_initial_condition(&physics, ic, &mesh, elem, &geom, &basis, true, 0.0).unwrap();
        let nodal = project_initial_condition(&physics, ic, &mesh, elem, &geom, &basis, false, 0.0).unwrap();
        for i in 0..l2.nrows() {
            assert_relative_eq!(l2[(i, 0)], 3.0, epsilon = 1e-8);
            assert_relative_eq!(nodal[(i, 0)], 3.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn nodal_interpolation_rejects_a_modal_basis() {
        let mesh = unit_mesh();
        let elem = &mesh.elements[0];
        let physics = Physics::Scalar { dim: Dim::Two, kind: ScalarKind::ConstAdv2D { cx: 1.0, cy: 0.0 } };
        let basis = Basis::new(ShapeKind::Quad, 2, BasisKind::Legendre, Node1dKind::GaussLobatto).unwrap();
        let geom = ElemGeom::build(&mesh, elem, &basis, QuadratureKind::GaussLegendre, None).unwrap();
        let ic = IcKind::Scalar(crate::physics::scalar::ScalarIcKind::Uniform { value: 3.0 });

        assert!(project_initial_condition(&physics, ic, &mesh, elem, &geom, &basis, false, 0.0).is_err());
    }
}
