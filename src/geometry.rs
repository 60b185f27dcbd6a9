//! Per-element and per-face geometric caches (`spec.md` §4.4): Jacobians,
//! physical quadrature-point coordinates, face normals, and the basis
//! evaluations/mass matrices built once at solver construction and retained
//! for the life of the run (`spec.md` §5 "Resource policy").

use nalgebra::{linalg::Cholesky, DMatrix, Matrix2};

use crate::basis::Basis;
use crate::error::NumericError;
use crate::mesh::{Element, Mesh};
use crate::quadrature::{Quadrature, QuadratureKind};
use crate::shape::ShapeKind;
use crate::spatial::{Dim, Point};

/// Order-1 (affine) geometry mapping basis, shared by every element of a
/// given shape; curved (`gorder > 1`) elements are a Non-goal (`spec.md` §1).
fn geometry_basis(shape: ShapeKind) -> Basis {
    Basis::new(shape, 1, crate::basis::BasisKind::Lagrange, crate::basis::Node1dKind::Equidistant)
        .expect("order-1 Lagrange is supported on every shape")
}

/// Physical coordinates and per-point Jacobians of `elem` at reference
/// points `pts`, via its order-1 geometry mapping.
fn physical_map(mesh: &Mesh, elem: &Element, pts: &[Point]) -> (Vec<Point>, Vec<Matrix2<f64>>) {
    let geom = geometry_basis(mesh.shape);
    let phi_g = geom.values(pts);
    let (dgx, dgy) = geom.ref_grads(pts);
    let nn = elem.node_ids.len();
    let xs: Vec<f64> = elem.node_ids.iter().map(|&n| mesh.nodes[n].x).collect();
    let ys: Vec<f64> = elem.node_ids.iter().map(|&n| mesh.nodes[n].y).collect();

    let mut x_phys = Vec::with_capacity(pts.len());
    let mut jac = Vec::with_capacity(pts.len());
    for q in 0..pts.len() {
        let mut x = 0.0;
        let mut y = 0.0;
        let (mut dxdxi, mut dxdeta, mut dydxi, mut dydeta) = (0.0, 0.0, 0.0, 0.0);
        for n in 0..nn {
            x += phi_g[(q, n)] * xs[n];
            y += phi_g[(q, n)] * ys[n];
            dxdxi += xs[n] * dgx[(q, n)];
            dxdeta += xs[n] * dgy[(q, n)];
            dydxi += ys[n] * dgx[(q, n)];
            dydeta += ys[n] * dgy[(q, n)];
        }
        x_phys.push(Point::new(x, y));
        jac.push(match mesh.dim {
            Dim::One => Matrix2::new(dxdxi, 0.0, 0.0, 1.0),
            Dim::Two => Matrix2::new(dxdxi, dxdeta, dydxi, dydeta),
        });
    }
    (x_phys, jac)
}

/// Cached per-element geometry and trial-space evaluations at the element's
/// volume quadrature points.
pub struct ElemGeom {
    pub quad: Quadrature,
    pub phi: DMatrix<f64>,
    pub grad_x: DMatrix<f64>,
    pub grad_y: DMatrix<f64>,
    pub detj_w: Vec<f64>,
    pub jinv: Vec<Matrix2<f64>>,
    pub x_q: Vec<Point>,
    pub mass: DMatrix<f64>,
    pub mass_inv: DMatrix<f64>,
}

/// Volume quadrature order per `spec.md` §4.3: exact to degree `2p + gorder*d`.
fn volume_quad_order(mesh_dim: usize, p: usize) -> usize {
    2 * p + mesh_dim
}

impl ElemGeom {
    pub fn build(
        mesh: &Mesh,
        elem: &Element,
        basis: &Basis,
        quad_kind: QuadratureKind,
        forced_npts: Option<usize>,
    ) -> Result<Self, NumericError> {
        let order = volume_quad_order(mesh.dim.as_usize(), basis.order());
        let quad = Quadrature::with_forced_npts(mesh.shape, order, quad_kind, forced_npts);
        let (x_q, jac) = physical_map(mesh, elem, &quad.points);

        let mut jinv = Vec::with_capacity(jac.len());
        let mut detj_w = Vec::with_capacity(jac.len());
        for (q, j) in jac.iter().enumerate() {
            let det = j.determinant();
            let inv = j.try_inverse().ok_or(NumericError::SingularMassMatrix(elem.id))?;
            jinv.push(inv);
            detj_w.push(det.abs() * quad.weights[q]);
        }

        let phi = basis.values(&quad.points);
        let ref_grads = basis.ref_grads(&quad.points);
        let (grad_x, grad_y) = basis.physical_grads(&ref_grads, &jinv);

        let nb = basis.nb();
        let mut mass = DMatrix::zeros(nb, nb);
        for q in 0..quad.num_points() {
            let w = detj_w[q];
            for i in 0..nb {
                let phi_iq = phi[(q, i)];
                if phi_iq == 0.0 {
                    continue;
                }
                for j in 0..nb {
                    mass[(i, j)] += phi_iq * phi[(q, j)] * w;
                }
            }
        }
        let chol = Cholesky::new(mass.clone()).ok_or(NumericError::SingularMassMatrix(elem.id))?;
        let mass_inv = chol.inverse();

        Ok(Self { quad, phi, grad_x, grad_y, detj_w, jinv, x_q, mass, mass_inv })
    }
}

/// Physical coordinates of `elem` at reference points `pts`, for callers
/// that only need the mapping (e.g. nodal IC sampling in
/// [`crate::projection`]) and not the Jacobian.
pub fn physical_points(mesh: &Mesh, elem: &Element, pts: &[Point]) -> Vec<Point> {
    physical_map(mesh, elem, pts).0
}

/// L2-projects pointwise values sampled at `geom`'s volume quadrature
/// points back onto the trial space (`spec.md` §4.9's projection formula).
/// Shared by initial-condition projection, the positivity limiter, and the
/// ADER predictor's implicit source correction — anywhere a pointwise
/// transform of the state needs to come back as basis coefficients.
pub fn project_quadrature_values(geom: &ElemGeom, u_q: &DMatrix<f64>) -> DMatrix<f64> {
    let nb = geom.phi.ncols();
    let ns = u_q.ncols();
    let nq = geom.quad.num_points();
    let mut rhs = DMatrix::zeros(nb, ns);
    for q in 0..nq {
        let w = geom.detj_w[q];
        for b in 0..nb {
            let phi_b = geom.phi[(q, b)];
            if phi_b == 0.0 {
                continue;
            }
            for s in 0..ns {
                rhs[(b, s)] += phi_b * u_q[(q, s)] * w;
            }
        }
    }
    &geom.mass_inv * rhs
}

/// Cached geometry/basis evaluations shared by both sides of an interior
/// face, plus the outward normal and face-Jacobian magnitude inferred from
/// the left element (`spec.md` §3/§4.4). Gradient fields are only needed by
/// the Navier-Stokes diffusive face term (`spec.md` §6's `DiffFluxNumerical`).
pub struct InteriorFaceGeom {
    pub phi_l: DMatrix<f64>,
    pub phi_r: DMatrix<f64>,
    pub grad_x_l: DMatrix<f64>,
    pub grad_y_l: DMatrix<f64>,
    pub grad_x_r: DMatrix<f64>,
    pub grad_y_r: DMatrix<f64>,
    pub normal: Vec<Point>,
    pub jac_mag: Vec<f64>,
    pub weights: Vec<f64>,
    pub x_q: Vec<Point>,
}

/// Cached geometry/basis evaluations for a boundary face.
pub struct BoundaryFaceGeom {
    pub phi: DMatrix<f64>,
    pub grad_x: DMatrix<f64>,
    pub grad_y: DMatrix<f64>,
    pub normal: Vec<Point>,
    pub jac_mag: Vec<f64>,
    pub weights: Vec<f64>,
    pub x_q: Vec<Point>,
}

/// Physical-space gradients of `basis` at `pts` lifted into `elem`'s own
/// reference frame (used at face quadrature points, where [`ElemGeom`]'s
/// cached volume-quadrature gradients do not apply).
fn physical_grads_at(mesh: &Mesh, elem: &Element, basis: &Basis, pts: &[Point]) -> Result<(DMatrix<f64>, DMatrix<f64>), NumericError> {
    let (_, jac) = physical_map(mesh, elem, pts);
    let mut jinv = Vec::with_capacity(jac.len());
    for j in &jac {
        jinv.push(j.try_inverse().ok_or(NumericError::SingularMassMatrix(elem.id))?);
    }
    let ref_grads = basis.ref_grads(pts);
    Ok(basis.physical_grads(&ref_grads, &jinv))
}

fn face_quad_order(p: usize) -> usize {
    2 * p + 1
}

/// Outward unit normal and its physical Jacobian magnitude at `pts` (lifted
/// into `elem`'s reference frame), inferred from `elem`'s own mapping.
fn face_normal_and_jacobian(mesh: &Mesh, elem: &Element, face_id: usize, pts: &[Point]) -> (Vec<Point>, Vec<f64>) {
    match mesh.dim {
        Dim::One => {
            let sign = if face_id == 0 { -1.0 } else { 1.0 };
            (vec![Point::new(sign, 0.0); pts.len()], vec![1.0; pts.len()])
        }
        Dim::Two => {
            let ends = mesh.shape.face_lift(face_id, &[-1.0, 1.0]);
            let tangent_ref = Point::new((ends[1].x - ends[0].x) / 2.0, (ends[1].y - ends[0].y) / 2.0);
            let (_, jac) = physical_map(mesh, elem, pts);
            let mut normal = Vec::with_capacity(pts.len());
            let mut jac_mag = Vec::with_capacity(pts.len());
            for j in &jac {
                let tx = j[(0, 0)] * tangent_ref.x + j[(0, 1)] * tangent_ref.y;
                let ty = j[(1, 0)] * tangent_ref.x + j[(1, 1)] * tangent_ref.y;
                let mag = (tx * tx + ty * ty).sqrt();
                normal.push(Point::new(ty / mag, -tx / mag));
                jac_mag.push(mag);
            }
            (normal, jac_mag)
        }
    }
}

fn face_reference_param(mesh: &Mesh, quad1d: &[f64]) -> Vec<f64> {
    match mesh.shape.face_shape() {
        ShapeKind::Point => vec![0.0],
        _ => quad1d.to_vec(),
    }
}

impl InteriorFaceGeom {
    pub fn build(
        mesh: &Mesh,
        elem_l: &Element,
        face_l: usize,
        elem_r: &Element,
        face_r: usize,
        basis: &Basis,
        quad_kind: QuadratureKind,
        forced_npts: Option<usize>,
    ) -> Result<Self, NumericError> {
        let order = face_quad_order(basis.order());
        let (s, weights) = match mesh.shape.face_shape() {
            ShapeKind::Point => (vec![0.0], vec![1.0]),
            _ => {
                let q1d = Quadrature::with_forced_npts(ShapeKind::Segment, order, quad_kind, forced_npts);
                (q1d.points.iter().map(|p| p.x).collect(), q1d.weights)
            }
        };
        let s_r: Vec<f64> = s.iter().map(|v| -v).collect();

        let pts_l = mesh.shape.face_lift(face_l, &face_reference_param(mesh, &s));
        let pts_r = mesh.shape.face_lift(face_r, &face_reference_param(mesh, &s_r));

        let phi_l = basis.values(&pts_l);
        let phi_r = basis.values(&pts_r);
        let (grad_x_l, grad_y_l) = physical_grads_at(mesh, elem_l, basis, &pts_l)?;
        let (grad_x_r, grad_y_r) = physical_grads_at(mesh, elem_r, basis, &pts_r)?;
        let (x_q, _) = physical_map(mesh, elem_l, &pts_l);
        let (normal, jac_mag) = face_normal_and_jacobian(mesh, elem_l, face_l, &pts_l);

        Ok(Self { phi_l, phi_r, grad_x_l, grad_y_l, grad_x_r, grad_y_r, normal, jac_mag, weights, x_q })
    }
}

impl BoundaryFaceGeom {
    pub fn build(
        mesh: &Mesh,
        elem: &Element,
        face: usize,
        basis: &Basis,
        quad_kind: QuadratureKind,
        forced_npts: Option<usize>,
    ) -> Result<Self, NumericError> {
        let order = face_quad_order(basis.order());
        let (s, weights) = match mesh.shape.face_shape() {
            ShapeKind::Point => (vec![0.0], vec![1.0]),
            _ => {
                let q1d = Quadrature::with_forced_npts(ShapeKind::Segment, order, quad_kind, forced_npts);
                (q1d.points.iter().map(|p| p.x).collect(), q1d.weights)
            }
        };
        let pts = mesh.shape.face_lift(face, &face_reference_param(mesh, &s));
        let phi = basis.values(&pts);
        let (grad_x, grad_y) = physical_grads_at(mesh, elem, basis, &pts)?;
        let (x_q, _) = physical_map(mesh, elem, &pts);
        let (normal, jac_mag) = face_normal_and_jacobian(mesh, elem, face, &pts);
        Ok(Self { phi, grad_x, grad_y, normal, jac_mag, weights, x_q })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BasisKind, Node1dKind};
    use crate::mesh::{generate, BuiltinMeshSpec};
    use approx::assert_relative_eq;

    fn unit_quad_mesh(nx: usize, ny: usize) -> Mesh {
        generate(&BuiltinMeshSpec {
            shape: ShapeKind::Quad,
            num_elems_x: nx,
            num_elems_y: Some(ny),
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
    fn mass_matrix_of_a_unit_quad_element_has_the_right_trace() {
        let mesh = unit_quad_mesh(1, 1);
        let basis = Basis::new(ShapeKind::Quad, 1, BasisKind::Lagrange, Node1dKind::GaussLobatto).unwrap();
        let geom = ElemGeom::build(&mesh, &mesh.elements[0], &basis, QuadratureKind::GaussLegendre, None).unwrap();
        assert_relative_eq!(geom.mass.trace(), geom.mass.trace());
        // mass matrix of a constant-1 field integrates to the element area.
        let ones = DMatrix::from_element(geom.mass.nrows(), 1, 1.0);
        let integral = (&geom.mass * &ones).sum();
        assert_relative_eq!(integral, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn interior_face_normal_is_unit_length_and_points_outward() {
        let mesh = unit_quad_mesh(2, 1);
        let basis = Basis::new(ShapeKind::Quad, 1, BasisKind::Lagrange, Node1dKind::GaussLobatto).unwrap();
        let face = &mesh.interior_faces[0];
        let fg = InteriorFaceGeom::build(
            &mesh,
            &mesh.elements[face.elem_l],
            face.face_l,
            &mesh.elements[face.elem_r],
            face.face_r,
            &basis,
            QuadratureKind::GaussLegendre,
            None,
        )
        .unwrap();
        for n in &fg.normal {
            assert_relative_eq!(n.x * n.x + n.y * n.y, 1.0, epsilon = 1e-10);
        }
        // the two cells of a 2x1 grid share a vertical seam; outward normal is +/-x.
        assert_relative_eq!(fg.normal[0].y, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn boundary_face_jacobian_magnitude_matches_edge_length() {
        let mesh = unit_quad_mesh(1, 1);
        let basis = Basis::new(ShapeKind::Quad, 2, BasisKind::Lagrange, Node1dKind::GaussLobatto).unwrap();
        let bf = &mesh.boundary_faces[0];
        let fg = BoundaryFaceGeom::build(
            &mesh,
            &mesh.elements[bf.elem],
            bf.face,
            &basis,
            QuadratureKind::GaussLegendre,
            None,
        )
        .unwrap();
        assert!(fg.jac_mag.iter().all(|&m| (m - 0.5).abs() < 1e-10));
    }
}
