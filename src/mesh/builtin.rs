//! The structured mesh generator used when `Mesh.File` is absent
//! (`spec.md` §6): a 1D segment chain, a 2D quadrilateral grid, or a 2D
//! triangle grid obtained by bisecting each generated quad cell.

use smallvec::smallvec;

use super::face::{BoundaryFace, InteriorFace};
use super::raw::{RawBoundaryFace, RawElement, RawMesh};
use super::Mesh;
use crate::error::MeshError;
use crate::shape::ShapeKind;
use crate::spatial::{Dim, Point};

#[derive(Clone, Copy, Debug)]
pub struct BuiltinMeshSpec {
    pub shape: ShapeKind,
    pub num_elems_x: usize,
    pub num_elems_y: Option<usize>,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub periodic_x: bool,
    pub periodic_y: bool,
}

pub fn generate(spec: &BuiltinMeshSpec) -> Result<Mesh, MeshError> {
    let raw = match spec.shape {
        ShapeKind::Segment => build_raw_segment(spec),
        ShapeKind::Quad => build_raw_quad(spec),
        ShapeKind::Triangle => build_raw_triangle(spec),
        ShapeKind::Point => panic!("a mesh of point elements is not meaningful"),
    };
    let mut mesh = Mesh::from_raw(raw)?;
    if spec.periodic_x {
        periodicize(&mut mesh, "x1", "x2", Point::new(spec.xmax - spec.xmin, 0.0))?;
    }
    if spec.periodic_y {
        periodicize(&mut mesh, "y1", "y2", Point::new(0.0, spec.ymax - spec.ymin))?;
    }
    Ok(mesh)
}

fn build_raw_segment(spec: &BuiltinMeshSpec) -> RawMesh {
    let n = spec.num_elems_x;
    let nodes: Vec<Point> = (0..=n)
        .map(|i| Point::on_axis(spec.xmin + (spec.xmax - spec.xmin) * i as f64 / n as f64))
        .collect();
    let elements = (0..n)
        .map(|e| RawElement { shape: ShapeKind::Segment, node_ids: vec![e, e + 1] })
        .collect();
    let boundaries = vec![
        ("x1".to_string(), vec![RawBoundaryFace { elem: 0, face: 0 }]),
        ("x2".to_string(), vec![RawBoundaryFace { elem: n - 1, face: 1 }]),
    ];
    RawMesh { dim: Dim::One, nodes, elements, boundaries }
}

fn build_raw_quad(spec: &BuiltinMeshSpec) -> RawMesh {
    let nx = spec.num_elems_x;
    let ny = spec.num_elems_y.expect("2D builtin mesh requires NumElemsY");
    let id = |i: usize, j: usize| i + j * (nx + 1);

    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let x = spec.xmin + (spec.xmax - spec.xmin) * i as f64 / nx as f64;
            let y = spec.ymin + (spec.ymax - spec.ymin) * j as f64 / ny as f64;
            nodes.push(Point::new(x, y));
        }
    }

    let mut elements = Vec::with_capacity(nx * ny);
    for ey in 0..ny {
        for ex in 0..nx {
            elements.push(RawElement {
                shape: ShapeKind::Quad,
                node_ids: vec![id(ex, ey), id(ex + 1, ey), id(ex, ey + 1), id(ex + 1, ey + 1)],
            });
        }
    }

    let cell = |ex: usize, ey: usize| ey * nx + ex;
    let mut x1 = Vec::new();
    let mut x2 = Vec::new();
    let mut y1 = Vec::new();
    let mut y2 = Vec::new();
    for ey in 0..ny {
        x1.push(RawBoundaryFace { elem: cell(0, ey), face: 3 });
        x2.push(RawBoundaryFace { elem: cell(nx - 1, ey), face: 1 });
    }
    for ex in 0..nx {
        y1.push(RawBoundaryFace { elem: cell(ex, 0), face: 0 });
        y2.push(RawBoundaryFace { elem: cell(ex, ny - 1), face: 2 });
    }

    RawMesh {
        dim: Dim::Two,
        nodes,
        elements,
        boundaries: vec![
            ("x1".to_string(), x1),
            ("x2".to_string(), x2),
            ("y1".to_string(), y1),
            ("y2".to_string(), y2),
        ],
    }
}

fn build_raw_triangle(spec: &BuiltinMeshSpec) -> RawMesh {
    let nx = spec.num_elems_x;
    let ny = spec.num_elems_y.expect("2D builtin mesh requires NumElemsY");
    let id = |i: usize, j: usize| i + j * (nx + 1);

    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let x = spec.xmin + (spec.xmax - spec.xmin) * i as f64 / nx as f64;
            let y = spec.ymin + (spec.ymax - spec.ymin) * j as f64 / ny as f64;
            nodes.push(Point::new(x, y));
        }
    }

    // cell (ex, ey) contributes triangle A (id 2*cell) and triangle B (id 2*cell + 1),
    // split along the diagonal from the cell's bottom-left to top-right corner.
    let mut elements = Vec::with_capacity(2 * nx * ny);
    for ey in 0..ny {
        for ex in 0..nx {
            let (bl, br, tl, tr) = (id(ex, ey), id(ex + 1, ey), id(ex, ey + 1), id(ex + 1, ey + 1));
            elements.push(RawElement { shape: ShapeKind::Triangle, node_ids: vec![bl, br, tr] });
            elements.push(RawElement { shape: ShapeKind::Triangle, node_ids: vec![bl, tr, tl] });
        }
    }

    let cell = |ex: usize, ey: usize| ey * nx + ex;
    let tri_a = |ex: usize, ey: usize| 2 * cell(ex, ey);
    let tri_b = |ex: usize, ey: usize| 2 * cell(ex, ey) + 1;

    let mut x1 = Vec::new();
    let mut x2 = Vec::new();
    let mut y1 = Vec::new();
    let mut y2 = Vec::new();
    for ey in 0..ny {
        x1.push(RawBoundaryFace { elem: tri_b(0, ey), face: 1 });
        x2.push(RawBoundaryFace { elem: tri_a(nx - 1, ey), face: 0 });
    }
    for ex in 0..nx {
        y1.push(RawBoundaryFace { elem: tri_a(ex, 0), face: 2 });
        y2.push(RawBoundaryFace { elem: tri_b(ex, ny - 1), face: 0 });
    }

    RawMesh {
        dim: Dim::Two,
        nodes,
        elements,
        boundaries: vec![
            ("x1".to_string(), x1),
            ("x2".to_string(), x2),
            ("y1".to_string(), y1),
            ("y2".to_string(), y2),
        ],
    }
}

/// Replaces the matched boundary faces of `name_a`/`name_b` with interior
/// faces, pairing each `name_a` face with the `name_b` face whose nodes
/// coincide with its own shifted by `shift` (`spec.md` §9's periodic-face
/// consistency check).
fn periodicize(mesh: &mut Mesh, name_a: &str, name_b: &str, shift: Point) -> Result<(), MeshError> {
    let (Some(id_a), Some(id_b)) = (mesh.boundary_id(name_a), mesh.boundary_id(name_b)) else {
        return Ok(());
    };

    let side_a: Vec<usize> =
        mesh.boundary_faces.iter().enumerate().filter(|(_, f)| f.boundary == id_a).map(|(i, _)| i).collect();
    let side_b: Vec<usize> =
        mesh.boundary_faces.iter().enumerate().filter(|(_, f)| f.boundary == id_b).map(|(i, _)| i).collect();

    let face_points = |mesh: &Mesh, bf: &BoundaryFace| -> Vec<Point> {
        bf.shared_node_ids.iter().map(|&n| mesh.nodes[n]).collect()
    };

    let mut matched_b = vec![false; side_b.len()];
    let mut new_interior = Vec::new();
    let mut consumed = Vec::new();

    for &ia in &side_a {
        let bf_a = mesh.boundary_faces[ia].clone();
        let pts_a = face_points(mesh, &bf_a);
        let shifted: Vec<Point> = pts_a.iter().map(|p| Point::new(p.x + shift.x, p.y + shift.y)).collect();

        let hit = side_b.iter().enumerate().find(|(k, &ib)| {
            if matched_b[*k] {
                return false;
            }
            let pts_b = face_points(mesh, &mesh.boundary_faces[ib]);
            points_match_as_set(&shifted, &pts_b)
        });

        match hit {
            Some((k, &ib)) => {
                matched_b[k] = true;
                let bf_b = mesh.boundary_faces[ib].clone();
                new_interior.push((
                    ia,
                    ib,
                    InteriorFace {
                        elem_l: bf_a.elem,
                        face_l: bf_a.face,
                        elem_r: bf_b.elem,
                        face_r: bf_b.face,
                        shared_node_ids: smallvec![],
                    },
                ));
                consumed.push(ia);
                consumed.push(ib);
            }
            None => {
                return Err(MeshError::InconsistentPeriodicFace {
                    elem_l: bf_a.elem,
                    face_l: bf_a.face,
                    elem_r: usize::MAX,
                    face_r: usize::MAX,
                    left_pt: shifted.first().copied().unwrap_or_default(),
                    right_pt: pts_a.first().copied().unwrap_or_default(),
                })
            }
        }
    }

    let base_interior_len = mesh.interior_faces.len();
    for (offset, (_, _, face)) in new_interior.iter().enumerate() {
        let new_idx = base_interior_len + offset;
        set_face_ref(mesh, face.elem_l, face.face_l, super::element::FaceRef::Interior(new_idx));
        set_face_ref(mesh, face.elem_r, face.face_r, super::element::FaceRef::Interior(new_idx));
    }
    mesh.interior_faces.extend(new_interior.into_iter().map(|(_, _, f)| f));

    let keep: Vec<bool> = (0..mesh.boundary_faces.len()).map(|i| !consumed.contains(&i)).collect();
    let mut remap = vec![usize::MAX; mesh.boundary_faces.len()];
    let mut kept_faces = Vec::new();
    for (old_idx, keep) in keep.into_iter().enumerate() {
        if keep {
            remap[old_idx] = kept_faces.len();
            kept_faces.push(mesh.boundary_faces[old_idx].clone());
        }
    }
    mesh.boundary_faces = kept_faces;
    for elem in mesh.elements.iter_mut() {
        for f in elem.faces.iter_mut() {
            if let super::element::FaceRef::Boundary(old_idx) = *f {
                if old_idx != usize::MAX {
                    *f = super::element::FaceRef::Boundary(remap[old_idx]);
                }
            }
        }
    }

    Ok(())
}

fn set_face_ref(mesh: &mut Mesh, elem: usize, face: usize, new_ref: super::element::FaceRef) {
    mesh.elements[elem].faces[face] = new_ref;
}

fn points_match_as_set(a: &[Point], b: &[Point]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|pa| {
        b.iter().enumerate().any(|(k, pb)| {
            if used[k] || !crate::spatial::points_coincide(*pa, *pb) {
                false
            } else {
                used[k] = true;
                true
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_segment_mesh_has_no_boundary_faces() {
        let spec = BuiltinMeshSpec {
            shape: ShapeKind::Segment,
            num_elems_x: 4,
            num_elems_y: None,
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 0.0,
            periodic_x: true,
            periodic_y: false,
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.boundary_faces.len(), 0);
        assert_eq!(mesh.interior_faces.len(), 4);
    }

    #[test]
    fn nonperiodic_segment_mesh_has_two_boundary_faces() {
        let spec = BuiltinMeshSpec {
            shape: ShapeKind::Segment,
            num_elems_x: 4,
            num_elems_y: None,
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 0.0,
            periodic_x: false,
            periodic_y: false,
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.boundary_faces.len(), 2);
        assert_eq!(mesh.interior_faces.len(), 3);
    }

    #[test]
    fn quad_grid_has_expected_element_and_face_counts() {
        let spec = BuiltinMeshSpec {
            shape: ShapeKind::Quad,
            num_elems_x: 3,
            num_elems_y: 2,
            xmin: 0.0,
            xmax: 3.0,
            ymin: 0.0,
            ymax: 2.0,
            periodic_x: false,
            periodic_y: false,
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.num_elements(), 6);
        // interior faces: 2 vertical seams * 2 rows + 1 horizontal seam * 3 cols = 7
        assert_eq!(mesh.interior_faces.len(), 7);
        assert_eq!(mesh.boundary_faces.len(), 2 * 3 + 2 * 2);
    }

    #[test]
    fn triangle_grid_has_twice_the_elements_of_the_equivalent_quad_grid() {
        let spec = BuiltinMeshSpec {
            shape: ShapeKind::Triangle,
            num_elems_x: 3,
            num_elems_y: 2,
            xmin: 0.0,
            xmax: 3.0,
            ymin: 0.0,
            ymax: 2.0,
            periodic_x: false,
            periodic_y: false,
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.num_elements(), 12);
    }

    #[test]
    fn doubly_periodic_quad_grid_has_no_boundary_faces() {
        let spec = BuiltinMeshSpec {
            shape: ShapeKind::Quad,
            num_elems_x: 2,
            num_elems_y: 2,
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 1.0,
            periodic_x: true,
            periodic_y: true,
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.boundary_faces.len(), 0);
    }
}
