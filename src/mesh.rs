//! Mesh container: elements, interior faces, and named boundary groups
//! (`spec.md` §3). Consumed read-only by the rest of the core once built,
//! either by the built-in structured generator ([`builtin`]) or from an
//! externally-parsed [`raw::RawMesh`].

mod builtin;
mod element;
mod face;
mod node;
mod raw;

pub use builtin::{generate, BuiltinMeshSpec};
pub use element::{Element, FaceRef};
pub use face::{BoundaryFace, InteriorFace};
pub use node::Node;
pub use raw::{RawBoundaryFace, RawElement, RawMesh};

use std::collections::BTreeMap;

use crate::error::MeshError;
use crate::shape::ShapeKind;
use crate::spatial::Dim;

#[derive(Clone, Debug)]
pub struct Mesh {
    pub dim: Dim,
    pub shape: ShapeKind,
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub interior_faces: Vec<InteriorFace>,
    pub boundary_faces: Vec<BoundaryFace>,
    pub boundary_names: Vec<String>,
}

impl Mesh {
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn boundary_id(&self, name: &str) -> Option<usize> {
        self.boundary_names.iter().position(|n| n == name)
    }

    /// Builds a [`Mesh`] from externally-supplied connectivity, inferring
    /// interior faces by matching shared face node-ID sets and validating
    /// watertightness (`spec.md` §3 invariants).
    pub fn from_raw(raw: RawMesh) -> Result<Self, MeshError> {
        let mut boundary_names = Vec::with_capacity(raw.boundaries.len());
        for (name, _) in &raw.boundaries {
            if boundary_names.contains(name) {
                return Err(MeshError::DuplicateBoundaryName(name.clone()));
            }
            boundary_names.push(name.clone());
        }

        let shape = raw.elements.first().map(|e| e.shape).unwrap_or(ShapeKind::Segment);

        // face key: sorted global node IDs of the face, used to pair interior
        // faces and to attach boundary assignments.
        let mut occurrences: BTreeMap<Vec<usize>, Vec<(usize, usize)>> = BTreeMap::new();
        for (elem_id, elem) in raw.elements.iter().enumerate() {
            for face_id in 0..elem.shape.num_faces() {
                let local_ids = elem.shape.face_node_local_ids(face_id, 1);
                let mut key: Vec<usize> = local_ids.iter().map(|&l| elem.node_ids[l]).collect();
                key.sort_unstable();
                occurrences.entry(key).or_default().push((elem_id, face_id));
            }
        }

        let mut assigned: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for (boundary_idx, (_, faces)) in raw.boundaries.iter().enumerate() {
            for f in faces {
                assigned.insert((f.elem, f.face), boundary_idx);
            }
        }

        let mut elements: Vec<Element> = raw
            .elements
            .iter()
            .enumerate()
            .map(|(id, e)| Element {
                id,
                node_ids: e.node_ids.iter().copied().collect(),
                faces: smallvec::smallvec![element::FaceRef::Boundary(usize::MAX); e.shape.num_faces()],
            })
            .collect();

        let mut interior_faces = Vec::new();
        let mut boundary_faces = Vec::new();

        for (key, occ) in occurrences {
            match occ.len() {
                2 => {
                    let (e0, f0) = occ[0];
                    let (e1, f1) = occ[1];
                    if assigned.contains_key(&(e0, f0)) || assigned.contains_key(&(e1, f1)) {
                        return Err(MeshError::NotWatertight(format!(
                            "face shared by elements {e0} and {e1} is also assigned to a boundary"
                        )));
                    }
                    let idx = interior_faces.len();
                    interior_faces.push(InteriorFace {
                        elem_l: e0,
                        face_l: f0,
                        elem_r: e1,
                        face_r: f1,
                        shared_node_ids: key.into_iter().collect(),
                    });
                    elements[e0].faces[f0] = element::FaceRef::Interior(idx);
                    elements[e1].faces[f1] = element::FaceRef::Interior(idx);
                }
                1 => {
                    let (e0, f0) = occ[0];
                    let boundary = *assigned.get(&(e0, f0)).ok_or(MeshError::DanglingFace { elem: e0 })?;
                    let idx = boundary_faces.len();
                    boundary_faces.push(BoundaryFace {
                        elem: e0,
                        face: f0,
                        shared_node_ids: key.into_iter().collect(),
                        boundary,
                    });
                    elements[e0].faces[f0] = element::FaceRef::Boundary(idx);
                }
                n => {
                    return Err(MeshError::NotWatertight(format!(
                        "face shared by {n} elements (expected 1 or 2)"
                    )))
                }
            }
        }

        Ok(Mesh {
            dim: raw.dim,
            shape,
            nodes: raw.nodes,
            elements,
            interior_faces,
            boundary_faces,
            boundary_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Point;

    fn two_segments() -> RawMesh {
        RawMesh {
            dim: Dim::One,
            nodes: vec![Point::on_axis(0.0), Point::on_axis(1.0), Point::on_axis(2.0)],
            elements: vec![
                RawElement { shape: ShapeKind::Segment, node_ids: vec![0, 1] },
                RawElement { shape: ShapeKind::Segment, node_ids: vec![1, 2] },
            ],
            boundaries: vec![
                ("x1".into(), vec![RawBoundaryFace { elem: 0, face: 0 }]),
                ("x2".into(), vec![RawBoundaryFace { elem: 1, face: 1 }]),
            ],
        }
    }

    #[test]
    fn from_raw_builds_one_interior_face_between_two_segments() {
        let mesh = Mesh::from_raw(two_segments()).unwrap();
        assert_eq!(mesh.interior_faces.len(), 1);
        assert_eq!(mesh.boundary_faces.len(), 2);
        assert_eq!(mesh.num_elements(), 2);
    }

    #[test]
    fn duplicate_boundary_name_is_rejected() {
        let mut raw = two_segments();
        raw.boundaries.push(("x1".into(), vec![]));
        assert!(matches!(Mesh::from_raw(raw), Err(MeshError::DuplicateBoundaryName(_))));
    }

    #[test]
    fn dangling_face_without_boundary_assignment_is_rejected() {
        let mut raw = two_segments();
        raw.boundaries.clear();
        assert!(matches!(Mesh::from_raw(raw), Err(MeshError::DanglingFace { .. })));
    }
}
