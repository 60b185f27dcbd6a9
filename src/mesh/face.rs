use smallvec::SmallVec;

pub type SharedNodeIds = SmallVec<[usize; 2]>;

/// `(elemL, faceL-local-id, elemR, faceR-local-id, shared-node IDs)`, per
/// `spec.md` §3. Face geometry is inferred from the left element; the right
/// side reuses it with an opposite outward normal.
#[derive(Clone, Debug)]
pub struct InteriorFace {
    pub elem_l: usize,
    pub face_l: usize,
    pub elem_r: usize,
    pub face_r: usize,
    pub shared_node_ids: SharedNodeIds,
}

/// `(elem, face-local-id, shared-node IDs)`, grouped by named boundary.
#[derive(Clone, Debug)]
pub struct BoundaryFace {
    pub elem: usize,
    pub face: usize,
    pub shared_node_ids: SharedNodeIds,
    pub boundary: usize,
}
