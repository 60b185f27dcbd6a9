use smallvec::SmallVec;

/// Either side of a mesh face references back into the mesh's flat interior-
/// or boundary-face arrays; elements hold non-owning indices rather than
/// back-pointers (`spec.md` §3 "Ownership").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceRef {
    Interior(usize),
    Boundary(usize),
}

/// An element's geometry node IDs; most meshes are affine (`gorder = 1`, one
/// node per shape vertex), so four is enough to avoid heap allocation for
/// the common quad/triangle case.
pub type NodeIds = SmallVec<[usize; 4]>;
/// An element's incident faces, indexed by local face ID.
pub type FaceRefs = SmallVec<[FaceRef; 4]>;

#[derive(Clone, Debug)]
pub struct Element {
    pub id: usize,
    pub node_ids: NodeIds,
    pub faces: FaceRefs,
}
