//! The data contract an external mesh loader must satisfy to construct a
//! [`super::Mesh`] (`spec.md` §1 "mesh ingestion from external files... out
//! of scope"; this crate only consumes the already-parsed result).

use crate::shape::ShapeKind;
use crate::spatial::{Dim, Point};

pub struct RawElement {
    pub shape: ShapeKind,
    /// Order-1 (affine) geometry node IDs, in the shape's principal-node
    /// order (`spec.md` §4.1).
    pub node_ids: Vec<usize>,
}

/// One face of one element assigned to a named boundary group.
#[derive(Clone, Copy, Debug)]
pub struct RawBoundaryFace {
    pub elem: usize,
    pub face: usize,
}

pub struct RawMesh {
    pub dim: Dim,
    pub nodes: Vec<Point>,
    pub elements: Vec<RawElement>,
    pub boundaries: Vec<(String, Vec<RawBoundaryFace>)>,
}
