use crate::spatial::Point;

/// A mesh node: a physical-space point, identified by its index into the
/// mesh's node array (`spec.md` §3 "Node: a point in R^d").
pub type Node = Point;
