//! Points in physical/reference space and small dense vector helpers.
//!
//! The core only ever works in 1 or 2 physical dimensions (`spec.md` §1), so
//! a fixed two-component [`Point`]/[`Vec2`] pulls its weight over a
//! dynamically-sized `nalgebra` vector for every element and face quantity;
//! 1D users simply leave the second component at zero.

use std::cmp::Ordering;
use std::fmt;

const POINT_UNIQUENESS_ACCURACY: f64 = 1e-12;

/// A point in physical or reference space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn on_axis(x: f64) -> Self {
        Self { x, y: 0.0 }
    }

    pub fn dist(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// A rounded, hashable key used to detect coincident points across
    /// floating point mesh construction (periodic pairing, node dedup).
    pub fn key(&self) -> PointKey {
        PointKey {
            x: FloatRep::from(self.x),
            y: FloatRep::from(self.y),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.10}, {:.10})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointKey {
    x: FloatRep,
    y: FloatRep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct FloatRep(u64);

impl FloatRep {
    fn from(value: f64) -> Self {
        let rounded = (value / POINT_UNIQUENESS_ACCURACY).round() * POINT_UNIQUENESS_ACCURACY;
        Self(rounded.to_bits())
    }
}

/// Compares two points to within [`POINT_UNIQUENESS_ACCURACY`].
pub fn points_coincide(a: Point, b: Point) -> bool {
    a.key() == b.key()
}

/// Lexicographic ordering of points, used to canonicalize edge/face node lists.
pub fn order_points(a: &Point, b: &Point) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap()
        .then_with(|| a.y.partial_cmp(&b.y).unwrap())
}

/// Dimension of the ambient space, carried explicitly rather than inferred
/// from an `Option`/enum on every `Point`, per `spec.md` §3 (`d` is fixed for
/// a run).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim {
    One = 1,
    Two = 2,
}

impl Dim {
    pub fn as_usize(self) -> usize {
        self as usize
    }
}
