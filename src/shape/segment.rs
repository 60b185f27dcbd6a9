use crate::spatial::Point;

/// Reference segment `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentShape;

impl SegmentShape {
    pub const NFACES: usize = 2;

    pub fn principal_nodes(&self) -> Vec<Point> {
        vec![Point::on_axis(-1.0), Point::on_axis(1.0)]
    }

    pub fn nb(&self, p: usize) -> usize {
        p + 1
    }

    /// Equidistant nodes over `[-1, 1]`, `p + 1` of them.
    pub fn equidistant_nodes(&self, p: usize) -> Vec<Point> {
        (0..=p)
            .map(|i| Point::on_axis(-1.0 + 2.0 * i as f64 / p as f64))
            .collect()
    }

    /// Face 0 lifts to the left endpoint, face 1 to the right endpoint.
    /// A segment's faces are points, so the face-reference input is ignored.
    pub fn face_lift(&self, face_id: usize) -> Point {
        match face_id {
            0 => Point::on_axis(-1.0),
            1 => Point::on_axis(1.0),
            _ => panic!("segment has only 2 faces; got face_id {face_id}"),
        }
    }

    pub fn face_node_local_id(&self, face_id: usize, p: usize) -> usize {
        match face_id {
            0 => 0,
            1 => p,
            _ => panic!("segment has only 2 faces; got face_id {face_id}"),
        }
    }
}
