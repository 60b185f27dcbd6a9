use crate::spatial::Point;

/// The 0-dimensional shape; it is only ever encountered as the face shape of
/// a [`super::Segment`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PointShape;

impl PointShape {
    pub fn nb(&self, _p: usize) -> usize {
        1
    }

    pub fn equidistant_nodes(&self, _p: usize) -> Vec<Point> {
        vec![Point::default()]
    }
}
