use crate::spatial::Point;

/// Reference quadrilateral `[-1, 1]^2`; nodes at order `p` are a tensor-product
/// equidistant `(p+1) x (p+1)` lattice, flattened as `idx = i + j*(p+1)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadShape;

impl QuadShape {
    pub const NFACES: usize = 4;

    pub fn principal_nodes(&self) -> Vec<Point> {
        vec![
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(-1.0, 1.0),
            Point::new(1.0, 1.0),
        ]
    }

    pub fn nb(&self, p: usize) -> usize {
        (p + 1) * (p + 1)
    }

    pub fn node_index(p: usize, i: usize, j: usize) -> usize {
        i + j * (p + 1)
    }

    pub fn equidistant_nodes(&self, p: usize) -> Vec<Point> {
        let lattice: Vec<f64> = if p == 0 {
            vec![0.0]
        } else {
            (0..=p).map(|k| -1.0 + 2.0 * k as f64 / p as f64).collect()
        };
        let mut nodes = vec![Point::default(); self.nb(p)];
        for j in 0..=p {
            for i in 0..=p {
                nodes[Self::node_index(p, i, j)] = Point::new(lattice[i], lattice[j]);
            }
        }
        nodes
    }

    /// Lifts points along a face's 1D reference coordinate `s in [-1, 1]` to
    /// element-reference coordinates, via the two principal corners of that
    /// face (`spec.md` §4.1): `t = (s+1)/2`, `(1-t)*x0 + t*x1`.
    pub fn face_lift(&self, face_id: usize, s: &[f64]) -> Vec<Point> {
        let [x0, x1] = self.face_corners(face_id);
        s.iter()
            .map(|&s| {
                let t = (s + 1.0) / 2.0;
                Point::new(
                    (1.0 - t) * x0.x + t * x1.x,
                    (1.0 - t) * x0.y + t * x1.y,
                )
            })
            .collect()
    }

    fn face_corners(&self, face_id: usize) -> [Point; 2] {
        let p = self.principal_nodes();
        match face_id {
            0 => [p[0], p[1]],
            1 => [p[1], p[3]],
            2 => [p[3], p[2]],
            3 => [p[2], p[0]],
            _ => panic!("quadrilateral has only 4 faces; got face_id {face_id}"),
        }
    }

    /// Local node IDs (into the `(p+1)x(p+1)` tensor-product lattice) of the
    /// nodes lying on `face_id`, in face-parametric order.
    pub fn face_node_local_ids(&self, face_id: usize, p: usize) -> Vec<usize> {
        match face_id {
            0 => (0..=p).map(|i| Self::node_index(p, i, 0)).collect(),
            1 => (0..=p).map(|j| Self::node_index(p, p, j)).collect(),
            2 => (0..=p).rev().map(|i| Self::node_index(p, i, p)).collect(),
            3 => (0..=p).rev().map(|j| Self::node_index(p, 0, j)).collect(),
            _ => panic!("quadrilateral has only 4 faces; got face_id {face_id}"),
        }
    }
}
