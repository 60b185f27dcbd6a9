use crate::spatial::Point;

/// Reference triangle with vertices `(0,0), (1,0), (0,1)`. Nodes at order `p`
/// are laid out in rows from the bottom edge (`y=0`) upward, each row `r`
/// holding `p+1-r` equidistant nodes (`spec.md` §4.1).
#[derive(Clone, Copy, Debug, Default)]
pub struct TriangleShape;

impl TriangleShape {
    pub const NFACES: usize = 3;

    pub fn principal_nodes(&self) -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]
    }

    pub fn nb(&self, p: usize) -> usize {
        (p + 1) * (p + 2) / 2
    }

    fn row_offset(p: usize, r: usize) -> usize {
        (0..r).map(|k| p + 1 - k).sum()
    }

    pub fn node_index(p: usize, r: usize, c: usize) -> usize {
        Self::row_offset(p, r) + c
    }

    pub fn equidistant_nodes(&self, p: usize) -> Vec<Point> {
        let mut nodes = vec![Point::default(); self.nb(p)];
        let h = if p == 0 { 1.0 } else { 1.0 / p as f64 };
        for r in 0..=p {
            let y = r as f64 * h;
            for c in 0..=(p - r) {
                let x = c as f64 * h;
                nodes[Self::node_index(p, r, c)] = Point::new(x, y);
            }
        }
        nodes
    }

    /// Lift a barycentric-edge parameter `s in [-1, 1]` to element-reference
    /// coordinates along `face_id`'s two principal corners.
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
            0 => [p[1], p[2]],
            1 => [p[2], p[0]],
            2 => [p[0], p[1]],
            _ => panic!("triangle has only 3 faces; got face_id {face_id}"),
        }
    }

    /// Local node IDs of the nodes lying on `face_id`, in face-parametric order.
    pub fn face_node_local_ids(&self, face_id: usize, p: usize) -> Vec<usize> {
        match face_id {
            // hypotenuse: r + c == p, from vertex 1 (r=0,c=p) to vertex 2 (r=p,c=0)
            0 => (0..=p).map(|r| Self::node_index(p, r, p - r)).collect(),
            // left edge: c == 0, from vertex 2 (r=p) down to vertex 0 (r=0)
            1 => (0..=p).rev().map(|r| Self::node_index(p, r, 0)).collect(),
            // bottom edge: r == 0, from vertex 0 (c=0) to vertex 1 (c=p)
            2 => (0..=p).map(|c| Self::node_index(p, 0, c)).collect(),
            _ => panic!("triangle has only 3 faces; got face_id {face_id}"),
        }
    }
}
