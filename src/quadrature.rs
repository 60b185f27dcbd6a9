//! Quadrature rules for the reference elements in [`crate::shape`].
//!
//! Segment rules come straight from [`gauss`]; quadrilateral rules are built
//! by tensor product of two segment rules (mirroring the original
//! implementation's `quadrilateral.get_quadrature_points_weights`, which
//! reshapes a segment rule via `outer`/`tile`/`repeat`); triangle rules are
//! the symmetric tables in [`dunavant`].

mod dunavant;
pub(crate) mod gauss;

use crate::shape::ShapeKind;
use crate::spatial::Point;

/// Which quadrature family to draw 1D points from. `Lobatto` is required for
/// colocated schemes, where quadrature nodes coincide with solution nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadratureKind {
    GaussLegendre,
    GaussLobatto,
}

/// A quadrature rule over a reference element: points in reference
/// coordinates paired with weights that already include any Jacobian of the
/// tensor-product construction (but not the physical element's Jacobian).
#[derive(Clone, Debug)]
pub struct Quadrature {
    pub points: Vec<Point>,
    pub weights: Vec<f64>,
}

impl Quadrature {
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Builds a rule over `shape` exact for polynomials up to `order`.
    ///
    /// `order` is the polynomial degree to integrate exactly; for segment and
    /// quadrilateral shapes this picks the 1D rule with `n` points such that
    /// `2n - 1 >= order` (Gauss) or `2n - 3 >= order` (Lobatto, `n >= 2`).
    pub fn new(shape: ShapeKind, order: usize, kind: QuadratureKind) -> Self {
        Self::with_forced_npts(shape, order, kind, None)
    }

    /// As [`Quadrature::new`], but `forced_npts` (when given) overrides the
    /// 1D point count directly instead of deriving it from `order` — the
    /// colocated-quadrature case (`spec.md` §4.3's `forced_npts?`), where the
    /// quadrature node count must match the solution node count exactly.
    pub fn with_forced_npts(
        shape: ShapeKind,
        order: usize,
        kind: QuadratureKind,
        forced_npts: Option<usize>,
    ) -> Self {
        match shape {
            ShapeKind::Point => Quadrature { points: vec![Point::default()], weights: vec![1.0] },
            ShapeKind::Segment => {
                let (x, w) = match forced_npts {
                    Some(n) => segment_rule_npts(n, kind),
                    None => segment_rule(order, kind),
                };
                Quadrature {
                    points: x.into_iter().map(Point::on_axis).collect(),
                    weights: w,
                }
            }
            ShapeKind::Quad => {
                let (x, w) = match forced_npts {
                    Some(n) => segment_rule_npts(n, kind),
                    None => segment_rule(order, kind),
                };
                let n = x.len();
                let mut points = Vec::with_capacity(n * n);
                let mut weights = Vec::with_capacity(n * n);
                for j in 0..n {
                    for i in 0..n {
                        points.push(Point::new(x[i], x[j]));
                        weights.push(w[i] * w[j]);
                    }
                }
                Quadrature { points, weights }
            }
            ShapeKind::Triangle => {
                let (points, weights) = dunavant::rule(order);
                Quadrature { points, weights }
            }
        }
    }
}

fn segment_rule_npts(n: usize, kind: QuadratureKind) -> (Vec<f64>, Vec<f64>) {
    match kind {
        QuadratureKind::GaussLegendre => gauss::gauss_legendre(n.max(1)),
        QuadratureKind::GaussLobatto => gauss::gauss_lobatto(n.max(2)),
    }
}

/// Smallest 1D rule of `kind` exact to polynomial degree `order`.
fn segment_rule(order: usize, kind: QuadratureKind) -> (Vec<f64>, Vec<f64>) {
    match kind {
        QuadratureKind::GaussLegendre => {
            let n = (order + 2) / 2;
            gauss::gauss_legendre(n.max(1))
        }
        QuadratureKind::GaussLobatto => {
            let n = (order + 3) / 2 + 1;
            gauss::gauss_lobatto(n.max(2))
        }
    }
}

pub use gauss::rescale;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_rule_is_exact_for_requested_order() {
        let q = Quadrature::new(ShapeKind::Segment, 5, QuadratureKind::GaussLegendre);
        let integral: f64 = q.points.iter().zip(&q.weights).map(|(p, &w)| p.x.powi(5) * w).sum();
        assert_relative_eq!(integral, 0.0, epsilon = 1e-10);

        let integral4: f64 = q.points.iter().zip(&q.weights).map(|(p, &w)| p.x.powi(4) * w).sum();
        assert_relative_eq!(integral4, 2.0 / 5.0, epsilon = 1e-10);
    }

    #[test]
    fn quad_rule_weights_sum_to_reference_area() {
        let q = Quadrature::new(ShapeKind::Quad, 3, QuadratureKind::GaussLegendre);
        assert_relative_eq!(q.weights.iter().sum::<f64>(), 4.0, epsilon = 1e-10);
    }

    #[test]
    fn lobatto_segment_rule_includes_endpoints() {
        let q = Quadrature::new(ShapeKind::Segment, 3, QuadratureKind::GaussLobatto);
        assert!(q.points.iter().any(|p| (p.x + 1.0).abs() < 1e-10));
        assert!(q.points.iter().any(|p| (p.x - 1.0).abs() < 1e-10));
    }

    #[test]
    fn triangle_rule_weights_sum_to_reference_area() {
        let q = Quadrature::new(ShapeKind::Triangle, 4, QuadratureKind::GaussLegendre);
        assert_relative_eq!(q.weights.iter().sum::<f64>(), 0.5, epsilon = 1e-10);
    }
}
