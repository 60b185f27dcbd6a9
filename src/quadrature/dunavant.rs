//! Symmetric quadrature rules on the reference triangle `(0,0), (1,0), (0,1)`,
//! after Dunavant (1985). Points are specified in barycentric coordinates and
//! expanded via their symmetry orbits; weights are normalized to the
//! reference triangle's area of `1/2`.

use crate::spatial::Point;

struct Orbit {
    /// Barycentric coordinates of one representative point per orbit member.
    bary: &'static [[f64; 3]],
    weight: f64,
}

fn expand(orbits: &[Orbit]) -> (Vec<Point>, Vec<f64>) {
    let mut points = Vec::new();
    let mut weights = Vec::new();
    for orbit in orbits {
        for b in orbit.bary {
            points.push(Point::new(b[1], b[2]));
            weights.push(orbit.weight / 2.0);
        }
    }
    (points, weights)
}

/// Degree-1 exact, 1-point centroid rule.
fn degree1() -> (Vec<Point>, Vec<f64>) {
    expand(&[Orbit { bary: &[[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]], weight: 1.0 }])
}

/// Degree-2 exact, 3-point rule.
fn degree2() -> (Vec<Point>, Vec<f64>) {
    const A: f64 = 1.0 / 6.0;
    const B: f64 = 2.0 / 3.0;
    expand(&[Orbit {
        bary: &[[B, A, A], [A, B, A], [A, A, B]],
        weight: 1.0 / 3.0,
    }])
}

/// Degree-4 exact, 6-point rule.
fn degree4() -> (Vec<Point>, Vec<f64>) {
    const A: f64 = 0.445_948_490_915_965;
    const B: f64 = 0.091_576_213_509_771;
    let a2 = 1.0 - 2.0 * A;
    let b2 = 1.0 - 2.0 * B;
    expand(&[
        Orbit {
            bary: &[[a2, A, A], [A, a2, A], [A, A, a2]],
            weight: 0.223_381_589_678_011,
        },
        Orbit {
            bary: &[[b2, B, B], [B, b2, B], [B, B, b2]],
            weight: 0.109_951_743_655_322,
        },
    ])
}

/// Degree-6 exact, 12-point rule.
fn degree6() -> (Vec<Point>, Vec<f64>) {
    const A: f64 = 0.249_286_745_170_910;
    const B: f64 = 0.063_089_014_491_502;
    const C1: f64 = 0.310_352_451_033_784;
    const C2: f64 = 0.636_502_499_121_399;
    let a2 = 1.0 - 2.0 * A;
    let b2 = 1.0 - 2.0 * B;
    let c3 = 1.0 - C1 - C2;
    expand(&[
        Orbit {
            bary: &[[a2, A, A], [A, a2, A], [A, A, a2]],
            weight: 0.116_786_275_726_379,
        },
        Orbit {
            bary: &[[b2, B, B], [B, b2, B], [B, B, b2]],
            weight: 0.050_844_906_370_207,
        },
        Orbit {
            bary: &[
                [C1, C2, c3],
                [C2, C1, c3],
                [C1, c3, C2],
                [C2, c3, C1],
                [c3, C1, C2],
                [c3, C2, C1],
            ],
            weight: 0.082_851_075_618_374,
        },
    ])
}

/// Returns a symmetric triangle rule exact for polynomials up to `degree`,
/// choosing the lowest-order table that covers it (`degree <= 6`).
pub fn rule(degree: usize) -> (Vec<Point>, Vec<f64>) {
    match degree {
        0 | 1 => degree1(),
        2 | 3 => degree2(),
        4 => degree4(),
        5 | 6 => degree6(),
        _ => panic!("no built-in symmetric triangle rule exact to degree {degree}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrate(points: &[Point], weights: &[f64], f: impl Fn(f64, f64) -> f64) -> f64 {
        points.iter().zip(weights).map(|(p, &w)| f(p.x, p.y) * w).sum()
    }

    #[test]
    fn weights_sum_to_reference_triangle_area() {
        for degree in [1, 2, 4, 6] {
            let (pts, w) = rule(degree);
            assert_relative_eq!(w.iter().sum::<f64>(), 0.5, epsilon = 1e-12);
            assert_eq!(pts.len(), w.len());
        }
    }

    #[test]
    fn degree4_rule_is_exact_for_quartic_monomial() {
        let (pts, w) = rule(4);
        let integral = integrate(&pts, &w, |x, y| x.powi(2) * y.powi(2));
        // integral over reference triangle of x^2 y^2 dA = 1/180
        assert_relative_eq!(integral, 1.0 / 180.0, epsilon = 1e-9);
    }

    #[test]
    fn degree2_rule_is_exact_for_quadratic_monomial() {
        let (pts, w) = rule(2);
        let integral = integrate(&pts, &w, |x, y| x * y);
        // integral over reference triangle of x y dA = 1/24
        assert_relative_eq!(integral, 1.0 / 24.0, epsilon = 1e-9);
    }
}
