//! Local Lax-Friedrichs (Rusanov) flux: the cheapest dissipative flux that
//! works for any physics exposing `flux_interior`/`max_wave_speed`
//! (`spec.md` §4.6's minimal physics contract).

use crate::physics::{Physics, StateVec};
use crate::spatial::Point;

pub fn flux(physics: &Physics, u_l: &StateVec, u_r: &StateVec, normal: Point) -> StateVec {
    let f_l = physics.flux_interior(u_l);
    let f_r = physics.flux_interior(u_r);
    let alpha = physics.max_wave_speed(u_l).max(physics.max_wave_speed(u_r));

    let mut out = StateVec::new();
    for i in 0..f_l.len() {
        let fl_n = f_l[i][0] * normal.x + f_l[i][1] * normal.y;
        let fr_n = f_r[i][0] * normal.x + f_r[i][1] * normal.y;
        out.push(0.5 * (fl_n + fr_n) - 0.5 * alpha * (u_r[i] - u_l[i]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::scalar::ScalarKind;
    use crate::spatial::Dim;
    use approx::assert_relative_eq;

    #[test]
    fn reduces_to_upwind_flux_for_positive_advection_speed() {
        let physics = Physics::Scalar { dim: Dim::One, kind: ScalarKind::ConstAdv1D { c: 2.0 } };
        let u_l: StateVec = [1.0].into_iter().collect();
        let u_r: StateVec = [3.0].into_iter().collect();
        let f = flux(&physics, &u_l, &u_r, Point::new(1.0, 0.0));
        assert_relative_eq!(f[0], 2.0 * 1.0, epsilon = 1e-10);
    }

    #[test]
    fn is_consistent_when_both_states_agree() {
        let physics = Physics::Scalar { dim: Dim::One, kind: ScalarKind::ConstAdv1D { c: 2.0 } };
        let u: StateVec = [1.5].into_iter().collect();
        let f = flux(&physics, &u, &u, Point::new(1.0, 0.0));
        assert_relative_eq!(f[0], 3.0, epsilon = 1e-10);
    }
}
