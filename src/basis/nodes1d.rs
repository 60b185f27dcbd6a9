//! 1D node distributions usable as nodal-basis support points or tensor
//! product factors, per `spec.md` §4.2 ("Nodal bases support user-selectable
//! 1D node distributions").

use crate::quadrature::gauss;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node1dKind {
    Equidistant,
    GaussLegendre,
    GaussLobatto,
}

/// `p + 1` nodes over `[-1, 1]` of the requested distribution.
pub fn nodes1d(kind: Node1dKind, p: usize) -> Vec<f64> {
    match kind {
        Node1dKind::Equidistant => {
            if p == 0 {
                vec![0.0]
            } else {
                (0..=p).map(|i| -1.0 + 2.0 * i as f64 / p as f64).collect()
            }
        }
        Node1dKind::GaussLegendre => gauss::gauss_legendre(p + 1).0,
        Node1dKind::GaussLobatto => gauss::gauss_lobatto(p + 1).0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn all_distributions_return_p_plus_one_nodes_spanning_the_interval() {
        for kind in [Node1dKind::Equidistant, Node1dKind::GaussLegendre, Node1dKind::GaussLobatto] {
            for p in 1..6 {
                let nodes = nodes1d(kind, p);
                assert_eq!(nodes.len(), p + 1);
                assert!(nodes.iter().all(|&x| x >= -1.0 - 1e-12 && x <= 1.0 + 1e-12));
            }
        }
    }

    #[test]
    fn lobatto_and_equidistant_include_endpoints() {
        for kind in [Node1dKind::Equidistant, Node1dKind::GaussLobatto] {
            let nodes = nodes1d(kind, 4);
            assert_relative_eq!(nodes[0], -1.0, epsilon = 1e-12);
            assert_relative_eq!(*nodes.last().unwrap(), 1.0, epsilon = 1e-12);
        }
    }
}
