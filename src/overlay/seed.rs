//! Seed/teleport options for [`super::ScoredGraph::run`].

use std::collections::HashMap;

use crate::address::NodeAddress;
use crate::chain::{indicator, uniform};
use crate::error::ScoreGraphError;

/// Teleport target for one `run` invocation.
///
/// A closed tagged union: every variant but [`Seed::SpecifiedSeed`] is
/// implemented; that one is reserved and always fails with
/// [`ScoreGraphError::NotImplemented`], matching the reference engine.
#[derive(Debug, Clone)]
pub enum Seed {
    /// Teleport `alpha = 0`; seed is uniform over the current node order
    /// (irrelevant, since it is never mixed in).
    NoSeed,
    /// Seed is uniform over all nodes.
    UniformSeed {
        /// Teleport probability, in `[0, 1]`.
        alpha: f64,
    },
    /// Seed is uniform over `selected_nodes`.
    ///
    /// If `selected_nodes` is empty, or names every node in the graph, this
    /// degenerates to uniform-over-all. Addresses absent from the graph are
    /// silently dropped (pinned choice; see `spec.md` §9's open question).
    SelectedSeed {
        /// Teleport probability, in `[0, 1]`.
        alpha: f64,
        /// Nodes to spread the seed mass over.
        selected_nodes: Vec<NodeAddress>,
    },
    /// Reserved: always fails with
    /// [`ScoreGraphError::NotImplemented`].
    SpecifiedSeed {
        /// Teleport probability, in `[0, 1]`.
        alpha: f64,
        /// Requested per-node seed scores (unused; the engine does not yet
        /// support arbitrary seed distributions).
        score_map: HashMap<NodeAddress, f64>,
    },
}

fn validate_alpha(alpha: f64) -> Result<(), ScoreGraphError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ScoreGraphError::Numeric {
            detail: format!("alpha must be in [0, 1], got {alpha}"),
        });
    }
    Ok(())
}

/// Resolve a [`Seed`] against a canonical node order into `(alpha,
/// seed_distribution)`.
///
/// # Errors
///
/// Returns [`ScoreGraphError::Numeric`] if `alpha` is outside `[0, 1]`, or
/// [`ScoreGraphError::NotImplemented`] for [`Seed::SpecifiedSeed`].
pub fn resolve(order: &[NodeAddress], seed: &Seed) -> Result<(f64, Vec<f64>), ScoreGraphError> {
    let n = order.len();
    match seed {
        Seed::NoSeed => Ok((0.0, uniform(n))),
        Seed::UniformSeed { alpha } => {
            validate_alpha(*alpha)?;
            Ok((*alpha, uniform(n)))
        }
        Seed::SelectedSeed {
            alpha,
            selected_nodes,
        } => {
            validate_alpha(*alpha)?;
            let selected: Vec<usize> = selected_nodes
                .iter()
                .filter_map(|addr| order.iter().position(|a| a == addr))
                .collect();
            Ok((*alpha, indicator(n, &selected)))
        }
        Seed::SpecifiedSeed { .. } => Err(ScoreGraphError::NotImplemented {
            feature: "SPECIFIED_SEED",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Vec<NodeAddress> {
        vec![
            NodeAddress::new(["a"]),
            NodeAddress::new(["b"]),
            NodeAddress::new(["c"]),
            NodeAddress::new(["d"]),
        ]
    }

    #[test]
    fn no_seed_has_zero_alpha_and_uniform_seed() {
        let (alpha, seed) = resolve(&order(), &Seed::NoSeed).unwrap();
        assert_eq!(alpha, 0.0);
        assert_eq!(seed, uniform(4));
    }

    #[test]
    fn selected_seed_spreads_mass_over_present_nodes() {
        let (alpha, seed) = resolve(
            &order(),
            &Seed::SelectedSeed {
                alpha: 1.0,
                selected_nodes: vec![NodeAddress::new(["a"])],
            },
        )
        .unwrap();
        assert_eq!(alpha, 1.0);
        assert_eq!(seed, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn selected_seed_drops_unknown_addresses_silently() {
        let (_, seed) = resolve(
            &order(),
            &Seed::SelectedSeed {
                alpha: 1.0,
                selected_nodes: vec![NodeAddress::new(["a"]), NodeAddress::new(["not-a-node"])],
            },
        )
        .unwrap();
        assert_eq!(seed, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn selected_seed_empty_falls_back_to_uniform() {
        let (_, seed) = resolve(
            &order(),
            &Seed::SelectedSeed {
                alpha: 1.0,
                selected_nodes: vec![],
            },
        )
        .unwrap();
        assert_eq!(seed, uniform(4));
    }

    #[test]
    fn specified_seed_is_not_implemented() {
        let err = resolve(
            &order(),
            &Seed::SpecifiedSeed {
                alpha: 0.5,
                score_map: HashMap::new(),
            },
        )
        .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NotImplemented);
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        assert!(resolve(&order(), &Seed::UniformSeed { alpha: 1.5 }).is_err());
        assert!(resolve(&order(), &Seed::UniformSeed { alpha: -0.1 }).is_err());
    }
}
