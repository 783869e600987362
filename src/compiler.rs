//! Compiles a host graph plus per-edge weights into a canonical node order
//! and a normalized column-stochastic [`Chain`].

use std::collections::HashMap;

use crate::address::NodeAddress;
use crate::chain::{Chain, Column};
use crate::error::ScoreGraphError;
use crate::graph::{EdgeFilter, HostGraph};
use crate::weight::EdgeWeight;

/// The canonical node order, lexicographic over node addresses.
///
/// This order is used both by the compiled [`Chain`] (columns/rows are
/// canonical indices into it) and by [`crate::serde_form`] — both must
/// agree, since a caller diffing or re-serializing a score vector relies on
/// position meaning the same node everywhere.
#[must_use]
pub fn canonical_node_order(graph: &impl HostGraph) -> Vec<NodeAddress> {
    let mut nodes: Vec<NodeAddress> = graph.nodes(None).collect();
    nodes.sort();
    nodes
}

/// Output of [`compile`]: the canonical order, the compiled chain, and the
/// per-node total out-weight the chain's normalization was derived from.
#[derive(Debug, Clone)]
pub struct CompiledChain {
    /// Canonical node order; chain indices refer to positions in this list.
    pub order: Vec<NodeAddress>,
    /// The compiled, column-normalized chain.
    pub chain: Chain,
    /// Cached total out-weight per node, keyed by address.
    pub total_out_weight: HashMap<NodeAddress, f64>,
}

/// Compile `graph` plus `weights` (one entry per edge address, already
/// validated non-negative/finite) into a [`CompiledChain`].
///
/// Every column's raw accumulated weight is divided by that node's total
/// out-weight (`synthetic_loop_weight` plus outgoing `to_weight` plus
/// incoming `fro_weight`), guaranteeing the chain is column-stochastic —
/// the synthetic loop guarantees the divisor is strictly positive even for
/// a node with no real incident edges.
///
/// # Errors
///
/// Returns [`ScoreGraphError::Numeric`] if, after normalization, a column
/// fails to sum to 1 within epsilon (this would indicate a bug in the
/// accumulation above, not a caller error).
pub fn compile(
    graph: &impl HostGraph,
    weights: &HashMap<crate::address::EdgeAddress, EdgeWeight>,
    synthetic_loop_weight: f64,
) -> Result<CompiledChain, ScoreGraphError> {
    let order = canonical_node_order(graph);
    let n = order.len();
    let index: HashMap<&NodeAddress, usize> = order.iter().enumerate().map(|(i, a)| (a, i)).collect();

    // Dense-per-column scratch, indexed by target canonical index, as the
    // kernel's numerical policy prescribes: no sorting required, summation
    // order unspecified.
    let mut accum: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];

    for j in 0..n {
        *accum[j].entry(j).or_insert(0.0) += synthetic_loop_weight;
    }

    for edge in graph.edges(EdgeFilter::default()) {
        let weight = weights
            .get(&edge.address)
            .expect("overlay construction validates every edge has a weight entry");
        let src_idx = index[&edge.src];
        let dst_idx = index[&edge.dst];

        if weight.to_weight != 0.0 {
            *accum[src_idx].entry(dst_idx).or_insert(0.0) += weight.to_weight;
        }
        if weight.fro_weight != 0.0 {
            *accum[dst_idx].entry(src_idx).or_insert(0.0) += weight.fro_weight;
        }
    }

    let mut total_out_weight = HashMap::with_capacity(n);
    let mut columns = Vec::with_capacity(n);

    for (j, raw) in accum.into_iter().enumerate() {
        let total: f64 = raw.values().sum();
        total_out_weight.insert(order[j].clone(), total);

        let mut targets: Vec<usize> = raw.keys().copied().collect();
        targets.sort_unstable();
        let weights: Vec<f64> = targets.iter().map(|t| raw[t] / total).collect();
        columns.push(Column { targets, weights });
    }

    let chain = Chain::new(columns)?;

    Ok(CompiledChain {
        order,
        chain,
        total_out_weight,
    })
}
