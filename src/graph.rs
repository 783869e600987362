//! The host graph contract and a minimal in-memory reference implementation
//! used by this crate's own tests and doc examples.
//!
//! The host graph itself is explicitly out of scope for this engine: a
//! caller is expected to bring a real graph data structure (with its own
//! storage, indexing, and persistence). [`HostGraph`] is the trait that
//! captures exactly the operations the engine needs from it; [`SimpleGraph`]
//! is a small reference implementation, generalized from a CSR-style
//! adjacency representation, that exists only so this crate compiles and
//! tests against something concrete.

use std::collections::HashMap;

use serde_json::json;

use crate::address::{Direction, EdgeAddress, NodeAddress};

/// A directed edge: `src -> dst`, carrying its own address (the host graph
/// is a multigraph, so `(src, dst)` does not uniquely identify an edge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// The edge's own address.
    pub address: EdgeAddress,
    /// Source node.
    pub src: NodeAddress,
    /// Destination node.
    pub dst: NodeAddress,
}

/// Filter applied to an edge iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFilter<'a> {
    /// Only edges whose address begins with this prefix.
    pub address_prefix: Option<&'a EdgeAddress>,
    /// Only edges whose source begins with this prefix.
    pub src_prefix: Option<&'a NodeAddress>,
    /// Only edges whose destination begins with this prefix.
    pub dst_prefix: Option<&'a NodeAddress>,
}

/// Options for a neighbor query.
#[derive(Debug, Clone, Copy)]
pub struct NeighborOptions<'a> {
    /// Which incident edges to consider, relative to the target.
    pub direction: Direction,
    /// Only consider neighbors whose address begins with this prefix.
    pub node_prefix: Option<&'a NodeAddress>,
    /// Only consider edges whose address begins with this prefix.
    pub edge_prefix: Option<&'a EdgeAddress>,
}

impl Default for NeighborOptions<'_> {
    fn default() -> Self {
        Self {
            direction: Direction::Any,
            node_prefix: None,
            edge_prefix: None,
        }
    }
}

/// The external contract the engine requires of a host graph: node/edge
/// iteration (optionally prefix-filtered), address lookup, incident-edge
/// queries, canonical JSON, and a monotonic modification counter.
///
/// Implementations are assumed immutable-by-convention for the lifetime of
/// any [`crate::overlay::ScoredGraph`] built over them; the modification
/// counter is the engine's sole defense against use-after-mutate.
pub trait HostGraph: PartialEq {
    /// A counter that strictly increases every time the graph is mutated.
    fn modification_count(&self) -> u64;

    /// All node addresses, optionally restricted to those beginning with
    /// `prefix`.
    fn nodes<'a>(&'a self, prefix: Option<&NodeAddress>) -> Box<dyn Iterator<Item = NodeAddress> + 'a>;

    /// Whether `address` names a node of this graph.
    fn node_exists(&self, address: &NodeAddress) -> bool;

    /// All edges matching `filter`.
    fn edges<'a>(&'a self, filter: EdgeFilter<'_>) -> Box<dyn Iterator<Item = Edge> + 'a>;

    /// The edge at `address`, if any.
    fn edge(&self, address: &EdgeAddress) -> Option<Edge>;

    /// Edges incident to `target` matching `opts`.
    fn neighbors<'a>(
        &'a self,
        target: &NodeAddress,
        opts: NeighborOptions<'_>,
    ) -> Box<dyn Iterator<Item = Edge> + 'a>;

    /// The graph's canonical JSON form. Node and edge addresses must be
    /// enumerable, in sorted order, from this value.
    fn to_json(&self) -> serde_json::Value;
}

/// A minimal in-memory [`HostGraph`]: a directed multigraph stored as
/// forward and reverse adjacency lists over canonically indexed nodes.
///
/// Not part of the scored engine — a reference fixture for this crate's own
/// tests and examples.
#[derive(Debug, Clone, Default)]
pub struct SimpleGraph {
    nodes: Vec<NodeAddress>,
    node_index: HashMap<NodeAddress, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<EdgeAddress, usize>,
    out_adjacency: Vec<Vec<usize>>,
    in_adjacency: Vec<Vec<usize>>,
    modification_count: u64,
}

impl SimpleGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if it is not already present. Idempotent: re-adding an
    /// existing node does not bump the modification counter.
    pub fn add_node(&mut self, address: NodeAddress) {
        if self.node_index.contains_key(&address) {
            return;
        }
        let idx = self.nodes.len();
        self.node_index.insert(address.clone(), idx);
        self.nodes.push(address);
        self.out_adjacency.push(Vec::new());
        self.in_adjacency.push(Vec::new());
        self.modification_count += 1;
    }

    /// Insert an edge, implicitly adding its endpoints as nodes if absent.
    ///
    /// # Panics
    ///
    /// Panics if `address` is already used by a different edge (addresses
    /// must be unique within a graph).
    pub fn add_edge(&mut self, address: EdgeAddress, src: NodeAddress, dst: NodeAddress) {
        assert!(
            !self.edge_index.contains_key(&address),
            "edge address {address} already in use"
        );
        self.add_node(src.clone());
        self.add_node(dst.clone());

        let src_idx = self.node_index[&src];
        let dst_idx = self.node_index[&dst];
        let edge_idx = self.edges.len();

        self.edge_index.insert(address.clone(), edge_idx);
        self.edges.push(Edge { address, src, dst });
        self.out_adjacency[src_idx].push(edge_idx);
        self.in_adjacency[dst_idx].push(edge_idx);
        self.modification_count += 1;
    }

    fn node_idx(&self, address: &NodeAddress) -> Option<usize> {
        self.node_index.get(address).copied()
    }
}

impl PartialEq for SimpleGraph {
    fn eq(&self, other: &Self) -> bool {
        let mut self_nodes = self.nodes.clone();
        let mut other_nodes = other.nodes.clone();
        self_nodes.sort();
        other_nodes.sort();

        let mut self_edges: Vec<_> = self.edges.clone();
        let mut other_edges: Vec<_> = other.edges.clone();
        self_edges.sort_by(|a, b| a.address.cmp(&b.address));
        other_edges.sort_by(|a, b| a.address.cmp(&b.address));

        self_nodes == other_nodes && self_edges == other_edges
    }
}

impl HostGraph for SimpleGraph {
    fn modification_count(&self) -> u64 {
        self.modification_count
    }

    fn nodes<'a>(&'a self, prefix: Option<&NodeAddress>) -> Box<dyn Iterator<Item = NodeAddress> + 'a> {
        let prefix = prefix.cloned();
        Box::new(
            self.nodes
                .clone()
                .into_iter()
                .filter(move |n| prefix.as_ref().map_or(true, |p| n.has_prefix(p))),
        )
    }

    fn node_exists(&self, address: &NodeAddress) -> bool {
        self.node_index.contains_key(address)
    }

    fn edges<'a>(&'a self, filter: EdgeFilter<'_>) -> Box<dyn Iterator<Item = Edge> + 'a> {
        let address_prefix = filter.address_prefix.cloned();
        let src_prefix = filter.src_prefix.cloned();
        let dst_prefix = filter.dst_prefix.cloned();
        Box::new(self.edges.clone().into_iter().filter(move |e| {
            address_prefix.as_ref().map_or(true, |p| e.address.has_prefix(p))
                && src_prefix.as_ref().map_or(true, |p| e.src.has_prefix(p))
                && dst_prefix.as_ref().map_or(true, |p| e.dst.has_prefix(p))
        }))
    }

    fn edge(&self, address: &EdgeAddress) -> Option<Edge> {
        self.edge_index.get(address).map(|&i| self.edges[i].clone())
    }

    fn neighbors<'a>(
        &'a self,
        target: &NodeAddress,
        opts: NeighborOptions<'_>,
    ) -> Box<dyn Iterator<Item = Edge> + 'a> {
        let Some(target_idx) = self.node_idx(target) else {
            return Box::new(std::iter::empty());
        };

        let mut incident: Vec<usize> = Vec::new();
        if matches!(opts.direction, Direction::Out | Direction::Any) {
            incident.extend(self.out_adjacency[target_idx].iter().copied());
        }
        if matches!(opts.direction, Direction::In | Direction::Any) {
            incident.extend(self.in_adjacency[target_idx].iter().copied());
        }
        incident.sort_unstable();
        incident.dedup();

        let edges: Vec<Edge> = incident.into_iter().map(|i| self.edges[i].clone()).collect();
        let node_prefix = opts.node_prefix.cloned();
        let edge_prefix = opts.edge_prefix.cloned();
        let target = target.clone();

        Box::new(edges.into_iter().filter(move |e| {
            let other = if e.src == target { &e.dst } else { &e.src };
            node_prefix.as_ref().map_or(true, |p| other.has_prefix(p))
                && edge_prefix.as_ref().map_or(true, |p| e.address.has_prefix(p))
        }))
    }

    fn to_json(&self) -> serde_json::Value {
        let mut nodes: Vec<&NodeAddress> = self.nodes.iter().collect();
        nodes.sort();
        let mut edges: Vec<&Edge> = self.edges.iter().collect();
        edges.sort_by(|a, b| a.address.cmp(&b.address));

        json!({
            "nodes": nodes.iter().map(|n| n.parts()).collect::<Vec<_>>(),
            "edges": edges.iter().map(|e| json!({
                "address": e.address.parts(),
                "src": e.src.parts(),
                "dst": e.dst.parts(),
            })).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(name: &str) -> NodeAddress {
        NodeAddress::new(["node", name])
    }

    fn e(name: &str) -> EdgeAddress {
        EdgeAddress::new(["edge", name])
    }

    fn small_graph() -> SimpleGraph {
        let mut g = SimpleGraph::new();
        g.add_edge(e("ab"), n("a"), n("b"));
        g.add_edge(e("bc"), n("b"), n("c"));
        g
    }

    #[test]
    fn modification_count_increases_on_mutation() {
        let mut g = SimpleGraph::new();
        assert_eq!(g.modification_count(), 0);
        g.add_edge(e("ab"), n("a"), n("b"));
        assert_eq!(g.modification_count(), 3); // two implicit node adds + one edge add
    }

    #[test]
    fn neighbors_respects_direction() {
        let g = small_graph();
        let out: Vec<_> = g
            .neighbors(
                &n("a"),
                NeighborOptions {
                    direction: Direction::Out,
                    ..Default::default()
                },
            )
            .collect();
        assert_eq!(out.len(), 1);

        let inbound: Vec<_> = g
            .neighbors(
                &n("a"),
                NeighborOptions {
                    direction: Direction::In,
                    ..Default::default()
                },
            )
            .collect();
        assert!(inbound.is_empty());
    }

    #[test]
    fn self_loop_appears_once_per_direction() {
        let mut g = SimpleGraph::new();
        g.add_edge(e("loop"), n("a"), n("a"));
        let any: Vec<_> = g
            .neighbors(
                &n("a"),
                NeighborOptions {
                    direction: Direction::Any,
                    ..Default::default()
                },
            )
            .collect();
        assert_eq!(any.len(), 1);
    }

    #[test]
    fn canonical_json_is_independent_of_insertion_order() {
        let mut g1 = SimpleGraph::new();
        g1.add_edge(e("ab"), n("a"), n("b"));
        g1.add_edge(e("bc"), n("b"), n("c"));

        let mut g2 = SimpleGraph::new();
        g2.add_edge(e("bc"), n("b"), n("c"));
        g2.add_edge(e("ab"), n("a"), n("b"));

        assert_eq!(g1.to_json(), g2.to_json());
    }
}
