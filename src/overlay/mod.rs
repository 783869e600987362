//! The scored-graph overlay: the public surface callers build against.
//!
//! Wraps a host graph (by reference — see `spec.md` §9's "weak/back-reference
//! semantics") with a derived edge-weight map and a per-node score
//! distribution, enforcing the "graph unchanged since construction"
//! invariant on every operation.

pub mod seed;

use std::collections::HashMap;
use std::time::Duration;

use crate::address::{EdgeAddress, NodeAddress};
use crate::chain::{self, SolverInput};
use crate::compiler;
use crate::error::{ScoreGraphError, Result};
use crate::graph::{Edge, EdgeFilter, HostGraph, NeighborOptions};
use crate::weight::{self, EdgeWeight, DEFAULT_SYNTHETIC_LOOP_WEIGHT};

pub use seed::Seed;

/// Default budget before the solver cooperatively yields, used when
/// [`RunOptions`] does not override it.
pub const DEFAULT_YIELD_AFTER: Duration = Duration::from_millis(50);

/// A node together with its current score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNode {
    /// The node's address.
    pub address: NodeAddress,
    /// The node's current score.
    pub score: f64,
}

/// An edge together with its weight pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedEdge {
    /// The underlying edge.
    pub edge: Edge,
    /// The edge's weight pair.
    pub weight: EdgeWeight,
}

/// One neighbor's contribution to a target node's score.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborContribution {
    /// The neighbor (the *other* endpoint; for a self-loop, the target itself).
    pub scored_node: ScoredNode,
    /// The incident edge and its weight.
    pub weighted_edge: WeightedEdge,
    /// This neighbor's contribution to the target's score.
    pub contribution: f64,
}

/// Options for [`ScoredGraph::nodes`]. Passing `Some(NodesOptions { prefix:
/// None })` — an options record with no prefix — is an error; pass `None`
/// for "all nodes".
#[derive(Debug, Clone, Default)]
pub struct NodesOptions {
    /// Restrict to nodes whose address begins with this prefix.
    pub prefix: Option<NodeAddress>,
}

/// Options for [`ScoredGraph::edges`]. All three prefixes are required when
/// an options record is supplied at all; pass `None` for "all edges".
#[derive(Debug, Clone, Default)]
pub struct EdgesOptions {
    /// Restrict to edges whose address begins with this prefix.
    pub address_prefix: Option<EdgeAddress>,
    /// Restrict to edges whose source begins with this prefix.
    pub src_prefix: Option<NodeAddress>,
    /// Restrict to edges whose destination begins with this prefix.
    pub dst_prefix: Option<NodeAddress>,
}

/// Options for [`ScoredGraph::run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Hard cap on power-iteration steps.
    pub max_iterations: usize,
    /// Stop once the convergence delta drops to or below this value.
    pub convergence_threshold: f64,
    /// Cooperative-yield budget; defaults to [`DEFAULT_YIELD_AFTER`].
    pub yield_after: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 1e-6,
            yield_after: DEFAULT_YIELD_AFTER,
        }
    }
}

/// Result of [`ScoredGraph::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutput {
    /// The last observed convergence delta.
    pub convergence_delta: f64,
}

/// A host graph, overlaid with derived per-edge weights and per-node
/// scores.
///
/// `ScoredGraph` never owns the host graph — it holds a borrow and a
/// snapshot of its modification counter, failing fast on any operation if
/// the graph has changed underneath it.
#[derive(Debug)]
pub struct ScoredGraph<'g, G: HostGraph> {
    graph: &'g G,
    weights: HashMap<EdgeAddress, EdgeWeight>,
    scores: HashMap<NodeAddress, f64>,
    total_out_weight: HashMap<NodeAddress, f64>,
    synthetic_loop_weight: f64,
    modification_snapshot: u64,
}

impl<'g, G: HostGraph> ScoredGraph<'g, G> {
    /// Build a scored overlay over `graph`, applying `evaluator` to every
    /// edge to derive its weight pair and initializing scores to the
    /// uniform distribution.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::EmptyGraph`] if `graph` has zero nodes,
    /// [`ScoreGraphError::InvalidLoopWeight`] if `synthetic_loop_weight` is
    /// not strictly positive, or [`ScoreGraphError::InvalidWeight`] if
    /// `evaluator` returns a negative, `NaN`, or infinite weight for any
    /// edge.
    pub fn new<F>(graph: &'g G, evaluator: F, synthetic_loop_weight: f64) -> Result<Self>
    where
        F: Fn(&Edge) -> (f64, f64),
    {
        weight::validate_loop_weight(synthetic_loop_weight)?;

        let node_count = graph.nodes(None).count();
        if node_count == 0 {
            return Err(ScoreGraphError::EmptyGraph);
        }

        let mut weights = HashMap::new();
        for edge in graph.edges(EdgeFilter::default()) {
            let (to_weight, fro_weight) = evaluator(&edge);
            let weight = EdgeWeight::new(&edge.address, to_weight, fro_weight)?;
            weights.insert(edge.address.clone(), weight);
        }

        let compiled = compiler::compile(graph, &weights, synthetic_loop_weight)?;
        let uniform_score = 1.0 / node_count as f64;
        let scores = compiled
            .order
            .iter()
            .map(|addr| (addr.clone(), uniform_score))
            .collect();

        tracing::debug!(
            node_count,
            edge_count = weights.len(),
            synthetic_loop_weight,
            "overlay.construct"
        );

        Ok(Self {
            graph,
            weights,
            scores,
            total_out_weight: compiled.total_out_weight,
            synthetic_loop_weight,
            modification_snapshot: graph.modification_count(),
        })
    }

    /// Convenience constructor using [`DEFAULT_SYNTHETIC_LOOP_WEIGHT`].
    ///
    /// # Errors
    ///
    /// See [`ScoredGraph::new`].
    pub fn with_default_loop_weight<F>(graph: &'g G, evaluator: F) -> Result<Self>
    where
        F: Fn(&Edge) -> (f64, f64),
    {
        Self::new(graph, evaluator, DEFAULT_SYNTHETIC_LOOP_WEIGHT)
    }

    /// Rebuild a `ScoredGraph` directly from already-validated parts.
    ///
    /// Used by [`crate::serde_form::from_envelope`] to reconstruct an
    /// overlay without re-running `new`'s uniform-score initialization.
    pub(crate) fn from_parts(
        graph: &'g G,
        weights: HashMap<EdgeAddress, EdgeWeight>,
        scores: HashMap<NodeAddress, f64>,
        total_out_weight: HashMap<NodeAddress, f64>,
        synthetic_loop_weight: f64,
    ) -> Self {
        Self {
            modification_snapshot: graph.modification_count(),
            graph,
            weights,
            scores,
            total_out_weight,
            synthetic_loop_weight,
        }
    }

    fn check_not_modified(&self) -> Result<()> {
        if self.graph.modification_count() != self.modification_snapshot {
            return Err(ScoreGraphError::GraphModified);
        }
        Ok(())
    }

    /// Every node whose address matches `options`, with its current score.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction, or [`ScoreGraphError::InvalidOptions`] if
    /// `options` is `Some` but carries no prefix.
    pub fn nodes(&self, options: Option<NodesOptions>) -> Result<impl Iterator<Item = ScoredNode> + '_> {
        self.check_not_modified()?;
        let prefix = match options {
            None => None,
            Some(NodesOptions { prefix: Some(p) }) => Some(p),
            Some(NodesOptions { prefix: None }) => {
                return Err(ScoreGraphError::InvalidOptions { field: "prefix" })
            }
        };
        Ok(self.graph.nodes(prefix.as_ref()).map(move |address| {
            let score = self.scores[&address];
            ScoredNode { address, score }
        }))
    }

    /// The node at `address`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction.
    pub fn node(&self, address: &NodeAddress) -> Result<Option<ScoredNode>> {
        self.check_not_modified()?;
        Ok(self.scores.get(address).map(|&score| ScoredNode {
            address: address.clone(),
            score,
        }))
    }

    /// Every edge matching `options`, with its weight pair.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction, or [`ScoreGraphError::InvalidOptions`] if
    /// `options` is `Some` but is missing any of the three required
    /// prefixes.
    pub fn edges(&self, options: Option<EdgesOptions>) -> Result<impl Iterator<Item = WeightedEdge> + '_> {
        self.check_not_modified()?;
        let (address_prefix, src_prefix, dst_prefix) = match options {
            None => (None, None, None),
            Some(o) => {
                let address_prefix = o
                    .address_prefix
                    .ok_or(ScoreGraphError::InvalidOptions { field: "addressPrefix" })?;
                let src_prefix = o
                    .src_prefix
                    .ok_or(ScoreGraphError::InvalidOptions { field: "srcPrefix" })?;
                let dst_prefix = o
                    .dst_prefix
                    .ok_or(ScoreGraphError::InvalidOptions { field: "dstPrefix" })?;
                (Some(address_prefix), Some(src_prefix), Some(dst_prefix))
            }
        };
        let filter = EdgeFilter {
            address_prefix: address_prefix.as_ref(),
            src_prefix: src_prefix.as_ref(),
            dst_prefix: dst_prefix.as_ref(),
        };
        let edges: Vec<Edge> = self.graph.edges(filter).collect();
        Ok(edges.into_iter().map(move |edge| {
            let weight = self.weights[&edge.address];
            WeightedEdge { edge, weight }
        }))
    }

    /// The edge at `address`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction.
    pub fn edge(&self, address: &EdgeAddress) -> Result<Option<WeightedEdge>> {
        self.check_not_modified()?;
        Ok(self.graph.edge(address).map(|edge| {
            let weight = self.weights[&edge.address];
            WeightedEdge { edge, weight }
        }))
    }

    /// The cached total out-weight of `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction, or [`ScoreGraphError::UnknownNode`] if `address`
    /// is not a node.
    pub fn total_out_weight(&self, address: &NodeAddress) -> Result<f64> {
        self.check_not_modified()?;
        self.total_out_weight
            .get(address)
            .copied()
            .ok_or_else(|| ScoreGraphError::UnknownNode {
                address: address.clone(),
            })
    }

    /// The configured synthetic loop weight.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction.
    pub fn synthetic_loop_weight(&self) -> Result<f64> {
        self.check_not_modified()?;
        Ok(self.synthetic_loop_weight)
    }

    /// `score(target) * synthetic_loop_weight / total_out_weight(target)`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction, or [`ScoreGraphError::UnknownNode`] if `target`
    /// is not a node.
    pub fn synthetic_loop_score_contribution(&self, target: &NodeAddress) -> Result<f64> {
        self.check_not_modified()?;
        let score = *self
            .scores
            .get(target)
            .ok_or_else(|| ScoreGraphError::UnknownNode {
                address: target.clone(),
            })?;
        let total = self.total_out_weight(target)?;
        Ok(score * self.synthetic_loop_weight / total)
    }

    /// For each edge incident to `target` matching `opts`, the neighbor
    /// endpoint, the weighted edge, and that neighbor's score contribution
    /// to `target` (see `spec.md` §4.D for the contribution formula).
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction, or [`ScoreGraphError::UnknownNode`] if `target`
    /// is not a node.
    pub fn neighbors(
        &self,
        target: &NodeAddress,
        opts: NeighborOptions<'_>,
    ) -> Result<Vec<NeighborContribution>> {
        self.check_not_modified()?;
        if !self.scores.contains_key(target) {
            return Err(ScoreGraphError::UnknownNode {
                address: target.clone(),
            });
        }

        self.graph
            .neighbors(target, opts)
            .map(|edge| {
                let other = if edge.src == *target {
                    &edge.dst
                } else {
                    &edge.src
                };
                let weight = self.weights[&edge.address];
                let raw_weight = if edge.dst == *target { weight.to_weight } else { 0.0 }
                    + if edge.src == *target { weight.fro_weight } else { 0.0 };

                let other_score = self.scores[other];
                let other_total = self.total_out_weight(other)?;
                let contribution = other_score * raw_weight / other_total;

                Ok(NeighborContribution {
                    scored_node: ScoredNode {
                        address: other.clone(),
                        score: other_score,
                    },
                    weighted_edge: WeightedEdge { edge, weight },
                    contribution,
                })
            })
            .collect()
    }

    /// Drive the overlay's scores to a near-fixed-point under `seed` and
    /// `options`, writing the result back into the overlay's score map.
    ///
    /// The initial distribution is the overlay's *current* scores (not
    /// re-initialized to uniform on every call — a pinned resolution of
    /// `spec.md` §9's open question; see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
    /// since construction, [`ScoreGraphError::NotImplemented`] for
    /// [`Seed::SpecifiedSeed`], or [`ScoreGraphError::Numeric`] if the
    /// compiled chain or the requested teleport `alpha` is invalid.
    pub async fn run(&mut self, seed: Seed, options: RunOptions) -> Result<RunOutput> {
        self.check_not_modified()?;

        let span = tracing::debug_span!(
            "overlay.run",
            max_iterations = options.max_iterations,
            convergence_threshold = options.convergence_threshold
        );
        let _enter = span.enter();

        let compiled = compiler::compile(self.graph, &self.weights, self.synthetic_loop_weight)?;
        let (alpha, seed_dist) = seed::resolve(&compiled.order, &seed)?;
        let initial: Vec<f64> = compiled.order.iter().map(|a| self.scores[a]).collect();

        let output = chain::run_to_convergence(
            &compiled.chain,
            SolverInput {
                initial,
                seed: seed_dist,
                alpha,
                max_iterations: options.max_iterations,
                convergence_threshold: options.convergence_threshold,
                yield_after: options.yield_after,
            },
        )
        .await;

        for (address, score) in compiled.order.iter().zip(output.pi.iter()) {
            self.scores.insert(address.clone(), *score);
        }

        Ok(RunOutput {
            convergence_delta: output.convergence_delta,
        })
    }

    /// The host graph this overlay was built over.
    #[must_use]
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    pub(crate) fn weights(&self) -> &HashMap<EdgeAddress, EdgeWeight> {
        &self.weights
    }

    pub(crate) fn scores(&self) -> &HashMap<NodeAddress, f64> {
        &self.scores
    }
}

impl<G: HostGraph> PartialEq for ScoredGraph<'_, G> {
    /// Two overlays are equal iff their graphs, scores, weights, and
    /// synthetic loop weights are all equal. Modification history does not
    /// participate.
    ///
    /// `spec.md` §7 also lists a `TYPE_MISMATCH` error for this comparison;
    /// in this statically typed port, `ScoredGraph<G>` can only ever be
    /// compared with another `ScoredGraph<G>`, so that case cannot arise —
    /// see DESIGN.md.
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph
            && self.scores == other.scores
            && self.weights == other.weights
            && (self.synthetic_loop_weight - other.synthetic_loop_weight).abs() < f64::EPSILON
    }
}
