//! Canonical external serialization (`spec.md` §4.E): a versioned envelope
//! wrapping the host graph's own JSON plus the overlay's derived weights and
//! scores, in canonical (sorted) address order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compiler;
use crate::error::{Result, ScoreGraphError};
use crate::graph::{EdgeFilter, HostGraph};
use crate::overlay::ScoredGraph;
use crate::weight::EdgeWeight;

/// Fixed literal values identifying the envelope shape.
pub const ENVELOPE_TYPE: &str = "scoregraph.overlay";
/// Current envelope version. Bumped on any incompatible payload change.
pub const ENVELOPE_VERSION: u32 = 1;

/// Envelope header: a fixed `(type, version)` pair checked on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Fixed literal: [`ENVELOPE_TYPE`].
    #[serde(rename = "type")]
    pub type_: String,
    /// Envelope schema version.
    pub version: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            type_: ENVELOPE_TYPE.to_string(),
            version: ENVELOPE_VERSION,
        }
    }
}

/// The envelope's payload: the host graph's own canonical JSON plus the
/// overlay's derived state, every array in canonical (sorted) address
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// The host graph's canonical JSON, as returned by
    /// [`crate::graph::HostGraph::to_json`].
    pub graph_json: Value,
    /// One score per node, in canonical node-address order.
    pub scores: Vec<f64>,
    /// One `to_weight` per edge, in canonical edge-address order.
    pub to_weights: Vec<f64>,
    /// One `fro_weight` per edge, in canonical edge-address order.
    pub fro_weights: Vec<f64>,
    /// The overlay's synthetic loop weight.
    pub synthetic_loop_weight: f64,
}

/// A versioned `(header, payload)` pair: the full external form of a
/// [`ScoredGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The envelope header.
    pub header: Header,
    /// The envelope payload.
    pub payload: Payload,
}

/// Serialize `overlay` to its canonical [`Envelope`] form.
///
/// Two overlays that differ only in the order their underlying graphs were
/// built, but agree on graph/weights/scores/loop-weight, produce
/// byte-identical JSON: every array here is walked in canonical (sorted)
/// address order, never insertion order.
///
/// # Errors
///
/// Returns [`ScoreGraphError::GraphModified`] if the host graph changed
/// since the overlay was constructed.
pub fn to_envelope<G: HostGraph>(overlay: &ScoredGraph<'_, G>) -> Result<Envelope> {
    let graph = overlay.graph();
    let order = compiler::canonical_node_order(graph);
    let mut edges: Vec<_> = graph.edges(EdgeFilter::default()).collect();
    edges.sort_by(|a, b| a.address.cmp(&b.address));

    let mut scores = Vec::with_capacity(order.len());
    for address in &order {
        let node = overlay
            .node(address)?
            .ok_or_else(|| ScoreGraphError::UnknownNode {
                address: address.clone(),
            })?;
        scores.push(node.score);
    }

    let mut to_weights = Vec::with_capacity(edges.len());
    let mut fro_weights = Vec::with_capacity(edges.len());
    for edge in &edges {
        let weighted = overlay
            .edge(&edge.address)?
            .ok_or_else(|| ScoreGraphError::UnknownNode {
                address: edge.address.clone(),
            })?;
        to_weights.push(weighted.weight.to_weight);
        fro_weights.push(weighted.weight.fro_weight);
    }

    Ok(Envelope {
        header: Header::default(),
        payload: Payload {
            graph_json: graph.to_json(),
            scores,
            to_weights,
            fro_weights,
            synthetic_loop_weight: overlay.synthetic_loop_weight()?,
        },
    })
}

/// Reconstruct a `ScoredGraph` over `graph` from `envelope`.
///
/// `graph` must be the same host graph (by canonical JSON) the envelope was
/// serialized from: `envelope.payload.graph_json` is checked against
/// `graph.to_json()` before anything else is rebuilt. Weights and scores are
/// read back out of the envelope's parallel arrays in the same canonical
/// order [`to_envelope`] wrote them in, so `from_envelope(&graph,
/// &to_envelope(&overlay)?)? == overlay` for any overlay whose graph has not
/// since changed.
///
/// # Errors
///
/// Returns [`ScoreGraphError::CompatMismatch`] if the header doesn't match
/// [`ENVELOPE_TYPE`]/[`ENVELOPE_VERSION`], if `graph`'s canonical JSON
/// doesn't match the envelope's, or if the envelope's arrays don't match
/// `graph`'s node/edge counts. Returns [`ScoreGraphError::InvalidWeight`] or
/// [`ScoreGraphError::InvalidLoopWeight`] if the envelope's weights are no
/// longer valid for `graph`, or [`ScoreGraphError::Numeric`] if the
/// reconstructed chain fails column-stochasticity.
pub fn from_envelope<'g, G: HostGraph>(graph: &'g G, envelope: &Envelope) -> Result<ScoredGraph<'g, G>> {
    check_header(envelope)?;

    if graph.to_json() != envelope.payload.graph_json {
        return Err(ScoreGraphError::CompatMismatch {
            expected: "envelope graphJSON matching the supplied host graph".to_string(),
            found: "a different graphJSON".to_string(),
        });
    }

    let order = compiler::canonical_node_order(graph);
    let mut edges: Vec<_> = graph.edges(EdgeFilter::default()).collect();
    edges.sort_by(|a, b| a.address.cmp(&b.address));

    if order.len() != envelope.payload.scores.len() {
        return Err(ScoreGraphError::CompatMismatch {
            expected: format!("{} scores", order.len()),
            found: format!("{} scores", envelope.payload.scores.len()),
        });
    }
    if edges.len() != envelope.payload.to_weights.len() || edges.len() != envelope.payload.fro_weights.len() {
        return Err(ScoreGraphError::CompatMismatch {
            expected: format!("{} edge weights", edges.len()),
            found: format!(
                "{} toWeights, {} froWeights",
                envelope.payload.to_weights.len(),
                envelope.payload.fro_weights.len()
            ),
        });
    }

    let scores: HashMap<_, _> = order
        .iter()
        .cloned()
        .zip(envelope.payload.scores.iter().copied())
        .collect();

    let mut weights = HashMap::with_capacity(edges.len());
    for ((edge, &to_weight), &fro_weight) in edges
        .iter()
        .zip(envelope.payload.to_weights.iter())
        .zip(envelope.payload.fro_weights.iter())
    {
        let weight = EdgeWeight::new(&edge.address, to_weight, fro_weight)?;
        weights.insert(edge.address.clone(), weight);
    }

    crate::weight::validate_loop_weight(envelope.payload.synthetic_loop_weight)?;
    let compiled = compiler::compile(graph, &weights, envelope.payload.synthetic_loop_weight)?;

    Ok(ScoredGraph::from_parts(
        graph,
        weights,
        scores,
        compiled.total_out_weight,
        envelope.payload.synthetic_loop_weight,
    ))
}

/// Validate that `envelope`'s header matches the expected type and version.
///
/// # Errors
///
/// Returns [`ScoreGraphError::CompatMismatch`] if either field differs from
/// [`ENVELOPE_TYPE`]/[`ENVELOPE_VERSION`].
pub fn check_header(envelope: &Envelope) -> Result<()> {
    if envelope.header.type_ != ENVELOPE_TYPE || envelope.header.version != ENVELOPE_VERSION {
        return Err(ScoreGraphError::CompatMismatch {
            expected: format!("{ENVELOPE_TYPE}:{ENVELOPE_VERSION}"),
            found: format!("{}:{}", envelope.header.type_, envelope.header.version),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{EdgeAddress, NodeAddress};
    use crate::graph::{Edge, SimpleGraph};
    use crate::overlay::ScoredGraph;

    fn n(name: &str) -> NodeAddress {
        NodeAddress::new(["node", name])
    }

    fn e(name: &str) -> EdgeAddress {
        EdgeAddress::new(["edge", name])
    }

    fn to_only(_edge: &Edge) -> (f64, f64) {
        (1.0, 0.0)
    }

    #[test]
    fn envelope_json_round_trips() {
        let mut g = SimpleGraph::new();
        g.add_edge(e("ab"), n("a"), n("b"));
        let overlay = ScoredGraph::new(&g, to_only, 1e-3).unwrap();

        let envelope = to_envelope(&overlay).unwrap();
        let json = serde_json::to_string(&envelope).unwrap();
        let decoded: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(envelope, decoded);
        check_header(&decoded).unwrap();
    }

    #[tokio::test]
    async fn overlay_round_trips_through_an_envelope() {
        let mut g = SimpleGraph::new();
        g.add_edge(e("ab"), n("a"), n("b"));
        g.add_edge(e("bc"), n("b"), n("c"));
        let mut overlay = ScoredGraph::new(&g, to_only, 1e-3).unwrap();
        overlay
            .run(
                crate::overlay::Seed::NoSeed,
                crate::overlay::RunOptions {
                    max_iterations: 50,
                    convergence_threshold: 1e-6,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let envelope = to_envelope(&overlay).unwrap();
        let rebuilt = from_envelope(&g, &envelope).unwrap();
        assert_eq!(rebuilt, overlay);
    }

    #[test]
    fn from_envelope_rejects_a_graph_json_mismatch() {
        let mut g1 = SimpleGraph::new();
        g1.add_edge(e("ab"), n("a"), n("b"));
        let overlay = ScoredGraph::new(&g1, to_only, 1e-3).unwrap();
        let envelope = to_envelope(&overlay).unwrap();

        let mut g2 = SimpleGraph::new();
        g2.add_edge(e("xy"), n("x"), n("y"));
        let err = from_envelope(&g2, &envelope).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::CompatMismatch);
    }

    #[test]
    fn canonical_with_respect_to_construction_order() {
        let mut g1 = SimpleGraph::new();
        g1.add_edge(e("ab"), n("a"), n("b"));
        g1.add_edge(e("bc"), n("b"), n("c"));

        let mut g2 = SimpleGraph::new();
        g2.add_edge(e("bc"), n("b"), n("c"));
        g2.add_edge(e("ab"), n("a"), n("b"));

        let overlay1 = ScoredGraph::new(&g1, to_only, 1e-3).unwrap();
        let overlay2 = ScoredGraph::new(&g2, to_only, 1e-3).unwrap();

        let json1 = serde_json::to_string(&to_envelope(&overlay1).unwrap()).unwrap();
        let json2 = serde_json::to_string(&to_envelope(&overlay2).unwrap()).unwrap();
        assert_eq!(json1, json2);
    }

    #[test]
    fn rejects_mismatched_header() {
        let mut g = SimpleGraph::new();
        g.add_edge(e("ab"), n("a"), n("b"));
        let overlay = ScoredGraph::new(&g, to_only, 1e-3).unwrap();
        let mut envelope = to_envelope(&overlay).unwrap();
        envelope.header.version = ENVELOPE_VERSION + 1;
        let err = check_header(&envelope).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::CompatMismatch);
    }
}
