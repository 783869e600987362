//! scoregraph: a weighted-graph PageRank scoring engine
//!
//! # Overview
//!
//! scoregraph overlays a weighted-graph power-iteration scorer onto a host's
//! own directed multigraph. Every node gets a synthetic self-loop; every
//! edge carries asymmetric `to`/`fro` weights; repeated power iteration
//! against a column-stochastic transition chain settles the overlay's
//! scores toward a stationary distribution.
//!
//! The host graph itself — storage, indexing, persistence — is out of
//! scope: callers implement [`graph::HostGraph`] over their own structure.
//! [`graph::SimpleGraph`] exists only so this crate's own tests and doc
//! examples have something concrete to run against.
//!
//! # Quick Start
//!
//! ```
//! # use scoregraph::address::{EdgeAddress, NodeAddress};
//! # use scoregraph::graph::{Edge, SimpleGraph};
//! # use scoregraph::overlay::{RunOptions, ScoredGraph, Seed};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = SimpleGraph::new();
//! graph.add_edge(
//!     EdgeAddress::new(["edge", "ab"]),
//!     NodeAddress::new(["a"]),
//!     NodeAddress::new(["b"]),
//! );
//!
//! let mut overlay = ScoredGraph::with_default_loop_weight(&graph, |_edge: &Edge| (1.0, 0.0))?;
//! let output = overlay.run(Seed::NoSeed, RunOptions::default()).await?;
//! println!("converged to within {}", output.convergence_delta);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Kernel** ([`chain`]) — a sparse column-stochastic transition matrix
//!   and a single power-iteration step.
//! - **Compiler** ([`compiler`]) — builds the canonical node order and
//!   compiles a host graph's edges plus synthetic loops into a chain.
//! - **Overlay** ([`overlay`]) — the public surface: derived weights,
//!   current scores, neighbor-contribution queries, and the async solver
//!   loop.
//! - **Serialization** ([`serde_form`]) — a versioned, canonical external
//!   form.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod chain;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod overlay;
pub mod serde_form;
pub mod weight;

pub use address::{Address, Direction, EdgeAddress, NodeAddress};
pub use error::{ErrorCode, Result, ScoreGraphError};
pub use graph::{Edge, EdgeFilter, HostGraph, NeighborOptions, SimpleGraph};
pub use overlay::{
    NeighborContribution, NodesOptions, RunOptions, RunOutput, ScoredGraph, ScoredNode, Seed,
    WeightedEdge,
};
pub use serde_form::{check_header, from_envelope, to_envelope, Envelope, Header, Payload};
pub use weight::{EdgeWeight, DEFAULT_SYNTHETIC_LOOP_WEIGHT};
