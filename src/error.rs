//! Error types for the scoregraph library.
//!
//! One variant per error kind in the engine's taxonomy; each carries the
//! offending address or field and a stable machine-readable code, following
//! the error/error-code split used elsewhere in this crate's lineage.

use std::fmt;

use thiserror::Error;

use crate::address::Address;

/// Stable codes describing [`ScoreGraphError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Host graph has zero nodes.
    EmptyGraph,
    /// `syntheticLoopWeight` was not strictly positive.
    InvalidLoopWeight,
    /// An edge-evaluator (or compiler) produced a negative, NaN, or infinite weight.
    InvalidWeight,
    /// The host graph's modification counter diverged from the overlay's snapshot.
    GraphModified,
    /// An address does not name a node of the host graph.
    UnknownNode,
    /// A caller-supplied options record was missing a required field.
    InvalidOptions,
    /// `equals` was called with an argument of the wrong type.
    TypeMismatch,
    /// A deserialized envelope's header did not match the expected type/version.
    CompatMismatch,
    /// `SPECIFIED_SEED` was requested.
    NotImplemented,
    /// A chain column failed to sum to 1 within epsilon.
    Numeric,
}

impl ErrorCode {
    /// The stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyGraph => "SCOREGRAPH_EMPTY_GRAPH",
            Self::InvalidLoopWeight => "SCOREGRAPH_INVALID_LOOP_WEIGHT",
            Self::InvalidWeight => "SCOREGRAPH_INVALID_WEIGHT",
            Self::GraphModified => "SCOREGRAPH_GRAPH_MODIFIED",
            Self::UnknownNode => "SCOREGRAPH_UNKNOWN_NODE",
            Self::InvalidOptions => "SCOREGRAPH_INVALID_OPTIONS",
            Self::TypeMismatch => "SCOREGRAPH_TYPE_MISMATCH",
            Self::CompatMismatch => "SCOREGRAPH_COMPAT_MISMATCH",
            Self::NotImplemented => "SCOREGRAPH_NOT_IMPLEMENTED",
            Self::Numeric => "SCOREGRAPH_NUMERIC",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced by constructing or operating a [`crate::overlay::ScoredGraph`].
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoreGraphError {
    /// Host graph has zero nodes.
    #[error("cannot build a scored graph over an empty host graph")]
    EmptyGraph,
    /// `syntheticLoopWeight` was not strictly positive.
    #[error("synthetic loop weight must be strictly positive (got {got})")]
    InvalidLoopWeight {
        /// The rejected value.
        got: f64,
    },
    /// An edge-evaluator (or compiler) produced a negative, NaN, or infinite weight.
    #[error("edge {address} has an invalid weight: {value} ({reason})")]
    InvalidWeight {
        /// The offending edge.
        address: Address,
        /// The rejected value.
        value: f64,
        /// Why it was rejected (negative, NaN, infinite).
        reason: &'static str,
    },
    /// The host graph's modification counter diverged from the overlay's snapshot.
    #[error("host graph was modified after the scored graph was constructed")]
    GraphModified,
    /// An address does not name a node of the host graph.
    #[error("{address} is not a node of the host graph")]
    UnknownNode {
        /// The address that was looked up.
        address: Address,
    },
    /// A caller-supplied options record was missing a required field.
    #[error("options record is missing required field `{field}`")]
    InvalidOptions {
        /// The missing field's name.
        field: &'static str,
    },
    /// `equals` was called with an argument of the wrong type.
    #[error("cannot compare a scored graph with a value of a different type")]
    TypeMismatch,
    /// A deserialized envelope's header did not match the expected type/version.
    #[error("envelope header mismatch: expected {expected}, found {found}")]
    CompatMismatch {
        /// The expected `type:version` string.
        expected: String,
        /// The header actually found.
        found: String,
    },
    /// `SPECIFIED_SEED` was requested.
    #[error("{feature} is not implemented")]
    NotImplemented {
        /// Name of the unimplemented feature.
        feature: &'static str,
    },
    /// A chain column failed to sum to 1 within epsilon.
    #[error("numeric invariant violated: {detail}")]
    Numeric {
        /// Human-readable description of the violated invariant.
        detail: String,
    },
}

impl ScoreGraphError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyGraph => ErrorCode::EmptyGraph,
            Self::InvalidLoopWeight { .. } => ErrorCode::InvalidLoopWeight,
            Self::InvalidWeight { .. } => ErrorCode::InvalidWeight,
            Self::GraphModified => ErrorCode::GraphModified,
            Self::UnknownNode { .. } => ErrorCode::UnknownNode,
            Self::InvalidOptions { .. } => ErrorCode::InvalidOptions,
            Self::TypeMismatch => ErrorCode::TypeMismatch,
            Self::CompatMismatch { .. } => ErrorCode::CompatMismatch,
            Self::NotImplemented { .. } => ErrorCode::NotImplemented,
            Self::Numeric { .. } => ErrorCode::Numeric,
        }
    }
}

/// Convenient alias for results returned by the public API.
pub type Result<T> = core::result::Result<T, ScoreGraphError>;
