//! Opaque, totally ordered node/edge addresses.
//!
//! Addresses are sequences of string "parts", ordered lexicographically by
//! `Vec<String>`'s derived `Ord`. This mirrors the array-of-parts addressing
//! scheme used throughout the contribution-attribution lineage this engine
//! was distilled from: total order plus prefix matching fall out of the
//! same representation for free.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, totally ordered identifier for a node or an edge.
///
/// Two addresses compare by comparing their parts lexicographically
/// (shorter sequences sort before longer ones that share a common prefix,
/// matching `Vec<T>`'s `Ord` impl).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(Vec<String>);

impl Address {
    /// Build an address from its parts.
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// The address's parts, in order.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Whether `self` begins with every part of `prefix`, in order.
    #[must_use]
    pub fn has_prefix(&self, prefix: &Address) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl<S: Into<String>> FromIterator<S> for Address {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Identifies a node. A distinct type alias from [`EdgeAddress`] for
/// self-documenting signatures even though both share a representation.
pub type NodeAddress = Address;

/// Identifies an edge.
pub type EdgeAddress = Address;

/// Direction of traversal relative to a target node, matching the host
/// graph's `neighbors` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Only edges whose `dst` is the target.
    In,
    /// Only edges whose `src` is the target.
    Out,
    /// Edges in either direction.
    Any,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_lexicographically() {
        let a = Address::new(["a"]);
        let ab = Address::new(["a", "b"]);
        let b = Address::new(["b"]);
        assert!(a < ab);
        assert!(ab < b);
    }

    #[test]
    fn prefix_matching() {
        let base = Address::new(["author", "alice"]);
        let full = Address::new(["author", "alice", "commit", "1"]);
        assert!(full.has_prefix(&base));
        assert!(!base.has_prefix(&full));
        assert!(full.has_prefix(&Address::new(Vec::<&str>::new())));
    }

    #[test]
    fn display_joins_parts() {
        let addr = Address::new(["author", "alice"]);
        assert_eq!(addr.to_string(), "author/alice");
    }
}
