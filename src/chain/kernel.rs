//! Sparse column-stochastic Markov chain kernel: one power-iteration step,
//! the convergence measure, and distribution builders.
//!
//! A [`Chain`] is a sequence of [`Column`]s, each column a pair of parallel
//! arrays `(targets, weights)` describing the nonzero entries of that
//! column, indexed by canonical position in the node order rather than by
//! address.

use crate::error::ScoreGraphError;

/// Numerical tolerance for column-stochasticity validation.
pub const COLUMN_SUM_EPSILON: f64 = 1e-9;

/// One column of a column-stochastic matrix: the nonzero rows `i` and
/// probabilities `P(i <- j)` of moving from node `j` (this column) to node
/// `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    /// Row indices with nonzero probability mass.
    pub targets: Vec<usize>,
    /// Probability mass per target, parallel to `targets`.
    pub weights: Vec<f64>,
}

impl Column {
    /// Sum of this column's weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// A sparse column-stochastic transition matrix over `n` canonically
/// indexed nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    columns: Vec<Column>,
}

impl Chain {
    /// Build a chain from its columns, validating that every column sums to
    /// 1 within [`COLUMN_SUM_EPSILON`].
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::Numeric`] if any column's weights do not
    /// sum to 1 within tolerance.
    pub fn new(columns: Vec<Column>) -> Result<Self, ScoreGraphError> {
        for (j, column) in columns.iter().enumerate() {
            let sum = column.sum();
            if (sum - 1.0).abs() > COLUMN_SUM_EPSILON {
                return Err(ScoreGraphError::Numeric {
                    detail: format!("column {j} sums to {sum}, expected 1 (+/- {COLUMN_SUM_EPSILON})"),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Number of nodes (columns) in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the chain has zero nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column for canonical index `j`.
    #[must_use]
    pub fn column(&self, j: usize) -> &Column {
        &self.columns[j]
    }
}

/// The uniform distribution `[1/n, ..., 1/n]` over `n` entries.
///
/// # Panics
///
/// Panics if `n` is zero (a distribution over zero nodes is undefined).
#[must_use]
pub fn uniform(n: usize) -> Vec<f64> {
    assert!(n > 0, "uniform distribution over zero nodes is undefined");
    vec![1.0 / n as f64; n]
}

/// A distribution whose mass is evenly spread over `selected` (by canonical
/// index), zero elsewhere. If `selected` is empty, falls back to
/// [`uniform`].
///
/// # Panics
///
/// Panics if `order_len` is zero, or if `selected` contains an index out of
/// range.
#[must_use]
pub fn indicator(order_len: usize, selected: &[usize]) -> Vec<f64> {
    assert!(order_len > 0, "indicator distribution over zero nodes is undefined");
    if selected.is_empty() {
        return uniform(order_len);
    }
    let mass = 1.0 / selected.len() as f64;
    let mut dist = vec![0.0; order_len];
    for &idx in selected {
        assert!(idx < order_len, "selected index {idx} out of range for {order_len} nodes");
        dist[idx] = mass;
    }
    dist
}

/// One power-iteration step with teleport: `pi' = alpha*seed + (1-alpha) *
/// (chain . pi)`.
///
/// # Panics
///
/// Panics if `pi` or `seed` do not have length equal to the chain's node
/// count, or if `alpha` is outside `[0, 1]`.
#[must_use]
pub fn step(chain: &Chain, pi: &[f64], seed: &[f64], alpha: f64) -> Vec<f64> {
    let n = chain.len();
    assert_eq!(pi.len(), n, "pi length must match chain size");
    assert_eq!(seed.len(), n, "seed length must match chain size");
    assert!((0.0..=1.0).contains(&alpha), "alpha must be in [0, 1]");

    let mut next = vec![0.0; n];
    for j in 0..n {
        let column = chain.column(j);
        let mass = pi[j];
        if mass == 0.0 {
            continue;
        }
        for (&target, &weight) in column.targets.iter().zip(column.weights.iter()) {
            next[target] += mass * weight;
        }
    }

    for i in 0..n {
        next[i] = alpha * seed[i] + (1.0 - alpha) * next[i];
    }
    next
}

/// The L-infinity norm of the difference between two distributions:
/// `max_i |pi'_i - pi_i|`.
///
/// # Panics
///
/// Panics if the two slices have different lengths.
#[must_use]
pub fn max_delta(pi: &[f64], pi_prime: &[f64]) -> f64 {
    assert_eq!(pi.len(), pi_prime.len(), "distributions must have matching length");
    pi.iter()
        .zip(pi_prime.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
