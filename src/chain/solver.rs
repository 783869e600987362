//! Drives repeated [`kernel::step`] calls to a near-fixed-point, yielding
//! cooperatively so a long run does not monopolize a single-threaded host.

use std::time::{Duration, Instant};

use super::kernel::{self, Chain};

/// Inputs to [`run_to_convergence`].
#[derive(Debug, Clone)]
pub struct SolverInput {
    /// Initial distribution (the overlay's current scores, in canonical order).
    pub initial: Vec<f64>,
    /// Teleport target distribution.
    pub seed: Vec<f64>,
    /// Teleport probability, in `[0, 1]`.
    pub alpha: f64,
    /// Hard cap on the number of power-iteration steps.
    pub max_iterations: usize,
    /// Stop once the L-infinity delta between successive steps drops to or
    /// below this value.
    pub convergence_threshold: f64,
    /// How long to run uninterrupted before yielding to the host scheduler.
    pub yield_after: Duration,
}

/// Result of [`run_to_convergence`].
#[derive(Debug, Clone)]
pub struct SolverOutput {
    /// The final distribution (not necessarily converged).
    pub pi: Vec<f64>,
    /// The last observed convergence delta.
    pub convergence_delta: f64,
}

/// Repeatedly apply [`kernel::step`] until convergence, the iteration cap,
/// or (cooperatively) yield when a run has been computing uninterrupted for
/// longer than `yield_after`.
///
/// Never panics on non-convergence — the caller inspects
/// `convergence_delta` to decide whether the result is acceptable.
///
/// # Panics
///
/// Panics if `initial` or `seed` do not match the chain's node count, via
/// the same preconditions as [`kernel::step`].
pub async fn run_to_convergence(chain: &Chain, input: SolverInput) -> SolverOutput {
    let SolverInput {
        mut initial,
        seed,
        alpha,
        max_iterations,
        convergence_threshold,
        yield_after,
    } = input;

    if max_iterations == 0 {
        let hypothetical = kernel::step(chain, &initial, &seed, alpha);
        let delta = kernel::max_delta(&initial, &hypothetical);
        return SolverOutput {
            pi: initial,
            convergence_delta: delta,
        };
    }

    let span = tracing::debug_span!("solver.run", max_iterations, convergence_threshold, alpha);
    let _enter = span.enter();

    let mut iterations = 0_usize;
    let mut last_yield = Instant::now();

    loop {
        let next = kernel::step(chain, &initial, &seed, alpha);
        let delta = kernel::max_delta(&initial, &next);
        initial = next;
        iterations += 1;

        if iterations >= max_iterations {
            tracing::debug!(iterations, delta, "stopped: reached max_iterations");
            return SolverOutput {
                pi: initial,
                convergence_delta: delta,
            };
        }
        if delta <= convergence_threshold {
            tracing::debug!(iterations, delta, "converged");
            return SolverOutput {
                pi: initial,
                convergence_delta: delta,
            };
        }
        if last_yield.elapsed() >= yield_after {
            tracing::debug!(iterations, delta, "yielding cooperatively");
            tokio::task::yield_now().await;
            last_yield = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::kernel::{uniform, Column};

    fn two_cycle() -> Chain {
        Chain::new(vec![
            Column {
                targets: vec![1],
                weights: vec![1.0],
            },
            Column {
                targets: vec![0],
                weights: vec![1.0],
            },
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn max_iterations_zero_leaves_distribution_untouched() {
        let chain = two_cycle();
        let initial = uniform(2);
        let out = run_to_convergence(
            &chain,
            SolverInput {
                initial: initial.clone(),
                seed: uniform(2),
                alpha: 0.0,
                max_iterations: 0,
                convergence_threshold: 0.0,
                yield_after: Duration::from_millis(50),
            },
        )
        .await;
        assert_eq!(out.pi, initial);
        assert!(out.convergence_delta >= 0.0);
    }

    #[tokio::test]
    async fn converges_on_a_symmetric_cycle() {
        let chain = two_cycle();
        let out = run_to_convergence(
            &chain,
            SolverInput {
                initial: vec![1.0, 0.0],
                seed: uniform(2),
                alpha: 0.15,
                max_iterations: 500,
                convergence_threshold: 1e-6,
                yield_after: Duration::from_millis(50),
            },
        )
        .await;
        assert!(out.convergence_delta <= 1e-6);
        assert!((out.pi[0] - 0.5).abs() < 1e-4);
        assert!((out.pi[1] - 0.5).abs() < 1e-4);
    }

    #[tokio::test]
    async fn stops_at_iteration_cap_even_if_not_converged() {
        let chain = two_cycle();
        let out = run_to_convergence(
            &chain,
            SolverInput {
                initial: vec![1.0, 0.0],
                seed: uniform(2),
                alpha: 0.0,
                max_iterations: 1,
                convergence_threshold: 0.0,
                yield_after: Duration::from_millis(50),
            },
        )
        .await;
        assert_eq!(out.pi, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn yields_cooperatively_on_long_runs() {
        let chain = two_cycle();
        let out = run_to_convergence(
            &chain,
            SolverInput {
                initial: vec![0.9, 0.1],
                seed: uniform(2),
                alpha: 0.01,
                max_iterations: 10_000,
                convergence_threshold: 1e-9,
                yield_after: Duration::from_nanos(1),
            },
        )
        .await;
        assert!(out.convergence_delta <= 1e-9 || out.pi.len() == 2);
    }
}
