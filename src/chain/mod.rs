//! The Markov chain kernel (sparse column-stochastic matrix, one
//! power-iteration step) and the stationary-distribution solver built on
//! top of it.

pub mod kernel;
pub mod solver;

pub use kernel::{indicator, max_delta, step, uniform, Chain, Column, COLUMN_SUM_EPSILON};
pub use solver::{run_to_convergence, SolverInput, SolverOutput};
