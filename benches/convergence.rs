//! Criterion benchmarks for scoregraph's solver.
//!
//! Measures the cost of driving a synthetic scale-free graph to convergence
//! under power iteration, across graph sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use scoregraph::address::{EdgeAddress, NodeAddress};
use scoregraph::graph::{Edge, SimpleGraph};
use scoregraph::overlay::{RunOptions, ScoredGraph, Seed};

/// Generate a scale-free-ish graph (BarabAsi-Albert model approximation)
/// for benchmark inputs, using a deterministic LCG for reproducibility.
fn generate_scale_free_graph(num_nodes: usize, edges_per_node: usize) -> SimpleGraph {
    let mut graph = SimpleGraph::new();
    let mut rng_state = 12345_u64;
    let mut edge_idx = 0usize;

    for node in 0..num_nodes {
        for _ in 0..edges_per_node {
            rng_state = rng_state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let target = (rng_state % num_nodes as u64) as usize;
            if target != node {
                graph.add_edge(
                    EdgeAddress::new(["edge", &edge_idx.to_string()]),
                    NodeAddress::new(["node", &node.to_string()]),
                    NodeAddress::new(["node", &target.to_string()]),
                );
                edge_idx += 1;
            }
        }
    }
    graph
}

fn uniform_weight(_edge: &Edge) -> (f64, f64) {
    (1.0, 0.0)
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay_construction");
    for size in [100, 500, 1000, 5000].iter() {
        let graph = generate_scale_free_graph(*size, 3);
        group.bench_with_input(BenchmarkId::new("new", size), &graph, |b, graph| {
            b.iter(|| {
                let overlay = ScoredGraph::with_default_loop_weight(black_box(graph), uniform_weight).unwrap();
                black_box(overlay);
            });
        });
    }
    group.finish();
}

fn bench_convergence(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_to_convergence");
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();

    for size in [100, 500, 1000, 5000].iter() {
        let graph = generate_scale_free_graph(*size, 3);
        group.bench_with_input(BenchmarkId::new("run", size), &graph, |b, graph| {
            b.iter(|| {
                let mut overlay = ScoredGraph::with_default_loop_weight(graph, uniform_weight).unwrap();
                let output = rt.block_on(overlay.run(
                    Seed::NoSeed,
                    RunOptions {
                        max_iterations: 100,
                        convergence_threshold: 1e-6,
                        ..RunOptions::default()
                    },
                ));
                black_box(output.unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_construction, bench_convergence);
criterion_main!(benches);
