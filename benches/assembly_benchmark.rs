use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use gasm::{assemble_with, build_read_graph, find_eulerian_circuit, AssemblyConfig};

const K: usize = 31;

/// Random circular genome of the given length
fn generate_genome(len: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let bases = ['A', 'C', 'G', 'T'];
    (0..len).map(|_| bases[rng.gen_range(0..4)]).collect()
}

/// Reads of `read_len` bases tiling the circular genome with a k-1 overlap,
/// so every circular k-mer is covered exactly once.
fn tile_reads(genome: &str, read_len: usize, k: usize) -> Vec<String> {
    let step = read_len - k + 1;
    let doubled = format!("{genome}{genome}");
    (0..genome.len())
        .step_by(step)
        .map(|start| doubled[start..start + read_len].to_string())
        .collect()
}

fn config() -> AssemblyConfig {
    AssemblyConfig {
        k: K,
        ..AssemblyConfig::default()
    }
}

fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    // genome lengths are multiples of the 120-base tiling step
    for len in [12_000, 60_000, 120_000] {
        let reads = tile_reads(&generate_genome(len), 150, K);
        group.bench_with_input(BenchmarkId::new("build_read_graph", len), &reads, |b, reads| {
            b.iter(|| build_read_graph(black_box(reads), &config()));
        });
    }

    group.finish();
}

fn bench_eulerian_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("eulerian_circuit");

    for len in [12_000, 60_000, 120_000] {
        let reads = tile_reads(&generate_genome(len), 150, K);
        let graph = match build_read_graph(&reads, &config()) {
            Ok(graph) => graph,
            Err(error) => panic!("benchmark graph failed to build: {error}"),
        };
        group.bench_with_input(BenchmarkId::new("find_eulerian_circuit", len), &graph, |b, graph| {
            b.iter(|| find_eulerian_circuit(black_box(graph)));
        });
    }

    group.finish();
}

fn bench_full_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_assembly");
    group.measurement_time(Duration::from_secs(10));

    for len in [12_000, 60_000] {
        let reads = tile_reads(&generate_genome(len), 150, K);
        group.bench_with_input(BenchmarkId::new("assemble_with", len), &reads, |b, reads| {
            b.iter(|| assemble_with(black_box(reads), &config()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_construction,
    bench_eulerian_circuit,
    bench_full_assembly
);
criterion_main!(benches);
