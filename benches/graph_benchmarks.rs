use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graphrank::graph::{GraphStore, NodeId};
use graphrank::{PageRank, PageRankArrayStorage, PageRankArrayStorageParallel, PageRankMapStorage, WorkerPool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random KNOWS graph with an average out-degree of 8
fn random_graph(size: usize) -> GraphStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = GraphStore::new();
    let ids: Vec<NodeId> = (0..size).map(|_| store.create_node("Person")).collect();
    for &from in &ids {
        for _ in 0..rng.gen_range(0..16) {
            let to = ids[rng.gen_range(0..size)];
            let _ = store.create_edge(from, to, "KNOWS");
        }
    }
    store
}

/// Benchmark adjacency index construction plus iteration for each storage layout
fn bench_serial(c: &mut Criterion) {
    let mut group = c.benchmark_group("pagerank_serial");

    for size in [1_000, 10_000].iter() {
        let store = random_graph(*size);

        group.bench_with_input(BenchmarkId::new("array", size), size, |b, _| {
            b.iter(|| {
                let mut pagerank = PageRankArrayStorage::new(&store);
                pagerank.compute_page_rank("Person", "KNOWS", 20).unwrap();
                criterion::black_box(pagerank.total_rank());
            });
        });

        group.bench_with_input(BenchmarkId::new("map", size), size, |b, _| {
            b.iter(|| {
                let mut pagerank = PageRankMapStorage::new(&store);
                pagerank.compute_page_rank("Person", "KNOWS", 20).unwrap();
                criterion::black_box(pagerank.total_rank());
            });
        });
    }
    group.finish();
}

/// Benchmark the worker pool engine at different worker counts
fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("pagerank_parallel");
    let store = random_graph(50_000);

    for workers in [1, 2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, &workers| {
            let pool = WorkerPool::with_size(workers, 100).unwrap();
            let mut pagerank = PageRankArrayStorageParallel::new(&store, pool);
            b.iter(|| {
                pagerank.compute_page_rank("Person", "KNOWS", 20).unwrap();
                criterion::black_box(pagerank.total_rank());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_serial, bench_parallel);
criterion_main!(benches);
