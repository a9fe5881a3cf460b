//! Criterion bench for `SeparatorTree` construction from an elimination-tree
//! parent vector, over perfect binary trees of growing depth.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use sparse_bench_harness::perfect_binary_etree;
use sparse_septree::from_elimination_tree;

fn bench_septree(c: &mut Criterion) {
    let mut group = c.benchmark_group("septree_construction");

    for &depth in &[8u32, 12u32, 16u32] {
        let etree = perfect_binary_etree(depth);
        group.throughput(Throughput::Elements(etree.len() as u64));

        group.bench_function(BenchmarkId::new("from_elimination_tree", etree.len()), |b| {
            b.iter_batched(
                || black_box(etree.clone()),
                |etree| {
                    black_box(from_elimination_tree(black_box(&etree)));
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_septree);
criterion_main!(benches);
