//! Criterion bench for `SparseStore::spmv` over banded matrices of growing
//! dimension. Throughput is reported in nonzeros (the quantity `spmv`'s cost
//! actually scales with).

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use sparse_bench_harness::banded_csr;

fn bench_spmv(c: &mut Criterion) {
    let mut group = c.benchmark_group("spmv_banded");

    for &n in &[1_000usize, 10_000usize, 100_000usize] {
        let band = 5;
        let store = banded_csr(n, band, 7);
        group.throughput(Throughput::Elements(store.nnz() as u64));

        let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
        group.bench_function(BenchmarkId::new("spmv", n), |b| {
            b.iter_batched(
                || black_box(vec![0.0f64; n]),
                |mut y| {
                    store.spmv(black_box(&x), &mut y);
                    black_box(y);
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spmv);
criterion_main!(benches);
