//! Criterion bench for the recursive `gemm`/`getrf` kernels across a range
//! of `KernelConfig::task_recursion_cutoff_level` values, to see where the
//! fork/join overhead stops paying for itself on a given machine.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use sparse_bench_harness::dense_system;
use sparse_blas::leaf::DefaultBlas;
use sparse_blas::{getrf, gemm, types::Trans, KernelConfig};

fn bench_gemm_cutoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm_vs_cutoff");
    let n = 256;
    let (a, _) = dense_system(n, 1, 11);
    let (b, _) = dense_system(n, 1, 13);

    for &cutoff in &[0u32, 2u32, 4u32, 6u32] {
        let cfg = KernelConfig { task_recursion_cutoff_level: cutoff, tile_size: 64, threshold: 64 };
        group.bench_function(BenchmarkId::new("gemm_256", cutoff), |bencher| {
            bencher.iter_batched(
                || black_box(vec![0.0f64; n * n]),
                |mut c_out| {
                    gemm(Trans::No, Trans::No, n, n, n, 1.0, &a, n, &b, n, 0.0, &mut c_out, n, 0, &cfg, &DefaultBlas);
                    black_box(c_out);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_getrf_cutoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("getrf_vs_cutoff");
    let n = 256;
    let (a0, _) = dense_system(n, 1, 17);

    for &cutoff in &[0u32, 2u32, 4u32, 6u32] {
        let cfg = KernelConfig { task_recursion_cutoff_level: cutoff, tile_size: 64, threshold: 64 };
        group.bench_function(BenchmarkId::new("getrf_256", cutoff), |bencher| {
            bencher.iter_batched(
                || black_box(a0.clone()),
                |mut a| {
                    black_box(getrf(n, n, &mut a, n, 0, &cfg, &DefaultBlas));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gemm_cutoff, bench_getrf_cutoff);
criterion_main!(benches);
