// crates/sparse-core/src/flops.rs

//! Process-wide floating-point operation counter, accumulated via an
//! atomic add (the allowed alternative to a thread-local-plus-reduction).
//! Lives here rather than in `sparse-blas` so `SparseStore::spmv` can
//! contribute to the same total every other kernel crate accumulates into.

use std::sync::atomic::{AtomicU64, Ordering};

static FLOP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Add `count` operations to the process-wide flop counter.
pub fn add(count: u64) {
    FLOP_COUNTER.fetch_add(count, Ordering::Relaxed);
}

/// Current value of the process-wide flop counter.
#[must_use]
pub fn total() -> u64 {
    FLOP_COUNTER.load(Ordering::Relaxed)
}

/// Reset the counter to zero. Intended for test isolation between scenario
/// runs; not part of the kernels' own call graph.
pub fn reset() {
    FLOP_COUNTER.store(0, Ordering::Relaxed);
}

/// `spmv` flop count for an `n x n` matrix with `nnz` stored entries:
/// `2*nnz - n`, times 4 for complex scalars.
#[must_use]
pub fn spmv_flops(nnz: usize, n: usize, is_complex: bool) -> u64 {
    let base = (2 * nnz).saturating_sub(n) as u64;
    if is_complex {
        4 * base
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spmv_flops_real_and_complex() {
        reset();
        assert_eq!(spmv_flops(10, 4, false), 16);
        assert_eq!(spmv_flops(10, 4, true), 64);
    }
}
