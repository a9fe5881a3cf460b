// crates/sparse-blas/src/gemm.rs

//! Task-recursive `gemm`: `C := alpha*op(A)*op(B) + beta*C`.
//!
//! Splits the largest of `(m, n, k)` in half; an `m`- or `n`-split forks
//! two independent tasks joined by a barrier, a `k`-split serializes
//! (first half folds into `C` with the caller's `beta`, the second half
//! accumulates with `beta=1`).

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::leaf::SequentialBlas;
use crate::submat::split_rows_mut;
use crate::task::fork_join;
use crate::types::Trans;

fn offset_a_k(trans: Trans, k0: usize, ld_a: usize) -> usize {
    match trans {
        Trans::No => k0 * ld_a,
        Trans::T => k0,
    }
}

fn offset_b_k(trans: Trans, k0: usize, ld_b: usize) -> usize {
    match trans {
        Trans::No => k0,
        Trans::T => k0 * ld_b,
    }
}

fn offset_a_m(trans: Trans, m0: usize, ld_a: usize) -> usize {
    match trans {
        Trans::No => m0,
        Trans::T => m0 * ld_a,
    }
}

fn offset_b_n(trans: Trans, n0: usize, ld_b: usize) -> usize {
    match trans {
        Trans::No => n0 * ld_b,
        Trans::T => n0,
    }
}

/// `C := alpha*op(A)*op(B) + beta*C`. `A`/`B`/`C` are column-major;
/// `op(A)` is `m x k`, `op(B)` is `k x n`, `C` is `m x n`.
#[allow(clippy::too_many_arguments)]
pub fn gemm<S: Scalar, L: SequentialBlas<S>>(
    transa: Trans,
    transb: Trans,
    m: usize,
    n: usize,
    k: usize,
    alpha: S,
    a: &[S],
    ld_a: usize,
    b: &[S],
    ld_b: usize,
    beta: S,
    c: &mut [S],
    ld_c: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        // Dimension-error edge case: no contraction to
        // perform, so this degrades to a pure scale of C.
        for j in 0..n {
            for i in 0..m {
                let idx = i + j * ld_c;
                c[idx] = if beta == S::zero() { S::zero() } else { c[idx] * beta };
            }
        }
        return;
    }
    if cfg.is_leaf(depth, &[m, n, k]) {
        leaf.gemm(transa, transb, m, n, k, alpha, a, ld_a, b, ld_b, beta, c, ld_c);
        return;
    }

    if m >= n && m >= k {
        let m0 = m / 2;
        let m1 = m - m0;
        let a_off = offset_a_m(transa, m0, ld_a);
        // SAFETY: m0+m1 == m <= ld_c (C's row count never exceeds its
        // leading dimension); the two halves index disjoint C rows.
        let (c0, c1) = unsafe { split_rows_mut(c, ld_c, n, m0, m1) };
        fork_join(
            depth + 1,
            cfg,
            || gemm(transa, transb, m0, n, k, alpha, &a[..], ld_a, b, ld_b, beta, c0, ld_c, depth + 1, cfg, leaf),
            || gemm(transa, transb, m1, n, k, alpha, &a[a_off..], ld_a, b, ld_b, beta, c1, ld_c, depth + 1, cfg, leaf),
        );
    } else if n >= m && n >= k {
        let n0 = n / 2;
        let n1 = n - n0;
        let b_off = offset_b_n(transb, n0, ld_b);
        let c_off = n0 * ld_c;
        let (c0, c1) = c.split_at_mut(c_off);
        fork_join(
            depth + 1,
            cfg,
            || gemm(transa, transb, m, n0, k, alpha, a, ld_a, &b[..], ld_b, beta, c0, ld_c, depth + 1, cfg, leaf),
            || gemm(transa, transb, m, n1, k, alpha, a, ld_a, &b[b_off..], ld_b, beta, c1, ld_c, depth + 1, cfg, leaf),
        );
    } else {
        // k-split: serialized, C := alpha*A0*B0 + beta*C, then C += alpha*A1*B1.
        let k0 = k / 2;
        let k1 = k - k0;
        let a_off = offset_a_k(transa, k0, ld_a);
        let b_off = offset_b_k(transb, k0, ld_b);
        gemm(transa, transb, m, n, k0, alpha, a, ld_a, b, ld_b, beta, c, ld_c, depth + 1, cfg, leaf);
        gemm(
            transa,
            transb,
            m,
            n,
            k1,
            alpha,
            &a[a_off..],
            ld_a,
            &b[b_off..],
            ld_b,
            S::one(),
            c,
            ld_c,
            depth + 1,
            cfg,
            leaf,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::DefaultBlas;

    #[test]
    fn matches_leaf_gemm_at_shallow_cutoff() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 6, tile_size: 2, threshold: 8 };
        let a: Vec<f64> = (0..8 * 8).map(|v| v as f64 * 0.1).collect();
        let b: Vec<f64> = (0..8 * 8).map(|v| (v as f64 * 0.2).sin()).collect();
        let mut c_rec = vec![0.0f64; 8 * 8];
        let mut c_leaf = vec![0.0f64; 8 * 8];
        gemm(Trans::No, Trans::No, 8, 8, 8, 1.0, &a, 8, &b, 8, 0.0, &mut c_rec, 8, 0, &cfg, &DefaultBlas);
        DefaultBlas.gemm(Trans::No, Trans::No, 8, 8, 8, 1.0, &a, 8, &b, 8, 0.0, &mut c_leaf, 8);
        for (x, y) in c_rec.iter().zip(c_leaf.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn cutoff_consistency_matches_sequential_default() {
        // cutoff=0 degenerates to the sequential leaf path everywhere.
        let a: Vec<f64> = (0..6 * 6).map(|v| v as f64 * 0.3 - 1.0).collect();
        let b: Vec<f64> = (0..6 * 6).map(|v| (v as f64 * 0.7).cos()).collect();
        let seq = KernelConfig::sequential();
        let par = KernelConfig { task_recursion_cutoff_level: 8, tile_size: 2, threshold: 4 };
        let mut c_seq = vec![0.0f64; 6 * 6];
        let mut c_par = vec![0.0f64; 6 * 6];
        gemm(Trans::No, Trans::No, 6, 6, 6, 1.0, &a, 6, &b, 6, 0.0, &mut c_seq, 6, 0, &seq, &DefaultBlas);
        gemm(Trans::No, Trans::No, 6, 6, 6, 1.0, &a, 6, &b, 6, 0.0, &mut c_par, 6, 0, &par, &DefaultBlas);
        for (x, y) in c_seq.iter().zip(c_par.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}
