// crates/sparse-blas/src/rank1.rs

//! Task-recursive `laswp` and the two rank-1 updates, `geru`/`gerc`.
//!
//! `laswp`'s row swaps are independent per column, so it splits on `n`
//! only (a safe column split). The rank-1 updates split on both `m` and
//! `n`: all four resulting quadrants of `A` are independent and may run
//! concurrently.

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::leaf::SequentialBlas;
use crate::submat::split_rows_mut;
use crate::task::fork_join;

/// Apply row interchanges `a[i] <-> a[piv[i]]` for `i` in `[k1, k2)`, in
/// increasing order (LAPACK `dlaswp` semantics), recursing over columns.
pub fn laswp<S: Scalar, L: SequentialBlas<S>>(
    n: usize,
    a: &mut [S],
    ld_a: usize,
    k1: usize,
    k2: usize,
    piv: &[usize],
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    if n == 0 || k1 >= k2 {
        return;
    }
    if cfg.is_leaf(depth, &[n]) {
        leaf.laswp(n, a, ld_a, k1, k2, piv);
        return;
    }
    let n0 = n / 2;
    let n1 = n - n0;
    let (a0, a1) = a.split_at_mut(n0 * ld_a);
    fork_join(
        depth + 1,
        cfg,
        || laswp(n0, a0, ld_a, k1, k2, piv, depth + 1, cfg, leaf),
        || laswp(n1, a1, ld_a, k1, k2, piv, depth + 1, cfg, leaf),
    );
}

#[allow(clippy::too_many_arguments)]
fn rank1_rec<S: Scalar, L: SequentialBlas<S>>(
    m: usize,
    n: usize,
    alpha: S,
    x: &[S],
    incx: usize,
    y: &[S],
    incy: usize,
    a: &mut [S],
    ld_a: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
    conjugated: bool,
) {
    if m == 0 || n == 0 {
        return;
    }
    if cfg.is_leaf(depth, &[m, n]) {
        if conjugated {
            leaf.gerc(m, n, alpha, x, incx, y, incy, a, ld_a);
        } else {
            leaf.geru(m, n, alpha, x, incx, y, incy, a, ld_a);
        }
        return;
    }
    let m0 = m / 2;
    let m1 = m - m0;
    let n0 = n / 2;
    let n1 = n - n0;
    let (x0, x1) = x.split_at(m0 * incx);
    let (y0, y1) = y.split_at(n0 * incy);
    let (a_left, a_right) = a.split_at_mut(n0 * ld_a);
    // SAFETY: m0+m1 == m <= ld_a (A's row count never exceeds its leading
    // dimension); each column group's top/bottom halves are disjoint rows.
    let (a00, a10) = unsafe { split_rows_mut(a_left, ld_a, n0, m0, m1) };
    let (a01, a11) = unsafe { split_rows_mut(a_right, ld_a, n1, m0, m1) };
    fork_join(
        depth + 1,
        cfg,
        || {
            fork_join(
                depth + 1,
                cfg,
                || rank1_rec(m0, n0, alpha, x0, incx, y0, incy, a00, ld_a, depth + 1, cfg, leaf, conjugated),
                || rank1_rec(m1, n0, alpha, x1, incx, y0, incy, a10, ld_a, depth + 1, cfg, leaf, conjugated),
            )
        },
        || {
            fork_join(
                depth + 1,
                cfg,
                || rank1_rec(m0, n1, alpha, x0, incx, y1, incy, a01, ld_a, depth + 1, cfg, leaf, conjugated),
                || rank1_rec(m1, n1, alpha, x1, incx, y1, incy, a11, ld_a, depth + 1, cfg, leaf, conjugated),
            )
        },
    );
}

/// Unconjugated rank-1 update: `A += alpha * x * yᵀ`, split across all
/// four quadrants of `A` in parallel.
#[allow(clippy::too_many_arguments)]
pub fn geru<S: Scalar, L: SequentialBlas<S>>(
    m: usize,
    n: usize,
    alpha: S,
    x: &[S],
    incx: usize,
    y: &[S],
    incy: usize,
    a: &mut [S],
    ld_a: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    rank1_rec(m, n, alpha, x, incx, y, incy, a, ld_a, depth, cfg, leaf, false);
}

/// Conjugated rank-1 update: `A += alpha * x * yᴴ`.
#[allow(clippy::too_many_arguments)]
pub fn gerc<S: Scalar, L: SequentialBlas<S>>(
    m: usize,
    n: usize,
    alpha: S,
    x: &[S],
    incx: usize,
    y: &[S],
    incy: usize,
    a: &mut [S],
    ld_a: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    rank1_rec(m, n, alpha, x, incx, y, incy, a, ld_a, depth, cfg, leaf, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::DefaultBlas;

    #[test]
    fn geru_matches_leaf() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 4, tile_size: 1, threshold: 1 };
        let x: Vec<f64> = (0..6).map(|v| v as f64 + 1.0).collect();
        let y: Vec<f64> = (0..5).map(|v| v as f64 * 0.5).collect();
        let a0: Vec<f64> = (0..6 * 5).map(|v| v as f64 * 0.1).collect();
        let mut a_rec = a0.clone();
        let mut a_leaf = a0.clone();
        geru(6, 5, 2.0, &x, 1, &y, 1, &mut a_rec, 6, 0, &cfg, &DefaultBlas);
        DefaultBlas.geru(6, 5, 2.0, &x, 1, &y, 1, &mut a_leaf, 6);
        for (p, q) in a_rec.iter().zip(a_leaf.iter()) {
            assert!((p - q).abs() < 1e-9);
        }
    }

    #[test]
    fn laswp_matches_leaf() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 3, tile_size: 1, threshold: 1 };
        let a0: Vec<f64> = (0..4 * 6).map(|v| v as f64).collect();
        let piv = vec![1usize, 1, 3, 3];
        let mut a_rec = a0.clone();
        let mut a_leaf = a0.clone();
        laswp(6, &mut a_rec, 4, 0, 4, &piv, 0, &cfg, &DefaultBlas);
        DefaultBlas.laswp(6, &mut a_leaf, 4, 0, 4, &piv);
        assert_eq!(a_rec, a_leaf);
    }
}
