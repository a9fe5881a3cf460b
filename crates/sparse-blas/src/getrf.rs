// crates/sparse-blas/src/getrf.rs

//! Task-recursive `getrf`: LU factorization with partial pivoting, stored
//! combined (unit lower triangle implicit below the diagonal, `U` on and
//! above it), matching LAPACK's `dgetrf` convention.
//!
//! Recursive panel algorithm (panel width `nb = min(m, n/2)`):
//! 1. factor the left `m x nb` panel recursively,
//! 2. apply its pivots to the right `m x (n-nb)` panel,
//! 3. solve `L11 * U12 = A12` (unit lower, top `nb` rows of the right panel),
//! 4. trailing update `A22 -= L21 * U12`,
//! 5. factor the `(m-nb) x (n-nb)` trailing submatrix recursively,
//! 6. apply its pivots (offset by `nb`) to the left panel's bottom rows,
//! 7. merge the two pivot vectors (the trailing one offset by `nb`).

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::error::GetrfReport;
use crate::gemm::gemm;
use crate::leaf::SequentialBlas;
use crate::rank1::laswp;
use crate::submat::{split_rows_mut, view_rows};

/// Forward substitution against a unit-diagonal lower-triangular `L`
/// (the diagonal is never read: `dgetrf`'s combined storage holds `U`'s
/// diagonal there, not `L`'s implicit `1`). Unblocked; `nb` is already
/// recursion-bounded by the time this runs.
fn solve_unit_lower_panel<S: Scalar>(nb: usize, n2: usize, l11: &[S], ld_l: usize, b: &mut [S], ld_b: usize) {
    for j in 0..n2 {
        for i in 0..nb {
            let mut sum = b[i + j * ld_b];
            for l in 0..i {
                sum -= l11[i + l * ld_l] * b[l + j * ld_b];
            }
            b[i + j * ld_b] = sum;
        }
    }
}

/// `B := L^-1 * B` for a unit lower-triangular `L` (`m x m`, diagonal
/// implicit), recursing the same way [`crate::trsm::trsm`] does. Used
/// internally by [`getrf`]'s panel update and by `getrs` to apply the `L`
/// factor; not exposed as a validated `(side, uplo, trans)` entry point
/// since the unit diagonal is specific to `dgetrf`'s storage convention.
pub(crate) fn trsm_unit_lower<S: Scalar, L: SequentialBlas<S>>(
    m: usize,
    n: usize,
    a: &[S],
    ld_a: usize,
    b: &mut [S],
    ld_b: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    if m == 0 || n == 0 {
        return;
    }
    if cfg.is_leaf(depth, &[m, n]) {
        solve_unit_lower_panel(m, n, a, ld_a, b, ld_b);
        return;
    }
    let k = m / 2;
    let m2 = m - k;
    let (a_left, a_right) = a.split_at(k * ld_a);
    let (a11, a21) = view_rows(a_left, ld_a, k, k, m2);
    let (_, a22) = view_rows(a_right, ld_a, m2, k, m2);
    let (b1, b2) = b.split_at_mut(k);
    trsm_unit_lower(k, n, a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
    gemm(
        crate::types::Trans::No,
        crate::types::Trans::No,
        m2,
        n,
        k,
        -S::one(),
        a21,
        ld_a,
        b1,
        ld_b,
        S::one(),
        b2,
        ld_b,
        depth + 1,
        cfg,
        leaf,
    );
    trsm_unit_lower(m2, n, a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
}

/// Recursive LU factorization with partial pivoting of an `m x n` matrix,
/// in place. `piv[k]` (for `k` in `0..min(m,n)`) is the absolute row
/// swapped into position `k`.
pub fn getrf<S: Scalar, L: SequentialBlas<S>>(
    m: usize,
    n: usize,
    a: &mut [S],
    ld_a: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) -> GetrfReport {
    let minmn = m.min(n);
    let mut piv = vec![0usize; minmn];
    let info = getrf_rec(m, n, a, ld_a, &mut piv, depth, cfg, leaf);
    GetrfReport { piv, info }
}

fn getrf_rec<S: Scalar, L: SequentialBlas<S>>(
    m: usize,
    n: usize,
    a: &mut [S],
    ld_a: usize,
    piv: &mut [usize],
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) -> Option<usize> {
    if m == 0 || n == 0 {
        return None;
    }
    if n == 1 || m == 1 || cfg.is_leaf(depth, &[m, n]) {
        return leaf.getrf(m, n, a, ld_a, piv);
    }

    let nb = (n / 2).min(m).max(1);
    let n2 = n - nb;
    let (left, right) = a.split_at_mut(nb * ld_a);

    let info_left = getrf_rec(m, nb, left, ld_a, &mut piv[..nb.min(m)], depth + 1, cfg, leaf);

    // Step 2: apply the left panel's pivots to the right panel's rows.
    laswp(n2, right, ld_a, 0, nb.min(m), &piv[..nb.min(m)], depth + 1, cfg, leaf);

    // Steps 3-4: solve L11*U12 = A12, then A22 -= L21*U12.
    let (left_top, left_bot) = view_rows(left, ld_a, nb, nb, m - nb);
    let (right_top, right_bot) = split_rows_mut(right, ld_a, n2, nb, m - nb);
    trsm_unit_lower(nb, n2, left_top, ld_a, right_top, ld_a, depth + 1, cfg, leaf);
    gemm(
        crate::types::Trans::No,
        crate::types::Trans::No,
        m - nb,
        n2,
        nb,
        -S::one(),
        left_bot,
        ld_a,
        right_top,
        ld_a,
        S::one(),
        right_bot,
        ld_a,
        depth + 1,
        cfg,
        leaf,
    );

    // Step 5: factor the trailing submatrix (rows offset by nb, so its
    // pivots come back local to [0, m-nb) and must be shifted by nb).
    let mut piv_trailing = vec![0usize; (m - nb).min(n2)];
    let info_trailing = getrf_rec(m - nb, n2, right_bot, ld_a, &mut piv_trailing, depth + 1, cfg, leaf);

    // Step 6: apply the trailing pivots (now absolute) to the left panel's
    // already-factored bottom rows.
    let abs_piv: Vec<usize> = piv_trailing.iter().map(|&p| p + nb).collect();
    laswp(nb, left_bot_mut(left, ld_a, nb, m, nb), ld_a, 0, (m - nb).min(n2), &abs_piv, depth + 1, cfg, leaf);

    // Step 7: merge.
    for (k, &p) in abs_piv.iter().enumerate() {
        piv[nb + k] = p;
    }

    match (info_left, info_trailing) {
        (Some(c), _) => Some(c),
        (None, Some(c)) => Some(c + nb),
        (None, None) => None,
    }
}

// SAFETY: `left_bot` above is already a disjoint mutable view into `left`
// produced by `view_rows`/`split_rows_mut`, but step 6 needs to re-borrow
// the same bottom rows of `left` mutably for `laswp` after step 5 has
// already ended its borrow of `left`'s split. This helper re-derives that
// view from scratch rather than threading the earlier borrow through the
// borrow-checker-hostile control flow above.
fn left_bot_mut<S>(left: &mut [S], ld_a: usize, nb: usize, m: usize, m0: usize) -> &mut [S] {
    // SAFETY: `m0 + (m - m0) == m <= ld_a`; `left`'s column count is `nb`.
    let (_, bot) = unsafe { split_rows_mut(left, ld_a, nb, m0, m - m0) };
    bot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::DefaultBlas;

    #[test]
    fn matches_leaf_getrf_small_dense_system() {
        // A = [[4,3,0],[6,3,1],[0,2,5]] (col-major).
        let mut a_rec: Vec<f64> = vec![4.0, 6.0, 0.0, 3.0, 3.0, 2.0, 0.0, 1.0, 5.0];
        let mut a_leaf = a_rec.clone();
        let cfg = KernelConfig { task_recursion_cutoff_level: 4, tile_size: 1, threshold: 1 };
        let report = getrf(3, 3, &mut a_rec, 3, 0, &cfg, &DefaultBlas);
        let mut piv_leaf = vec![0usize; 3];
        let info_leaf = DefaultBlas.getrf(3, 3, &mut a_leaf, 3, &mut piv_leaf);
        assert_eq!(report.info, info_leaf);
        for (x, y) in a_rec.iter().zip(a_leaf.iter()) {
            assert!((x - y).abs() < 1e-9, "{x} vs {y}");
        }
    }

    #[test]
    fn matches_leaf_getrf_wider() {
        let n = 8;
        let a0: Vec<f64> = (0..n * n).map(|v| ((v as f64) * 0.37).sin() + if v % (n + 1) == 0 { 5.0 } else { 0.0 }).collect();
        let mut a_rec = a0.clone();
        let mut a_leaf = a0.clone();
        let cfg = KernelConfig { task_recursion_cutoff_level: 4, tile_size: 2, threshold: 4 };
        let report = getrf(n, n, &mut a_rec, n, 0, &cfg, &DefaultBlas);
        let mut piv_leaf = vec![0usize; n];
        DefaultBlas.getrf(n, n, &mut a_leaf, n, &mut piv_leaf);
        assert_eq!(report.piv, piv_leaf);
        for (x, y) in a_rec.iter().zip(a_leaf.iter()) {
            assert!((x - y).abs() < 1e-8, "{x} vs {y}");
        }
    }
}
