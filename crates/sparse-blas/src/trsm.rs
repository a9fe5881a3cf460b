// crates/sparse-blas/src/trsm.rs

//! Task-recursive `trsm`/`trsv`: solve a triangular system in place of the
//! right-hand side.
//!
//! Only the three `(side, uplo, trans)` combinations the leaf layer
//! implements are accepted; every other combination is rejected with
//! [`BlasError::UnsupportedVariant`] before any recursion happens.

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::error::BlasError;
use crate::gemm::gemm;
use crate::gemv::gemv;
use crate::leaf::SequentialBlas;
use crate::submat::view_rows;
use crate::types::{Side, Trans, UpLo};

fn check_combo(op: &'static str, side: Side, uplo: UpLo, trans: Trans) -> Result<(), BlasError> {
    match (side, uplo, trans) {
        (Side::Left, UpLo::Lower, Trans::No)
        | (Side::Left, UpLo::Upper, Trans::No)
        | (Side::Right, UpLo::Upper, Trans::No) => Ok(()),
        _ => Err(BlasError::UnsupportedVariant { op, side, uplo, trans }),
    }
}

/// Solve `op(A)*X = alpha*B` (`Side::Left`) or `X*op(A) = alpha*B`
/// (`Side::Right`) in place of `B`, `A` triangular.
#[allow(clippy::too_many_arguments)]
pub fn trsm<S: Scalar, L: SequentialBlas<S>>(
    side: Side,
    uplo: UpLo,
    transa: Trans,
    m: usize,
    n: usize,
    alpha: S,
    a: &[S],
    ld_a: usize,
    b: &mut [S],
    ld_b: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) -> Result<(), BlasError> {
    check_combo("trsm", side, uplo, transa)?;
    trsm_rec(side, uplo, m, n, alpha, a, ld_a, b, ld_b, depth, cfg, leaf);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn trsm_rec<S: Scalar, L: SequentialBlas<S>>(
    side: Side,
    uplo: UpLo,
    m: usize,
    n: usize,
    alpha: S,
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
        leaf.trsm(side, uplo, Trans::No, m, n, alpha, a, ld_a, b, ld_b);
        return;
    }
    match (side, uplo) {
        (Side::Left, UpLo::Lower) => {
            let k = m / 2;
            let m2 = m - k;
            let (a_left, a_right) = a.split_at(k * ld_a);
            let (a11, a21) = view_rows(a_left, ld_a, k, k, m2);
            let (_, a22) = view_rows(a_right, ld_a, m2, k, m2);
            let (b1, b2) = b.split_at_mut(k);
            trsm_rec(side, uplo, k, n, alpha, a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
            gemm(Trans::No, Trans::No, m2, n, k, -S::one(), a21, ld_a, b1, ld_b, alpha, b2, ld_b, depth + 1, cfg, leaf);
            trsm_rec(side, uplo, m2, n, S::one(), a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
        }
        (Side::Left, UpLo::Upper) => {
            let k = m / 2;
            let m2 = m - k;
            let (a_left, a_right) = a.split_at(k * ld_a);
            let (a11, _) = view_rows(a_left, ld_a, k, k, m2);
            let (a12, a22) = view_rows(a_right, ld_a, m2, k, m2);
            let (b1, b2) = b.split_at_mut(k);
            trsm_rec(side, uplo, m2, n, alpha, a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
            gemm(Trans::No, Trans::No, k, n, m2, -S::one(), a12, ld_a, b2, ld_b, alpha, b1, ld_b, depth + 1, cfg, leaf);
            trsm_rec(side, uplo, k, n, S::one(), a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
        }
        (Side::Right, UpLo::Upper) => {
            let k = n / 2;
            let n2 = n - k;
            let (a_left, a_right) = a.split_at(k * ld_a);
            let (a11, _) = view_rows(a_left, ld_a, k, k, n2);
            let (a12, a22) = view_rows(a_right, ld_a, n2, k, n2);
            let (b1, b2) = b.split_at_mut(k * ld_b);
            trsm_rec(side, uplo, m, k, alpha, a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
            gemm(Trans::No, Trans::No, m, n2, k, -S::one(), b1, ld_b, a12, ld_a, alpha, b2, ld_b, depth + 1, cfg, leaf);
            trsm_rec(side, uplo, m, n2, S::one(), a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
        }
        _ => unreachable!("validated by check_combo"),
    }
}

/// Solve `op(A)*x = b` in place of `b`, `A` triangular `n x n`.
///
/// `side` has no meaning for a vector solve; [`BlasError::UnsupportedVariant`]
/// always reports `Side::Left` when rejecting an unsupported combination.
pub fn trsv<S: Scalar, L: SequentialBlas<S>>(
    uplo: UpLo,
    trans: Trans,
    n: usize,
    a: &[S],
    ld_a: usize,
    x: &mut [S],
    incx: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) -> Result<(), BlasError> {
    match trans {
        Trans::No => {}
        Trans::T => {
            return Err(BlasError::UnsupportedVariant { op: "trsv", side: Side::Left, uplo, trans });
        }
    }
    trsv_rec(uplo, n, a, ld_a, x, incx, depth, cfg, leaf);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn trsv_rec<S: Scalar, L: SequentialBlas<S>>(
    uplo: UpLo,
    n: usize,
    a: &[S],
    ld_a: usize,
    x: &mut [S],
    incx: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    if n == 0 {
        return;
    }
    if cfg.is_leaf(depth, &[n]) {
        leaf.trsv(uplo, Trans::No, n, a, ld_a, x, incx);
        return;
    }
    let k = n / 2;
    let n2 = n - k;
    let (a_left, a_right) = a.split_at(k * ld_a);
    let (x1, x2) = x.split_at_mut(k * incx);
    match uplo {
        UpLo::Lower => {
            let (a11, a21) = view_rows(a_left, ld_a, k, k, n2);
            let (_, a22) = view_rows(a_right, ld_a, n2, k, n2);
            trsv_rec(uplo, k, a11, ld_a, x1, incx, depth + 1, cfg, leaf);
            gemv(Trans::No, n2, k, -S::one(), a21, ld_a, x1, incx, S::one(), x2, incx, depth + 1, cfg, leaf);
            trsv_rec(uplo, n2, a22, ld_a, x2, incx, depth + 1, cfg, leaf);
        }
        UpLo::Upper => {
            let (a11, _) = view_rows(a_left, ld_a, k, k, n2);
            let (a12, a22) = view_rows(a_right, ld_a, n2, k, n2);
            trsv_rec(uplo, n2, a22, ld_a, x2, incx, depth + 1, cfg, leaf);
            gemv(Trans::No, k, n2, -S::one(), a12, ld_a, x2, incx, S::one(), x1, incx, depth + 1, cfg, leaf);
            trsv_rec(uplo, k, a11, ld_a, x1, incx, depth + 1, cfg, leaf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::DefaultBlas;

    #[test]
    fn matches_leaf_trsm_lower() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 4, tile_size: 1, threshold: 1 };
        let mut l = vec![0.0f64; 6 * 6];
        for i in 0..6 {
            for j in 0..=i {
                l[i + j * 6] = if i == j { 2.0 + i as f64 } else { ((i + j) as f64 * 0.1).sin() };
            }
        }
        let b0: Vec<f64> = (0..6 * 3).map(|v| v as f64 * 0.5 - 1.0).collect();
        let mut b_rec = b0.clone();
        let mut b_leaf = b0.clone();
        trsm(Side::Left, UpLo::Lower, Trans::No, 6, 3, 1.0, &l, 6, &mut b_rec, 6, 0, &cfg, &DefaultBlas).unwrap();
        DefaultBlas.trsm(Side::Left, UpLo::Lower, Trans::No, 6, 3, 1.0, &l, 6, &mut b_leaf, 6);
        for (x, y) in b_rec.iter().zip(b_leaf.iter()) {
            assert!((x - y).abs() < 1e-8);
        }
    }

    #[test]
    fn rejects_unsupported_combo() {
        let cfg = KernelConfig::default();
        let a = vec![1.0f64; 4];
        let mut b = vec![1.0f64; 4];
        let err = trsm(Side::Right, UpLo::Lower, Trans::No, 2, 2, 1.0, &a, 2, &mut b, 2, 0, &cfg, &DefaultBlas).unwrap_err();
        assert!(matches!(err, BlasError::UnsupportedVariant { op: "trsm", .. }));
    }
}
