// crates/sparse-blas/src/trmm.rs

//! Task-recursive `trmm`: `B := alpha*op(A)*B` (`Side::Left`) or
//! `B := alpha*B*op(A)` (`Side::Right`), `A` triangular.
//!
//! Same three validated combinations as [`crate::trsm`]; the block
//! recursion multiplies the off-diagonal block into the *other* half
//! before that half is overwritten, so the stages below are ordered
//! (not independently parallelizable the way `gemm`'s splits are).

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::error::BlasError;
use crate::gemm::gemm;
use crate::leaf::SequentialBlas;
use crate::submat::view_rows;
use crate::types::{Side, Trans, UpLo};

fn check_combo(side: Side, uplo: UpLo, trans: Trans) -> Result<(), BlasError> {
    match (side, uplo, trans) {
        (Side::Left, UpLo::Lower, Trans::No)
        | (Side::Left, UpLo::Upper, Trans::No)
        | (Side::Right, UpLo::Upper, Trans::No) => Ok(()),
        _ => Err(BlasError::UnsupportedVariant { op: "trmm", side, uplo, trans }),
    }
}

/// `B := alpha*op(A)*B` (`Side::Left`) or `B := alpha*B*op(A)` (`Side::Right`).
#[allow(clippy::too_many_arguments)]
pub fn trmm<S: Scalar, L: SequentialBlas<S>>(
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
    check_combo(side, uplo, transa)?;
    trmm_rec(side, uplo, m, n, alpha, a, ld_a, b, ld_b, depth, cfg, leaf);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn trmm_rec<S: Scalar, L: SequentialBlas<S>>(
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
        leaf.trmm(side, uplo, Trans::No, m, n, alpha, a, ld_a, b, ld_b);
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
            trmm_rec(side, uplo, m2, n, alpha, a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
            gemm(Trans::No, Trans::No, m2, n, k, alpha, a21, ld_a, b1, ld_b, S::one(), b2, ld_b, depth + 1, cfg, leaf);
            trmm_rec(side, uplo, k, n, alpha, a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
        }
        (Side::Left, UpLo::Upper) => {
            let k = m / 2;
            let m2 = m - k;
            let (a_left, a_right) = a.split_at(k * ld_a);
            let (a11, _) = view_rows(a_left, ld_a, k, k, m2);
            let (a12, a22) = view_rows(a_right, ld_a, m2, k, m2);
            let (b1, b2) = b.split_at_mut(k);
            trmm_rec(side, uplo, k, n, alpha, a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
            gemm(Trans::No, Trans::No, k, n, m2, alpha, a12, ld_a, b2, ld_b, S::one(), b1, ld_b, depth + 1, cfg, leaf);
            trmm_rec(side, uplo, m2, n, alpha, a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
        }
        (Side::Right, UpLo::Upper) => {
            let k = n / 2;
            let n2 = n - k;
            let (a_left, a_right) = a.split_at(k * ld_a);
            let (a11, _) = view_rows(a_left, ld_a, k, k, n2);
            let (a12, a22) = view_rows(a_right, ld_a, n2, k, n2);
            let (b1, b2) = b.split_at_mut(k * ld_b);
            trmm_rec(side, uplo, m, n2, alpha, a22, ld_a, b2, ld_b, depth + 1, cfg, leaf);
            gemm(Trans::No, Trans::No, m, n2, k, alpha, b1, ld_b, a12, ld_a, S::one(), b2, ld_b, depth + 1, cfg, leaf);
            trmm_rec(side, uplo, m, k, alpha, a11, ld_a, b1, ld_b, depth + 1, cfg, leaf);
        }
        _ => unreachable!("validated by check_combo"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::DefaultBlas;
    use crate::trsm::trsm;

    #[test]
    fn matches_leaf_trmm_upper() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 4, tile_size: 1, threshold: 1 };
        let mut u = vec![0.0f64; 5 * 5];
        for i in 0..5 {
            for j in i..5 {
                u[i + j * 5] = if i == j { 1.5 + i as f64 } else { ((i + 2 * j) as f64 * 0.2).cos() };
            }
        }
        let b0: Vec<f64> = (0..5 * 4).map(|v| v as f64 * 0.3 + 1.0).collect();
        let mut b_rec = b0.clone();
        let mut b_leaf = b0.clone();
        trmm(Side::Left, UpLo::Upper, Trans::No, 5, 4, 2.0, &u, 5, &mut b_rec, 5, 0, &cfg, &DefaultBlas).unwrap();
        DefaultBlas.trmm(Side::Left, UpLo::Upper, Trans::No, 5, 4, 2.0, &u, 5, &mut b_leaf, 5);
        for (x, y) in b_rec.iter().zip(b_leaf.iter()) {
            assert!((x - y).abs() < 1e-8);
        }
    }

    #[test]
    fn trsm_then_trmm_round_trips_p9() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 3, tile_size: 2, threshold: 4 };
        let mut l = vec![0.0f64; 4 * 4];
        for i in 0..4 {
            for j in 0..=i {
                l[i + j * 4] = if i == j { 3.0 } else { 0.4 };
            }
        }
        let b0: Vec<f64> = (0..4 * 2).map(|v| v as f64 + 1.0).collect();
        let mut b = b0.clone();
        trsm(Side::Left, UpLo::Lower, Trans::No, 4, 2, 1.0, &l, 4, &mut b, 4, 0, &cfg, &DefaultBlas).unwrap();
        trmm(Side::Left, UpLo::Lower, Trans::No, 4, 2, 1.0, &l, 4, &mut b, 4, 0, &cfg, &DefaultBlas).unwrap();
        for (x, y) in b.iter().zip(b0.iter()) {
            assert!((x - y).abs() < 1e-8);
        }
    }
}
