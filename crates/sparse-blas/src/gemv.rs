// crates/sparse-blas/src/gemv.rs

//! Task-recursive `gemv`: `y := alpha*op(A)*x + beta*y`.
//!
//! Two dimensions only, so the split choice is binary: split the output
//! (non-contracting) dimension in parallel, or the contracting dimension
//! serially, whichever is larger.

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::leaf::SequentialBlas;
use crate::submat::view_rows;
use crate::task::fork_join;
use crate::types::Trans;

#[allow(clippy::too_many_arguments)]
pub fn gemv<S: Scalar, L: SequentialBlas<S>>(
    trans: Trans,
    m: usize,
    n: usize,
    alpha: S,
    a: &[S],
    ld_a: usize,
    x: &[S],
    incx: usize,
    beta: S,
    y: &mut [S],
    incy: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) {
    let (out_len, con_len) = match trans {
        Trans::No => (m, n),
        Trans::T => (n, m),
    };
    if out_len == 0 {
        return;
    }
    if con_len == 0 {
        for i in 0..out_len {
            let yi = &mut y[i * incy];
            *yi = if beta == S::zero() { S::zero() } else { *yi * beta };
        }
        return;
    }
    if cfg.is_leaf(depth, &[m, n]) {
        leaf.gemv(trans, m, n, alpha, a, ld_a, x, incx, beta, y, incy);
        return;
    }

    if out_len >= con_len {
        let o0 = out_len / 2;
        let o1 = out_len - o0;
        let (y0, y1) = y.split_at_mut(o0 * incy);
        match trans {
            Trans::No => {
                let (a0, a1) = view_rows(a, ld_a, n, o0, o1);
                fork_join(
                    depth + 1,
                    cfg,
                    || gemv(trans, o0, n, alpha, a0, ld_a, x, incx, beta, y0, incy, depth + 1, cfg, leaf),
                    || gemv(trans, o1, n, alpha, a1, ld_a, x, incx, beta, y1, incy, depth + 1, cfg, leaf),
                );
            }
            Trans::T => {
                let (a0, a1) = a.split_at(o0 * ld_a);
                fork_join(
                    depth + 1,
                    cfg,
                    || gemv(trans, m, o0, alpha, a0, ld_a, x, incx, beta, y0, incy, depth + 1, cfg, leaf),
                    || gemv(trans, m, o1, alpha, a1, ld_a, x, incx, beta, y1, incy, depth + 1, cfg, leaf),
                );
            }
        }
    } else {
        let c0 = con_len / 2;
        let c1 = con_len - c0;
        let (x0, x1) = x.split_at(c0 * incx);
        match trans {
            Trans::No => {
                let (a0, a1) = a.split_at(c0 * ld_a);
                gemv(trans, m, c0, alpha, a0, ld_a, x0, incx, beta, y, incy, depth + 1, cfg, leaf);
                gemv(trans, m, c1, alpha, a1, ld_a, x1, incx, S::one(), y, incy, depth + 1, cfg, leaf);
            }
            Trans::T => {
                let (a0, a1) = view_rows(a, ld_a, n, c0, c1);
                gemv(trans, c0, n, alpha, a0, ld_a, x0, incx, beta, y, incy, depth + 1, cfg, leaf);
                gemv(trans, c1, n, alpha, a1, ld_a, x1, incx, S::one(), y, incy, depth + 1, cfg, leaf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::DefaultBlas;

    #[test]
    fn matches_leaf_gemv_no_trans() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 6, tile_size: 2, threshold: 4 };
        let a: Vec<f64> = (0..7 * 5).map(|v| (v as f64 * 0.13).sin()).collect();
        let x: Vec<f64> = (0..5).map(|v| v as f64 + 1.0).collect();
        let mut y_rec = vec![1.0f64; 7];
        let mut y_leaf = vec![1.0f64; 7];
        gemv(Trans::No, 7, 5, 1.0, &a, 7, &x, 1, 0.5, &mut y_rec, 1, 0, &cfg, &DefaultBlas);
        DefaultBlas.gemv(Trans::No, 7, 5, 1.0, &a, 7, &x, 1, 0.5, &mut y_leaf, 1);
        for (p, q) in y_rec.iter().zip(y_leaf.iter()) {
            assert!((p - q).abs() < 1e-9);
        }
    }

    #[test]
    fn matches_leaf_gemv_trans() {
        let cfg = KernelConfig { task_recursion_cutoff_level: 6, tile_size: 2, threshold: 4 };
        let a: Vec<f64> = (0..7 * 5).map(|v| (v as f64 * 0.07).cos()).collect();
        let x: Vec<f64> = (0..7).map(|v| v as f64 - 2.0).collect();
        let mut y_rec = vec![0.0f64; 5];
        let mut y_leaf = vec![0.0f64; 5];
        gemv(Trans::T, 7, 5, 1.0, &a, 7, &x, 1, 0.0, &mut y_rec, 1, 0, &cfg, &DefaultBlas);
        DefaultBlas.gemv(Trans::T, 7, 5, 1.0, &a, 7, &x, 1, 0.0, &mut y_leaf, 1);
        for (p, q) in y_rec.iter().zip(y_leaf.iter()) {
            assert!((p - q).abs() < 1e-9);
        }
    }
}
