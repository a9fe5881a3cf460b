// crates/sparse-blas/src/getrs.rs

//! `getrs`: solve `A*X = B` given `A`'s `dgetrf`-style factorization
//! (combined `L`/`U`, `piv`). Transpose solve is not supported in this
//! layer.

use sparse_core::Scalar;

use crate::config::KernelConfig;
use crate::error::BlasError;
use crate::getrf::trsm_unit_lower;
use crate::leaf::SequentialBlas;
use crate::rank1::laswp;
use crate::trsm::trsm;
use crate::types::{Side, Trans, UpLo};

/// Solve `A*X = B` in place of `B` (`n x nrhs`), given the `n x n`
/// factorization `a`/`piv` produced by [`crate::getrf::getrf`].
#[allow(clippy::too_many_arguments)]
pub fn getrs<S: Scalar, L: SequentialBlas<S>>(
    trans: Trans,
    n: usize,
    nrhs: usize,
    a: &[S],
    ld_a: usize,
    piv: &[usize],
    b: &mut [S],
    ld_b: usize,
    depth: u32,
    cfg: &KernelConfig,
    leaf: &L,
) -> Result<(), BlasError> {
    if trans != Trans::No {
        return Err(BlasError::UnsupportedVariant { op: "getrs", side: Side::Left, uplo: UpLo::Lower, trans });
    }
    if n == 0 || nrhs == 0 {
        return Ok(());
    }
    laswp(nrhs, b, ld_b, 0, n, piv, depth, cfg, leaf);
    trsm_unit_lower(n, nrhs, a, ld_a, b, ld_b, depth, cfg, leaf);
    trsm(Side::Left, UpLo::Upper, Trans::No, n, nrhs, S::one(), a, ld_a, b, ld_b, depth, cfg, leaf)
        .expect("(Left, Upper, No) is always a supported trsm combination");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::getrf::getrf;
    use crate::leaf::DefaultBlas;

    #[test]
    fn solves_scenario_s3_dense_system() {
        // A = [[4,3,0],[6,3,1],[0,2,5]] (col-major), b chosen so x = [1,1,1].
        let a0: Vec<f64> = vec![4.0, 6.0, 0.0, 3.0, 3.0, 2.0, 0.0, 1.0, 5.0];
        let mut a = a0.clone();
        let cfg = KernelConfig { task_recursion_cutoff_level: 3, tile_size: 1, threshold: 1 };
        let report = getrf(3, 3, &mut a, 3, 0, &cfg, &DefaultBlas);
        assert_eq!(report.info, None);

        // b = A * [1,1,1]^T, computed by hand from the column-major entries above.
        let mut b = vec![
            a0[0] + a0[3] + a0[6],
            a0[1] + a0[4] + a0[7],
            a0[2] + a0[5] + a0[8],
        ];
        getrs(Trans::No, 3, 1, &a, 3, &report.piv, &mut b, 3, 0, &cfg, &DefaultBlas).unwrap();
        for x in &b {
            assert!((x - 1.0).abs() < 1e-9, "{x}");
        }
    }

    #[test]
    fn rejects_transpose_solve() {
        let cfg = KernelConfig::default();
        let a = vec![1.0f64; 4];
        let piv = vec![0usize, 1];
        let mut b = vec![1.0f64; 2];
        let err = getrs(Trans::T, 2, 1, &a, 2, &piv, &mut b, 2, 0, &cfg, &DefaultBlas).unwrap_err();
        assert!(matches!(err, BlasError::UnsupportedVariant { op: "getrs", .. }));
    }
}
