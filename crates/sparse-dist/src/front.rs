// crates/sparse-dist/src/front.rs

//! `front_multiply_2d`: the distributed counterpart of
//! [`sparse_extract::front_multiply`].
//!
//! Redistributes `R`, `Srow`, `Scol` to 1D column-cyclic layout (block size
//! equal to the matrix height, so each column lives entirely on one process
//! column), runs the same per-row merge-scan as the local version, and
//! turns every matched entry into a `pgeadd` of one row into another rather
//! than a direct array write. Redistributes `Srow`/`Scol` back before
//! returning.

use sparse_core::{IndexInt, Scalar, SparseStore};

use crate::error::DistError;
use crate::transport::{BlockCyclicMatrix, BlockCyclicTransport, ProcessGrid};

#[inline]
fn as_usize<I: IndexInt>(i: I) -> usize {
    let v: u64 = i.into();
    v as usize
}

/// Distributed counterpart of `sparse_extract::front_multiply`: same
/// separator/update merge-scan, each contribution applied via `transport`'s
/// `pgeadd` instead of a local accumulate. Returns this process's local
/// flop count.
///
/// # Errors
/// Propagates the first [`DistError`] any transport call reports.
#[allow(clippy::too_many_arguments)]
pub fn front_multiply_2d<S: Scalar, I: IndexInt, T: BlockCyclicTransport<S>>(
    store: &SparseStore<S, I>,
    slo: usize,
    shi: usize,
    upd: &[usize],
    grid: ProcessGrid,
    r: &BlockCyclicMatrix<S>,
    srow: &mut BlockCyclicMatrix<S>,
    scol: &mut BlockCyclicMatrix<S>,
    transport: &T,
) -> Result<f64, DistError> {
    let ds = shi - slo;
    let r1d = transport.redistribute_to_column_cyclic(grid, r)?;
    let mut srow1d = transport.redistribute_to_column_cyclic(grid, srow)?;
    let mut scol1d = transport.redistribute_to_column_cyclic(grid, scol)?;
    let ncols = r1d.global_cols as f64;
    let mut local_flops = 0.0f64;

    for row in slo..shi {
        let row_local = row - slo;
        let row_lo = as_usize(store.ptr()[row]);
        let row_hi = as_usize(store.ptr()[row + 1]);
        let mut upd_ptr = 0usize;
        for k in row_lo..row_hi {
            let col = as_usize(store.ind()[k]);
            if col < slo {
                continue;
            }
            let val = store.val()[k];
            if col < shi {
                let col_local = col - slo;
                transport.pgeadd(grid, val, &r1d, col_local, &mut srow1d, row_local)?;
                transport.pgeadd(grid, val, &r1d, row_local, &mut scol1d, col_local)?;
                local_flops += 2.0 * ncols;
            } else {
                while upd_ptr < upd.len() && upd[upd_ptr] < col {
                    upd_ptr += 1;
                }
                if upd_ptr == upd.len() {
                    break;
                }
                if upd[upd_ptr] == col {
                    let upd_local = ds + upd_ptr;
                    transport.pgeadd(grid, val, &r1d, upd_local, &mut srow1d, row_local)?;
                    transport.pgeadd(grid, val, &r1d, row_local, &mut scol1d, upd_local)?;
                    local_flops += 2.0 * ncols;
                }
            }
        }
    }

    // Update rows: only separator-column contributions; an update-to-update
    // column stops the scan instead of matching (mirrors front_multiply).
    for (i, &row) in upd.iter().enumerate() {
        let row_local = ds + i;
        let row_lo = as_usize(store.ptr()[row]);
        let row_hi = as_usize(store.ptr()[row + 1]);
        for k in row_lo..row_hi {
            let col = as_usize(store.ind()[k]);
            if col < slo {
                continue;
            }
            if col < shi {
                let col_local = col - slo;
                let val = store.val()[k];
                transport.pgeadd(grid, val, &r1d, col_local, &mut srow1d, row_local)?;
                transport.pgeadd(grid, val, &r1d, row_local, &mut scol1d, col_local)?;
                local_flops += 2.0 * ncols;
            } else {
                break;
            }
        }
    }

    *srow = transport.redistribute_to_block_cyclic(grid, &srow1d, srow.block_rows, srow.block_cols)?;
    *scol = transport.redistribute_to_block_cyclic(grid, &scol1d, scol.block_rows, scol.block_cols)?;
    Ok(local_flops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ColumnCyclicMatrix;

    /// Single-process transport: redistribution is the identity (there is
    /// nowhere else to move data to) and `pgeadd` is a direct row-scaled
    /// accumulate. Exists only to check `front_multiply_2d`'s merge-scan
    /// against `sparse_extract::front_multiply`'s serial one.
    struct SingleProcess;

    impl BlockCyclicTransport<f64> for SingleProcess {
        fn redistribute_to_column_cyclic(&self, _grid: ProcessGrid, m: &BlockCyclicMatrix<f64>) -> Result<ColumnCyclicMatrix<f64>, DistError> {
            Ok(ColumnCyclicMatrix { global_rows: m.global_rows, global_cols: m.global_cols, local: m.local.clone(), local_ld: m.local_ld })
        }

        fn redistribute_to_block_cyclic(&self, _grid: ProcessGrid, m: &ColumnCyclicMatrix<f64>, block_rows: usize, block_cols: usize) -> Result<BlockCyclicMatrix<f64>, DistError> {
            Ok(BlockCyclicMatrix { global_rows: m.global_rows, global_cols: m.global_cols, block_rows, block_cols, local: m.local.clone(), local_ld: m.local_ld })
        }

        fn pgeadd(&self, _grid: ProcessGrid, alpha: f64, src: &ColumnCyclicMatrix<f64>, src_row: usize, dst: &mut ColumnCyclicMatrix<f64>, dst_row: usize) -> Result<(), DistError> {
            for c in 0..dst.global_cols {
                dst.local[dst_row + c * dst.local_ld] += alpha * src.local[src_row + c * src.local_ld];
            }
            Ok(())
        }
    }

    fn dense_csr() -> SparseStore<f64, u32> {
        // Same matrix as sparse-extract's front.rs fixture:
        // A = [[2,0,1],[0,3,4],[1,4,5]]
        let ptr: Vec<u32> = vec![0, 2, 4, 7];
        let ind: Vec<u32> = vec![0, 2, 1, 2, 0, 1, 2];
        let val: Vec<f64> = vec![2.0, 1.0, 3.0, 4.0, 1.0, 4.0, 5.0];
        SparseStore::from_raw(3, ptr, ind, val, true).unwrap()
    }

    #[test]
    fn matches_serial_front_multiply_scenario_s5() {
        let a = dense_csr();
        let grid = ProcessGrid { nprow: 1, npcol: 1, myrow: 0, mycol: 0 };
        let r = BlockCyclicMatrix {
            global_rows: 3,
            global_cols: 3,
            block_rows: 3,
            block_cols: 3,
            local: vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            local_ld: 3,
        };
        let mut srow = BlockCyclicMatrix { global_rows: 3, global_cols: 3, block_rows: 3, block_cols: 3, local: vec![0.0; 9], local_ld: 3 };
        let mut scol = BlockCyclicMatrix { global_rows: 3, global_cols: 3, block_rows: 3, block_cols: 3, local: vec![0.0; 9], local_ld: 3 };

        front_multiply_2d(&a, 0, 2, &[2], grid, &r, &mut srow, &mut scol, &SingleProcess).unwrap();

        let mut sr_expected = vec![0.0f64; 9];
        let mut sc_expected = vec![0.0f64; 9];
        sparse_extract::front_multiply(&a, 0, 2, &[2], &r.local, 3, &mut sr_expected, 3, &mut sc_expected, 3, 3);
        assert_eq!(srow.local, sr_expected);
        assert_eq!(scol.local, sc_expected);
    }

    #[test]
    fn no_transport_reports_unconfigured() {
        use crate::transport::NoTransport;
        let a = dense_csr();
        let grid = ProcessGrid { nprow: 1, npcol: 1, myrow: 0, mycol: 0 };
        let r = BlockCyclicMatrix { global_rows: 3, global_cols: 3, block_rows: 3, block_cols: 3, local: vec![0.0; 9], local_ld: 3 };
        let mut srow = BlockCyclicMatrix { global_rows: 3, global_cols: 3, block_rows: 3, block_cols: 3, local: vec![0.0; 9], local_ld: 3 };
        let mut scol = BlockCyclicMatrix { global_rows: 3, global_cols: 3, block_rows: 3, block_cols: 3, local: vec![0.0; 9], local_ld: 3 };
        let err = front_multiply_2d(&a, 0, 2, &[2], grid, &r, &mut srow, &mut scol, &NoTransport).unwrap_err();
        assert!(matches!(err, DistError::NoTransportConfigured));
    }
}
