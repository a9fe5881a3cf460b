// crates/sparse-mc64/src/repack.rs

//! Repack a CSR matrix into the 1-indexed Fortran CSC form MC64 expects.
//!
//! Mirrors `strumpack_mc64`'s repack loop
//! (`examples/original_source/src/CSRMatrix.hpp`): build per-column counts,
//! prefix-sum them into a 1-indexed `col_ptr`, then scatter row indices and
//! scalar magnitudes using a running per-column cursor. [`sparse_core::SparseStore::to_csc`]
//! already performs the count/prefix-sum/scatter in 0-indexed form, so this
//! is a thin re-indexing pass rather than a second implementation of it.

use sparse_core::{IndexInt, Scalar, SparseStore};

/// The 1-indexed Fortran CSC triple MC64 reads, plus the magnitudes MC64
/// matches on (`|val|` for complex scalars, `Re(val)` for real ones,
/// per [`Scalar::mc64_magnitude`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mc64Csc {
    /// 1-indexed column pointers, length `n + 1`.
    pub col_ptr: Vec<i64>,
    /// 1-indexed row indices, length `nnz`.
    pub row_ind: Vec<i64>,
}

/// Magnitudes parallel to [`Mc64Csc::row_ind`], kept separate since they are
/// `f64` regardless of the store's scalar type.
#[derive(Debug, Clone, PartialEq)]
pub struct Mc64Values(pub Vec<f64>);

/// Build the 1-indexed CSC triple and magnitude array MC64 expects from a
/// CSR [`SparseStore`].
#[must_use]
pub fn repack<S: Scalar, I: IndexInt>(store: &SparseStore<S, I>) -> (Mc64Csc, Mc64Values) {
    let (col_ptr0, row_ind0, col_val0) = store.to_csc();
    let col_ptr: Vec<i64> = col_ptr0.iter().map(|&p| p.into() as i64 + 1).collect();
    let row_ind: Vec<i64> = row_ind0.iter().map(|&r| r.into() as i64 + 1).collect();
    let dval: Vec<f64> = col_val0.iter().map(Scalar::mc64_magnitude).collect();
    (Mc64Csc { col_ptr, row_ind }, Mc64Values(dval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repack_matches_hand_computed_csc() {
        // rows [4,3,0],[6,3,1],[0,2,5] in CSR.
        let ptr: Vec<u32> = vec![0, 2, 5, 7];
        let ind: Vec<u32> = vec![0, 1, 0, 1, 2, 1, 2];
        let val: Vec<f64> = vec![4.0, 3.0, 6.0, 3.0, 1.0, 2.0, 5.0];
        let store = SparseStore::from_raw(3, ptr, ind, val, false).unwrap();

        let (csc, vals) = repack(&store);
        // Column 0 holds rows {0,1}, column 1 holds rows {0,1,2}, column 2
        // holds rows {1,2}: 1-indexed col_ptr = [1, 3, 6, 8].
        assert_eq!(csc.col_ptr, vec![1, 3, 6, 8]);
        assert_eq!(csc.row_ind.len(), 7);
        assert_eq!(vals.0.len(), 7);
        // Every 1-indexed row index must lie in [1, 3].
        assert!(csc.row_ind.iter().all(|&r| (1..=3).contains(&r)));
    }
}
