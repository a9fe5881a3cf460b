// crates/sparse-mc64/src/lib.rs

//! Adapter around MC64, the weighted bipartite matching routine STRUMPACK
//! uses ahead of static pivoting: repacks a CSR [`sparse_core::SparseStore`]
//! into the 1-indexed Fortran CSC form MC64 expects, calls it, and converts
//! its result back to a 0-indexed column permutation.
//!
//! MC64 itself is external and not vendored here; without the `system-mc64`
//! feature, [`mc64_permutation`] returns
//! [`Mc64Error::ExternalRoutineUnavailable`].

mod error;
mod ffi;
mod repack;

pub use error::Mc64Error;
pub use repack::{repack, Mc64Csc, Mc64Values};

use sparse_core::{IndexInt, Scalar, SparseStore};

/// Compute a 0-indexed column permutation maximizing the product (or sum,
/// depending on `job`) of matched entry magnitudes, for use as a static
/// pivoting order ahead of numerical factorization.
///
/// # Errors
/// See [`Mc64Error`].
pub fn mc64_permutation<S: Scalar, I: IndexInt>(store: &SparseStore<S, I>) -> Result<Vec<usize>, Mc64Error> {
    let (csc, values) = repack(store);
    ffi::run(store.n(), &csc, &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_unavailable_without_system_mc64() {
        let ptr: Vec<u32> = vec![0, 2, 5, 7];
        let ind: Vec<u32> = vec![0, 1, 0, 1, 2, 1, 2];
        let val: Vec<f64> = vec![4.0, 3.0, 6.0, 3.0, 1.0, 2.0, 5.0];
        let store = SparseStore::from_raw(3, ptr, ind, val, false).unwrap();

        let err = mc64_permutation(&store).unwrap_err();
        assert_eq!(err, Mc64Error::ExternalRoutineUnavailable);
    }

    #[test]
    fn empty_matrix_is_rejected_before_the_ffi_boundary() {
        let store: SparseStore<f64, u32> = SparseStore::from_raw(0, vec![0], vec![], vec![], false).unwrap();
        let err = mc64_permutation(&store).unwrap_err();
        assert!(matches!(err, Mc64Error::EmptyMatrix { n: 0, nnz: 0 }));
    }
}
