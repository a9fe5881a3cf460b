// crates/sparse-mc64/src/ffi.rs

//! Calling contract for MC64 itself.
//!
//! Off by default (`Mc64Error::ExternalRoutineUnavailable`): the real
//! routine is a Fortran `extern "C"` symbol this crate does not vendor or
//! link unless the `system-mc64` feature is enabled.

use crate::error::Mc64Error;
use crate::repack::{Mc64Csc, Mc64Values};

/// `job` code for MC64's maximum-weighted-matching-with-row/column-scaling
/// variant (the one STRUMPACK uses ahead of static pivoting).
const JOB_MAX_WEIGHTED_MATCHING: i32 = 5;

#[cfg(feature = "system-mc64")]
mod linked {
    use std::os::raw::{c_double, c_int};

    extern "C" {
        /// `mc64ad`/`strumpack_mc64ad_`'s C-linkage signature.
        fn strumpack_mc64ad_(
            job: *const c_int,
            n: *const c_int,
            nnz: *const c_int,
            col_ptr: *const c_int,
            row_ind: *const c_int,
            dval: *const c_double,
            num: *mut c_int,
            perm: *mut c_int,
            liw: *const c_int,
            iw: *mut c_int,
            ldw: *const c_int,
            dw: *mut c_double,
            icntl: *const c_int,
            info: *mut c_int,
        );
    }

    /// # Safety
    /// `col_ptr`, `row_ind`, `dval` must describe a well-formed 1-indexed
    /// CSC matrix of dimension `n` with `nnz` entries; `perm` must have
    /// length `n`. This function owns all scratch arrays `mc64ad` writes
    /// into internally, so the only caller obligation is the input shape.
    pub(super) unsafe fn call(job: i32, n: i32, nnz: i32, col_ptr: &[i64], row_ind: &[i64], dval: &[f64]) -> (i32, Vec<i32>, i32) {
        let col_ptr: Vec<c_int> = col_ptr.iter().map(|&v| v as c_int).collect();
        let row_ind: Vec<c_int> = row_ind.iter().map(|&v| v as c_int).collect();
        let liw = 4 * n + 2 * nnz.max(1);
        let ldw = n + 3 * nnz.max(1) + n * n.min(10);
        let mut iw = vec![0 as c_int; liw.max(1) as usize];
        let mut dw = vec![0.0 as c_double; ldw.max(1) as usize];
        let icntl = [0 as c_int; 10];
        let mut num: c_int = 0;
        let mut perm = vec![0 as c_int; n as usize];
        let mut info: c_int = 0;
        strumpack_mc64ad_(
            &job, &n, &nnz, col_ptr.as_ptr(), row_ind.as_ptr(), dval.as_ptr(), &mut num, perm.as_mut_ptr(),
            &liw, iw.as_mut_ptr(), &ldw, dw.as_mut_ptr(), icntl.as_ptr(), &mut info,
        );
        (info as i32, perm, num as i32)
    }
}

/// Run MC64 against an already-repacked CSC matrix, returning a 0-indexed
/// column permutation (`perm[i]` is the column matched to row `i`).
///
/// # Errors
/// Returns [`Mc64Error::ExternalRoutineUnavailable`] unless built with the
/// `system-mc64` feature; [`Mc64Error::RoutineFailed`] if MC64's `info`
/// output is nonzero.
pub fn run(n: usize, csc: &Mc64Csc, values: &Mc64Values) -> Result<Vec<usize>, Mc64Error> {
    let nnz = values.0.len();
    if n == 0 || nnz == 0 {
        return Err(Mc64Error::EmptyMatrix { n, nnz });
    }
    #[cfg(feature = "system-mc64")]
    {
        // SAFETY: csc/values were just built from a validated SparseStore
        // by repack(), so shapes match n/nnz exactly.
        let (info, perm, _num) = unsafe {
            linked::call(
                JOB_MAX_WEIGHTED_MATCHING,
                n as i32,
                nnz as i32,
                &csc.col_ptr,
                &csc.row_ind,
                &values.0,
            )
        };
        if info != 0 {
            return Err(Mc64Error::RoutineFailed(info));
        }
        return Ok(perm.into_iter().map(|p| (p - 1) as usize).collect());
    }
    #[cfg(not(feature = "system-mc64"))]
    {
        tracing::debug!(n, nnz, "MC64 requested without the system-mc64 feature");
        Err(Mc64Error::ExternalRoutineUnavailable)
    }
}
