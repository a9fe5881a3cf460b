// crates/sparse-blas/src/submat.rs

//! Disjoint mutable row-views into a column-major, strided buffer.
//!
//! A column split of a column-major matrix is contiguous (`split_at_mut`
//! suffices); a *row* split is not, because each row's elements are
//! spaced `ld` apart. Every recursive kernel that forks in parallel on the
//! row dimension needs two provably-disjoint `&mut` views into that
//! interleaved memory, which safe slicing cannot express. This is the one
//! place in the crate where that is done with `unsafe`, gated by this
//! crate's `unsafe_code = "deny"` (rather than `"forbid"`) lint override.

/// Split an `ncols`-column, `ld`-strided column-major buffer into a
/// `[0, m0)` row view and an `[m0, m0+m1)` row view, each still spanning
/// all `ncols` columns with leading dimension `ld`.
///
/// # Safety
/// `ld >= m0 + m1` and `buf.len() >= (ncols.saturating_sub(1)) * ld + m0 + m1`
/// must hold (the caller's contract: `ld` is the matrix's true leading
/// dimension and `m0+m1` does not exceed the row count). Under that
/// contract the two returned slices index disjoint elements of `buf` for
/// every column, so simultaneous `&mut` access to both is sound.
#[allow(unsafe_code)]
pub(crate) unsafe fn split_rows_mut<S>(buf: &mut [S], ld: usize, ncols: usize, m0: usize, m1: usize) -> (&mut [S], &mut [S]) {
    debug_assert!(ld >= m0 + m1);
    debug_assert!(buf.len() >= ncols.saturating_sub(1) * ld + m0 + m1);
    let ptr = buf.as_mut_ptr();
    let len_top = if ncols == 0 { 0 } else { (ncols - 1) * ld + m0 };
    let len_bot = if ncols == 0 { 0 } else { (ncols - 1) * ld + m1 };
    // SAFETY: disjointness and in-bounds-ness are the function's
    // documented precondition; `ptr` and `ptr.add(m0)` both originate
    // from the same live allocation (`buf`).
    unsafe {
        let top = std::slice::from_raw_parts_mut(ptr, len_top);
        let bottom = std::slice::from_raw_parts_mut(ptr.add(m0), len_bot);
        (top, bottom)
    }
}

/// Read-only counterpart of [`split_rows_mut`]. Two shared, possibly
/// byte-overlapping views into `buf` are always sound (only simultaneous
/// `&mut` aliasing is undefined behaviour), so this needs no `unsafe`: it
/// is plain slicing, just split on the `[0, m0)`/`[m0, m0+m1)` row ranges
/// rather than a prefix.
pub(crate) fn view_rows<S>(buf: &[S], ld: usize, ncols: usize, m0: usize, m1: usize) -> (&[S], &[S]) {
    debug_assert!(ld >= m0 + m1);
    let len_top = if ncols == 0 { 0 } else { (ncols - 1) * ld + m0 };
    let len_bot = if ncols == 0 { 0 } else { (ncols - 1) * ld + m1 };
    (&buf[..len_top], &buf[m0..m0 + len_bot])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_rows_matches_manual_indexing() {
        let a: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let ld = 4;
        let (top, bottom) = view_rows(&a, ld, 3, 2, 2);
        for j in 0..3 {
            assert_eq!(top[0 + j * ld], (j * 4) as f64);
            assert_eq!(top[1 + j * ld], (j * 4 + 1) as f64);
            assert_eq!(bottom[0 + j * ld], (j * 4 + 2) as f64);
            assert_eq!(bottom[1 + j * ld], (j * 4 + 3) as f64);
        }
    }

    #[test]
    fn row_split_matches_manual_indexing() {
        // 4x3 column-major, ld=4 (no padding).
        let mut a: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let ld = 4;
        let (top, bottom) = unsafe { split_rows_mut(&mut a, ld, 3, 2, 2) };
        for j in 0..3 {
            assert_eq!(top[0 + j * ld], (j * 4) as f64);
            assert_eq!(top[1 + j * ld], (j * 4 + 1) as f64);
            assert_eq!(bottom[0 + j * ld], (j * 4 + 2) as f64);
            assert_eq!(bottom[1 + j * ld], (j * 4 + 3) as f64);
        }
    }
}
