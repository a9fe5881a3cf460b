// crates/sparse-extract/src/front.rs

//! Dense front extraction: `F11`/`F12`/`F21` block fills, the general
//! `extract_separator`, and the dense-times-sparse `front_multiply`.
//!
//! All operations are read-only on the [`SparseStore`] and write-only on
//! caller-supplied, pre-zeroed column-major dense tiles.

use sparse_core::{IndexInt, Scalar, SparseStore};

#[inline]
fn as_usize<I: IndexInt>(i: I) -> usize {
    let v: u64 = i.into();
    v as usize
}

/// `F[i + j*ld]` column-major indexing helper.
#[inline]
fn at<S: Copy>(f: &mut [S], ld: usize, i: usize, j: usize) -> &mut S {
    &mut f[i + j * ld]
}

/// Fill `F` (dims `nr x nc`, leading dimension `ld_f`) with
/// `A[row..row+nr, col..col+nc]`. `F` must already be zeroed.
pub fn extract_f11_block<S: Scalar, I: IndexInt>(
    store: &SparseStore<S, I>,
    f: &mut [S],
    ld_f: usize,
    row: usize,
    nr: usize,
    col: usize,
    nc: usize,
) {
    let n = store.n();
    for r in row..(row + nr).min(n) {
        let row_lo = as_usize(store.ptr()[r]);
        let row_hi = as_usize(store.ptr()[r + 1]);
        let mut k = row_lo;
        while k < row_hi && as_usize(store.ind()[k]) < col {
            k += 1;
        }
        while k < row_hi {
            let c = as_usize(store.ind()[k]);
            if c < col + nc {
                *at(f, ld_f, r - row, c - col) = store.val()[k];
                k += 1;
            } else {
                break;
            }
        }
    }
}

/// Fill `F` (dims `nr x nc`, leading dimension `ld_f`) with
/// `A[row..row+nr, upd[0..nc]]` (`upd` strictly increasing).
pub fn extract_f12_block<S: Scalar, I: IndexInt>(
    store: &SparseStore<S, I>,
    f: &mut [S],
    ld_f: usize,
    row: usize,
    nr: usize,
    col: usize,
    nc: usize,
    upd: &[usize],
) {
    debug_assert!(upd.len() >= nc);
    let n = store.n();
    for r in row..(row + nr).min(n) {
        let row_lo = as_usize(store.ptr()[r]);
        let row_hi = as_usize(store.ptr()[r + 1]);
        let mut upd_pos = 0usize;
        for k in row_lo..row_hi {
            let c = as_usize(store.ind()[k]);
            if c >= col {
                while upd_pos < nc && upd[upd_pos] < c {
                    upd_pos += 1;
                }
                if upd_pos == nc {
                    break;
                }
                if upd[upd_pos] == c {
                    *at(f, ld_f, r - row, upd_pos) = store.val()[k];
                }
            }
        }
    }
}

/// Fill `F` (dims `nr x nc`, leading dimension `ld_f`) with
/// `A[upd[0..nr], col..col+nc]` (`upd` strictly increasing).
pub fn extract_f21_block<S: Scalar, I: IndexInt>(
    store: &SparseStore<S, I>,
    f: &mut [S],
    ld_f: usize,
    nr: usize,
    col: usize,
    nc: usize,
    upd: &[usize],
) {
    debug_assert!(upd.len() >= nr);
    for i in 0..nr {
        let r = upd[i];
        let row_lo = as_usize(store.ptr()[r]);
        let row_hi = as_usize(store.ptr()[r + 1]);
        let mut k = row_lo;
        while k < row_hi && as_usize(store.ind()[k]) < col {
            k += 1;
        }
        while k < row_hi {
            let c = as_usize(store.ind()[k]);
            if c < col + nc {
                *at(f, ld_f, i, c - col) = store.val()[k];
                k += 1;
            } else {
                break;
            }
        }
    }
}

/// General (row-set, column-set) extraction for boundary blocks.
///
/// `b` is `I.len() x J.len()`, column-major, leading dimension `ld_b`, and
/// must already be zeroed. Rows with no stored entries are explicitly
/// guarded before `cmin`/`cmax` are read.
pub fn extract_separator<S: Scalar, I: IndexInt>(
    store: &SparseStore<S, I>,
    sep_end: usize,
    i_set: &[usize],
    j_set: &[usize],
    b: &mut [S],
    ld_b: usize,
) {
    if i_set.is_empty() || j_set.is_empty() {
        return;
    }
    for (i, &r) in i_set.iter().enumerate() {
        let row_lo = as_usize(store.ptr()[r]);
        let row_hi = as_usize(store.ptr()[r + 1]);
        if row_lo == row_hi {
            // Empty row: every column in this row is structurally zero.
            continue;
        }
        let cmin = as_usize(store.ind()[row_lo]);
        let cmax = as_usize(store.ind()[row_hi - 1]);
        for (k, &c) in j_set.iter().enumerate() {
            if c >= cmin && c <= cmax && (r < sep_end || c < sep_end) {
                let mut a_pos = row_lo;
                let a_max = row_hi - 1;
                while a_pos < a_max && as_usize(store.ind()[a_pos]) < c {
                    a_pos += 1;
                }
                if as_usize(store.ind()[a_pos]) == c {
                    *at(b, ld_b, i, k) = store.val()[a_pos];
                }
            }
        }
    }
}

/// Simultaneous sparse matvecs `Sr <- A_sep * R` and `Sc <- A_sepᵀ * R`,
/// where `A_sep` is the principal submatrix over separator rows `[slo,shi)`
/// and the update row set `upd`.
///
/// `r`, `sr`, `sc` are column-major with leading dimensions `ld_r`/`ld_sr`/
/// `ld_sc` and `ncols` columns; both `sr` and `sc` have `shi-slo + upd.len()`
/// rows (separator rows followed by update rows) and are accumulated into
/// (not overwritten), matching the source's `+=` semantics. The update-row
/// block of `sr` only picks up contributions from separator columns: a
/// column in the update range on an update row breaks the scan without
/// matching (the update-to-update diagonal is excluded).
///
/// # Panics
/// Panics if `upd` is not strictly increasing (debug builds only).
#[allow(clippy::too_many_arguments)]
pub fn front_multiply<S: Scalar, I: IndexInt>(
    store: &SparseStore<S, I>,
    slo: usize,
    shi: usize,
    upd: &[usize],
    r: &[S],
    ld_r: usize,
    sr: &mut [S],
    ld_sr: usize,
    sc: &mut [S],
    ld_sc: usize,
    ncols: usize,
) {
    debug_assert!(upd.windows(2).all(|w| w[0] < w[1]));
    let ds = shi - slo;
    let dupd = upd.len();

    // Separator rows: both the separator-to-separator and separator-to-update
    // contributions land in both Sr and Sc (the structurally symmetric part).
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
            if col < shi {
                let col_local = col - slo;
                for c in 0..ncols {
                    *at(sr, ld_sr, row_local, c) += store.val()[k] * r[col_local + c * ld_r];
                    *at(sc, ld_sc, col_local, c) += store.val()[k] * r[row_local + c * ld_r];
                }
            } else {
                while upd_ptr < dupd && upd[upd_ptr] < col {
                    upd_ptr += 1;
                }
                if upd_ptr == dupd {
                    break;
                }
                if upd[upd_ptr] == col {
                    let upd_local = ds + upd_ptr;
                    for c in 0..ncols {
                        *at(sr, ld_sr, row_local, c) += store.val()[k] * r[upd_local + c * ld_r];
                        *at(sc, ld_sc, upd_local, c) += store.val()[k] * r[row_local + c * ld_r];
                    }
                }
            }
        }
    }

    // Update rows: only the separator-column contributions are picked up;
    // a column at or past `shi` (i.e. update-to-update) simply stops the scan.
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
                for c in 0..ncols {
                    *at(sr, ld_sr, row_local, c) += store.val()[k] * r[col_local + c * ld_r];
                    *at(sc, ld_sc, col_local, c) += store.val()[k] * r[row_local + c * ld_r];
                }
            } else {
                break;
            }
        }
    }
}

/// Fill the three dense sub-blocks of a front in one call: `f11`
/// (`dim_sep x dim_sep`), `f12` (`dim_sep x dim_upd`), `f21`
/// (`dim_upd x dim_sep`). All three tiles must already be zeroed.
#[allow(clippy::too_many_arguments)]
pub fn extract_front<S: Scalar, I: IndexInt>(
    store: &SparseStore<S, I>,
    f11: &mut [S],
    ld_f11: usize,
    f12: &mut [S],
    ld_f12: usize,
    f21: &mut [S],
    ld_f21: usize,
    sep_begin: usize,
    sep_end: usize,
    upd: &[usize],
) {
    let dim_sep = sep_end - sep_begin;
    let dim_upd = upd.len();
    extract_f11_block(store, f11, ld_f11, sep_begin, dim_sep, sep_begin, dim_sep);
    if dim_upd > 0 {
        extract_f12_block(store, f12, ld_f12, sep_begin, dim_sep, sep_begin, dim_upd, upd);
        extract_f21_block(store, f21, ld_f21, dim_upd, sep_begin, dim_sep, upd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparse_core::SparseStore;

    fn dense_csr() -> SparseStore<f64, u32> {
        // A = [[2,0,1],[0,3,4],[1,4,5]]
        let ptr: Vec<u32> = vec![0, 2, 4, 7];
        let ind: Vec<u32> = vec![0, 2, 1, 2, 0, 1, 2];
        let val: Vec<f64> = vec![2.0, 1.0, 3.0, 4.0, 1.0, 4.0, 5.0];
        SparseStore::from_raw(3, ptr, ind, val, true).unwrap()
    }

    #[test]
    fn extract_f11_matches_dense_slice() {
        let a = dense_csr();
        let mut f = vec![0.0f64; 2 * 2];
        extract_f11_block(&a, &mut f, 2, 0, 2, 0, 2);
        // rows 0..2, cols 0..2, column-major
        assert_eq!(f, vec![2.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn front_multiply_scenario_s5() {
        let a = dense_csr();
        // R = I3, column-major, ld=3
        let r: Vec<f64> = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        // Sr/Sc both have ds+dupd = 3 rows x 3 cols, column-major, ld=3.
        let mut sr = vec![0.0f64; 3 * 3];
        let mut sc = vec![0.0f64; 3 * 3];
        front_multiply(&a, 0, 2, &[2], &r, 3, &mut sr, 3, &mut sc, 3, 3);
        // Separator-row block of Sr: [[2,0,1],[0,3,4]] (rows 0..2).
        assert_eq!(sr[0], 2.0);
        assert_eq!(sr[1], 0.0);
        assert_eq!(sr[0 + 1 * 3], 0.0);
        assert_eq!(sr[1 + 1 * 3], 3.0);
        assert_eq!(sr[0 + 2 * 3], 1.0);
        assert_eq!(sr[1 + 2 * 3], 4.0);
        // Sc = [[2,0,1],[0,3,4],[1,4,0]] column-major with ld=3; the third
        // (update) row excludes the update-to-update diagonal.
        assert_eq!(
            sc,
            vec![2.0, 0.0, 1.0, 0.0, 3.0, 4.0, 1.0, 4.0, 0.0]
        );
        // Sr's update row picks up the same separator-column contributions
        // as Sc's (the matrix is numerically symmetric here).
        assert_eq!(sr[2], 1.0);
        assert_eq!(sr[2 + 1 * 3], 4.0);
        assert_eq!(sr[2 + 2 * 3], 0.0);
    }

    #[test]
    fn extract_separator_empty_row_guard() {
        // row 1 has no entries at all.
        let ptr: Vec<u32> = vec![0, 1, 1, 2];
        let ind: Vec<u32> = vec![0, 2];
        let val: Vec<f64> = vec![1.0, 5.0];
        let a = SparseStore::from_raw(3, ptr, ind, val, false).unwrap();
        let mut b = vec![0.0f64; 3 * 3];
        // Must not panic on the empty row 1.
        extract_separator(&a, 3, &[0, 1, 2], &[0, 1, 2], &mut b, 3);
        assert_eq!(b[0], 1.0); // (0,0)
        assert_eq!(b[1], 0.0); // (1,0): empty row
        assert_eq!(b[2 + 2 * 3], 5.0); // (2,2)
    }
}
