// crates/sparse-core/src/store.rs

//! `SparseStore`: the CSR triplet owner plus its numeric operations.

use crate::error::SparseError;
use crate::types::{IndexInt, Scalar};

#[inline]
fn as_usize<I: IndexInt>(i: I) -> usize {
    let v: u64 = i.into();
    v as usize
}

#[inline]
fn from_usize<I: IndexInt>(v: usize) -> I {
    I::try_from(v).unwrap_or_else(|_| panic!("index value {v} does not fit the configured index width"))
}

/// Compressed-sparse-row storage for a (possibly non-symmetric) `n x n` matrix.
///
/// Invariants: for each row `r`,
/// `ind[ptr[r]..ptr[r+1]]` is strictly increasing (I1); every index is in
/// `[0, n)` (I2); `ptr` is non-decreasing (I3). `SparseStore` owns its three
/// arrays outright — copies are always deep.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseStore<S, I> {
    n: usize,
    ptr: Vec<I>,
    ind: Vec<I>,
    val: Vec<S>,
    symmetric_sparsity: bool,
}

impl<S: Scalar, I: IndexInt> SparseStore<S, I> {
    /// Build a store from raw CSR arrays, checking I1–I3.
    ///
    /// # Errors
    /// Returns [`SparseError::InvariantViolation`] if `ptr`, `ind` do not
    /// satisfy I1–I3, or if array lengths are inconsistent with `n`/`nnz`.
    pub fn from_raw(
        n: usize,
        ptr: Vec<I>,
        ind: Vec<I>,
        val: Vec<S>,
        symmetric_sparsity: bool,
    ) -> Result<Self, SparseError> {
        if ptr.len() != n + 1 {
            return Err(SparseError::InvariantViolation(format!(
                "ptr length {} does not match n+1={}",
                ptr.len(),
                n + 1
            )));
        }
        let nnz = as_usize(ptr[n]);
        if ind.len() != nnz || val.len() != nnz {
            return Err(SparseError::InvariantViolation(
                "ind/val length does not match ptr[n] (nnz)".into(),
            ));
        }
        for r in 0..n {
            let (lo, hi) = (as_usize(ptr[r]), as_usize(ptr[r + 1]));
            if hi < lo {
                return Err(SparseError::InvariantViolation(format!(
                    "ptr not non-decreasing at row {r}"
                )));
            }
            let mut prev: Option<usize> = None;
            for &c in &ind[lo..hi] {
                let c = as_usize(c);
                if c >= n {
                    return Err(SparseError::InvariantViolation(format!(
                        "column index {c} out of bounds (n={n})"
                    )));
                }
                if let Some(p) = prev {
                    if c <= p {
                        return Err(SparseError::InvariantViolation(format!(
                            "row {r} column indices not strictly increasing"
                        )));
                    }
                }
                prev = Some(c);
            }
        }
        Ok(Self {
            n,
            ptr,
            ind,
            val,
            symmetric_sparsity,
        })
    }

    /// Matrix dimension `n`.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Number of stored nonzeros.
    #[must_use]
    pub fn nnz(&self) -> usize {
        as_usize(self.ptr[self.n])
    }

    /// Row pointer array, length `n+1`.
    #[must_use]
    pub fn ptr(&self) -> &[I] {
        &self.ptr
    }

    /// Column index array, length `nnz`.
    #[must_use]
    pub fn ind(&self) -> &[I] {
        &self.ind
    }

    /// Value array, length `nnz`.
    #[must_use]
    pub fn val(&self) -> &[S] {
        &self.val
    }

    /// Whether the sparsity pattern is flagged as structurally symmetric.
    #[must_use]
    pub const fn symmetric_sparsity(&self) -> bool {
        self.symmetric_sparsity
    }

    /// `y <- A*x`.
    ///
    /// # Panics
    /// Panics if `x.len() != n` or `y.len() != n`.
    pub fn spmv(&self, x: &[S], y: &mut [S]) {
        assert_eq!(x.len(), self.n, "spmv: x has wrong length");
        assert_eq!(y.len(), self.n, "spmv: y has wrong length");
        for r in 0..self.n {
            let lo = as_usize(self.ptr[r]);
            let hi = as_usize(self.ptr[r + 1]);
            let mut acc = S::zero();
            for k in lo..hi {
                acc += self.val[k] * x[as_usize(self.ind[k])];
            }
            y[r] = acc;
        }
        crate::flops::add(crate::flops::spmv_flops(self.nnz(), self.n, S::KIND.is_complex()));
    }

    /// In-place `val[k] <- val[k] * dr[row(k)] * dc[ind[k]]`.
    ///
    /// # Panics
    /// Panics if `dr.len() != n` or `dc.len() != n`.
    pub fn apply_scaling(&mut self, dr: &[S], dc: &[S]) {
        assert_eq!(dr.len(), self.n);
        assert_eq!(dc.len(), self.n);
        for r in 0..self.n {
            let lo = as_usize(self.ptr[r]);
            let hi = as_usize(self.ptr[r + 1]);
            for k in lo..hi {
                let c = as_usize(self.ind[k]);
                self.val[k] = self.val[k] * dr[r] * dc[c];
            }
        }
    }

    /// Apply a column permutation: `ind[k] <- iperm[ind[k]]`, re-sorting each
    /// row's `(ind, val)` pairs together to restore I1.
    ///
    /// `perm[i]` is the new index of old column `i`. The inverse is computed
    /// internally.
    ///
    /// # Panics
    /// Panics if `perm.len() != n` or `perm` is not a bijection on `[0, n)`.
    pub fn apply_column_permutation(&mut self, perm: &[usize]) {
        assert_eq!(perm.len(), self.n);
        let mut iperm = vec![0usize; self.n];
        for (i, &p) in perm.iter().enumerate() {
            assert!(p < self.n, "apply_column_permutation: perm out of range");
            iperm[p] = i;
        }

        for r in 0..self.n {
            let lo = as_usize(self.ptr[r]);
            let hi = as_usize(self.ptr[r + 1]);
            let mut pairs: Vec<(usize, S)> = (lo..hi)
                .map(|k| (iperm[as_usize(self.ind[k])], self.val[k]))
                .collect();
            pairs.sort_by_key(|(c, _)| *c);
            for (k, (c, v)) in (lo..hi).zip(pairs) {
                self.ind[k] = from_usize(c);
                self.val[k] = v;
            }
        }
    }

    /// `max_i |b_i - (A x)_i| / (|b_i| + sum_k |A_{i,k}| |x_k|)`, with a row
    /// whose denominator is zero contributing `0` rather than `NaN`.
    ///
    /// # Panics
    /// Panics if `x.len() != n` or `b.len() != n`.
    #[must_use]
    pub fn max_scaled_residual(&self, x: &[S], b: &[S]) -> f64 {
        assert_eq!(x.len(), self.n);
        assert_eq!(b.len(), self.n);
        let mut worst = 0.0f64;
        for r in 0..self.n {
            let lo = as_usize(self.ptr[r]);
            let hi = as_usize(self.ptr[r + 1]);
            let mut ax = S::zero();
            let mut denom = b[r].abs64();
            for k in lo..hi {
                let c = as_usize(self.ind[k]);
                ax += self.val[k] * x[c];
                denom += self.val[k].abs64() * x[c].abs64();
            }
            let num = (b[r] - ax).abs64();
            let ratio = if denom == 0.0 { 0.0 } else { num / denom };
            if ratio > worst {
                worst = ratio;
            }
        }
        worst
    }

    /// Convert to CSC: `(col_ptr, row_ind, col_val)`, all 0-indexed.
    #[must_use]
    pub fn to_csc(&self) -> (Vec<I>, Vec<I>, Vec<S>) {
        let nnz = self.nnz();
        let mut col_counts = vec![0usize; self.n + 1];
        for &c in &self.ind {
            col_counts[as_usize(c) + 1] += 1;
        }
        for c in 0..self.n {
            col_counts[c + 1] += col_counts[c];
        }
        let col_ptr = col_counts.clone();

        let mut row_ind = vec![from_usize::<I>(0); nnz];
        let mut col_val = vec![S::zero(); nnz];
        let mut cursor = col_counts;
        for r in 0..self.n {
            let lo = as_usize(self.ptr[r]);
            let hi = as_usize(self.ptr[r + 1]);
            for k in lo..hi {
                let c = as_usize(self.ind[k]);
                let dest = cursor[c];
                row_ind[dest] = from_usize(r);
                col_val[dest] = self.val[k];
                cursor[c] += 1;
            }
        }
        (
            col_ptr.into_iter().map(from_usize).collect(),
            row_ind,
            col_val,
        )
    }

    /// Rebuild a `SparseStore` from CSC arrays (inverse of [`Self::to_csc`]).
    ///
    /// # Errors
    /// Propagates [`SparseError::InvariantViolation`] from [`Self::from_raw`]
    /// if the resulting CSR form would violate I1–I3.
    pub fn from_csc(
        n: usize,
        col_ptr: &[I],
        row_ind: &[I],
        col_val: &[S],
        symmetric_sparsity: bool,
    ) -> Result<Self, SparseError> {
        let nnz = as_usize(col_ptr[n]);
        let mut row_counts = vec![0usize; n + 1];
        for &r in row_ind {
            row_counts[as_usize(r) + 1] += 1;
        }
        for r in 0..n {
            row_counts[r + 1] += row_counts[r];
        }
        let ptr = row_counts.clone();

        let mut ind = vec![from_usize::<I>(0); nnz];
        let mut val = vec![S::zero(); nnz];
        let mut cursor = row_counts;
        for c in 0..n {
            let lo = as_usize(col_ptr[c]);
            let hi = as_usize(col_ptr[c + 1]);
            for k in lo..hi {
                let r = as_usize(row_ind[k]);
                let dest = cursor[r];
                ind[dest] = from_usize(c);
                val[dest] = col_val[k];
                cursor[r] += 1;
            }
        }
        // Rows were filled in column order, so re-sort each row to restore I1.
        for r in 0..n {
            let lo = as_usize(ptr[r]);
            let hi = as_usize(ptr[r + 1]);
            let mut pairs: Vec<(I, S)> = ind[lo..hi].iter().copied().zip(val[lo..hi].iter().copied()).collect();
            pairs.sort_by_key(|(c, _)| as_usize(*c));
            for (slot, (c, v)) in ind[lo..hi].iter_mut().zip(val[lo..hi].iter_mut()).zip(pairs) {
                *slot.0 = c;
                *slot.1 = v;
            }
        }

        Self::from_raw(
            n,
            ptr.into_iter().map(from_usize).collect(),
            ind,
            val,
            symmetric_sparsity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiag() -> SparseStore<f64, u32> {
        // n=4 tridiagonal.
        let ptr: Vec<u32> = vec![0, 2, 5, 8, 10];
        let ind: Vec<u32> = vec![0, 1, 0, 1, 2, 1, 2, 3, 2, 3];
        let val: Vec<f64> = vec![2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0];
        SparseStore::from_raw(4, ptr, ind, val, true).unwrap()
    }

    #[test]
    fn spmv_tridiagonal() {
        let a = tridiag();
        let x = [1.0, 1.0, 1.0, 1.0];
        let mut y = [0.0; 4];
        a.spmv(&x, &mut y);
        assert_eq!(y, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn spmv_accumulates_into_process_wide_flop_counter() {
        crate::flops::reset();
        let a = tridiag();
        let x = [1.0, 1.0, 1.0, 1.0];
        let mut y = [0.0; 4];
        a.spmv(&x, &mut y);
        assert_eq!(
            crate::flops::total(),
            crate::flops::spmv_flops(a.nnz(), a.n(), false)
        );
    }

    #[test]
    fn rejects_unsorted_row() {
        let ptr: Vec<u32> = vec![0, 2];
        let ind: Vec<u32> = vec![1, 0];
        let val: Vec<f64> = vec![1.0, 1.0];
        assert!(SparseStore::<f64, u32>::from_raw(2, ptr, ind, val, false).is_err());
    }

    #[test]
    fn csc_roundtrip() {
        let a = tridiag();
        let (cp, ri, cv) = a.to_csc();
        let b = SparseStore::from_csc(4, &cp, &ri, &cv, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn column_permutation_preserves_sort() {
        let mut a = tridiag();
        a.apply_column_permutation(&[3, 2, 1, 0]);
        for r in 0..a.n() {
            let lo = as_usize(a.ptr[r]);
            let hi = as_usize(a.ptr[r + 1]);
            let mut prev: Option<u32> = None;
            for &c in &a.ind[lo..hi] {
                if let Some(p) = prev {
                    assert!(c > p);
                }
                prev = Some(c);
            }
        }
    }

    #[test]
    fn max_scaled_residual_zero_row_guard() {
        // A single isolated zero row: b=0, A row empty -> ratio must be 0, not NaN.
        let ptr: Vec<u32> = vec![0, 0];
        let ind: Vec<u32> = vec![];
        let val: Vec<f64> = vec![];
        let a = SparseStore::from_raw(1, ptr, ind, val, false).unwrap();
        let r = a.max_scaled_residual(&[0.0], &[0.0]);
        assert_eq!(r, 0.0);
    }
}
