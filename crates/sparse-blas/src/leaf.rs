// crates/sparse-blas/src/leaf.rs

//! `SequentialBlas`: the recursion leaf every task-recursive kernel
//! delegates to once a problem is small enough.
//!
//! [`DefaultBlas`] is a small safe-Rust triple-loop implementation: correct
//! and always available. The `system-blas` feature additionally provides
//! [`system::SystemBlas`], a thin bridge to a real Fortran BLAS/LAPACK for
//! `f32`/`f64`, behind a feature-gated module in the style of other
//! off-by-default external bridges in this workspace.
//!
//! All matrices are column-major; `ld_*` is the leading dimension (the
//! stride between successive columns). Only the four `(side, uplo, trans)`
//! combinations the recursive layer ever dispatches are implemented at the leaf;
//! the recursive layer rejects every other combination before a leaf call
//! could be reached (`BlasError::UnsupportedVariant`).

use sparse_core::Scalar;

use crate::types::{Side, Trans, UpLo};

#[inline]
fn at<S: Copy>(m: &[S], ld: usize, i: usize, j: usize) -> S {
    m[i + j * ld]
}

#[inline]
fn at_mut<S: Copy>(m: &mut [S], ld: usize, i: usize, j: usize) -> &mut S {
    &mut m[i + j * ld]
}

/// The sequential BLAS/LAPACK leaf every recursive kernel bottoms out at.
pub trait SequentialBlas<S: Scalar>: Send + Sync {
    /// `C := alpha*op(A)*op(B) + beta*C`, `op(A)` is `m x k`, `op(B)` is `k x n`.
    #[allow(clippy::too_many_arguments)]
    fn gemm(
        &self,
        transa: Trans,
        transb: Trans,
        m: usize,
        n: usize,
        k: usize,
        alpha: S,
        a: &[S],
        ld_a: usize,
        b: &[S],
        ld_b: usize,
        beta: S,
        c: &mut [S],
        ld_c: usize,
    );

    /// `y := alpha*op(A)*x + beta*y`, `op(A)` is `m x n`.
    #[allow(clippy::too_many_arguments)]
    fn gemv(
        &self,
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
    );

    /// Solve `op(A)*X = alpha*B` (`Side::Left`) or `X*op(A) = alpha*B`
    /// (`Side::Right`) in place of `B`, `A` triangular.
    #[allow(clippy::too_many_arguments)]
    fn trsm(
        &self,
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
    );

    /// Solve `op(A)*x = b` in place of `b`, `A` triangular `n x n`.
    fn trsv(&self, uplo: UpLo, trans: Trans, n: usize, a: &[S], ld_a: usize, x: &mut [S], incx: usize);

    /// `B := alpha*op(A)*B` (`Side::Left`) or `B := alpha*B*op(A)`
    /// (`Side::Right`), `A` triangular.
    #[allow(clippy::too_many_arguments)]
    fn trmm(
        &self,
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
    );

    /// Unblocked LU factorization with partial pivoting of an `m x n`
    /// matrix. `piv` (length `min(m,n)`) receives, for each pivot step `k`,
    /// the (0-indexed, absolute) row swapped into position `k`. Returns the
    /// column of the first exactly-zero pivot, if any.
    fn getrf(&self, m: usize, n: usize, a: &mut [S], ld_a: usize, piv: &mut [usize]) -> Option<usize>;

    /// Apply row interchanges `a[i] <-> a[piv[i]]` for `i` in `[k1, k2)`, in
    /// increasing order (LAPACK `dlaswp` semantics).
    fn laswp(&self, n: usize, a: &mut [S], ld_a: usize, k1: usize, k2: usize, piv: &[usize]);

    /// Unconjugated rank-1 update: `A += alpha * x * yᵀ`.
    #[allow(clippy::too_many_arguments)]
    fn geru(&self, m: usize, n: usize, alpha: S, x: &[S], incx: usize, y: &[S], incy: usize, a: &mut [S], ld_a: usize);

    /// Conjugated rank-1 update: `A += alpha * x * yᴴ` (identical to
    /// [`Self::geru`] for the two real scalar kinds).
    #[allow(clippy::too_many_arguments)]
    fn gerc(&self, m: usize, n: usize, alpha: S, x: &[S], incx: usize, y: &[S], incy: usize, a: &mut [S], ld_a: usize);
}

/// Pure-Rust triple-loop `SequentialBlas`. Correct, not vector-optimized;
/// relies on the compiler to autovectorize.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultBlas;

impl<S: Scalar> SequentialBlas<S> for DefaultBlas {
    fn gemm(
        &self,
        transa: Trans,
        transb: Trans,
        m: usize,
        n: usize,
        k: usize,
        alpha: S,
        a: &[S],
        ld_a: usize,
        b: &[S],
        ld_b: usize,
        beta: S,
        c: &mut [S],
        ld_c: usize,
    ) {
        for j in 0..n {
            for i in 0..m {
                let cij = at_mut(c, ld_c, i, j);
                *cij = if beta == S::zero() { S::zero() } else { *cij * beta };
            }
        }
        for j in 0..n {
            for l in 0..k {
                let b_lj = match transb {
                    Trans::No => at(b, ld_b, l, j),
                    Trans::T => at(b, ld_b, j, l),
                };
                let scaled = alpha * b_lj;
                for i in 0..m {
                    let a_il = match transa {
                        Trans::No => at(a, ld_a, i, l),
                        Trans::T => at(a, ld_a, l, i),
                    };
                    *at_mut(c, ld_c, i, j) += a_il * scaled;
                }
            }
        }
        crate::flops::add(gemm_flops(m, n, k, S::KIND.is_complex()));
    }

    fn gemv(
        &self,
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
    ) {
        let ylen = match trans {
            Trans::No => m,
            Trans::T => n,
        };
        for i in 0..ylen {
            y[i * incy] = if beta == S::zero() { S::zero() } else { y[i * incy] * beta };
        }
        match trans {
            Trans::No => {
                for j in 0..n {
                    let xj = alpha * x[j * incx];
                    for i in 0..m {
                        y[i * incy] += at(a, ld_a, i, j) * xj;
                    }
                }
            }
            Trans::T => {
                for j in 0..n {
                    let mut acc = S::zero();
                    for i in 0..m {
                        acc += at(a, ld_a, i, j) * x[i * incx];
                    }
                    y[j * incy] += alpha * acc;
                }
            }
        }
    }

    fn trsm(
        &self,
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
    ) {
        for j in 0..n {
            for i in 0..m {
                *at_mut(b, ld_b, i, j) = at(b, ld_b, i, j) * alpha;
            }
        }
        match (side, uplo, transa) {
            (Side::Left, UpLo::Lower, Trans::No) => {
                for j in 0..n {
                    for i in 0..m {
                        let mut sum = at(b, ld_b, i, j);
                        for l in 0..i {
                            sum -= at(a, ld_a, i, l) * at(b, ld_b, l, j);
                        }
                        *at_mut(b, ld_b, i, j) = sum / at(a, ld_a, i, i);
                    }
                }
            }
            (Side::Left, UpLo::Upper, Trans::No) => {
                for j in 0..n {
                    for i in (0..m).rev() {
                        let mut sum = at(b, ld_b, i, j);
                        for l in (i + 1)..m {
                            sum -= at(a, ld_a, i, l) * at(b, ld_b, l, j);
                        }
                        *at_mut(b, ld_b, i, j) = sum / at(a, ld_a, i, i);
                    }
                }
            }
            (Side::Right, UpLo::Upper, Trans::No) => {
                for j in 0..n {
                    for i in 0..m {
                        let mut sum = at(b, ld_b, i, j);
                        for l in 0..j {
                            sum -= at(b, ld_b, i, l) * at(a, ld_a, l, j);
                        }
                        *at_mut(b, ld_b, i, j) = sum / at(a, ld_a, j, j);
                    }
                }
            }
            _ => unreachable!(
                "trsm: leaf only ever sees the three validated (side,uplo,trans) combinations"
            ),
        }
    }

    fn trsv(&self, uplo: UpLo, trans: Trans, n: usize, a: &[S], ld_a: usize, x: &mut [S], incx: usize) {
        match (uplo, trans) {
            (UpLo::Lower, Trans::No) => {
                for i in 0..n {
                    let mut sum = x[i * incx];
                    for l in 0..i {
                        sum -= at(a, ld_a, i, l) * x[l * incx];
                    }
                    x[i * incx] = sum / at(a, ld_a, i, i);
                }
            }
            (UpLo::Upper, Trans::No) => {
                for i in (0..n).rev() {
                    let mut sum = x[i * incx];
                    for l in (i + 1)..n {
                        sum -= at(a, ld_a, i, l) * x[l * incx];
                    }
                    x[i * incx] = sum / at(a, ld_a, i, i);
                }
            }
            _ => unreachable!("trsv: leaf only ever sees lower/no-trans or upper/no-trans"),
        }
    }

    fn trmm(
        &self,
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
    ) {
        match (side, uplo, transa) {
            (Side::Left, UpLo::Lower, Trans::No) => {
                for j in 0..n {
                    for i in (0..m).rev() {
                        let mut sum = at(a, ld_a, i, i) * at(b, ld_b, i, j);
                        for l in 0..i {
                            sum += at(a, ld_a, i, l) * at(b, ld_b, l, j);
                        }
                        *at_mut(b, ld_b, i, j) = alpha * sum;
                    }
                }
            }
            (Side::Left, UpLo::Upper, Trans::No) => {
                for j in 0..n {
                    for i in 0..m {
                        let mut sum = at(a, ld_a, i, i) * at(b, ld_b, i, j);
                        for l in (i + 1)..m {
                            sum += at(a, ld_a, i, l) * at(b, ld_b, l, j);
                        }
                        *at_mut(b, ld_b, i, j) = alpha * sum;
                    }
                }
            }
            (Side::Right, UpLo::Upper, Trans::No) => {
                for j in (0..n).rev() {
                    for i in 0..m {
                        let mut sum = at(b, ld_b, i, j) * at(a, ld_a, j, j);
                        for l in 0..j {
                            sum += at(b, ld_b, i, l) * at(a, ld_a, l, j);
                        }
                        *at_mut(b, ld_b, i, j) = alpha * sum;
                    }
                }
            }
            _ => unreachable!(
                "trmm: leaf only ever sees the three validated (side,uplo,trans) combinations"
            ),
        }
    }

    fn getrf(&self, m: usize, n: usize, a: &mut [S], ld_a: usize, piv: &mut [usize]) -> Option<usize> {
        let minmn = m.min(n);
        let mut info = None;
        for k in 0..minmn {
            let mut p = k;
            let mut best = at(a, ld_a, k, k).abs64();
            for i in (k + 1)..m {
                let v = at(a, ld_a, i, k).abs64();
                if v > best {
                    best = v;
                    p = i;
                }
            }
            piv[k] = p;
            if p != k {
                for j in 0..n {
                    let (ik, pk) = (k + j * ld_a, p + j * ld_a);
                    a.swap(ik, pk);
                }
            }
            let pivot = at(a, ld_a, k, k);
            if pivot == S::zero() {
                if info.is_none() {
                    info = Some(k);
                }
                continue;
            }
            for i in (k + 1)..m {
                let v = at(a, ld_a, i, k) / pivot;
                *at_mut(a, ld_a, i, k) = v;
            }
            for j in (k + 1)..n {
                let ukj = at(a, ld_a, k, j);
                for i in (k + 1)..m {
                    let lik = at(a, ld_a, i, k);
                    *at_mut(a, ld_a, i, j) -= lik * ukj;
                }
            }
        }
        info
    }

    fn laswp(&self, n: usize, a: &mut [S], ld_a: usize, k1: usize, k2: usize, piv: &[usize]) {
        for i in k1..k2 {
            let p = piv[i];
            if p != i {
                for j in 0..n {
                    let (ia, ip) = (i + j * ld_a, p + j * ld_a);
                    a.swap(ia, ip);
                }
            }
        }
    }

    fn geru(&self, m: usize, n: usize, alpha: S, x: &[S], incx: usize, y: &[S], incy: usize, a: &mut [S], ld_a: usize) {
        for j in 0..n {
            let scaled = alpha * y[j * incy];
            for i in 0..m {
                *at_mut(a, ld_a, i, j) += x[i * incx] * scaled;
            }
        }
    }

    fn gerc(&self, m: usize, n: usize, alpha: S, x: &[S], incx: usize, y: &[S], incy: usize, a: &mut [S], ld_a: usize) {
        for j in 0..n {
            let scaled = alpha * y[j * incy].conj();
            for i in 0..m {
                *at_mut(a, ld_a, i, j) += x[i * incx] * scaled;
            }
        }
    }
}

fn gemm_flops(m: usize, n: usize, k: usize, is_complex: bool) -> u64 {
    let base = (2 * m * n * k) as u64;
    if is_complex {
        4 * base
    } else {
        base
    }
}

#[cfg(feature = "system-blas")]
pub mod system {
    //! Thin bridge to a real Fortran BLAS/LAPACK for `f32`/`f64`, linked via
    //! `blas`/`lapack` (backed by `blas-src`/`openblas-src`). Complex
    //! scalars are not bridged (no `SequentialBlas<Complex<_>>` impl here);
    //! callers needing complex kernels use [`super::DefaultBlas`].
    #![allow(unsafe_code)]

    use super::{SequentialBlas, Side, Trans, UpLo};

    fn trans_tag(t: Trans) -> u8 {
        match t {
            Trans::No => b'N',
            Trans::T => b'T',
        }
    }

    fn side_tag(s: Side) -> u8 {
        match s {
            Side::Left => b'L',
            Side::Right => b'R',
        }
    }

    fn uplo_tag(u: UpLo) -> u8 {
        match u {
            UpLo::Lower => b'L',
            UpLo::Upper => b'U',
        }
    }

    /// `SequentialBlas` leaf backed by a system BLAS/LAPACK (`dgemm_`,
    /// `dgetrf_`, ... via the `blas`/`lapack` FFI crates).
    #[derive(Copy, Clone, Debug, Default)]
    pub struct SystemBlas;

    macro_rules! impl_system_blas {
        ($ty:ty, $gemm:path, $gemv:path, $trsm:path, $trsv:path, $trmm:path, $getrf:path, $laswp:path, $geru:path) => {
            impl SequentialBlas<$ty> for SystemBlas {
                fn gemm(
                    &self,
                    transa: Trans,
                    transb: Trans,
                    m: usize,
                    n: usize,
                    k: usize,
                    alpha: $ty,
                    a: &[$ty],
                    ld_a: usize,
                    b: &[$ty],
                    ld_b: usize,
                    beta: $ty,
                    c: &mut [$ty],
                    ld_c: usize,
                ) {
                    // SAFETY: slice lengths are the caller's contract (mirrors
                    // every other `blas`-crate call site); dimensions and
                    // leading dimensions are forwarded unchanged to Fortran.
                    unsafe {
                        $gemm(
                            trans_tag(transa),
                            trans_tag(transb),
                            m as i32,
                            n as i32,
                            k as i32,
                            alpha,
                            a,
                            ld_a as i32,
                            b,
                            ld_b as i32,
                            beta,
                            c,
                            ld_c as i32,
                        );
                    }
                }

                fn gemv(
                    &self,
                    trans: Trans,
                    m: usize,
                    n: usize,
                    alpha: $ty,
                    a: &[$ty],
                    ld_a: usize,
                    x: &[$ty],
                    incx: usize,
                    beta: $ty,
                    y: &mut [$ty],
                    incy: usize,
                ) {
                    // SAFETY: see `gemm` above.
                    unsafe {
                        $gemv(
                            trans_tag(trans),
                            m as i32,
                            n as i32,
                            alpha,
                            a,
                            ld_a as i32,
                            x,
                            incx as i32,
                            beta,
                            y,
                            incy as i32,
                        );
                    }
                }

                fn trsm(
                    &self,
                    side: Side,
                    uplo: UpLo,
                    transa: Trans,
                    m: usize,
                    n: usize,
                    alpha: $ty,
                    a: &[$ty],
                    ld_a: usize,
                    b: &mut [$ty],
                    ld_b: usize,
                ) {
                    // SAFETY: see `gemm` above. `diag` is always 'N'
                    // (non-unit) since every triangular factor here carries
                    // its own diagonal.
                    unsafe {
                        $trsm(
                            side_tag(side),
                            uplo_tag(uplo),
                            trans_tag(transa),
                            b'N',
                            m as i32,
                            n as i32,
                            alpha,
                            a,
                            ld_a as i32,
                            b,
                            ld_b as i32,
                        );
                    }
                }

                fn trsv(&self, uplo: UpLo, trans: Trans, n: usize, a: &[$ty], ld_a: usize, x: &mut [$ty], incx: usize) {
                    // SAFETY: see `gemm` above.
                    unsafe {
                        $trsv(uplo_tag(uplo), trans_tag(trans), b'N', n as i32, a, ld_a as i32, x, incx as i32);
                    }
                }

                fn trmm(
                    &self,
                    side: Side,
                    uplo: UpLo,
                    transa: Trans,
                    m: usize,
                    n: usize,
                    alpha: $ty,
                    a: &[$ty],
                    ld_a: usize,
                    b: &mut [$ty],
                    ld_b: usize,
                ) {
                    // SAFETY: see `gemm` above.
                    unsafe {
                        $trmm(
                            side_tag(side),
                            uplo_tag(uplo),
                            trans_tag(transa),
                            b'N',
                            m as i32,
                            n as i32,
                            alpha,
                            a,
                            ld_a as i32,
                            b,
                            ld_b as i32,
                        );
                    }
                }

                fn getrf(&self, m: usize, n: usize, a: &mut [$ty], ld_a: usize, piv: &mut [usize]) -> Option<usize> {
                    let minmn = m.min(n);
                    let mut ipiv: Vec<i32> = vec![0; minmn];
                    let mut info: i32 = 0;
                    // SAFETY: see `gemm` above; `ipiv`/`info` are
                    // out-parameters sized exactly as LAPACK expects.
                    unsafe {
                        $getrf(m as i32, n as i32, a, ld_a as i32, &mut ipiv, &mut info);
                    }
                    for (k, &p) in ipiv.iter().enumerate() {
                        // LAPACK's ipiv is 1-indexed and Fortran-relative
                        // (row k swapped with row ipiv[k]-1, both absolute).
                        piv[k] = (p as usize) - 1;
                    }
                    if info > 0 {
                        Some((info as usize) - 1)
                    } else {
                        None
                    }
                }

                fn laswp(&self, n: usize, a: &mut [$ty], ld_a: usize, k1: usize, k2: usize, piv: &[usize]) {
                    let ipiv: Vec<i32> = piv[k1..k2].iter().map(|&p| (p + 1) as i32).collect();
                    // SAFETY: see `gemm` above.
                    unsafe {
                        $laswp(n as i32, a, ld_a as i32, (k1 + 1) as i32, k2 as i32, &ipiv, 1);
                    }
                }

                fn geru(
                    &self,
                    m: usize,
                    n: usize,
                    alpha: $ty,
                    x: &[$ty],
                    incx: usize,
                    y: &[$ty],
                    incy: usize,
                    a: &mut [$ty],
                    ld_a: usize,
                ) {
                    // SAFETY: see `gemm` above.
                    unsafe {
                        $geru(m as i32, n as i32, alpha, x, incx as i32, y, incy as i32, a, ld_a as i32);
                    }
                }

                fn gerc(
                    &self,
                    m: usize,
                    n: usize,
                    alpha: $ty,
                    x: &[$ty],
                    incx: usize,
                    y: &[$ty],
                    incy: usize,
                    a: &mut [$ty],
                    ld_a: usize,
                ) {
                    // Real scalars: gerc == geru.
                    SequentialBlas::geru(self, m, n, alpha, x, incx, y, incy, a, ld_a);
                }
            }
        };
    }

    impl_system_blas!(
        f64,
        blas::dgemm,
        blas::dgemv,
        blas::dtrsm,
        blas::dtrsv,
        blas::dtrmm,
        lapack::dgetrf,
        lapack::dlaswp,
        blas::dger
    );
    impl_system_blas!(
        f32,
        blas::sgemm,
        blas::sgemv,
        blas::strsm,
        blas::strsv,
        blas::strmm,
        lapack::sgetrf,
        lapack::slaswp,
        blas::sger
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemm_identity_returns_a() {
        // gemm with alpha=1, beta=0, B=I returns A.
        let a: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3 column-major
        let ident: Vec<f64> = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut c = vec![0.0f64; 2 * 3];
        DefaultBlas.gemm(Trans::No, Trans::No, 2, 3, 3, 1.0, &a, 2, &ident, 3, 0.0, &mut c, 2);
        assert_eq!(c, a);
    }

    #[test]
    fn trsm_then_trmm_is_identity_p9() {
        // Lower-triangular L, trsm then trmm with the same factor round-trips B.
        let l: Vec<f64> = vec![2.0, 1.0, 0.0, 3.0]; // [[2,0],[1,3]]
        let b0: Vec<f64> = vec![4.0, 5.0, 6.0, 7.0];
        let mut b = b0.clone();
        DefaultBlas.trsm(Side::Left, UpLo::Lower, Trans::No, 2, 2, 1.0, &l, 2, &mut b, 2);
        DefaultBlas.trmm(Side::Left, UpLo::Lower, Trans::No, 2, 2, 1.0, &l, 2, &mut b, 2);
        for (x, y) in b.iter().zip(b0.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn getrf_pivots_on_larger_magnitude() {
        // A = [[4,3],[6,3]].
        let mut a: Vec<f64> = vec![4.0, 6.0, 3.0, 3.0];
        let mut piv = vec![0usize; 2];
        let info = DefaultBlas.getrf(2, 2, &mut a, 2, &mut piv);
        assert_eq!(info, None);
        assert_eq!(piv[0], 1); // row 1 (value 6) has larger magnitude, pivots in
    }
}
