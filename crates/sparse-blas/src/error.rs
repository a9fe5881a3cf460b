// crates/sparse-blas/src/error.rs

//! Typed errors for the recursive BLAS kernels.

use thiserror::Error;

/// Errors raised by the recursive kernels.
///
/// Dimension mismatches that Rust's type system cannot express as
/// precondition violations are `debug_assert!`s instead;
/// this enum only covers the one genuinely recoverable kind, the
/// unsupported `(side, uplo, trans)` combination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlasError {
    /// `trsv`/`trsm`/`trmm`/`getrs` were invoked with a `(side, uplo, trans)`
    /// combination the leaf implementation does not support.
    #[error("unsupported (side, uplo, trans) combination for {op}: {side:?}/{uplo:?}/{trans:?}")]
    UnsupportedVariant {
        /// Name of the kernel that rejected the request.
        op: &'static str,
        /// The requested operand side.
        side: crate::types::Side,
        /// The requested triangle.
        uplo: crate::types::UpLo,
        /// The requested transpose flag.
        trans: crate::types::Trans,
    },
}

/// Status report from [`crate::getrf::getrf`]: the pivot vector plus the
/// first zero-pivot column encountered, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetrfReport {
    /// 0-indexed row-interchange pivots, one per column of `min(m, n)`:
    /// row `i` was swapped with row `piv[i]` during elimination.
    pub piv: Vec<usize>,
    /// Column of the first exactly-zero pivot encountered, adjusted by the
    /// panel origin at the point of detection (`None` if the factorization
    /// completed without one).
    pub info: Option<usize>,
}
