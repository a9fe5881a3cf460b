// crates/sparse-core/src/error.rs

//! Typed error taxonomy for the sparse storage + I/O boundary.

use thiserror::Error;

/// Errors surfaced by `SparseStore` construction, I/O, and mutation.
#[derive(Debug, Error)]
pub enum SparseError {
    /// Binary format sentinel byte was not `'R'`.
    #[error("bad format sentinel: expected 'R', found {found:?}")]
    BadSentinel {
        /// The byte actually read.
        found: u8,
    },

    /// Binary format index-width byte did not match the caller's expected width.
    #[error("index width mismatch: file has {file:?}, caller expected {expected:?}")]
    IndexWidthMismatch {
        /// Width tag stored in the file.
        file: crate::types::IndexWidth,
        /// Width tag the caller requested.
        expected: crate::types::IndexWidth,
    },

    /// Binary format scalar-kind byte did not match the caller's expected kind.
    #[error("scalar kind mismatch: file has {file:?}, caller expected {expected:?}")]
    ScalarKindMismatch {
        /// Kind tag stored in the file.
        file: crate::types::ScalarKind,
        /// Kind tag the caller requested.
        expected: crate::types::ScalarKind,
    },

    /// A Matrix Market file failed to parse.
    #[error("matrix market parse error: {0}")]
    MatrixMarketParse(String),

    /// A structural invariant (I1/I2/I3) was violated.
    #[error("CSR invariant violated: {0}")]
    InvariantViolation(String),

    /// The file ended before all expected bytes were read.
    #[error("unexpected end of file: needed {needed} more bytes")]
    Truncated {
        /// Number of additional bytes that were expected.
        needed: usize,
    },

    /// Wraps an underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
