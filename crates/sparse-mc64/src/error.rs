// crates/sparse-mc64/src/error.rs

//! Typed errors for the MC64 bridge.

use thiserror::Error;

/// Errors raised by [`crate::mc64_permutation`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Mc64Error {
    /// The `system-mc64` feature is off, or MC64 was unavailable at link
    /// time; no real weighted-matching routine is reachable from this
    /// build.
    #[error("MC64 is not linked into this build (enable the system-mc64 feature)")]
    ExternalRoutineUnavailable,
    /// MC64 itself reported a failure via its `info` output argument.
    #[error("MC64 returned a nonzero info code: {0}")]
    RoutineFailed(i32),
    /// The matrix has no entries to match (`n == 0` or `nnz == 0`).
    #[error("cannot compute a matching for an empty matrix (n={n}, nnz={nnz})")]
    EmptyMatrix { n: usize, nnz: usize },
}
