// crates/sparse-blas/src/types.rs

//! The small enums threaded through every kernel entry point: which operand
//! is transposed, which side the triangular factor sits on, and which
//! triangle is stored.

/// Whether an operand participates transposed.
///
/// Conjugate-transpose is not a separate variant: every kernel here only
/// ever specifies plain transpose, and `getrs`'s transpose solve is
/// explicitly out of scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trans {
    /// Operand used as stored.
    No,
    /// Operand used transposed.
    T,
}

/// Which side of the update a triangular factor appears on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Triangular factor multiplies/divides from the left.
    Left,
    /// Triangular factor multiplies/divides from the right.
    Right,
}

/// Which triangle of a matrix is populated and referenced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpLo {
    /// Lower triangle (including the diagonal).
    Lower,
    /// Upper triangle (including the diagonal).
    Upper,
}
