// crates/sparse-septree/src/error.rs

//! Typed errors for separator tree construction and wire decoding.

/// Errors raised by [`crate::SeparatorTree`] construction, queries, and
/// wire (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A decoded wire buffer did not have the `4*nbsep+1` shape a valid
    /// tree requires.
    #[error("separator tree wire buffer of length {len} is not of the form 4*nbsep+1")]
    MalformedWireLength {
        /// The length actually observed.
        len: usize,
    },

    /// A structural invariant (T1-T6) did not hold.
    #[error("separator tree invariant violated: {0}")]
    InvariantViolation(String),
}
