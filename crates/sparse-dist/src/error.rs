// crates/sparse-dist/src/error.rs

//! Typed errors for the distributed front-multiply calling contract.

use thiserror::Error;

/// Errors a [`crate::transport::BlockCyclicTransport`] implementation may
/// report.
#[derive(Debug, Error)]
pub enum DistError {
    /// No transport was supplied: this workspace
    /// specifies the calling contract only, not a BLACS/ScaLAPACK binding.
    #[error("no block-cyclic transport is configured")]
    NoTransportConfigured,
    /// A redistribute or `pgeadd` call failed inside a real transport.
    #[error("transport call failed: {0}")]
    Transport(#[from] anyhow::Error),
}
