// crates/sparse-dist/src/lib.rs

//! Distributed-memory 2D block-cyclic calling contract for the multifrontal
//! front multiply.
//!
//! `pgeadd`/`pgemr2d` and BLACS process grids are external (ScaLAPACK); this
//! crate specifies only the shapes and the collective calls a real binding
//! would make, via [`transport::BlockCyclicTransport`]. [`transport::NoTransport`]
//! is the off-by-default stand-in.

pub mod error;
pub mod front;
pub mod transport;

pub use error::DistError;
pub use front::front_multiply_2d;
pub use transport::{BlockCyclicMatrix, BlockCyclicTransport, ColumnCyclicMatrix, NoTransport, ProcessGrid};
