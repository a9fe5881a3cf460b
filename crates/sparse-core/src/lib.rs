// crates/sparse-core/src/lib.rs

//! Compressed-sparse-row storage, the scalar/index type machinery, and the
//! binary + Matrix Market I/O boundary for the multifrontal kernel.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

pub mod error;
pub mod flops;
pub mod io;
pub mod store;
pub mod types;

pub use error::SparseError;
pub use io::{read_auto, read_versioned_cbor, write_auto, write_versioned_cbor};
pub use store::SparseStore;
pub use types::{IndexInt, IndexWidth, Scalar, ScalarKind, Versioned};
