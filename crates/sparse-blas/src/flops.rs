// crates/sparse-blas/src/flops.rs

//! Thin re-export of `sparse-core`'s process-wide flop counter, so every
//! kernel here accumulates into the same total `SparseStore::spmv` does.

pub use sparse_core::flops::{add, reset, total};
