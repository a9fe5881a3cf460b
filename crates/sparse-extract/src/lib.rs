// crates/sparse-extract/src/lib.rs

//! Read-only dense front extraction over a [`sparse_core::SparseStore`]:
//! `F11`/`F12`/`F21` block fills, general boundary-block extraction, and
//! the sparse-times-dense `front_multiply` kernel.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

pub mod front;

pub use front::{
    extract_f11_block, extract_f12_block, extract_f21_block, extract_front, extract_separator,
    front_multiply,
};
