// crates/sparse-septree/src/lib.rs

//! Binary separator tree construction from an elimination-tree parent
//! vector, `P`-way subtree/toptree partitioning, and raw wire
//! (de)serialization for broadcast or persistence.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

pub mod error;
pub mod partition;
pub mod tree;
pub mod wire;

pub use error::TreeError;
pub use tree::{from_elimination_tree, SeparatorTree};
