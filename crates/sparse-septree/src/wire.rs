// crates/sparse-septree/src/wire.rs

//! Raw wire (de)serialization of a [`SeparatorTree`] as a single
//! contiguous `i64` buffer, plus a CBOR convenience wrapper for on-disk
//! persistence (grounded in `sparse_core::io`'s `Versioned<T>` pattern).

use std::path::Path;

use anyhow::Result;

use crate::error::TreeError;
use crate::tree::SeparatorTree;

impl SeparatorTree {
    /// Serialize to the single contiguous `i64` block `sep_end (nbsep+1),
    /// pa, lch, rch` laid out consecutively. This is the unit a
    /// `broadcast` would transfer.
    #[must_use]
    pub fn to_wire(&self) -> Vec<i64> {
        self.raw_buffer().to_vec()
    }

    /// Reconstruct a tree from a buffer produced by [`Self::to_wire`].
    ///
    /// # Errors
    /// Returns [`TreeError::MalformedWireLength`] if `buf.len()` is not
    /// of the form `4*nbsep+1`.
    pub fn from_wire(buf: &[i64]) -> Result<Self, TreeError> {
        if buf.is_empty() || (buf.len() - 1) % 4 != 0 {
            return Err(TreeError::MalformedWireLength { len: buf.len() });
        }
        let nbsep = (buf.len() - 1) / 4;
        Ok(Self::from_raw_buffer(buf.to_vec(), nbsep))
    }

    /// Persist to `path` as a CBOR-wrapped, versioned payload (for
    /// convenient on-disk storage; not the wire format used for
    /// broadcast — see [`Self::to_wire`]).
    ///
    /// # Errors
    /// Propagates serialization and I/O errors.
    pub fn save(&self, path: &Path) -> Result<()> {
        sparse_core::io::write_versioned_cbor(&self.to_wire(), path)
    }

    /// Load a tree persisted with [`Self::save`].
    ///
    /// # Errors
    /// Propagates deserialization and I/O errors, plus
    /// [`TreeError::MalformedWireLength`] wrapped via `anyhow`.
    pub fn load(path: &Path) -> Result<Self> {
        let buf: Vec<i64> = sparse_core::io::read_versioned_cbor(path)?;
        Ok(Self::from_wire(&buf)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::from_elimination_tree;

    #[test]
    fn wire_roundtrip() {
        let t = from_elimination_tree(&[4, 4, 5, 5, 5, -1]);
        let buf = t.to_wire();
        let back = super::SeparatorTree::from_wire(&buf).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn from_wire_rejects_malformed_length() {
        let err = super::SeparatorTree::from_wire(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, super::TreeError::MalformedWireLength { .. }));
    }
}
