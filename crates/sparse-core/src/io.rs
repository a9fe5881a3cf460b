// crates/sparse-core/src/io.rs

//! Binary and Matrix Market I/O for `SparseStore`, plus an extension-dispatch
//! convenience layer over a CBOR `Versioned<T>` wrapper for auxiliary
//! artifacts (separator trees, etc.)

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::SparseError;
use crate::store::SparseStore;
use crate::types::{IndexInt, IndexWidth, Scalar, ScalarKind, Versioned};

#[inline]
fn as_usize<I: IndexInt>(i: I) -> usize {
    let v: u64 = i.into();
    v as usize
}

#[inline]
fn from_usize<I: IndexInt>(v: usize) -> I {
    I::try_from(v).unwrap_or_else(|_| panic!("index value {v} does not fit the configured index width"))
}

/// Lowercase file extension, used to pick a serialization format from a
/// path.
fn ext_lower(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn read_index<I: IndexInt>(r: &mut impl Read, width: IndexWidth) -> Result<I, SparseError> {
    match width {
        IndexWidth::W32 => {
            let mut buf = [0u8; 4];
            r.read_exact(&mut buf).map_err(|e| wrap_truncated(e, 4))?;
            Ok(from_usize(u32::from_le_bytes(buf) as usize))
        }
        IndexWidth::W64 => {
            let mut buf = [0u8; 8];
            r.read_exact(&mut buf).map_err(|e| wrap_truncated(e, 8))?;
            Ok(from_usize(u64::from_le_bytes(buf) as usize))
        }
    }
}

fn write_index<I: IndexInt>(w: &mut impl Write, width: IndexWidth, v: I) -> std::io::Result<()> {
    let n: u64 = v.into();
    match width {
        IndexWidth::W32 => w.write_all(&(n as u32).to_le_bytes()),
        IndexWidth::W64 => w.write_all(&n.to_le_bytes()),
    }
}

fn wrap_truncated(e: std::io::Error, needed: usize) -> SparseError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        SparseError::Truncated { needed }
    } else {
        SparseError::Io(e)
    }
}

impl<S: Scalar, I: IndexInt> SparseStore<S, I> {
    /// Write the fixed binary sparse matrix format (sentinel byte, index
    /// width, scalar kind, dimensions, then `ptr`/`ind`/`val` in that order).
    ///
    /// # Errors
    /// Returns an I/O error if the writer fails.
    pub fn write_binary(&self, w: &mut impl Write) -> Result<(), SparseError> {
        w.write_all(&[b'R', I::WIDTH.tag(), S::KIND.tag()])?;
        write_index(w, I::WIDTH, from_usize::<I>(self.n()))?;
        write_index(w, I::WIDTH, from_usize::<I>(self.n()))?;
        write_index(w, I::WIDTH, from_usize::<I>(self.nnz()))?;
        for &p in self.ptr() {
            write_index(w, I::WIDTH, p)?;
        }
        for &c in self.ind() {
            write_index(w, I::WIDTH, c)?;
        }
        let mut buf = Vec::new();
        for v in self.val() {
            v.write_le(&mut buf);
        }
        w.write_all(&buf)?;
        Ok(())
    }

    /// Read the fixed binary sparse matrix format written by
    /// [`Self::write_binary`].
    ///
    /// Rejects on sentinel mismatch, index-width mismatch, or scalar-kind
    /// mismatch against the caller's expected `S`/`I` type parameters.
    ///
    /// # Errors
    /// Returns [`SparseError`] on any format mismatch, truncation, or
    /// invariant violation.
    pub fn read_binary(r: &mut impl Read) -> Result<Self, SparseError> {
        let mut header = [0u8; 3];
        r.read_exact(&mut header).map_err(|e| wrap_truncated(e, 3))?;
        if header[0] != b'R' {
            return Err(SparseError::BadSentinel { found: header[0] });
        }
        let file_width =
            IndexWidth::from_tag(header[1]).ok_or(SparseError::BadSentinel { found: header[1] })?;
        if file_width != I::WIDTH {
            return Err(SparseError::IndexWidthMismatch {
                file: file_width,
                expected: I::WIDTH,
            });
        }
        let file_kind =
            ScalarKind::from_tag(header[2]).ok_or(SparseError::BadSentinel { found: header[2] })?;
        if file_kind != S::KIND {
            return Err(SparseError::ScalarKindMismatch {
                file: file_kind,
                expected: S::KIND,
            });
        }

        let n1: I = read_index(r, I::WIDTH)?;
        let _n2: I = read_index(r, I::WIDTH)?;
        let nnz: I = read_index(r, I::WIDTH)?;
        let n = as_usize(n1);
        let nnz = as_usize(nnz);

        let mut ptr = Vec::with_capacity(n + 1);
        for _ in 0..=n {
            ptr.push(read_index(r, I::WIDTH)?);
        }
        let mut ind = Vec::with_capacity(nnz);
        for _ in 0..nnz {
            ind.push(read_index(r, I::WIDTH)?);
        }

        let comp_width = S::KIND.component_width();
        let per_value = if S::KIND.is_complex() { comp_width * 2 } else { comp_width };
        let mut raw = vec![0u8; per_value * nnz];
        r.read_exact(&mut raw).map_err(|e| wrap_truncated(e, per_value * nnz))?;
        let mut val = Vec::with_capacity(nnz);
        for k in 0..nnz {
            val.push(S::read_le(&raw[k * per_value..(k + 1) * per_value]));
        }

        Self::from_raw(n, ptr, ind, val, false)
    }

    /// Write the Matrix Market coordinate text format (1-indexed,
    /// 17-digit precision, real or complex).
    ///
    /// # Errors
    /// Returns an I/O error if the writer fails.
    pub fn write_matrix_market(&self, w: &mut impl Write) -> Result<(), SparseError> {
        let kind_word = if S::KIND.is_complex() { "complex" } else { "real" };
        writeln!(w, "%%MatrixMarket matrix coordinate {kind_word} general")?;
        writeln!(w, "{} {} {}", self.n(), self.n(), self.nnz())?;
        for r in 0..self.n() {
            let lo = as_usize(self.ptr()[r]);
            let hi = as_usize(self.ptr()[r + 1]);
            for k in lo..hi {
                let c = as_usize(self.ind()[k]);
                writeln!(w, "{} {} {}", r + 1, c + 1, self.val()[k].format_mm())?;
            }
        }
        Ok(())
    }

    /// Read the Matrix Market coordinate text format. Entries are sorted
    /// lexicographically by (row, col); duplicates are not de-duplicated.
    ///
    /// # Errors
    /// Returns [`SparseError::MatrixMarketParse`] on any malformed line.
    pub fn read_matrix_market(r: &mut impl Read) -> Result<Self, SparseError> {
        let mut text = String::new();
        r.read_to_string(&mut text)?;
        let mut lines = text.lines();

        let header = lines
            .next()
            .ok_or_else(|| SparseError::MatrixMarketParse("empty file".into()))?;
        if !header.starts_with("%%MatrixMarket") {
            return Err(SparseError::MatrixMarketParse(format!(
                "missing MatrixMarket header, found: {header}"
            )));
        }
        let is_complex = header.contains("complex");

        let dims_line = lines
            .find(|l| !l.trim_start().starts_with('%') && !l.trim().is_empty())
            .ok_or_else(|| SparseError::MatrixMarketParse("missing dimension line".into()))?;
        let mut dims = dims_line.split_whitespace();
        let n: usize = dims
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SparseError::MatrixMarketParse("bad n".into()))?;
        let _n2: usize = dims
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SparseError::MatrixMarketParse("bad n".into()))?;
        let nnz: usize = dims
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SparseError::MatrixMarketParse("bad nnz".into()))?;

        let mut triplets: Vec<(usize, usize, S)> = Vec::with_capacity(nnz);
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut f = line.split_whitespace();
            let row: usize = f
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| SparseError::MatrixMarketParse(format!("bad row in: {line}")))?;
            let col: usize = f
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| SparseError::MatrixMarketParse(format!("bad col in: {line}")))?;
            let value = parse_mm_value::<S>(&mut f, is_complex, line)?;
            if row == 0 || col == 0 || row > n || col > n {
                return Err(SparseError::MatrixMarketParse(format!(
                    "index out of range in: {line}"
                )));
            }
            triplets.push((row - 1, col - 1, value));
        }
        triplets.sort_by_key(|(r, c, _)| (*r, *c));

        let mut ptr = vec![0usize; n + 1];
        for &(r, _, _) in &triplets {
            ptr[r + 1] += 1;
        }
        for r in 0..n {
            ptr[r + 1] += ptr[r];
        }
        let mut ind = vec![0usize; triplets.len()];
        let mut val = vec![S::zero(); triplets.len()];
        for (k, &(_, c, v)) in triplets.iter().enumerate() {
            ind[k] = c;
            val[k] = v;
        }

        Self::from_raw(
            n,
            ptr.into_iter().map(from_usize).collect(),
            ind.into_iter().map(from_usize).collect(),
            val,
            false,
        )
    }
}

fn parse_mm_value<S: Scalar>(
    fields: &mut std::str::SplitWhitespace<'_>,
    is_complex: bool,
    line: &str,
) -> Result<S, SparseError> {
    let re: f64 = fields
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| SparseError::MatrixMarketParse(format!("bad value in: {line}")))?;
    let im: f64 = if is_complex {
        fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SparseError::MatrixMarketParse(format!("bad imag value in: {line}")))?
    } else {
        0.0
    };
    Ok(S::from_re_im(re, im))
}

/// Ensure the parent directory of `path` exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating parent directory for {}", path.display()))?;
        }
    }
    Ok(())
}

/// Write `store` to `path`, choosing binary vs. Matrix Market by extension
/// (`.bin`/`.mtx`, case-insensitive; anything else defaults to binary).
///
/// # Errors
/// Propagates I/O and format errors with path context attached.
pub fn write_auto<S: Scalar, I: IndexInt>(store: &SparseStore<S, I>, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut f = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    match ext_lower(path).as_str() {
        "mtx" => store
            .write_matrix_market(&mut f)
            .with_context(|| format!("writing matrix market to {}", path.display())),
        _ => store
            .write_binary(&mut f)
            .with_context(|| format!("writing binary sparse format to {}", path.display())),
    }
}

/// Read a `SparseStore` from `path`, choosing binary vs. Matrix Market by
/// extension (`.bin`/`.mtx`, case-insensitive; anything else defaults to
/// binary).
///
/// # Errors
/// Propagates I/O and format errors with path context attached.
pub fn read_auto<S: Scalar, I: IndexInt>(path: &Path) -> Result<SparseStore<S, I>> {
    let mut f =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    match ext_lower(path).as_str() {
        "mtx" => SparseStore::read_matrix_market(&mut f)
            .with_context(|| format!("reading matrix market from {}", path.display())),
        _ => SparseStore::read_binary(&mut f)
            .with_context(|| format!("reading binary sparse format from {}", path.display())),
    }
}

/// Write a CBOR-wrapped `Versioned<T>` payload,
/// used for auxiliary artifacts that are not part of the mandated wire
/// formats above (e.g. a persisted separator tree).
///
/// # Errors
/// Propagates serialization and I/O errors.
pub fn write_versioned_cbor<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let wrapped = Versioned::v1(value);
    let f = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    ciborium::into_writer(&wrapped, f).with_context(|| format!("encoding CBOR to {}", path.display()))
}

/// Read a CBOR-wrapped `Versioned<T>` payload written by
/// [`write_versioned_cbor`].
///
/// # Errors
/// Propagates deserialization and I/O errors.
pub fn read_versioned_cbor<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let f = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let wrapped: Versioned<T> =
        ciborium::from_reader(f).with_context(|| format!("decoding CBOR from {}", path.display()))?;
    Ok(wrapped.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> SparseStore<f64, u32> {
        let ptr: Vec<u32> = vec![0, 2, 5, 8, 10];
        let ind: Vec<u32> = vec![0, 1, 0, 1, 2, 1, 2, 3, 2, 3];
        let val: Vec<f64> = vec![2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0];
        SparseStore::from_raw(4, ptr, ind, val, true).unwrap()
    }

    #[test]
    fn binary_roundtrip() {
        let a = sample();
        let mut buf = Vec::new();
        a.write_binary(&mut buf).unwrap();
        let b = SparseStore::<f64, u32>::read_binary(&mut Cursor::new(buf)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn binary_rejects_wrong_sentinel() {
        let a = sample();
        let mut buf = Vec::new();
        a.write_binary(&mut buf).unwrap();
        buf[0] = b'X';
        let e = SparseStore::<f64, u32>::read_binary(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(e, SparseError::BadSentinel { .. }));
    }

    #[test]
    fn binary_rejects_scalar_kind_mismatch() {
        let a = sample();
        let mut buf = Vec::new();
        a.write_binary(&mut buf).unwrap();
        let e = SparseStore::<f32, u32>::read_binary(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(e, SparseError::ScalarKindMismatch { .. }));
    }

    #[test]
    fn matrix_market_roundtrip() {
        let a = sample();
        let mut buf = Vec::new();
        a.write_matrix_market(&mut buf).unwrap();
        let b = SparseStore::<f64, u32>::read_matrix_market(&mut Cursor::new(buf)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn binary_complex_roundtrip_s4() {
        use num_complex::Complex;
        let ptr: Vec<u32> = vec![0, 2, 4];
        let ind: Vec<u32> = vec![0, 1, 0, 1];
        let val: Vec<Complex<f64>> = vec![
            Complex::new(1.0, 2.0),
            Complex::new(3.0, 4.0),
            Complex::new(5.0, 6.0),
            Complex::new(7.0, 8.0),
        ];
        let a = SparseStore::from_raw(2, ptr, ind, val, false).unwrap();
        let mut buf = Vec::new();
        a.write_binary(&mut buf).unwrap();
        let b = SparseStore::<Complex<f64>, u32>::read_binary(&mut Cursor::new(buf)).unwrap();
        assert_eq!(a, b);
    }
}
