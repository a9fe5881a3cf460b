// crates/sparse-core/src/types.rs

//! Scalar/index type tags and the small trait bounds used throughout the
//! multifrontal kernel to stay generic over `{f32,f64,c32,c64} x {i32,i64}`.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Scalar kind tag, as it appears in the binary format (byte 2).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    /// `f32`
    Single,
    /// `f64`
    Double,
    /// `Complex<f32>`
    ComplexSingle,
    /// `Complex<f64>`
    ComplexDouble,
}

impl ScalarKind {
    /// The byte tag used in the binary format.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Single => b's',
            Self::Double => b'd',
            Self::ComplexSingle => b'c',
            Self::ComplexDouble => b'z',
        }
    }

    /// Parse a binary-format scalar tag byte.
    #[must_use]
    pub fn from_tag(b: u8) -> Option<Self> {
        match b {
            b's' => Some(Self::Single),
            b'd' => Some(Self::Double),
            b'c' => Some(Self::ComplexSingle),
            b'z' => Some(Self::ComplexDouble),
            _ => None,
        }
    }

    /// Size in bytes of one scalar value on disk (real parts only; complex
    /// values are `Re,Im` interleaved, so this is the size of one component).
    #[inline]
    #[must_use]
    pub const fn component_width(self) -> usize {
        match self {
            Self::Single | Self::ComplexSingle => 4,
            Self::Double | Self::ComplexDouble => 8,
        }
    }

    /// Whether this kind stores two components (Re, Im) per value.
    #[inline]
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::ComplexSingle | Self::ComplexDouble)
    }
}

/// Index width tag, as it appears in the binary format (byte 1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexWidth {
    /// 32-bit indices.
    W32,
    /// 64-bit indices.
    W64,
}

impl IndexWidth {
    /// The byte tag used in the binary format (`'4'` or `'8'`).
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::W32 => b'4',
            Self::W64 => b'8',
        }
    }

    /// Parse a binary-format index-width tag byte.
    #[must_use]
    pub fn from_tag(b: u8) -> Option<Self> {
        match b {
            b'4' => Some(Self::W32),
            b'8' => Some(Self::W64),
            _ => None,
        }
    }

    /// Width in bytes of a single index value on disk.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }
}

/// Index integer bound: the index types a `SparseStore` may be built over.
pub trait IndexInt:
    Copy
    + Clone
    + Ord
    + std::fmt::Debug
    + num_traits::PrimInt
    + num_traits::Unsigned
    + TryFrom<usize>
    + Into<u64>
{
    /// The binary-format width tag for this index type.
    const WIDTH: IndexWidth;
}

impl IndexInt for u32 {
    const WIDTH: IndexWidth = IndexWidth::W32;
}

impl IndexInt for u64 {
    const WIDTH: IndexWidth = IndexWidth::W64;
}

/// Scalar bound shared by real and complex entries.
///
/// Keeps the kernels generic over `{f32,f64,Complex<f32>,Complex<f64>}`
/// without duplicating the per-row CSR walk four times.
pub trait Scalar:
    Copy
    + Clone
    + Default
    + PartialEq
    + std::fmt::Debug
    + Send
    + Sync
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
    + std::ops::AddAssign
    + std::ops::SubAssign
{
    /// The binary-format scalar tag for this type.
    const KIND: ScalarKind;

    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// `|x|` as an `f64`, used for residual computation and MC64 magnitudes.
    fn abs64(&self) -> f64;

    /// Complex conjugate; the identity for the two real kinds. Used by
    /// `gerc` (the conjugated rank-1 update); the non-conjugated kernels
    /// never need to call it.
    fn conj(&self) -> Self;

    /// MC64's expected magnitude: `Re(val)` for real kinds, `|val|` for complex.
    fn mc64_magnitude(&self) -> f64;

    /// Write this value's components (Re, [Im]) little-endian into `out`.
    fn write_le(&self, out: &mut Vec<u8>);

    /// Read one value's components from a little-endian byte slice.
    fn read_le(buf: &[u8]) -> Self;

    /// Format with 17 significant digits, as Matrix Market requires.
    /// Complex values produce two space-separated fields (`Re Im`).
    fn format_mm(&self) -> String;

    /// Construct from `(Re, Im)` components; real kinds discard `im`.
    fn from_re_im(re: f64, im: f64) -> Self;
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Single;
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn abs64(&self) -> f64 {
        f64::from(self.abs())
    }
    fn conj(&self) -> Self {
        *self
    }
    fn mc64_magnitude(&self) -> f64 {
        f64::from(*self)
    }
    fn write_le(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
    fn read_le(buf: &[u8]) -> Self {
        Self::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
    }
    fn format_mm(&self) -> String {
        format!("{self:.17e}")
    }
    fn from_re_im(re: f64, _im: f64) -> Self {
        re as Self
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Double;
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn abs64(&self) -> f64 {
        self.abs()
    }
    fn conj(&self) -> Self {
        *self
    }
    fn mc64_magnitude(&self) -> f64 {
        *self
    }
    fn write_le(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
    fn read_le(buf: &[u8]) -> Self {
        let mut b = [0u8; 8];
        b.copy_from_slice(&buf[..8]);
        Self::from_le_bytes(b)
    }
    fn format_mm(&self) -> String {
        format!("{self:.17e}")
    }
    fn from_re_im(re: f64, _im: f64) -> Self {
        re
    }
}

impl Scalar for Complex<f32> {
    const KIND: ScalarKind = ScalarKind::ComplexSingle;
    fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
    fn one() -> Self {
        Self::new(1.0, 0.0)
    }
    fn abs64(&self) -> f64 {
        f64::from(self.norm())
    }
    fn conj(&self) -> Self {
        Complex::conj(self)
    }
    fn mc64_magnitude(&self) -> f64 {
        f64::from(self.norm())
    }
    fn write_le(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.re.to_le_bytes());
        out.extend_from_slice(&self.im.to_le_bytes());
    }
    fn read_le(buf: &[u8]) -> Self {
        let re = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let im = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        Self::new(re, im)
    }
    fn format_mm(&self) -> String {
        format!("{:.17e} {:.17e}", self.re, self.im)
    }
    fn from_re_im(re: f64, im: f64) -> Self {
        Self::new(re as f32, im as f32)
    }
}

impl Scalar for Complex<f64> {
    const KIND: ScalarKind = ScalarKind::ComplexDouble;
    fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
    fn one() -> Self {
        Self::new(1.0, 0.0)
    }
    fn abs64(&self) -> f64 {
        self.norm()
    }
    fn conj(&self) -> Self {
        Complex::conj(self)
    }
    fn mc64_magnitude(&self) -> f64 {
        self.norm()
    }
    fn write_le(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.re.to_le_bytes());
        out.extend_from_slice(&self.im.to_le_bytes());
    }
    fn read_le(buf: &[u8]) -> Self {
        let mut re_b = [0u8; 8];
        let mut im_b = [0u8; 8];
        re_b.copy_from_slice(&buf[0..8]);
        im_b.copy_from_slice(&buf[8..16]);
        Self::new(f64::from_le_bytes(re_b), f64::from_le_bytes(im_b))
    }
    fn format_mm(&self) -> String {
        format!("{:.17e} {:.17e}", self.re, self.im)
    }
    fn from_re_im(re: f64, im: f64) -> Self {
        Self::new(re, im)
    }
}

/// A version-tagged payload, used for CBOR/JSON persistence of auxiliary
/// artifacts (e.g. a serialized separator tree) alongside the raw wire
/// formats mandated by the external interfaces.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Versioned<T> {
    /// Format version, bumped on incompatible layout changes.
    pub ver: u32,
    /// The wrapped payload.
    pub payload: T,
}

impl<T> Versioned<T> {
    /// Wrap `payload` at version 1.
    #[must_use]
    pub const fn v1(payload: T) -> Self {
        Self { ver: 1, payload }
    }
}
