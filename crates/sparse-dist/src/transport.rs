// crates/sparse-dist/src/transport.rs

//! Distributed-memory layout types and the transport a real BLACS/ScaLAPACK
//! binding would implement.
//!
//! `sparse-dist` specifies only the calling contract: the
//! shapes below describe a 2D block-cyclic matrix and its 1D column-cyclic
//! counterpart, and [`BlockCyclicTransport`] is the set of collective
//! operations `front_multiply_2d` drives. No concrete transport ships here;
//! [`NoTransport`] is the stand-in that compiles and reports unconfigured
//! until a real binding is wired in.

use sparse_core::Scalar;

use crate::error::DistError;

/// A BLACS-style 2D process grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGrid {
    /// Process rows.
    pub nprow: usize,
    /// Process columns.
    pub npcol: usize,
    /// This process's row in the grid.
    pub myrow: usize,
    /// This process's column in the grid.
    pub mycol: usize,
}

/// A dense matrix distributed in 2D block-cyclic layout: `global_rows x
/// global_cols`, tiled into `block_rows x block_cols` blocks dealt round-robin
/// across [`ProcessGrid`]. `local` is this process's share, column-major with
/// leading dimension `local_ld`.
#[derive(Debug, Clone)]
pub struct BlockCyclicMatrix<S> {
    /// Global row count.
    pub global_rows: usize,
    /// Global column count.
    pub global_cols: usize,
    /// Block-cyclic tile height.
    pub block_rows: usize,
    /// Block-cyclic tile width.
    pub block_cols: usize,
    /// This process's local share, column-major.
    pub local: Vec<S>,
    /// Leading dimension of `local`.
    pub local_ld: usize,
}

/// The same matrix redistributed to 1D column-cyclic layout with block size
/// equal to `global_rows`: every column resides entirely
/// on one process column, so a single `pgeadd` of one row never splits
/// across processes.
#[derive(Debug, Clone)]
pub struct ColumnCyclicMatrix<S> {
    /// Global row count.
    pub global_rows: usize,
    /// Global column count.
    pub global_cols: usize,
    /// This process's local share, column-major.
    pub local: Vec<S>,
    /// Leading dimension of `local`.
    pub local_ld: usize,
}

/// Collective operations a real BLACS/ScaLAPACK binding would implement.
///
/// `front_multiply_2d` drives these in three phases: redistribute `R`,
/// `Srow`, `Scol` from 2D block-cyclic to 1D column-cyclic, perform the
/// local merge-scan with one `pgeadd` per contributing entry, then
/// redistribute `Srow`/`Scol` back.
pub trait BlockCyclicTransport<S: Scalar>: Send + Sync {
    /// Redistribute a 2D block-cyclic matrix to 1D column-cyclic
    /// (`pgemr2d`-shaped).
    ///
    /// # Errors
    /// See [`DistError`].
    fn redistribute_to_column_cyclic(&self, grid: ProcessGrid, m: &BlockCyclicMatrix<S>) -> Result<ColumnCyclicMatrix<S>, DistError>;

    /// Redistribute a 1D column-cyclic matrix back to 2D block-cyclic.
    ///
    /// # Errors
    /// See [`DistError`].
    fn redistribute_to_block_cyclic(&self, grid: ProcessGrid, m: &ColumnCyclicMatrix<S>, block_rows: usize, block_cols: usize) -> Result<BlockCyclicMatrix<S>, DistError>;

    /// `dst[dst_row, ..] += alpha * src[src_row, ..]` across the process
    /// column that owns `dst_row` (`pgeadd('N', 1, ncols, ...)`-shaped).
    ///
    /// # Errors
    /// See [`DistError`].
    fn pgeadd(&self, grid: ProcessGrid, alpha: S, src: &ColumnCyclicMatrix<S>, src_row: usize, dst: &mut ColumnCyclicMatrix<S>, dst_row: usize) -> Result<(), DistError>;
}

/// The stand-in transport this workspace ships: every call reports
/// [`DistError::NoTransportConfigured`]. A real binding (BLACS + ScaLAPACK
/// `pgemr2d`/`pgeadd`) is an explicit Non-goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransport;

impl<S: Scalar> BlockCyclicTransport<S> for NoTransport {
    fn redistribute_to_column_cyclic(&self, _grid: ProcessGrid, _m: &BlockCyclicMatrix<S>) -> Result<ColumnCyclicMatrix<S>, DistError> {
        Err(DistError::NoTransportConfigured)
    }

    fn redistribute_to_block_cyclic(&self, _grid: ProcessGrid, _m: &ColumnCyclicMatrix<S>, _block_rows: usize, _block_cols: usize) -> Result<BlockCyclicMatrix<S>, DistError> {
        Err(DistError::NoTransportConfigured)
    }

    fn pgeadd(&self, _grid: ProcessGrid, _alpha: S, _src: &ColumnCyclicMatrix<S>, _src_row: usize, _dst: &mut ColumnCyclicMatrix<S>, _dst_row: usize) -> Result<(), DistError> {
        Err(DistError::NoTransportConfigured)
    }
}
